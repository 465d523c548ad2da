//! Positional extraction of metric values from monthly summary pages.
//!
//! The analytics site renders its monthly numbers in an unlabelled grid, so
//! values are located by absolute element position rather than by class or
//! id. Locators are written in a small XPath subset: `/tag[n]/tag/...`.

use std::fmt;
use std::str::FromStr;

use dragon_core::Metrics;
use scraper::{ElementRef, Html};

/// Built-in locators matching the site's current layout.
pub const DEFAULT_VIEWERS_PATH: &str =
    "/html/body/div[2]/div[2]/div[4]/div/div[3]/div/div/div[2]/div";
pub const DEFAULT_PEAK_PATH: &str =
    "/html/body/div[2]/div[2]/div[4]/div/div[4]/div/div/div[2]/div";
pub const DEFAULT_CHANNELS_PATH: &str =
    "/html/body/div[2]/div[2]/div[4]/div/div[5]/div/div/div[2]/div";

#[derive(Debug, thiserror::Error)]
#[error("Invalid locator '{path}': {reason}")]
pub struct LocatorError {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    tag: String,
    /// 1-based position among same-named siblings.
    index: usize,
}

/// Absolute element path from the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    path: String,
    steps: Vec<Step>,
}

impl Locator {
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Follow the path through `doc`. `None` if any step has no match.
    pub fn resolve<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        let (first, rest) = self.steps.split_first()?;
        let root = doc.root_element();
        if !root.value().name().eq_ignore_ascii_case(&first.tag) || first.index != 1 {
            return None;
        }
        rest.iter().try_fold(root, |node, step| {
            node.children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name().eq_ignore_ascii_case(&step.tag))
                .nth(step.index - 1)
        })
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| LocatorError {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let body = path
            .trim()
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;

        let mut steps = Vec::new();
        for segment in body.split('/') {
            let (tag, index) = match segment.split_once('[') {
                Some((tag, rest)) => {
                    let digits = rest
                        .strip_suffix(']')
                        .ok_or_else(|| invalid("unterminated '['"))?;
                    let index: usize = digits
                        .parse()
                        .map_err(|_| invalid("position must be a positive integer"))?;
                    (tag, index)
                }
                None => (segment, 1),
            };
            if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid("empty or non-alphanumeric tag"));
            }
            if index == 0 {
                return Err(invalid("positions start at 1"));
            }
            steps.push(Step {
                tag: tag.to_ascii_lowercase(),
                index,
            });
        }

        Ok(Self {
            path: path.trim().to_string(),
            steps,
        })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Why a value could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// The body was empty or not UTF-8.
    Unparseable,
    /// The locator did not resolve to an element.
    NotFound,
    /// The element's text was not a non-negative integer.
    NotNumeric(String),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Unparseable => write!(f, "document could not be parsed"),
            Missing::NotFound => write!(f, "element not found"),
            Missing::NotNumeric(text) => write!(f, "not a number: {text:?}"),
        }
    }
}

/// Parse a response body. The HTML parser itself never fails, so only empty
/// and non-UTF-8 bodies are rejected.
pub fn parse_page(body: &[u8]) -> Option<Html> {
    let text = std::str::from_utf8(body).ok()?;
    if text.trim().is_empty() {
        return None;
    }
    Some(Html::parse_document(text))
}

/// Read the integer at `locator`, ignoring thousands separators.
pub fn extract(doc: &Html, locator: &Locator) -> Result<u64, Missing> {
    let element = locator.resolve(doc).ok_or(Missing::NotFound)?;
    let text: String = element.text().collect();
    let trimmed = text.trim();
    trimmed
        .replace(',', "")
        .parse::<u64>()
        .map_err(|_| Missing::NotNumeric(trimmed.to_string()))
}

/// The three locators read from each monthly page.
#[derive(Debug, Clone)]
pub struct PageLocators {
    pub viewers: Locator,
    pub channels: Locator,
    pub peak: Locator,
}

impl PageLocators {
    pub fn from_paths(viewers: &str, channels: &str, peak: &str) -> Result<Self, LocatorError> {
        Ok(Self {
            viewers: viewers.parse()?,
            channels: channels.parse()?,
            peak: peak.parse()?,
        })
    }
}

impl Default for PageLocators {
    fn default() -> Self {
        Self::from_paths(DEFAULT_VIEWERS_PATH, DEFAULT_CHANNELS_PATH, DEFAULT_PEAK_PATH)
            .expect("built-in locators are valid")
    }
}

/// The first metric that could not be read from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricFailure {
    pub field: &'static str,
    pub reason: Missing,
}

impl fmt::Display for MetricFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Extract all three metrics from a monthly page body.
pub fn read_metrics(body: &[u8], locators: &PageLocators) -> Result<Metrics, MetricFailure> {
    let doc = parse_page(body).ok_or(MetricFailure {
        field: "document",
        reason: Missing::Unparseable,
    })?;
    let field = |field: &'static str, locator: &Locator| {
        extract(&doc, locator).map_err(|reason| MetricFailure { field, reason })
    };
    Ok(Metrics {
        average_viewers: field("average_viewers", &locators.viewers)?,
        average_channels: field("average_channels", &locators.channels)?,
        peak_viewers: field("peak_viewers", &locators.peak)?,
    })
}

#[cfg(test)]
#[path = "tests/extract_tests.rs"]
mod tests;
