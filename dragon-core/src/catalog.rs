//! Records supplied by the external game catalog.

use serde::Deserialize;

use crate::document::opaque_id;

/// A game as listed by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogGame {
    pub name: String,
    #[serde(default, deserialize_with = "opaque_id")]
    pub game_id: Option<String>,
    /// Publisher/company the game is listed under, when the catalog knows it.
    #[serde(default, deserialize_with = "opaque_id")]
    pub company_id: Option<String>,
}

impl CatalogGame {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            game_id: None,
            company_id: None,
        }
    }

    pub fn with_game_id(mut self, id: impl Into<String>) -> Self {
        self.game_id = Some(id.into());
        self
    }
}

/// Keep only the games listed under `company_id`; `None` keeps everything.
pub fn filter_by_company(games: Vec<CatalogGame>, company_id: Option<&str>) -> Vec<CatalogGame> {
    match company_id {
        None => games,
        Some(id) => games
            .into_iter()
            .filter(|g| g.company_id.as_deref() == Some(id))
            .collect(),
    }
}
