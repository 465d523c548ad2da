//! Lenient view of a document file.
//!
//! Every field is optional so that files written by older tools, or edited
//! by hand, can still be inspected entry by entry instead of being rejected
//! wholesale.

use dragon_core::document::opaque_id;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub data: Option<Vec<RawEntry>>,
    #[serde(rename = "meta-data", default)]
    pub meta: Option<RawMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMeta {
    #[serde(default)]
    pub streamcamel_name: Option<String>,
    #[serde(default)]
    pub sullygnome_name: Option<String>,
    #[serde(default, deserialize_with = "opaque_id")]
    pub game_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub average_viewers: Option<i64>,
    #[serde(default)]
    pub average_channels: Option<i64>,
    #[serde(default)]
    pub peak_viewers: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}
