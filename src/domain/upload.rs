use serde::Deserialize;

use crate::domain::email::Sentiment;

/// Backend analysis of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FileInfo {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub sentiment: Sentiment,
}
