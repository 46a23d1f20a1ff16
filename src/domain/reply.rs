use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One generated reply. Placeholders such as `[NAME]` are left for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplySuggestion {
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub placeholders: Vec<String>,
}

/// Shared legend explaining the placeholder tokens used by all options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PlaceholderLegend {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub types: BTreeMap<String, String>,
}

/// Payload of `POST /suggest-reply`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Suggestions {
    #[serde(default)]
    pub options: Vec<ReplySuggestion>,
    #[serde(default)]
    pub placeholders: Option<PlaceholderLegend>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestRequest {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    pub num_options: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingReply {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub email_id: String,
}
