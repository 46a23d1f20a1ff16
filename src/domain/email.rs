use serde::{Deserialize, Serialize};

/// Backend message id (Gmail ids are opaque strings).
pub type EmailId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    pub from: String,
    pub subject: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub priority_analysis: Option<PriorityAnalysis>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriorityAnalysis {
    /// 1 (low) to 5 (critical)
    #[serde(default)]
    pub urgency_score: u8,
    /// 1 (low) to 5 (critical)
    #[serde(default)]
    pub importance_score: u8,
    #[serde(default)]
    pub suggested_response_time: ResponseTime,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTime {
    Immediate,
    WithinHour,
    WithinDay,
    WithinWeek,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ResponseTime {
    pub fn label(self) -> &'static str {
        match self {
            ResponseTime::Immediate => "reply now",
            ResponseTime::WithinHour => "within an hour",
            ResponseTime::WithinDay => "within a day",
            ResponseTime::WithinWeek => "within a week",
            ResponseTime::Unknown => "no deadline",
        }
    }
}

/// Emotional tone detected by the backend.
///
/// Older backends send a bare label such as `"🙂 Joy"`; it is split into
/// emoji and primary emotion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "SentimentRepr")]
pub struct Sentiment {
    pub emoji: String,
    pub primary_emotion: String,
    pub secondary_emotions: Vec<String>,
    /// 1 to 5
    pub intensity: Option<u8>,
    pub triggers: Vec<String>,
}

impl Sentiment {
    /// `"😀 joy"`, or just the emotion when no emoji was sent.
    pub fn headline(&self) -> String {
        match (self.emoji.is_empty(), self.primary_emotion.is_empty()) {
            (true, _) => self.primary_emotion.clone(),
            (false, true) => self.emoji.clone(),
            (false, false) => format!("{} {}", self.emoji, self.primary_emotion),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SentimentRepr {
    Label(String),
    Full {
        #[serde(default)]
        emoji: String,
        #[serde(default)]
        primary_emotion: String,
        #[serde(default)]
        secondary_emotions: Vec<String>,
        #[serde(default)]
        intensity: Option<u8>,
        #[serde(default)]
        triggers: Vec<String>,
    },
}

impl From<SentimentRepr> for Sentiment {
    fn from(repr: SentimentRepr) -> Self {
        match repr {
            SentimentRepr::Label(label) => {
                let label = label.trim();
                let (emoji, emotion) = match label.split_once(char::is_whitespace) {
                    Some((emoji, emotion)) => (emoji.to_string(), emotion.trim().to_string()),
                    None => (String::new(), label.to_string()),
                };
                Sentiment {
                    emoji,
                    primary_emotion: emotion,
                    ..Default::default()
                }
            }
            SentimentRepr::Full {
                emoji,
                primary_emotion,
                secondary_emotions,
                intensity,
                triggers,
            } => Sentiment {
                emoji,
                primary_emotion,
                secondary_emotions,
                intensity,
                triggers,
            },
        }
    }
}

/// Payload of `GET /emails`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EmailBatch {
    #[serde(default)]
    pub emails: Vec<Email>,
    #[serde(default)]
    pub analysis_summary: Option<AnalysisSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub total_emails: usize,
    #[serde(default)]
    pub urgent_count: usize,
    #[serde(default)]
    pub important_count: usize,
    #[serde(default)]
    pub sentiment_distribution: SentimentDistribution,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SentimentDistribution {
    #[serde(default)]
    pub positive: usize,
    #[serde(default)]
    pub negative: usize,
    #[serde(default)]
    pub neutral: usize,
}

/// Result of `GET /next-email`.
#[derive(Debug, Clone, PartialEq)]
pub enum NextEmail {
    Email(Email),
    /// The unread queue is exhausted; carries the backend's note, if any.
    NoMore(String),
}
