pub mod input;

use crate::domain::email::{AnalysisSummary, Email, EmailId, ResponseTime};
use crate::domain::reply::{PlaceholderLegend, ReplySuggestion};
use crate::domain::upload::FileInfo;
use crate::error::ClientError;
use input::TextField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    #[default]
    Unauthenticated,
    AwaitingApiKey,
    AwaitingGmailConnect,
    AwaitingAuthCode,
    /// Terminal for the session.
    Connected,
}

/// The auth status line under the header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Hidden,
    Checking,
    PendingAuthorization,
    Completing,
    Connected,
    Failed(String),
}

/// Visibility of every popup. Flags are independent except for the
/// auth-url -> auth-code hand-off owned by the auth flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modals {
    pub api_key: bool,
    pub auth_url: bool,
    pub auth_code: bool,
    pub reply: bool,
    pub upload: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub phase: AuthPhase,
    pub status: ConnectionStatus,
    pub auth_url: Option<String>,

    pub api_key_input: TextField,
    pub api_key_error: Option<String>,
    pub key_in_flight: bool,

    pub code_input: TextField,
    pub code_error: Option<String>,
    pub code_in_flight: bool,

    pub connect_in_flight: bool,
}

/// Which screen region a controller reports into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    ApiKeyPrompt,
    AuthCodePrompt,
    UploadPrompt,
}

/// Card shown for one email, in backend order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCard {
    pub id: EmailId,
    pub subject: String,
    pub from: String,
    pub summary: String,
    pub attachment_count: usize,
    pub urgency: Option<u8>,
    pub importance: Option<u8>,
    pub response_time: Option<ResponseTime>,
    pub sentiment: Option<String>,
}

impl From<&Email> for EmailCard {
    fn from(e: &Email) -> Self {
        let priority = e.priority_analysis.as_ref();
        Self {
            id: e.id.clone(),
            subject: e.subject.clone(),
            from: e.from.clone(),
            summary: e.summary.clone(),
            attachment_count: e.attachments.len(),
            urgency: priority.map(|p| p.urgency_score),
            importance: priority.map(|p| p.importance_score),
            response_time: priority.map(|p| p.suggested_response_time),
            sentiment: e.sentiment.as_ref().map(|s| s.headline()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListContent {
    /// Cleared; nothing rendered yet.
    #[default]
    Blank,
    Empty,
    Cards(Vec<EmailCard>),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct ListPane {
    pub loading: bool,
    pub content: ListContent,
    pub summary: Option<AnalysisSummary>,
    /// A refresh was requested while one was in flight.
    pub refresh_queued: bool,
    pub cursor: usize,
}

impl ListPane {
    pub fn cards(&self) -> &[EmailCard] {
        match &self.content {
            ListContent::Cards(c) => c,
            _ => &[],
        }
    }

    pub fn highlighted(&self) -> Option<&EmailCard> {
        self.cards().get(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: i32) {
        let len = self.cards().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as i64 + delta as i64).clamp(0, len as i64 - 1);
        self.cursor = next as usize;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReplyOptions {
    #[default]
    Loading,
    Ready {
        options: Vec<ReplySuggestion>,
        legend: Option<PlaceholderLegend>,
    },
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyFocus {
    #[default]
    Options,
    Subject,
    Body,
}

impl ReplyFocus {
    pub fn next(self) -> Self {
        match self {
            ReplyFocus::Options => ReplyFocus::Subject,
            ReplyFocus::Subject => ReplyFocus::Body,
            ReplyFocus::Body => ReplyFocus::Options,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplyPane {
    /// Bumped on every open/close; responses carrying an older value are stale.
    pub generation: u64,
    pub options: ReplyOptions,
    /// The suggestion last copied into the fields.
    pub chosen: Option<ReplySuggestion>,
    pub subject: TextField,
    pub body: TextField,
    /// A send-reply request is outstanding. Outlives close/reopen; only its
    /// completion clears it.
    pub sending: bool,
    pub focus: ReplyFocus,
    pub option_cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadResult {
    #[default]
    None,
    Analysed(FileInfo),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct UploadPane {
    pub generation: u64,
    pub filename: Option<String>,
    pub busy: bool,
    pub in_flight: bool,
    pub result: UploadResult,
    /// Manual file-picker input; reset after each upload completes.
    pub path_input: TextField,
    /// Rejected selection, shown in the prompt and the pane.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct NextEmailPane {
    pub email: Option<Email>,
    pub in_flight: bool,
}

/// Everything the screen shows. One instance per session, owned by the app
/// and handed to each controller.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    emails: Vec<Email>,
    selected: Option<EmailId>,

    pub modals: Modals,
    pub auth: AuthState,
    pub list: ListPane,
    pub reply: ReplyPane,
    pub upload: UploadPane,
    pub next: NextEmailPane,

    /// Blocking alert; dismissed by any key.
    pub alert: Option<String>,
    pub notice: Option<Notice>,
}

impl ViewState {
    pub fn emails(&self) -> &[Email] {
        &self.emails
    }

    pub fn email(&self, id: &str) -> Option<&Email> {
        self.emails.iter().find(|e| e.id == id)
    }

    /// Replace the list wholesale. A selection that no longer resolves is dropped.
    pub fn replace_emails(&mut self, emails: Vec<Email>) {
        self.emails = emails;
        if let Some(id) = &self.selected {
            if !self.emails.iter().any(|e| &e.id == id) {
                self.selected = None;
            }
        }
    }

    pub fn selected_email(&self) -> Option<&Email> {
        self.selected.as_deref().and_then(|id| self.email(id))
    }

    /// Select by id; ids not in the current list are refused.
    pub fn select(&mut self, id: &str) -> bool {
        if self.email(id).is_some() {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn report(&mut self, region: Region, err: &ClientError) {
        match region {
            Region::ApiKeyPrompt => self.auth.api_key_error = Some(err.to_string()),
            Region::AuthCodePrompt => self.auth.code_error = Some(err.to_string()),
            Region::UploadPrompt => self.upload.error = Some(err.to_string()),
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            text: text.into(),
        });
    }
}
