//! Controllers as functions of `(event, state) -> commands`.
//!
//! [`App::handle`] mutates the injected [`ViewState`] and returns the side
//! effects to run. The terminal runtime executes them on worker threads and
//! feeds completions back as [`Event::Completed`]; tests execute them inline.

pub mod auth_flow;
pub mod email_list;
pub mod next_email;
pub mod reply;
pub mod upload;

use std::path::PathBuf;
use std::time::Duration;

use log::debug;

use crate::domain::email::{EmailBatch, NextEmail};
use crate::domain::reply::{OutgoingReply, SuggestRequest, Suggestions};
use crate::domain::upload::FileInfo;
use crate::error::ClientResult;
use crate::gateway::ServerGateway;
use crate::state::{AuthPhase, Region, ViewState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub reply_options: u8,
    pub upload_settle: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            reply_options: 3,
            upload_settle: Duration::from_millis(2000),
        }
    }
}

/// One backend request, tagged where a late answer could be stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    StartAuth,
    CompleteAuth { code: String },
    SetApiKey { api_key: String },
    ListEmails,
    SuggestReply { generation: u64, request: SuggestRequest },
    SendReply { generation: u64, reply: OutgoingReply },
    UploadFile { generation: u64, path: PathBuf },
    NextEmail,
}

impl Call {
    pub fn perform(self, gateway: &dyn ServerGateway) -> Outcome {
        match self {
            Call::StartAuth => Outcome::AuthStarted(gateway.start_auth()),
            Call::CompleteAuth { code } => Outcome::AuthCompleted(gateway.complete_auth(&code)),
            Call::SetApiKey { api_key } => Outcome::ApiKeySet(gateway.set_api_key(&api_key)),
            Call::ListEmails => Outcome::EmailsListed(gateway.list_emails()),
            Call::SuggestReply {
                generation,
                request,
            } => Outcome::SuggestionsReady {
                generation,
                result: gateway.suggest_reply(&request),
            },
            Call::SendReply { generation, reply } => Outcome::ReplySent {
                generation,
                result: gateway.send_reply(&reply),
            },
            Call::UploadFile { generation, path } => Outcome::FileUploaded {
                generation,
                result: gateway.upload_file(&path),
            },
            Call::NextEmail => Outcome::NextEmail(gateway.next_email()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    AuthStarted(ClientResult<()>),
    AuthCompleted(ClientResult<()>),
    ApiKeySet(ClientResult<()>),
    EmailsListed(ClientResult<EmailBatch>),
    SuggestionsReady {
        generation: u64,
        result: ClientResult<Suggestions>,
    },
    ReplySent {
        generation: u64,
        result: ClientResult<()>,
    },
    FileUploaded {
        generation: u64,
        result: ClientResult<FileInfo>,
    },
    NextEmail(ClientResult<NextEmail>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Call(Call),
    /// Post [`Event::UploadSettled`] after the delay.
    SettleUpload { generation: u64, after: Duration },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ShowApiKeyPrompt,
    DismissApiKeyPrompt,
    SubmitApiKey(String),
    ConnectGmail,
    CloseAuthUrlPrompt,
    DismissAuthCodePrompt,
    SubmitAuthCode(String),

    RefreshEmails,

    OpenReply(String),
    SelectOption(usize),
    SendReply,
    CloseReply,

    ShowUploadPrompt,
    DismissUploadPrompt,
    /// Dropped or picked files; only the first is used.
    UploadFiles(Vec<PathBuf>),
    UploadSettled { generation: u64 },

    FetchNextEmail,

    DismissAlert,
    DismissNotice,

    Completed(Outcome),
}

pub struct App {
    pub state: ViewState,
    settings: AppSettings,
}

impl App {
    /// Session start: the API-key gate is up and Gmail connect is blocked.
    pub fn new(settings: AppSettings) -> Self {
        let mut state = ViewState::default();
        auth_flow::enter(&mut state);
        Self { state, settings }
    }

    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        let state = &mut self.state;
        match event {
            Event::ShowApiKeyPrompt => {
                state.modals.api_key = true;
                vec![]
            }
            Event::DismissApiKeyPrompt => {
                state.modals.api_key = false;
                vec![]
            }
            Event::SubmitApiKey(key) => guard(
                state,
                Region::ApiKeyPrompt,
                |s| auth_flow::submit_api_key(s, &key),
            ),
            Event::ConnectGmail => auth_flow::connect_gmail(state),
            Event::CloseAuthUrlPrompt => {
                auth_flow::close_auth_url_prompt(state);
                vec![]
            }
            Event::DismissAuthCodePrompt => {
                state.modals.auth_code = false;
                vec![]
            }
            Event::SubmitAuthCode(code) => guard(
                state,
                Region::AuthCodePrompt,
                |s| auth_flow::submit_auth_code(s, &code),
            ),

            Event::RefreshEmails => email_list::refresh(state),

            Event::OpenReply(id) => reply::open(state, &id, self.settings.reply_options),
            Event::SelectOption(index) => {
                reply::select_option(state, index);
                vec![]
            }
            Event::SendReply => reply::send(state),
            Event::CloseReply => {
                reply::close(state);
                vec![]
            }

            Event::ShowUploadPrompt => {
                state.modals.upload = true;
                state.upload.error = None;
                vec![]
            }
            Event::DismissUploadPrompt => {
                state.modals.upload = false;
                state.upload.error = None;
                vec![]
            }
            Event::UploadFiles(paths) => guard(state, Region::UploadPrompt, |s| {
                upload::select_files(s, paths)
            }),
            Event::UploadSettled { generation } => {
                upload::settled(state, generation);
                vec![]
            }

            Event::FetchNextEmail => next_email::fetch(state),

            Event::DismissAlert => {
                state.alert = None;
                vec![]
            }
            Event::DismissNotice => {
                state.notice = None;
                vec![]
            }

            Event::Completed(outcome) => self.complete(outcome),
        }
    }

    fn complete(&mut self, outcome: Outcome) -> Vec<Command> {
        let state = &mut self.state;
        match outcome {
            Outcome::ApiKeySet(result) => {
                auth_flow::api_key_set(state, result);
                vec![]
            }
            Outcome::AuthStarted(result) => auth_flow::auth_started(state, result),
            Outcome::AuthCompleted(result) => auth_flow::auth_completed(state, result),
            Outcome::EmailsListed(result) => email_list::listed(state, result),
            Outcome::SuggestionsReady { generation, result } => {
                reply::suggestions_ready(state, generation, result);
                vec![]
            }
            Outcome::ReplySent { generation, result } => reply::sent(state, generation, result),
            Outcome::FileUploaded { generation, result } => {
                upload::uploaded(state, generation, result, self.settings.upload_settle)
            }
            Outcome::NextEmail(result) => {
                next_email::loaded(state, result);
                vec![]
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state.auth.phase == AuthPhase::Connected
    }
}

/// Run a fallible controller operation; failures are rendered in `region`.
fn guard(
    state: &mut ViewState,
    region: Region,
    op: impl FnOnce(&mut ViewState) -> ClientResult<Vec<Command>>,
) -> Vec<Command> {
    match op(state) {
        Ok(commands) => commands,
        Err(e) => {
            debug!("rejected input for {region:?}: {e}");
            state.report(region, &e);
            vec![]
        }
    }
}
