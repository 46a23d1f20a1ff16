//! API-key gate and Gmail OAuth hand-off.
//!
//! `Unauthenticated -> AwaitingApiKey -> AwaitingGmailConnect ->
//! AwaitingAuthCode -> Connected`. `AwaitingAuthCode` is skipped when the
//! backend already holds a token. `Connected` is never left.

use log::{debug, info, warn};

use crate::app::{Call, Command, email_list};
use crate::error::{ClientError, ClientResult};
use crate::state::{AuthPhase, ConnectionStatus, ViewState};

/// Prefix the backend puts in front of the authorization URL.
pub const AUTH_URL_MARKER: &str = "Please authenticate at:";

/// Pull the authorization URL out of a backend message: the text after the
/// marker up to the next newline, trimmed.
pub fn extract_auth_url(message: &str) -> Option<String> {
    let (_, rest) = message.split_once(AUTH_URL_MARKER)?;
    let url = rest.split('\n').next().unwrap_or("").trim();
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

pub fn enter(state: &mut ViewState) {
    state.auth.phase = AuthPhase::AwaitingApiKey;
    state.modals.api_key = true;
}

/// Whether the connect control is live.
pub fn connect_enabled(state: &ViewState) -> bool {
    state.auth.phase == AuthPhase::AwaitingGmailConnect
        && !state.auth.connect_in_flight
        && !state.modals.auth_url
}

pub fn submit_api_key(state: &mut ViewState, key: &str) -> ClientResult<Vec<Command>> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ClientError::Validation("API key is required".into()));
    }
    if state.auth.key_in_flight {
        return Ok(vec![]);
    }
    state.auth.key_in_flight = true;
    state.auth.api_key_error = None;
    Ok(vec![Command::Call(Call::SetApiKey {
        api_key: key.to_string(),
    })])
}

pub fn api_key_set(state: &mut ViewState, result: ClientResult<()>) {
    state.auth.key_in_flight = false;
    match result {
        Ok(()) => {
            info!("API key accepted");
            state.modals.api_key = false;
            state.auth.api_key_input.clear();
            if matches!(
                state.auth.phase,
                AuthPhase::Unauthenticated | AuthPhase::AwaitingApiKey
            ) {
                state.auth.phase = AuthPhase::AwaitingGmailConnect;
            }
        }
        Err(e) => {
            warn!("API key rejected: {e}");
            state.auth.api_key_error = Some(format!("Failed to set API key: {e}"));
        }
    }
}

pub fn connect_gmail(state: &mut ViewState) -> Vec<Command> {
    match state.auth.phase {
        AuthPhase::AwaitingGmailConnect if connect_enabled(state) => {
            state.auth.connect_in_flight = true;
            state.auth.status = ConnectionStatus::Checking;
            vec![Command::Call(Call::StartAuth)]
        }
        AuthPhase::AwaitingAuthCode => {
            // the code prompt may have been dismissed; bring it back
            state.modals.auth_code = true;
            vec![]
        }
        phase => {
            debug!("connect ignored in {phase:?}");
            vec![]
        }
    }
}

pub fn auth_started(state: &mut ViewState, result: ClientResult<()>) -> Vec<Command> {
    state.auth.connect_in_flight = false;
    let err = match result {
        Ok(()) => return become_connected(state),
        Err(e) => e,
    };

    match err.backend_message().and_then(extract_auth_url) {
        Some(url) => {
            info!("authorization required at {url}");
            state.auth.auth_url = Some(url);
            state.auth.status = ConnectionStatus::PendingAuthorization;
            state.modals.auth_url = true;
        }
        None => {
            warn!("gmail connect failed: {err}");
            state.auth.status = ConnectionStatus::Failed(err.to_string());
        }
    }
    vec![]
}

/// Dismissing the URL prompt always hands over to the code prompt.
pub fn close_auth_url_prompt(state: &mut ViewState) {
    state.modals.auth_url = false;
    state.modals.auth_code = true;
    if state.auth.phase != AuthPhase::Connected {
        state.auth.phase = AuthPhase::AwaitingAuthCode;
    }
}

pub fn submit_auth_code(state: &mut ViewState, code: &str) -> ClientResult<Vec<Command>> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ClientError::Validation(
            "Authorization code is required".into(),
        ));
    }
    if state.auth.code_in_flight {
        return Ok(vec![]);
    }
    state.auth.code_in_flight = true;
    state.auth.code_error = None;
    state.auth.status = ConnectionStatus::Completing;
    Ok(vec![Command::Call(Call::CompleteAuth {
        code: code.to_string(),
    })])
}

pub fn auth_completed(state: &mut ViewState, result: ClientResult<()>) -> Vec<Command> {
    state.auth.code_in_flight = false;
    match result {
        Ok(()) => {
            state.modals.auth_code = false;
            state.auth.code_input.clear();
            become_connected(state)
        }
        Err(e) => {
            warn!("auth code rejected: {e}");
            state.auth.status = ConnectionStatus::Failed(e.to_string());
            vec![]
        }
    }
}

fn become_connected(state: &mut ViewState) -> Vec<Command> {
    info!("connected to Gmail");
    state.auth.phase = AuthPhase::Connected;
    state.auth.status = ConnectionStatus::Connected;
    state.auth.auth_url = None;
    state.modals.auth_url = false;
    email_list::refresh(state)
}
