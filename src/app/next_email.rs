use log::warn;

use crate::app::{Call, Command};
use crate::domain::email::NextEmail;
use crate::error::ClientResult;
use crate::state::{NoticeLevel, ViewState};

pub fn fetch(state: &mut ViewState) -> Vec<Command> {
    if state.next.in_flight {
        return vec![];
    }
    state.next.in_flight = true;
    vec![Command::Call(Call::NextEmail)]
}

pub fn loaded(state: &mut ViewState, result: ClientResult<NextEmail>) {
    state.next.in_flight = false;
    match result {
        Ok(NextEmail::Email(email)) => {
            state.next.email = Some(email);
            state.notify(NoticeLevel::Success, "Next email loaded successfully!");
        }
        Ok(NextEmail::NoMore(_)) => {
            state.notify(NoticeLevel::Info, "No more unread emails!");
        }
        Err(e) => {
            warn!("next email failed: {e}");
            state.notify(
                NoticeLevel::Error,
                format!("Failed to fetch next email: {e}"),
            );
        }
    }
}
