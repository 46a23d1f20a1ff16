use log::{debug, warn};

use crate::app::{Call, Command, reply};
use crate::domain::email::EmailBatch;
use crate::error::ClientResult;
use crate::state::{EmailCard, ListContent, NoticeLevel, ViewState};

/// Clear the list, show the loading indicator and request emails. While a
/// request is in flight further refreshes are coalesced into one follow-up.
pub fn refresh(state: &mut ViewState) -> Vec<Command> {
    if state.list.loading {
        debug!("refresh queued behind in-flight list request");
        state.list.refresh_queued = true;
        return vec![];
    }
    state.list.loading = true;
    state.list.content = ListContent::Blank;
    vec![Command::Call(Call::ListEmails)]
}

pub fn listed(state: &mut ViewState, result: ClientResult<EmailBatch>) -> Vec<Command> {
    state.list.loading = false;
    match result {
        Ok(batch) => {
            debug!("listed {} emails", batch.emails.len());
            // backend order is kept; the server already ranks
            let cards: Vec<EmailCard> = batch.emails.iter().map(EmailCard::from).collect();
            state.list.content = if cards.is_empty() {
                ListContent::Empty
            } else {
                ListContent::Cards(cards)
            };
            state.list.summary = batch.analysis_summary;
            state.replace_emails(batch.emails);
            if state.modals.reply && state.selected_email().is_none() {
                reply::close(state);
                state.notify(
                    NoticeLevel::Info,
                    "The email you were replying to is no longer in the list.",
                );
            }
            let len = state.list.cards().len();
            state.list.cursor = state.list.cursor.min(len.saturating_sub(1));
        }
        Err(e) => {
            warn!("listing emails failed: {e}");
            state.list.content = ListContent::Failed(e.to_string());
        }
    }

    if state.list.refresh_queued {
        state.list.refresh_queued = false;
        return refresh(state);
    }
    vec![]
}
