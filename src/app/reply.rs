use log::{debug, info, warn};

use crate::app::{Call, Command, email_list};
use crate::domain::reply::{OutgoingReply, SuggestRequest, Suggestions};
use crate::error::ClientResult;
use crate::state::{ReplyFocus, ReplyOptions, ViewState};

/// Local part of the sender's address, used as a greeting hint.
///
/// `"Ann Lee <ann.lee@example.com>"` gives `ann.lee`.
pub fn sender_display_name(from: &str) -> Option<String> {
    let addr = mailparse::addrparse(from)
        .ok()
        .and_then(|list| list.extract_single_info())
        .map(|info| info.addr)
        .unwrap_or_else(|| from.trim().to_string());
    let local = addr.split('@').next().unwrap_or("").trim();
    if local.is_empty() {
        None
    } else {
        Some(local.to_string())
    }
}

/// Open the modal for `email_id` and ask for suggestions. Ids no longer in
/// the list are ignored.
pub fn open(state: &mut ViewState, email_id: &str, num_options: u8) -> Vec<Command> {
    let Some(email) = state.email(email_id) else {
        debug!("reply requested for unknown email {email_id}");
        return vec![];
    };
    let request = SuggestRequest {
        body: email.body.clone(),
        sender_name: sender_display_name(&email.from),
        num_options,
    };
    state.select(email_id);

    let pane = &mut state.reply;
    pane.generation += 1;
    pane.options = ReplyOptions::Loading;
    pane.chosen = None;
    pane.subject.clear();
    pane.body.clear();
    pane.focus = ReplyFocus::Options;
    pane.option_cursor = 0;
    state.modals.reply = true;

    vec![Command::Call(Call::SuggestReply {
        generation: pane.generation,
        request,
    })]
}

pub fn suggestions_ready(state: &mut ViewState, generation: u64, result: ClientResult<Suggestions>) {
    if generation != state.reply.generation || !state.modals.reply {
        debug!("discarding stale suggestions (generation {generation})");
        return;
    }
    state.reply.options = match result {
        Ok(s) => ReplyOptions::Ready {
            options: s.options,
            legend: s.placeholders,
        },
        Err(e) => {
            warn!("reply suggestions failed: {e}");
            ReplyOptions::Failed(e.to_string())
        }
    };
}

/// Copy option `index` into the editable fields. The modal stays open.
pub fn select_option(state: &mut ViewState, index: usize) {
    let ReplyOptions::Ready { options, .. } = &state.reply.options else {
        return;
    };
    let Some(option) = options.get(index).cloned() else {
        return;
    };
    state.reply.subject.set(&option.subject);
    state.reply.body.set(&option.body);
    state.reply.option_cursor = index;
    state.reply.chosen = Some(option);
}

pub fn send(state: &mut ViewState) -> Vec<Command> {
    let Some(email) = state.selected_email() else {
        return vec![];
    };
    if state.reply.sending {
        return vec![];
    }
    let reply = OutgoingReply {
        to: email.from.clone(),
        subject: state.reply.subject.value().to_string(),
        body: state.reply.body.value().to_string(),
        email_id: email.id.clone(),
    };
    state.reply.sending = true;
    vec![Command::Call(Call::SendReply {
        generation: state.reply.generation,
        reply,
    })]
}

pub fn sent(state: &mut ViewState, generation: u64, result: ClientResult<()>) -> Vec<Command> {
    let current = generation == state.reply.generation;
    state.reply.sending = false;
    match result {
        Ok(()) => {
            info!("reply sent");
            if current {
                close(state);
            }
            email_list::refresh(state)
        }
        Err(e) => {
            warn!("sending reply failed: {e}");
            state.alert = Some(format!("Failed to send reply: {e}"));
            vec![]
        }
    }
}

pub fn close(state: &mut ViewState) {
    state.modals.reply = false;
    state.clear_selection();
    state.reply.generation += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::email::Email;
    use crate::domain::reply::ReplySuggestion;
    use crate::error::ClientError;

    fn state_with(from: &str) -> ViewState {
        let mut s = ViewState::default();
        s.replace_emails(vec![Email {
            id: "m1".into(),
            from: from.into(),
            subject: "Lunch?".into(),
            summary: String::new(),
            body: "Want to grab lunch?".into(),
            date: None,
            attachments: vec![],
            priority_analysis: None,
            sentiment: None,
        }]);
        s
    }

    fn suggestions() -> Suggestions {
        Suggestions {
            options: vec![
                ReplySuggestion {
                    subject: "Re: Lunch?".into(),
                    body: "Sure, [TIME] works.".into(),
                    placeholders: vec!["TIME".into()],
                },
                ReplySuggestion {
                    subject: "Re: Lunch? (no)".into(),
                    body: "Sorry, busy.\n\nBest".into(),
                    placeholders: vec![],
                },
            ],
            placeholders: None,
        }
    }

    #[test]
    fn display_name_is_local_part() {
        assert_eq!(
            sender_display_name("Ann Lee <ann.lee@example.com>").as_deref(),
            Some("ann.lee")
        );
        assert_eq!(sender_display_name("bob@example.com").as_deref(), Some("bob"));
        assert_eq!(sender_display_name(""), None);
    }

    #[test]
    fn open_requests_suggestions_for_body() {
        let mut s = state_with("Ann <ann@example.com>");
        let cmds = open(&mut s, "m1", 3);
        assert!(s.modals.reply);
        assert_eq!(s.reply.options, ReplyOptions::Loading);
        assert_eq!(s.selected_email().unwrap().id, "m1");
        let [Command::Call(Call::SuggestReply { request, .. })] = cmds.as_slice() else {
            panic!("unexpected {cmds:?}");
        };
        assert_eq!(request.body, "Want to grab lunch?");
        assert_eq!(request.sender_name.as_deref(), Some("ann"));
        assert_eq!(request.num_options, 3);
    }

    #[test]
    fn open_with_stale_id_is_noop() {
        let mut s = state_with("a@b.c");
        assert!(open(&mut s, "gone", 3).is_empty());
        assert!(!s.modals.reply);
        assert!(s.selected_email().is_none());
    }

    #[test]
    fn select_option_copies_verbatim_and_keeps_modal() {
        let mut s = state_with("a@b.c");
        open(&mut s, "m1", 3);
        let g = s.reply.generation;
        suggestions_ready(&mut s, g, Ok(suggestions()));
        for (i, opt) in suggestions().options.iter().enumerate() {
            select_option(&mut s, i);
            assert_eq!(s.reply.subject.value(), opt.subject);
            assert_eq!(s.reply.body.value(), opt.body);
            assert_eq!(s.reply.chosen.as_ref(), Some(opt));
            assert!(s.modals.reply);
        }
        select_option(&mut s, 9);
        assert_eq!(s.reply.subject.value(), "Re: Lunch? (no)");
    }

    #[test]
    fn failed_suggestions_render_inside_open_modal() {
        let mut s = state_with("a@b.c");
        open(&mut s, "m1", 3);
        let g = s.reply.generation;
        suggestions_ready(&mut s, g, Err(ClientError::application("model overloaded")));
        assert!(s.modals.reply);
        assert_eq!(s.reply.options, ReplyOptions::Failed("model overloaded".into()));
    }

    #[test]
    fn late_suggestions_after_close_are_dropped() {
        let mut s = state_with("a@b.c");
        open(&mut s, "m1", 3);
        let g = s.reply.generation;
        close(&mut s);
        suggestions_ready(&mut s, g, Ok(suggestions()));
        assert_eq!(s.reply.options, ReplyOptions::Loading);

        open(&mut s, "m1", 3);
        suggestions_ready(&mut s, g, Ok(suggestions()));
        assert_eq!(s.reply.options, ReplyOptions::Loading);
    }

    #[test]
    fn send_without_selection_does_nothing() {
        let mut s = state_with("a@b.c");
        s.modals.reply = true;
        let before = s.modals;
        assert!(send(&mut s).is_empty());
        assert_eq!(s.modals, before);
        assert!(!s.reply.sending);
    }

    #[test]
    fn send_posts_edited_fields_to_sender() {
        let mut s = state_with("Ann <ann@example.com>");
        open(&mut s, "m1", 3);
        s.reply.subject.set("Re: Lunch?");
        s.reply.body.set("Yes!");
        let cmds = send(&mut s);
        let [Command::Call(Call::SendReply { reply, .. })] = cmds.as_slice() else {
            panic!("unexpected {cmds:?}");
        };
        assert_eq!(
            reply,
            &OutgoingReply {
                to: "Ann <ann@example.com>".into(),
                subject: "Re: Lunch?".into(),
                body: "Yes!".into(),
                email_id: "m1".into(),
            }
        );
        // no double send while in flight
        assert!(send(&mut s).is_empty());
    }

    #[test]
    fn successful_send_closes_and_refreshes() {
        let mut s = state_with("a@b.c");
        open(&mut s, "m1", 3);
        send(&mut s);
        let g = s.reply.generation;
        let cmds = sent(&mut s, g, Ok(()));
        assert_eq!(cmds, vec![Command::Call(Call::ListEmails)]);
        assert!(!s.modals.reply);
        assert!(s.selected_email().is_none());
    }

    #[test]
    fn failed_send_alerts_and_keeps_fields() {
        let mut s = state_with("a@b.c");
        open(&mut s, "m1", 3);
        s.reply.subject.set("edited subject");
        s.reply.body.set("edited body");
        send(&mut s);
        let g = s.reply.generation;
        let cmds = sent(&mut s, g, Err(ClientError::application("quota exceeded")));
        assert!(cmds.is_empty());
        assert!(s.modals.reply);
        assert_eq!(s.reply.subject.value(), "edited subject");
        assert_eq!(s.reply.body.value(), "edited body");
        assert!(s.alert.as_deref().unwrap().contains("quota exceeded"));
        assert!(!s.reply.sending);
    }

    #[test]
    fn reopening_during_send_cannot_send_again() {
        let mut s = state_with("a@b.c");
        open(&mut s, "m1", 3);
        assert_eq!(send(&mut s).len(), 1);
        let first = s.reply.generation;
        close(&mut s);
        open(&mut s, "m1", 3);
        assert!(send(&mut s).is_empty());

        // the first send lands; the reopened modal stays and may send again
        let cmds = sent(&mut s, first, Ok(()));
        assert_eq!(cmds, vec![Command::Call(Call::ListEmails)]);
        assert!(s.modals.reply);
        assert!(!s.reply.sending);
        assert_eq!(send(&mut s).len(), 1);
    }

    #[test]
    fn close_clears_selection_unconditionally() {
        let mut s = state_with("a@b.c");
        close(&mut s);
        assert!(!s.modals.reply);
        open(&mut s, "m1", 3);
        close(&mut s);
        assert!(s.selected_email().is_none());
    }
}
