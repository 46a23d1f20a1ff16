use std::path::PathBuf;

use log::warn;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{Event, upload};
use crate::state::input::TextField;
use crate::state::{AuthPhase, ReplyFocus, ReplyOptions, ViewState};

#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Quit,
    Emit(Event),
    None,
}

/// Map a key press to an app event. Plain text editing happens here
/// directly on the focused field; everything else goes through the app.
pub fn handle_key(key: KeyEvent, state: &mut ViewState) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }
    if state.alert.is_some() {
        return KeyAction::Emit(Event::DismissAlert);
    }

    let modals = state.modals;
    if modals.api_key {
        return prompt_keys(key, &mut state.auth.api_key_input, |v| {
            Event::SubmitApiKey(v.to_string())
        }, Event::DismissApiKeyPrompt);
    }
    if modals.auth_url {
        return auth_url_keys(key, state);
    }
    if modals.auth_code {
        return prompt_keys(key, &mut state.auth.code_input, |v| {
            Event::SubmitAuthCode(v.to_string())
        }, Event::DismissAuthCodePrompt);
    }
    if modals.upload {
        // typed paths are taken whole; spaces are part of the name
        return prompt_keys(key, &mut state.upload.path_input, |v| {
            let v = v.trim();
            let paths = if v.is_empty() { vec![] } else { vec![PathBuf::from(v)] };
            Event::UploadFiles(paths)
        }, Event::DismissUploadPrompt);
    }
    if modals.reply {
        return reply_keys(key, state);
    }
    main_keys(key, state)
}

/// Terminals deliver dropped files as pasted text.
pub fn handle_paste(text: &str, state: &mut ViewState) -> KeyAction {
    if state.alert.is_some() {
        return KeyAction::None;
    }
    let m = state.modals;
    let field = if m.api_key {
        &mut state.auth.api_key_input
    } else if m.auth_code {
        &mut state.auth.code_input
    } else if m.upload {
        &mut state.upload.path_input
    } else if m.reply && state.reply.focus == ReplyFocus::Subject {
        &mut state.reply.subject
    } else if m.reply && state.reply.focus == ReplyFocus::Body {
        &mut state.reply.body
    } else if m.auth_url || m.reply {
        return KeyAction::None;
    } else {
        let paths = upload::parse_dropped_paths(text);
        if paths.is_empty() {
            return KeyAction::None;
        }
        return KeyAction::Emit(Event::UploadFiles(paths));
    };
    field.push_str(text.trim_end_matches(['\r', '\n']));
    KeyAction::None
}

fn edit(field: &mut TextField, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => field.push(c),
        KeyCode::Backspace => field.backspace(),
        _ => {}
    }
}

fn prompt_keys(
    key: KeyEvent,
    field: &mut TextField,
    submit: impl FnOnce(&str) -> Event,
    dismiss: Event,
) -> KeyAction {
    match key.code {
        KeyCode::Enter => KeyAction::Emit(submit(field.value())),
        KeyCode::Esc => KeyAction::Emit(dismiss),
        _ => {
            edit(field, key);
            KeyAction::None
        }
    }
}

fn auth_url_keys(key: KeyEvent, state: &ViewState) -> KeyAction {
    match key.code {
        KeyCode::Char('o') => {
            if let Some(url) = &state.auth.auth_url {
                if let Err(e) = open::that(url) {
                    warn!("could not open browser: {e}");
                }
            }
            KeyAction::None
        }
        KeyCode::Enter | KeyCode::Esc => KeyAction::Emit(Event::CloseAuthUrlPrompt),
        _ => KeyAction::None,
    }
}

fn reply_keys(key: KeyEvent, state: &mut ViewState) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
        return KeyAction::Emit(Event::SendReply);
    }
    match key.code {
        KeyCode::Esc => return KeyAction::Emit(Event::CloseReply),
        KeyCode::Tab => {
            state.reply.focus = state.reply.focus.next();
            return KeyAction::None;
        }
        _ => {}
    }

    let pane = &mut state.reply;
    match pane.focus {
        ReplyFocus::Options => {
            let count = match &pane.options {
                ReplyOptions::Ready { options, .. } => options.len(),
                _ => 0,
            };
            match key.code {
                KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                    pane.option_cursor = (pane.option_cursor + 1).min(count - 1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    pane.option_cursor = pane.option_cursor.saturating_sub(1);
                }
                KeyCode::Enter => return KeyAction::Emit(Event::SelectOption(pane.option_cursor)),
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    return KeyAction::Emit(Event::SelectOption(index));
                }
                _ => {}
            }
        }
        ReplyFocus::Subject => match key.code {
            KeyCode::Enter => pane.focus = ReplyFocus::Body,
            _ => edit(&mut pane.subject, key),
        },
        ReplyFocus::Body => match key.code {
            KeyCode::Enter => pane.body.push('\n'),
            _ => edit(&mut pane.body, key),
        },
    }
    KeyAction::None
}

fn main_keys(key: KeyEvent, state: &mut ViewState) -> KeyAction {
    match key.code {
        KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Esc => KeyAction::Emit(Event::DismissNotice),
        KeyCode::Down | KeyCode::Char('j') => {
            state.list.move_cursor(1);
            KeyAction::None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.list.move_cursor(-1);
            KeyAction::None
        }
        KeyCode::Home => {
            state.list.cursor = 0;
            KeyAction::None
        }
        KeyCode::Enter => match state.list.highlighted() {
            Some(card) => KeyAction::Emit(Event::OpenReply(card.id.clone())),
            None => KeyAction::None,
        },
        KeyCode::Char('r') if state.auth.phase == AuthPhase::Connected => {
            KeyAction::Emit(Event::RefreshEmails)
        }
        KeyCode::Char('c') => KeyAction::Emit(Event::ConnectGmail),
        KeyCode::Char('a') => KeyAction::Emit(Event::ShowApiKeyPrompt),
        KeyCode::Char('u') => KeyAction::Emit(Event::ShowUploadPrompt),
        KeyCode::Char('n') => KeyAction::Emit(Event::FetchNextEmail),
        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reply::ReplySuggestion;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_into(state: &mut ViewState, text: &str) {
        for c in text.chars() {
            handle_key(press(KeyCode::Char(c)), state);
        }
    }

    #[test]
    fn api_key_prompt_captures_text_and_submits() {
        let mut s = ViewState::default();
        s.modals.api_key = true;
        type_into(&mut s, "sk-12x");
        handle_key(press(KeyCode::Backspace), &mut s);
        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut s),
            KeyAction::Emit(Event::SubmitApiKey("sk-12".into()))
        );
    }

    #[test]
    fn q_inside_prompt_is_text_not_quit() {
        let mut s = ViewState::default();
        s.modals.auth_code = true;
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut s), KeyAction::None);
        assert_eq!(s.auth.code_input.value(), "q");
    }

    #[test]
    fn alert_swallows_next_key() {
        let mut s = ViewState::default();
        s.alert = Some("boom".into());
        assert_eq!(
            handle_key(press(KeyCode::Char('q')), &mut s),
            KeyAction::Emit(Event::DismissAlert)
        );
    }

    #[test]
    fn refresh_needs_connection() {
        let mut s = ViewState::default();
        assert_eq!(handle_key(press(KeyCode::Char('r')), &mut s), KeyAction::None);
        s.auth.phase = AuthPhase::Connected;
        assert_eq!(
            handle_key(press(KeyCode::Char('r')), &mut s),
            KeyAction::Emit(Event::RefreshEmails)
        );
    }

    #[test]
    fn digits_pick_reply_options() {
        let mut s = ViewState::default();
        s.modals.reply = true;
        s.reply.options = ReplyOptions::Ready {
            options: vec![
                ReplySuggestion {
                    subject: "a".into(),
                    body: "b".into(),
                    placeholders: vec![],
                };
                2
            ],
            legend: None,
        };
        assert_eq!(
            handle_key(press(KeyCode::Char('2')), &mut s),
            KeyAction::Emit(Event::SelectOption(1))
        );
        handle_key(press(KeyCode::Down), &mut s);
        handle_key(press(KeyCode::Down), &mut s);
        assert_eq!(s.reply.option_cursor, 1);
        assert_eq!(
            handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), &mut s),
            KeyAction::Emit(Event::SendReply)
        );
    }

    #[test]
    fn typed_upload_path_keeps_spaces() {
        let mut s = ViewState::default();
        s.modals.upload = true;
        type_into(&mut s, "/tmp/my report.pdf ");
        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut s),
            KeyAction::Emit(Event::UploadFiles(vec![PathBuf::from("/tmp/my report.pdf")]))
        );
    }

    #[test]
    fn paste_on_main_screen_is_a_drop() {
        let mut s = ViewState::default();
        assert_eq!(
            handle_paste("'/tmp/a b.pdf' /tmp/c.pdf", &mut s),
            KeyAction::Emit(Event::UploadFiles(vec![
                PathBuf::from("/tmp/a b.pdf"),
                PathBuf::from("/tmp/c.pdf"),
            ]))
        );
    }

    #[test]
    fn blank_paste_on_main_screen_is_ignored() {
        let mut s = ViewState::default();
        assert_eq!(handle_paste(" \n", &mut s), KeyAction::None);
    }

    #[test]
    fn enter_on_empty_upload_prompt_still_submits() {
        let mut s = ViewState::default();
        s.modals.upload = true;
        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut s),
            KeyAction::Emit(Event::UploadFiles(vec![]))
        );
    }

    #[test]
    fn paste_into_prompt_fills_field() {
        let mut s = ViewState::default();
        s.modals.api_key = true;
        assert_eq!(handle_paste("sk-abc\n", &mut s), KeyAction::None);
        assert_eq!(s.auth.api_key_input.value(), "sk-abc");
    }
}
