use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::auth_flow;
use crate::domain::email::Sentiment;
use crate::domain::upload::FileInfo;
use crate::state::{
    AuthPhase, ConnectionStatus, EmailCard, ListContent, NoticeLevel, ReplyFocus, ReplyOptions,
    UploadResult, ViewState,
};

const ACCENT: Color = Color::Yellow;

pub fn render(f: &mut Frame, state: &ViewState) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(f.area());

    let [list_area, side] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);
    let [upload_area, next_area] =
        Layout::vertical([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(side);

    render_header(f, header, state);
    render_list(f, list_area, state);
    render_upload(f, upload_area, state);
    render_next_email(f, next_area, state);
    render_footer(f, footer, state);

    if state.modals.reply {
        render_reply_modal(f, state);
    }
    if state.modals.upload {
        render_upload_prompt(f, state);
    }
    if state.modals.api_key {
        render_api_key_prompt(f, state);
    }
    if state.modals.auth_url {
        render_auth_url_prompt(f, state);
    }
    if state.modals.auth_code {
        render_auth_code_prompt(f, state);
    }
    if let Some(msg) = &state.alert {
        render_alert(f, msg);
    }
}

fn render_header(f: &mut Frame, area: Rect, state: &ViewState) {
    let status = match &state.auth.status {
        ConnectionStatus::Hidden => Span::raw(""),
        ConnectionStatus::Checking => {
            Span::styled("⟳ Checking Gmail connection…", Style::default().fg(Color::Blue))
        }
        ConnectionStatus::PendingAuthorization => Span::styled(
            "! Please complete the authorization process",
            Style::default().fg(Color::Yellow),
        ),
        ConnectionStatus::Completing => {
            Span::styled("⟳ Completing authentication…", Style::default().fg(Color::Blue))
        }
        ConnectionStatus::Connected => {
            Span::styled("✔ Connected to Gmail", Style::default().fg(Color::Green))
        }
        ConnectionStatus::Failed(msg) => {
            Span::styled(format!("✖ {msg}"), Style::default().fg(Color::Red))
        }
    };

    let hint = if state.auth.phase == AuthPhase::AwaitingApiKey {
        "  [a] enter API key"
    } else if auth_flow::connect_enabled(state) {
        "  [c] connect Gmail"
    } else if state.auth.phase == AuthPhase::AwaitingAuthCode {
        "  [c] enter authorization code"
    } else {
        ""
    };

    let p = Paragraph::new(Line::from(vec![
        status,
        Span::styled(hint, Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::bordered()
            .border_type(BorderType::Rounded)
            .title(" Mail Assistant ")
            .border_style(Style::default().fg(ACCENT)),
    );
    f.render_widget(p, area);
}

fn render_list(f: &mut Frame, area: Rect, state: &ViewState) {
    let mut title = String::from(" Inbox ");
    if let Some(s) = &state.list.summary {
        title = format!(
            " Inbox · {} emails · {} urgent · {} important · +{} / -{} / ={} ",
            s.total_emails,
            s.urgent_count,
            s.important_count,
            s.sentiment_distribution.positive,
            s.sentiment_distribution.negative,
            s.sentiment_distribution.neutral,
        );
    }
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if state.list.loading {
        let p = Paragraph::new("⟳ Loading emails…").block(block);
        f.render_widget(p, area);
        return;
    }

    match &state.list.content {
        ListContent::Blank => {
            let text = if state.auth.phase == AuthPhase::Connected {
                ""
            } else {
                "Connect Gmail to load your unread emails."
            };
            f.render_widget(Paragraph::new(text).block(block), area);
        }
        ListContent::Empty => {
            let p = Paragraph::new("No unread emails. You're all caught up!")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            f.render_widget(p, area);
        }
        ListContent::Failed(msg) => {
            let p = Paragraph::new(format!("✖ {msg}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false })
                .block(block);
            f.render_widget(p, area);
        }
        ListContent::Cards(cards) => {
            let items: Vec<ListItem> = cards
                .iter()
                .map(|c| ListItem::new(Text::from(card_lines(c))))
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_symbol("➜ ")
                .highlight_style(Style::default().fg(Color::Green));
            let mut list_state = ListState::default().with_selected(Some(state.list.cursor));
            f.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

pub fn card_lines(card: &EmailCard) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled(
            card.subject.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(format!("From: {}", card.from), Style::default().fg(Color::Gray)),
    ];
    lines.extend(card.summary.lines().map(|l| Line::raw(l.to_string())));
    if card.attachment_count > 0 {
        lines.push(Line::styled(
            format!("📎 {} attachment(s)", card.attachment_count),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut meta = Vec::new();
    if let (Some(u), Some(i)) = (card.urgency, card.importance) {
        meta.push(format!("urgency {u}/5 · importance {i}/5"));
    }
    if let Some(t) = card.response_time {
        meta.push(t.label().to_string());
    }
    if let Some(s) = &card.sentiment {
        meta.push(s.clone());
    }
    if !meta.is_empty() {
        lines.push(Line::styled(
            meta.join(" · "),
            Style::default().fg(Color::Cyan),
        ));
    }
    lines.push(Line::raw(""));
    lines
}

/// Sentiment breakdown; empty lists produce no line at all.
pub fn sentiment_lines(s: &Sentiment) -> Vec<String> {
    let mut out = Vec::new();
    let headline = s.headline();
    if !headline.is_empty() {
        out.push(format!("Sentiment: {headline}"));
    }
    if !s.secondary_emotions.is_empty() {
        out.push(format!("Also: {}", s.secondary_emotions.join(", ")));
    }
    if let Some(i) = s.intensity {
        out.push(format!("Intensity: {i}/5"));
    }
    if !s.triggers.is_empty() {
        out.push(format!("Triggers: {}", s.triggers.join(", ")));
    }
    out
}

fn upload_result_lines(info: &FileInfo) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = info
        .summary
        .lines()
        .map(|l| Line::raw(l.to_string()))
        .collect();
    lines.push(Line::raw(""));
    lines.extend(
        sentiment_lines(&info.sentiment)
            .into_iter()
            .map(|l| Line::styled(l, Style::default().fg(Color::Cyan))),
    );
    lines
}

fn render_upload(f: &mut Frame, area: Rect, state: &ViewState) {
    let pane = &state.upload;
    let mut lines = Vec::new();

    if let Some(name) = &pane.filename {
        let mut l = vec![
            Span::raw("File: "),
            Span::styled(name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ];
        if pane.busy {
            l.push(Span::styled("  ⟳ analysing…", Style::default().fg(Color::Blue)));
        }
        lines.push(Line::from(l));
        lines.push(Line::raw(""));
    }

    match &pane.result {
        UploadResult::Analysed(info) => lines.extend(upload_result_lines(info)),
        UploadResult::Failed(msg) => {
            lines.push(Line::styled(format!("✖ {msg}"), Style::default().fg(Color::Red)))
        }
        UploadResult::None if pane.filename.is_none() => lines.push(Line::styled(
            "Press u to pick a file, or drop one onto the terminal.",
            Style::default().fg(Color::DarkGray),
        )),
        UploadResult::None => {}
    }
    if !state.modals.upload {
        lines.extend(error_line(pane.error.as_deref()));
    }

    let p = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(Block::bordered().title(" File analysis "));
    f.render_widget(p, area);
}

fn render_next_email(f: &mut Frame, area: Rect, state: &ViewState) {
    let text = match &state.next.email {
        Some(e) => {
            let mut lines = vec![
                Line::styled(format!("From: {}", e.from), Style::default().fg(Color::Gray)),
                Line::styled(
                    format!("Subject: {}", e.subject),
                    Style::default().fg(Color::Gray),
                ),
            ];
            if let Some(d) = &e.date {
                lines.push(Line::styled(
                    format!("Sent: {d}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            lines.push(Line::raw(""));
            lines.extend(e.body.lines().map(|l| Line::raw(l.to_string())));
            Text::from(lines)
        }
        None => Text::styled(
            "Press n to load the next unread email.",
            Style::default().fg(Color::DarkGray),
        ),
    };
    let title = if state.next.in_flight {
        " Next unread ⟳ "
    } else {
        " Next unread "
    };
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::bordered().title(title));
    f.render_widget(p, area);
}

fn render_footer(f: &mut Frame, area: Rect, state: &ViewState) {
    if let Some(n) = &state.notice {
        let color = match n.level {
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Info => Color::Blue,
            NoticeLevel::Error => Color::Red,
        };
        f.render_widget(
            Paragraph::new(Line::styled(n.text.clone(), Style::default().fg(color))),
            area,
        );
        return;
    }

    let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::BOLD));
    let hint = Paragraph::new(Line::from(vec![
        key("j/k"),
        Span::raw(" move  "),
        key("Enter"),
        Span::raw(" reply  "),
        key("r"),
        Span::raw(" refresh  "),
        key("u"),
        Span::raw(" upload  "),
        key("n"),
        Span::raw(" next  "),
        key("c"),
        Span::raw(" connect  "),
        key("a"),
        Span::raw(" api key  "),
        key("q"),
        Span::raw(" quit"),
    ]));
    f.render_widget(hint, area);
}

fn popup(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn prompt_block(title: &str) -> Block<'_> {
    Block::bordered()
        .border_type(BorderType::Rounded)
        .title(title)
        .border_style(Style::default().fg(ACCENT))
}

fn help_line(text: &'static str) -> Line<'static> {
    Line::styled(text, Style::default().fg(Color::DarkGray))
}

fn error_line(err: Option<&str>) -> Option<Line<'static>> {
    err.map(|e| Line::styled(format!("✖ {e}"), Style::default().fg(Color::Red)))
}

fn render_prompt(f: &mut Frame, title: &str, lines: Vec<Line>) {
    let area = popup(f.area(), 60, 30);
    f.render_widget(Clear, area);
    let p = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(prompt_block(title));
    f.render_widget(p, area);
}

fn render_api_key_prompt(f: &mut Frame, state: &ViewState) {
    let masked = "•".repeat(state.auth.api_key_input.value().chars().count());
    let mut lines = vec![
        Line::raw("Enter the API key for the summarization backend:"),
        Line::raw(""),
        Line::from(vec![Span::raw("> "), Span::raw(masked)]),
        Line::raw(""),
    ];
    lines.extend(error_line(state.auth.api_key_error.as_deref()));
    if state.auth.key_in_flight {
        lines.push(Line::styled("⟳ Saving…", Style::default().fg(Color::Blue)));
    }
    lines.push(help_line("Enter submit · Esc close"));
    render_prompt(f, " API key ", lines);
}

fn render_auth_url_prompt(f: &mut Frame, state: &ViewState) {
    let url = state.auth.auth_url.clone().unwrap_or_default();
    let lines = vec![
        Line::raw("Authorize Gmail access by visiting:"),
        Line::raw(""),
        Line::styled(url, Style::default().fg(Color::Cyan)),
        Line::raw(""),
        Line::raw("Then come back with the authorization code."),
        help_line("o open in browser · Enter/Esc continue"),
    ];
    render_prompt(f, " Gmail authorization ", lines);
}

fn render_auth_code_prompt(f: &mut Frame, state: &ViewState) {
    let mut lines = vec![
        Line::raw("Paste the authorization code:"),
        Line::raw(""),
        Line::from(vec![
            Span::raw("> "),
            Span::raw(state.auth.code_input.value().to_string()),
        ]),
        Line::raw(""),
    ];
    lines.extend(error_line(state.auth.code_error.as_deref()));
    if let ConnectionStatus::Failed(msg) = &state.auth.status {
        lines.push(Line::styled(format!("✖ {msg}"), Style::default().fg(Color::Red)));
    }
    lines.push(help_line("Enter submit · Esc close"));
    render_prompt(f, " Authorization code ", lines);
}

fn render_upload_prompt(f: &mut Frame, state: &ViewState) {
    let mut lines = vec![
        Line::raw("File to analyse (pdf, docx, txt, csv, xlsx):"),
        Line::raw(""),
        Line::from(vec![
            Span::raw("> "),
            Span::raw(state.upload.path_input.value().to_string()),
        ]),
        Line::raw(""),
    ];
    lines.extend(error_line(state.upload.error.as_deref()));
    lines.push(help_line("Enter upload · Esc cancel"));
    render_prompt(f, " Upload file ", lines);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_reply_modal(f: &mut Frame, state: &ViewState) {
    let area = popup(f.area(), 80, 85);
    f.render_widget(Clear, area);
    let outer = Block::bordered()
        .border_type(BorderType::Rounded)
        .title(" Reply ")
        .border_style(Style::default().fg(ACCENT));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let pane = &state.reply;
    let [options_area, subject_area, body_area, help_area] = Layout::vertical([
        Constraint::Percentage(45),
        Constraint::Length(3),
        Constraint::Min(4),
        Constraint::Length(1),
    ])
    .areas(inner);

    let options_block = Block::bordered()
        .title(" Suggestions ")
        .border_style(focus_style(pane.focus == ReplyFocus::Options));
    match &pane.options {
        ReplyOptions::Loading => f.render_widget(
            Paragraph::new("⟳ Generating reply suggestions…").block(options_block),
            options_area,
        ),
        ReplyOptions::Failed(msg) => f.render_widget(
            Paragraph::new(format!("✖ {msg}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false })
                .block(options_block),
            options_area,
        ),
        ReplyOptions::Ready { options, legend } => {
            let mut items: Vec<ListItem> = options
                .iter()
                .enumerate()
                .map(|(i, o)| {
                    let mut lines = vec![Line::styled(
                        format!("{}. {}", i + 1, o.subject),
                        Style::default().add_modifier(Modifier::BOLD),
                    )];
                    lines.extend(
                        o.body
                            .lines()
                            .map(|l| Line::styled(l.to_string(), Style::default().fg(Color::Gray))),
                    );
                    ListItem::new(Text::from(lines))
                })
                .collect();
            if let Some(legend) = legend {
                let mut lines = vec![Line::styled(
                    legend.description.clone(),
                    Style::default().fg(Color::DarkGray),
                )];
                lines.extend(legend.types.iter().map(|(token, meaning)| {
                    Line::styled(
                        format!("  {token}: {meaning}"),
                        Style::default().fg(Color::DarkGray),
                    )
                }));
                items.push(ListItem::new(Text::from(lines)));
            }
            let list = List::new(items)
                .block(options_block)
                .highlight_symbol("➜ ")
                .highlight_style(Style::default().fg(Color::Green));
            let mut list_state = ListState::default().with_selected(Some(pane.option_cursor));
            f.render_stateful_widget(list, options_area, &mut list_state);
        }
    }

    let subject = Paragraph::new(pane.subject.value().to_string()).block(
        Block::bordered()
            .title(" Subject ")
            .border_style(focus_style(pane.focus == ReplyFocus::Subject)),
    );
    f.render_widget(subject, subject_area);

    let body = Paragraph::new(pane.body.value().to_string())
        .wrap(Wrap { trim: false })
        .block(
            Block::bordered()
                .title(" Body ")
                .border_style(focus_style(pane.focus == ReplyFocus::Body)),
        );
    f.render_widget(body, body_area);

    let help = if pane.sending {
        Line::styled("⟳ Sending…", Style::default().fg(Color::Blue))
    } else {
        help_line("Tab focus · 1-9/Enter pick · Ctrl+S send · Esc close")
    };
    f.render_widget(Paragraph::new(help), help_area);
}

fn render_alert(f: &mut Frame, msg: &str) {
    let area = popup(f.area(), 50, 20);
    f.render_widget(Clear, area);
    let p = Paragraph::new(Text::from(vec![
        Line::raw(msg.to_string()),
        Line::raw(""),
        help_line("press any key"),
    ]))
    .wrap(Wrap { trim: false })
    .block(
        Block::bordered()
            .title(" Alert ")
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{App, AppSettings, Call, Event, Outcome};
    use crate::domain::email::{Email, EmailBatch};
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(state: &ViewState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 45)).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        let buf = terminal.backend().buffer();
        buf.content()
            .chunks(buf.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn email(id: &str, subject: &str) -> Email {
        Email {
            id: id.into(),
            from: "ann@example.com".into(),
            subject: subject.into(),
            summary: "short summary".into(),
            body: String::new(),
            date: None,
            attachments: vec![],
            priority_analysis: None,
            sentiment: None,
        }
    }

    fn connected_app() -> App {
        let mut app = App::new(AppSettings::default());
        app.state.modals.api_key = false;
        app.state.auth.phase = AuthPhase::Connected;
        app
    }

    #[test]
    fn sentiment_without_secondary_emotions_has_no_also_line() {
        let s = Sentiment {
            emoji: "😀".into(),
            primary_emotion: "joy".into(),
            ..Default::default()
        };
        assert_eq!(sentiment_lines(&s), vec!["Sentiment: 😀 joy".to_string()]);
    }

    #[test]
    fn full_sentiment_breakdown() {
        let s = Sentiment {
            emoji: "😰".into(),
            primary_emotion: "Anxiety".into(),
            secondary_emotions: vec!["Urgency".into(), "Stress".into()],
            intensity: Some(4),
            triggers: vec!["deadline".into()],
        };
        assert_eq!(
            sentiment_lines(&s),
            vec![
                "Sentiment: 😰 Anxiety",
                "Also: Urgency, Stress",
                "Intensity: 4/5",
                "Triggers: deadline",
            ]
        );
    }

    #[test]
    fn api_key_prompt_is_shown_on_start_and_masks_input() {
        let mut app = App::new(AppSettings::default());
        app.state.auth.api_key_input.set("secret");
        let screen = draw(&app.state);
        assert!(screen.contains("API key"));
        assert!(!screen.contains("secret"));
    }

    #[test]
    fn empty_inbox_renders_empty_state() {
        let mut app = connected_app();
        app.handle(Event::RefreshEmails);
        assert!(draw(&app.state).contains("Loading emails"));
        app.handle(Event::Completed(Outcome::EmailsListed(Ok(EmailBatch::default()))));
        let screen = draw(&app.state);
        assert!(screen.contains("No unread emails"));
        assert!(!screen.contains("Loading emails"));
    }

    #[test]
    fn cards_render_in_backend_order() {
        let mut app = connected_app();
        app.handle(Event::RefreshEmails);
        app.handle(Event::Completed(Outcome::EmailsListed(Ok(EmailBatch {
            emails: vec![email("2", "Zebra invoice"), email("1", "Alpha meeting")],
            analysis_summary: None,
        }))));
        let screen = draw(&app.state);
        let zebra = screen.find("Zebra invoice").unwrap();
        let alpha = screen.find("Alpha meeting").unwrap();
        assert!(zebra < alpha);
    }

    #[test]
    fn auth_url_prompt_shows_url() {
        let mut app = App::new(AppSettings::default());
        app.state.modals.api_key = false;
        app.state.auth.phase = AuthPhase::AwaitingGmailConnect;
        let cmds = app.handle(Event::ConnectGmail);
        assert_eq!(cmds, vec![crate::app::Command::Call(Call::StartAuth)]);
        app.handle(Event::Completed(Outcome::AuthStarted(Err(
            crate::error::ClientError::application("Please authenticate at: https://x/y\nmore"),
        ))));
        assert!(draw(&app.state).contains("https://x/y"));
    }

    #[test]
    fn empty_upload_submission_shows_error_in_prompt() {
        let mut app = connected_app();
        app.handle(Event::ShowUploadPrompt);
        assert!(app.handle(Event::UploadFiles(vec![])).is_empty());
        assert!(app.state.modals.upload);
        assert!(draw(&app.state).contains("Please choose a file to upload"));

        app.handle(Event::DismissUploadPrompt);
        assert!(!draw(&app.state).contains("Please choose a file to upload"));
    }

    #[test]
    fn alert_is_drawn_on_top() {
        let mut state = ViewState::default();
        state.alert = Some("Failed to send reply: quota exceeded".into());
        assert!(draw(&state).contains("quota exceeded"));
    }
}
