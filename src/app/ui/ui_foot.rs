#[allow(unused)]
use {
    crate::{
        app::{App, SPScreen},
        error::SPError,
        panel::PanelKind,
    },
    chrono::Local,
    error_stack::{Report, Result},
    ratatui::{
        buffer::Buffer,
        layout::{Constraint, Layout, Rect},
        prelude::{Color, Direction, Style},
        style::Stylize,
        text::{Line, Span},
        widgets::{Block, Borders, Paragraph, Widget},
    },
};

pub fn keys_hint(app: &App) -> &'static str {
    match app.current_screen() {
        SPScreen::Main => match app.panel() {
            PanelKind::Breaker => "(t) trip, (c) close, (d) debug, (q) quit",
            PanelKind::Relay => {
                "(t) trip, (r) reset, (a) alarm reset, (l) latch reset, (d) debug, (q) quit"
            }
            PanelKind::Hmi => {
                "(t) trip (c) close (o) open (x) reset (m)/(n) MMS trip/reset (r) reset relay (a) ack (v) read (d) diag (q) quit"
            }
            PanelKind::Sim => {
                "UP(k)/DOWN(j) select, LEFT(h)/RIGHT(l) adjust, (+)/(-) x10, (f) fault (b) breaker (m) manual trip (s) send trip (i) inject, (1-4) scenario (0) reset (e) e-stop, (q) quit"
            }
        },
        SPScreen::Debug => "(ENTER)/(ESC) back, (q) quit",
        SPScreen::Exiting => "(y) exit, (n) back",
    }
}

pub fn draw(area: Rect, buf: &mut Buffer, app: &App) -> Result<(), SPError> {
    let foot_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let status = app.status();
    let last_update = match app.last_update() {
        Some(t) => {
            let age = Local::now() - *t;
            format!("{} ({}s ago)", t.format("%H:%M:%S"), age.num_seconds())
        }
        None => "no data yet".to_owned(),
    };

    let info_color = if status.is_online() {
        Color::White
    } else {
        Color::DarkGray
    };

    let status_text = vec![
        Span::styled(
            format!(" {} ", status.label()),
            Style::default().fg(status.color()).bold(),
        ),
        Span::styled(" | ", Style::default().fg(Color::White)),
        Span::styled(last_update, Style::default().fg(info_color)),
    ];

    Paragraph::new(Line::from(status_text))
        .block(Block::default().borders(Borders::NONE))
        .render(foot_chunks[0], buf);

    if let Some(error) = app.app_error.as_ref() {
        Paragraph::new(Line::from(Span::styled(
            error,
            Style::default().fg(Color::Red),
        )))
        .render(foot_chunks[1], buf);
    } else {
        Paragraph::new(Line::from(Span::styled(
            keys_hint(app),
            Style::default().fg(Color::White),
        )))
        .render(foot_chunks[1], buf);
    }

    Ok(())
}
