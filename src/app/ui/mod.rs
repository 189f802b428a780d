pub mod ui_breaker;
pub mod ui_debug;
pub mod ui_exit;
pub mod ui_foot;
pub mod ui_head;
pub mod ui_hmi;
pub mod ui_log;
pub mod ui_relay;
pub mod ui_sim;

#[allow(unused)]
use {
    crate::{
        app::App,
        error::SPError,
        telemetry::{ElementState, Severity, Snapshot},
    },
    error_stack::{Report, Result},
    ratatui::symbols,
    ratatui::{
        buffer::Buffer,
        layout::{Constraint, Layout, Rect},
        prelude::{Color, Direction, Style},
        style::Stylize,
        text::{Line, Span},
        widgets::{Block, Borders, ListItem},
    },
};

/// Breaker OPEN indicator.
pub const ORANGE: Color = Color::Rgb(255, 136, 0);

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn normal_block<'a>(title: &'a str) -> Block<'a> {
    Block::default()
        .title(Span::styled(title, Style::new().fg(Color::Yellow)))
        .borders(Borders::ALL)
}

pub fn focus_block<'a>(title: &'a str) -> Block<'a> {
    Block::default()
        .title(Span::styled(
            title,
            Style::new().fg(Color::LightYellow).bold(),
        ))
        .borders(Borders::ALL)
        .border_set(symbols::border::THICK)
        .bold()
}

/// Block whose border takes the alarm color, used for the status lamps.
pub fn alarm_block<'a>(title: &'a str, color: Color) -> Block<'a> {
    Block::default()
        .title(Span::styled(title, Style::new().fg(color).bold()))
        .borders(Borders::ALL)
        .border_style(Style::new().fg(color))
}

pub fn list_items_push(list_items: &mut Vec<ListItem>, name: &str, value: &str) {
    list_items.push(ListItem::new(Span::styled(
        format!("{:<25} : {}", name, value),
        Style::default(),
    )));
}

pub fn list_items_push_colored(
    list_items: &mut Vec<ListItem>,
    name: &str,
    value: &str,
    color: Color,
) {
    list_items.push(ListItem::new(Line::from(vec![
        Span::styled(format!("{:<25} : ", name), Style::default()),
        Span::styled(value.to_owned(), Style::default().fg(color).bold()),
    ])));
}

pub fn list_items_push_element(list_items: &mut Vec<ListItem>, name: &str, state: ElementState) {
    list_items_push_colored(list_items, name, state.label, state.severity.color());
}

/// Two-state indicator: `on_text` in `on_color`, otherwise `off_text` in green.
pub fn lamp<'a>(on: bool, on_text: &'a str, off_text: &'a str, on_color: Color) -> Span<'a> {
    if on {
        Span::styled(format!(" {on_text} "), Style::new().fg(Color::Black).bg(on_color).bold())
    } else {
        Span::styled(
            format!(" {off_text} "),
            Style::new().fg(Color::Black).bg(Color::Green).bold(),
        )
    }
}

pub fn severity_of(flag: bool) -> Severity {
    if flag { Severity::Trip } else { Severity::Normal }
}

/// Formats a snapshot field, "--" until the first snapshot arrives.
pub fn field(snapshot: Option<&Snapshot>, f: impl Fn(&Snapshot) -> String) -> String {
    snapshot.map(f).unwrap_or_else(|| "--".to_owned())
}

#[cfg(test)]
pub fn buffer_text(buf: &Buffer) -> String {
    buf.content.iter().map(|c| c.symbol()).collect()
}

#[cfg(test)]
pub mod testing {
    use {
        crate::{
            app::App,
            link::{LinkCtrl, PanelMsg},
            panel::{PanelKind, Services},
            telemetry::Snapshot,
        },
        ratatui::{buffer::Buffer, layout::Rect, widgets::Widget},
    };

    /// Renders the whole panel after feeding it one snapshot.
    pub fn render_panel(panel: PanelKind, body: Option<&str>, width: u16, height: u16) -> (App, String) {
        let (link, tx, _cmd_rx) = LinkCtrl::detached();
        let mut app = App::with_link(panel, Services::new("localhost").unwrap(), link);
        if let Some(body) = body {
            tx.send(PanelMsg::Data(Snapshot::parse(body).unwrap())).unwrap();
            app.update().unwrap();
        }

        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);
        let text = super::buffer_text(&buf);
        (app, text)
    }
}
