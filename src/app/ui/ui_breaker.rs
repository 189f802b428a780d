#[allow(unused)]
use {
    super::{
        ORANGE, alarm_block, field, lamp, list_items_push, list_items_push_colored, normal_block,
        ui_log,
    },
    crate::{app::App, error::SPError, telemetry::Snapshot},
    error_stack::{Report, Result},
    ratatui::{
        buffer::Buffer,
        layout::{Alignment, Constraint, Layout, Rect},
        prelude::{Color, Direction, Style},
        style::Stylize,
        text::{Line, Span},
        widgets::{List, ListItem, Paragraph, Widget},
    },
};

fn draw_position(area: Rect, buf: &mut Buffer, snapshot: Option<&Snapshot>) {
    let (text, color) = match snapshot {
        Some(s) if s.is_breaker_open() => ("OPEN", Color::Red),
        Some(_) => ("CLOSED", Color::Green),
        None => ("UNKNOWN", Color::DarkGray),
    };

    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("[ {text} ]"),
            Style::default().fg(color).bold(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(alarm_block(" BREAKER POSITION ", color))
    .render(area, buf);
}

fn draw_goose(area: Rect, buf: &mut Buffer, app: &App) {
    let snapshot = app.snapshot();
    let mut list_items = Vec::<ListItem>::new();

    let (status, status_color) = match snapshot {
        Some(s) if s.is_breaker_open() => ("OPEN", ORANGE),
        Some(_) => ("NORMAL", Color::Green),
        None => ("--", Color::DarkGray),
    };
    list_items_push_colored(&mut list_items, "Status", status, status_color);

    let trip_received = snapshot.map(|s| s.trip_received).unwrap_or(false);
    list_items.push(ListItem::new(Line::from(vec![
        Span::raw(format!("{:<25} : ", "Trip received")),
        lamp(trip_received, "YES", "NO", Color::Red),
    ])));

    list_items_push(
        &mut list_items,
        "GOOSE StNum",
        &field(snapshot, |s| s.goose_st_num.to_string()),
    );
    list_items_push(
        &mut list_items,
        "GOOSE SqNum",
        &field(snapshot, |s| s.goose_sq_num.to_string()),
    );
    list_items_push(
        &mut list_items,
        "GOOSE messages",
        &field(snapshot, |s| s.goose_msg_count.to_string()),
    );
    list_items_push(
        &mut list_items,
        "Last GOOSE",
        &field(snapshot, |s| {
            s.last_goose_time.clone().unwrap_or_else(|| "--".to_owned())
        }),
    );
    list_items_push(
        &mut list_items,
        "Last Op",
        &app.last_operation()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--".to_owned()),
    );

    List::new(list_items)
        .block(normal_block(" GOOSE SUBSCRIBER "))
        .render(area, buf);
}

pub fn draw(area: Rect, buf: &mut Buffer, app: &App) -> Result<(), SPError> {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(9)])
        .split(chunks[0]);

    draw_position(left[0], buf, app.snapshot());
    draw_goose(left[1], buf, app);
    ui_log::draw(chunks[1], buf, app.log(), " EVENT LOG ")?;

    Ok(())
}
