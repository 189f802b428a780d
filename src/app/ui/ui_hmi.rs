#[allow(unused)]
use {
    super::{
        alarm_block, field, lamp, list_items_push, list_items_push_colored, normal_block,
        severity_of, ui_log,
    },
    crate::{
        app::App,
        error::SPError,
        telemetry::{self, PowerFlow, Severity, Snapshot},
    },
    error_stack::{Report, Result},
    ratatui::{
        buffer::Buffer,
        layout::{Constraint, Layout, Rect},
        prelude::{Color, Direction, Style},
        style::Stylize,
        text::{Line, Span},
        widgets::{List, ListItem, Paragraph, Widget},
    },
};

/// Current is red whenever a fault is flagged, otherwise it follows the
/// overcurrent classification.
pub fn current_color(snapshot: &Snapshot) -> Color {
    if snapshot.fault_detected {
        Color::Red
    } else {
        telemetry::overcurrent_state(snapshot.current).severity.color()
    }
}

fn draw_measurements(area: Rect, buf: &mut Buffer, snapshot: Option<&Snapshot>) {
    let mut list_items = Vec::<ListItem>::new();
    let power = snapshot.map(PowerFlow::from_snapshot);

    list_items_push(&mut list_items, "Voltage L1", &field(snapshot, Snapshot::voltage_str));
    list_items_push_colored(
        &mut list_items,
        "Current L1",
        &field(snapshot, Snapshot::current_str),
        snapshot.map(current_color).unwrap_or(Color::DarkGray),
    );
    list_items_push_colored(
        &mut list_items,
        "Frequency",
        &field(snapshot, Snapshot::frequency_str),
        snapshot
            .map(|s| telemetry::frequency_deviation(s.frequency).color())
            .unwrap_or(Color::DarkGray),
    );
    list_items_push(
        &mut list_items,
        "Active power",
        &power
            .map(|p| format!("{:.1} MW", p.active_mw))
            .unwrap_or_else(|| "--".to_owned()),
    );
    list_items_push(
        &mut list_items,
        "Reactive power",
        &power
            .map(|p| format!("{:.1} MVAr", p.reactive_mvar))
            .unwrap_or_else(|| "--".to_owned()),
    );
    list_items_push(
        &mut list_items,
        "Power factor",
        &power
            .map(|p| format!("{:.2}", p.power_factor))
            .unwrap_or_else(|| "--".to_owned()),
    );

    List::new(list_items)
        .block(normal_block(" MMS MEASUREMENTS "))
        .render(area, buf);
}

fn draw_status(area: Rect, buf: &mut Buffer, snapshot: Option<&Snapshot>) {
    let s = snapshot.cloned().unwrap_or_default();
    let mut list_items = Vec::<ListItem>::new();

    list_items.push(ListItem::new(Line::from(vec![
        Span::raw(format!("{:<25} : ", "Breaker")),
        lamp(s.is_breaker_open(), "OPEN", "CLOSED", Color::Red),
    ])));
    list_items.push(ListItem::new(Line::from(vec![
        Span::raw(format!("{:<25} : ", "Protection")),
        lamp(s.fault_detected, "FAULT", "HEALTHY", Color::Red),
    ])));
    list_items_push_colored(
        &mut list_items,
        "Trip command",
        if s.trip_command { "ACTIVE" } else { "NO" },
        severity_of(s.trip_command).color(),
    );
    list_items_push(&mut list_items, "Fault current", &field(snapshot, Snapshot::fault_current_str));
    if let Some(last_alarm) = s.last_alarm.as_deref().filter(|a| !a.is_empty()) {
        list_items_push_colored(&mut list_items, "Last alarm", last_alarm, Color::Yellow);
    }

    List::new(list_items)
        .block(normal_block(" SUBSTATION STATUS "))
        .render(area, buf);
}

fn draw_alarms(area: Rect, buf: &mut Buffer, app: &App) {
    let rows = app.alarms().rows();
    let color = if rows.is_empty() {
        Color::Green
    } else {
        Color::Red
    };

    let list_items: Vec<ListItem> = if rows.is_empty() {
        vec![ListItem::new(Span::styled(
            "No active alarms",
            Style::default().fg(Color::Green),
        ))]
    } else {
        rows.iter()
            .rev()
            .map(|row| {
                ListItem::new(Span::styled(
                    row.render(),
                    Style::default().fg(Color::Red).bold(),
                ))
            })
            .collect()
    };

    List::new(list_items)
        .block(alarm_block(" ALARMS ", color))
        .render(area, buf);
}

pub fn draw(area: Rect, buf: &mut Buffer, app: &App) -> Result<(), SPError> {
    let snapshot = app.snapshot();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(7)])
        .split(chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    draw_measurements(left[0], buf, snapshot);
    draw_status(left[1], buf, snapshot);
    draw_alarms(right[0], buf, app);
    ui_log::draw(right[1], buf, app.log(), " EVENT LOG ")?;

    Ok(())
}
