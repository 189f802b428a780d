#[allow(unused)]
use {
    super::{
        ORANGE, alarm_block, field, lamp, list_items_push, list_items_push_colored,
        list_items_push_element, normal_block, severity_of, ui_log,
    },
    crate::{
        app::App,
        error::SPError,
        telemetry::{self, Severity, Snapshot},
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

/// Relay front panel colors frequency by the 81U element, not the
/// deviation band.
fn frequency_color(frequency: f64) -> Color {
    telemetry::underfrequency_state(frequency).severity.color()
}

fn breaker_color(open: bool) -> Color {
    if open { ORANGE } else { Color::Green }
}

fn draw_measurements(area: Rect, buf: &mut Buffer, snapshot: Option<&Snapshot>) {
    let mut list_items = Vec::<ListItem>::new();

    list_items_push(&mut list_items, "Voltage", &field(snapshot, Snapshot::voltage_str));
    list_items_push_colored(
        &mut list_items,
        "Current",
        &field(snapshot, Snapshot::current_str),
        snapshot
            .map(|s| telemetry::overcurrent_state(s.current).severity.color())
            .unwrap_or(Color::DarkGray),
    );
    list_items_push_colored(
        &mut list_items,
        "Frequency",
        &field(snapshot, Snapshot::frequency_str),
        snapshot
            .map(|s| frequency_color(s.frequency))
            .unwrap_or(Color::DarkGray),
    );
    list_items_push_colored(
        &mut list_items,
        "Fault current",
        &field(snapshot, Snapshot::fault_current_str),
        snapshot
            .map(|s| telemetry::ground_fault_state(s.fault_current).severity.color())
            .unwrap_or(Color::DarkGray),
    );

    List::new(list_items)
        .block(normal_block(" MEASUREMENTS "))
        .render(area, buf);
}

fn draw_elements(area: Rect, buf: &mut Buffer, snapshot: Option<&Snapshot>) {
    let s = snapshot.cloned().unwrap_or_default();
    let mut list_items = Vec::<ListItem>::new();

    list_items_push_element(
        &mut list_items,
        "50/51 Overcurrent",
        telemetry::overcurrent_state(s.current),
    );
    list_items_push_element(
        &mut list_items,
        "50G/51G Ground fault",
        telemetry::ground_fault_state(s.fault_current),
    );
    list_items_push_element(
        &mut list_items,
        "81U Underfrequency",
        telemetry::underfrequency_state(s.frequency),
    );
    list_items_push_colored(
        &mut list_items,
        "Trip command",
        if s.trip_command { "ACTIVE" } else { "NO" },
        severity_of(s.trip_command).color(),
    );
    list_items_push_colored(
        &mut list_items,
        "Breaker",
        if s.is_breaker_open() { "OPEN" } else { "CLOSED" },
        breaker_color(s.is_breaker_open()),
    );
    list_items_push_colored(
        &mut list_items,
        "Trip reason",
        telemetry::trip_reason(&s),
        severity_of(s.trip_command).color(),
    );

    List::new(list_items)
        .block(normal_block(" PROTECTION ELEMENTS "))
        .render(area, buf);
}

/// OK in green, TIMEOUT in red.
fn goose_led(ok: bool) -> Span<'static> {
    if ok {
        Span::styled("OK", Style::default().fg(Color::Green).bold())
    } else {
        Span::styled("TIMEOUT", Style::default().fg(Color::Red).bold())
    }
}

/// GGIO1 points published by the relay. The GOOSE LEDs only trust a fresh
/// poll, a missing flag or an offline link reads as TIMEOUT.
fn draw_data_points(area: Rect, buf: &mut Buffer, snapshot: Option<&Snapshot>, online: bool) {
    let s = snapshot.cloned().unwrap_or_default();
    let mut list_items = Vec::<ListItem>::new();

    list_items_push(&mut list_items, "AnIn1 (Voltage)", &s.voltage_str());
    list_items_push(&mut list_items, "AnIn2 (Current)", &s.current_str());
    list_items_push(&mut list_items, "AnIn3 (Frequency)", &s.frequency_str());
    list_items_push(&mut list_items, "AnIn4 (Fault I)", &s.fault_current_str());
    list_items_push(&mut list_items, "SPCSO1 (Trip)", &s.trip_command.to_string());
    list_items_push(&mut list_items, "SPCSO2 (CB Pos)", &s.is_breaker_open().to_string());
    list_items_push(&mut list_items, "SPCSO3 (Fault)", &s.fault_detected.to_string());
    list_items_push(&mut list_items, "SPCSO4 (Overcur)", &s.is_overcurrent().to_string());

    let goose_tx = online && s.tx_ok.unwrap_or(false);
    let goose_rx = online && s.rx_ok.unwrap_or(false);
    list_items.push(ListItem::new(Line::from(vec![
        Span::raw(format!("{:<25} : ", "GOOSE")),
        Span::raw("TX "),
        goose_led(goose_tx),
        Span::raw("  RX "),
        goose_led(goose_rx),
    ])));

    List::new(list_items)
        .block(normal_block(" IEC 61850 DATA "))
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
        .constraints([
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Min(11),
        ])
        .split(chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5)])
        .split(chunks[1]);

    draw_measurements(left[0], buf, snapshot);
    draw_elements(left[1], buf, snapshot);
    draw_data_points(left[2], buf, snapshot, app.status().is_online());

    let trip = snapshot.map(|s| s.trip_command).unwrap_or(false);
    let color = severity_of(trip).color();
    Paragraph::new(Line::from(vec![
        Span::raw(" "),
        lamp(trip, "TRIP", "NORMAL", Color::Red),
        Span::raw(" "),
        Span::styled(
            snapshot
                .map(telemetry::trip_reason)
                .unwrap_or("Normal")
                .to_owned(),
            Style::default().fg(color),
        ),
    ]))
    .block(alarm_block(" RELAY STATUS ", color))
    .render(right[0], buf);

    ui_log::draw(right[1], buf, app.log(), " EVENT LOG ")?;

    Ok(())
}
