#[allow(unused)]
use {
    super::{
        field, focus_block, lamp, list_items_push, list_items_push_colored, normal_block,
        severity_of, ui_log,
    },
    crate::{
        app::{App, SimField},
        error::SPError,
        telemetry::{self, Snapshot},
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

fn setpoint_text(field: SimField, value: f64) -> String {
    match field {
        SimField::Voltage => telemetry::fmt_voltage(value),
        SimField::Frequency => format!("{value:.2} Hz"),
        SimField::Current | SimField::FaultCurrent => telemetry::fmt_current(value),
    }
}

fn draw_setpoints(area: Rect, buf: &mut Buffer, app: &App) {
    let setpoints = app.setpoints();
    let mut list_items = Vec::<ListItem>::new();

    for sim_field in SimField::ALL {
        let (min, max, _) = sim_field.range();
        let value = setpoints.get(sim_field);
        let text = format!(
            "{:<25} : {:<12} [{min} .. {max}]",
            sim_field.name(),
            setpoint_text(sim_field, value)
        );
        let style = if sim_field == app.sim_focus() {
            Style::default().fg(Color::Black).bg(Color::LightYellow).bold()
        } else {
            Style::default()
        };
        list_items.push(ListItem::new(Span::styled(text, style)));
    }

    list_items.push(ListItem::new(""));
    list_items.push(ListItem::new(Line::from(vec![
        Span::raw(format!("{:<25} : ", "Fault (f)")),
        lamp(setpoints.fault_active, "ACTIVE", "OFF", Color::Red),
    ])));
    list_items.push(ListItem::new(Line::from(vec![
        Span::raw(format!("{:<25} : ", "Breaker (b)")),
        lamp(setpoints.breaker_open, "OPEN", "CLOSED", Color::Red),
    ])));
    list_items.push(ListItem::new(Line::from(vec![
        Span::raw(format!("{:<25} : ", "Manual trip (m)")),
        lamp(setpoints.manual_trip, "ACTIVE", "OFF", Color::Red),
    ])));

    List::new(list_items)
        .block(focus_block(" SETPOINTS "))
        .render(area, buf);
}

fn draw_live_data(area: Rect, buf: &mut Buffer, app: &App) {
    let snapshot = app.snapshot();
    let mut list_items = Vec::<ListItem>::new();

    list_items_push(&mut list_items, "Voltage", &field(snapshot, Snapshot::voltage_str));
    list_items_push(&mut list_items, "Current", &field(snapshot, Snapshot::current_str));
    list_items_push(&mut list_items, "Frequency", &field(snapshot, Snapshot::frequency_str));
    list_items_push(
        &mut list_items,
        "Fault current",
        &field(snapshot, Snapshot::fault_current_str),
    );

    let s = snapshot.cloned().unwrap_or_default();
    list_items_push_colored(
        &mut list_items,
        "Fault detected",
        if s.fault_detected { "YES" } else { "NO" },
        severity_of(s.fault_detected).color(),
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
        severity_of(s.is_breaker_open()).color(),
    );
    list_items_push_colored(
        &mut list_items,
        "Overcurrent",
        if s.is_overcurrent() { "YES" } else { "NO" },
        if s.is_overcurrent() {
            Color::Yellow
        } else {
            Color::Green
        },
    );
    list_items_push(
        &mut list_items,
        "Last update",
        &app.last_update()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--".to_owned()),
    );

    List::new(list_items)
        .block(normal_block(" LIVE DATA "))
        .render(area, buf);
}

fn draw_scenarios(area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(" (1) Normal  (2) Overcurrent  (3) Ground fault  (4) Frequency deviation"),
        Line::from(vec![
            Span::raw(" (0) Reset all  (i) Inject fault  (s) Send trip  "),
            Span::styled("(e) EMERGENCY STOP", Style::default().fg(Color::Red).bold()),
        ]),
    ];

    Paragraph::new(lines)
        .block(normal_block(" SCENARIOS "))
        .render(area, buf);
}

pub fn draw(area: Rect, buf: &mut Buffer, app: &App) -> Result<(), SPError> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(11), Constraint::Length(4)])
        .split(area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(rows[0]);

    draw_setpoints(chunks[0], buf, app);
    draw_live_data(chunks[1], buf, app);
    ui_log::draw(chunks[2], buf, app.log(), " EVENT LOG ")?;
    draw_scenarios(rows[1], buf);

    Ok(())
}
