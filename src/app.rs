mod ui;

#[allow(unused)]
use {
    super::{
        alarm::{AlarmList, EdgeTracker, EventLog},
        error::{SPError, SPErrorExt},
        link::{
            LinkCtrl, LinkStatus, PanelMsg, PollError, TelemetrySource,
            command::{CommandReport, CommandRequest, ReplyUse, SimCommand},
            http::HttpSource,
            tcp::TcpSource,
        },
        panel::{PanelKind, Service, Services},
        telemetry::{self, Snapshot},
    },
    chrono::{DateTime, Local},
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    error_stack::{Report, Result},
    jlogger_tracing::{jdebug, jerror, jinfo},
    ratatui::{
        Frame,
        buffer::Buffer,
        layout::{Constraint, Layout, Rect},
        prelude::Direction,
        widgets::Widget,
    },
    std::time::{Duration, Instant},
    ui::*,
};

/// How often the UI drains the message queue and redraws.
pub const UI_TICK: Duration = Duration::from_millis(100);

pub struct AppConfig {
    pub panel: PanelKind,
    pub services: Services,
    pub breaker_tcp: bool,
    pub interval: Duration,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn new(panel: PanelKind, services: Services) -> Self {
        Self {
            panel,
            services,
            breaker_tcp: false,
            interval: panel.poll_interval(),
            timeout: Duration::from_secs(2),
        }
    }

    pub fn source(&self) -> Result<Box<dyn TelemetrySource>, SPError> {
        let service = self.panel.service();
        if self.breaker_tcp && service == Service::Breaker {
            return Ok(Box::new(TcpSource::new(
                &self.services.breaker_socket(),
                self.timeout,
            )));
        }

        let url = self.services.read_endpoint(service)?;
        Ok(Box::new(HttpSource::new(url, self.timeout)?))
    }
}

#[derive(Debug, Default, PartialEq, Clone, Copy)]
pub enum SPScreen {
    #[default]
    Main,
    Debug,
    Exiting,
}

/// Adjustable analog quantity on the simulation panel.
#[derive(Debug, Default, PartialEq, Clone, Copy)]
pub enum SimField {
    #[default]
    Voltage,
    Current,
    Frequency,
    FaultCurrent,
}

impl SimField {
    pub const ALL: [SimField; 4] = [
        SimField::Voltage,
        SimField::Current,
        SimField::Frequency,
        SimField::FaultCurrent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SimField::Voltage => "Voltage L1 (kV)",
            SimField::Current => "Current L1 (A)",
            SimField::Frequency => "Frequency (Hz)",
            SimField::FaultCurrent => "Fault Current (A)",
        }
    }

    /// (min, max, step)
    pub fn range(&self) -> (f64, f64, f64) {
        match self {
            SimField::Voltage => (110.0, 150.0, 0.1),
            SimField::Current => (0.0, 3000.0, 10.0),
            SimField::Frequency => (47.0, 52.0, 0.01),
            SimField::FaultCurrent => (0.0, 5000.0, 100.0),
        }
    }

    pub fn command(&self, value: f64) -> SimCommand {
        match self {
            SimField::Voltage => SimCommand::UpdateVoltage(value),
            SimField::Current => SimCommand::UpdateCurrent(value),
            SimField::Frequency => SimCommand::UpdateFrequency(value),
            SimField::FaultCurrent => SimCommand::UpdateFaultCurrent(value),
        }
    }

    pub fn next(&self) -> SimField {
        match self {
            SimField::Voltage => SimField::Current,
            SimField::Current => SimField::Frequency,
            SimField::Frequency => SimField::FaultCurrent,
            SimField::FaultCurrent => SimField::Voltage,
        }
    }

    pub fn prev(&self) -> SimField {
        match self {
            SimField::Voltage => SimField::FaultCurrent,
            SimField::Current => SimField::Voltage,
            SimField::Frequency => SimField::Current,
            SimField::FaultCurrent => SimField::Frequency,
        }
    }
}

/// Values the simulation panel pushes to the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoints {
    pub voltage: f64,
    pub current: f64,
    pub frequency: f64,
    pub fault_current: f64,
    pub fault_active: bool,
    pub breaker_open: bool,
    pub manual_trip: bool,
}

impl Default for Setpoints {
    fn default() -> Self {
        Self {
            voltage: 132.0,
            current: 450.0,
            frequency: 50.0,
            fault_current: 0.0,
            fault_active: false,
            breaker_open: false,
            manual_trip: false,
        }
    }
}

impl Setpoints {
    pub fn get(&self, field: SimField) -> f64 {
        match field {
            SimField::Voltage => self.voltage,
            SimField::Current => self.current,
            SimField::Frequency => self.frequency,
            SimField::FaultCurrent => self.fault_current,
        }
    }

    /// Stores the value clamped to the field range and snapped to its step.
    pub fn set(&mut self, field: SimField, value: f64) -> f64 {
        let (min, max, step) = field.range();
        let snapped = ((value.clamp(min, max) / step).round() * step).clamp(min, max);
        match field {
            SimField::Voltage => self.voltage = snapped,
            SimField::Current => self.current = snapped,
            SimField::Frequency => self.frequency = snapped,
            SimField::FaultCurrent => self.fault_current = snapped,
        }
        snapped
    }
}

pub struct App {
    exit: bool,
    panel: PanelKind,
    services: Services,
    link: LinkCtrl,
    screens: Vec<SPScreen>,
    status: LinkStatus,
    snapshot: Option<Snapshot>,
    last_update: Option<DateTime<Local>>,
    edges: EdgeTracker,
    alarms: AlarmList,
    log: EventLog,
    last_msg_count: Option<u64>,
    last_operation: Option<DateTime<Local>>,
    debug_text: Option<String>,
    setpoints: Setpoints,
    setpoints_synced: bool,
    sim_focus: SimField,
    pub app_error: Option<String>,
}

impl App {
    pub fn new(cfg: AppConfig) -> Result<Self, SPError> {
        let source = cfg.source()?;
        let link = LinkCtrl::start(source, cfg.interval, cfg.timeout)?;
        Ok(Self::with_link(cfg.panel, cfg.services, link))
    }

    pub fn with_link(panel: PanelKind, services: Services, link: LinkCtrl) -> Self {
        let mut log = EventLog::new();
        log.push(format!("{} started", panel.title()));

        Self {
            exit: false,
            panel,
            services,
            link,
            screens: vec![SPScreen::Main],
            status: LinkStatus::default(),
            snapshot: None,
            last_update: None,
            edges: EdgeTracker::new(),
            alarms: AlarmList::new(),
            log,
            last_msg_count: None,
            last_operation: None,
            debug_text: None,
            setpoints: Setpoints::default(),
            setpoints_synced: false,
            sim_focus: SimField::default(),
            app_error: None,
        }
    }

    pub fn current_screen(&self) -> SPScreen {
        self.screens.last().copied().unwrap_or_default()
    }

    pub fn sp_screen_move_to(&mut self, next_screen: SPScreen) {
        self.screens.push(next_screen);
        self.app_error = None;
    }

    pub fn sp_screen_move_back(&mut self) {
        if self.screens.len() > 1 {
            self.screens.pop();
        }

        self.app_error = None;
    }

    /// Applies every queued worker message. No-op when the queue is empty.
    pub fn update(&mut self) -> Result<(), SPError> {
        for msg in self.link.drain() {
            self.apply(msg);
        }
        Ok(())
    }

    pub fn apply(&mut self, msg: PanelMsg) {
        match msg {
            PanelMsg::Data(snapshot) => {
                if !self.status.is_online() {
                    jinfo!(func = "App::apply", note = "service online");
                }
                self.status = LinkStatus::Connected;
                self.apply_snapshot(snapshot);
            }
            PanelMsg::Error(e) => {
                let status = LinkStatus::from(&e);
                if status != self.status {
                    jinfo!(func = "App::apply", status = status.label(), error = format!("{e:?}"));
                }
                // Last values stay on screen, only the indicator changes.
                self.status = status;
            }
            PanelMsg::Command(report) => self.apply_command_report(report),
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        match self.panel {
            PanelKind::Breaker => {
                if self.edges.observe("trip_received", snapshot.trip_received) {
                    self.log.push("GOOSE TRIP SIGNAL RECEIVED");
                    self.last_operation = Some(Local::now());
                }

                if let Some(previous) = self.last_msg_count {
                    if snapshot.goose_msg_count > previous {
                        self.log.push(format!(
                            "GOOSE MSG: StNum={} SqNum={} Time={}",
                            snapshot.goose_st_num,
                            snapshot.goose_sq_num,
                            snapshot.last_goose_time.as_deref().unwrap_or("--:--:--")
                        ));
                    }
                }
                self.last_msg_count = Some(snapshot.goose_msg_count);
            }
            PanelKind::Relay => {
                if self.edges.observe("fault", snapshot.fault_detected) {
                    self.log.push("ALARM: Fault detected in protection zone");
                }
                if self.edges.observe("trip", snapshot.trip_command) {
                    self.log
                        .push(format!("TRIP: {}", telemetry::trip_reason(&snapshot)));
                }
            }
            PanelKind::Hmi => {
                if self.edges.observe("fault", snapshot.fault_detected) {
                    self.alarms.raise("FAULT DETECTED");
                    self.log.push("ALARM: Fault detected in protection zone");
                }
                if self.edges.observe("trip", snapshot.trip_command) {
                    self.alarms.raise("TRIP COMMAND ISSUED");
                    self.log
                        .push("EVENT: Trip command issued by protection relay");
                }
            }
            PanelKind::Sim => {
                if !self.setpoints_synced {
                    self.setpoints.set(SimField::Voltage, snapshot.voltage);
                    self.setpoints.set(SimField::Current, snapshot.current);
                    self.setpoints.set(SimField::Frequency, snapshot.frequency);
                    self.setpoints
                        .set(SimField::FaultCurrent, snapshot.fault_current);
                    self.setpoints.fault_active = snapshot.fault_detected;
                    self.setpoints.breaker_open = snapshot.breaker_status;
                    self.setpoints.manual_trip = snapshot.trip_command;
                    self.setpoints_synced = true;
                }
                if self.edges.observe("fault", snapshot.fault_detected) {
                    self.log.push("EVENT: Fault detected");
                }
                if self.edges.observe("trip", snapshot.trip_command) {
                    self.log.push("EVENT: Trip command active");
                }
            }
        }

        self.snapshot = Some(snapshot);
        self.last_update = Some(Local::now());
    }

    fn apply_command_report(&mut self, report: CommandReport) {
        for line in report.log_lines() {
            self.log.push(line);
        }

        if report.request.on_success == ReplyUse::Inspect {
            let text = match &report.outcome {
                Ok(reply) => {
                    let body = serde_json::from_str::<serde_json::Value>(&reply.body)
                        .and_then(|v| serde_json::to_string_pretty(&v))
                        .unwrap_or_else(|_| reply.body.clone());
                    format!(
                        "{}: {}\n\nHTTP Status: {}\nResponse:\n{}\n\nTest: SUCCESS",
                        report.request.label, report.request.url, reply.status, body
                    )
                }
                Err(e) => format!(
                    "{}: {}\n\nError: {}\nTest: FAILED",
                    report.request.label, report.request.url, e
                ),
            };
            self.debug_text = Some(text);
            if self.current_screen() != SPScreen::Debug {
                self.sp_screen_move_to(SPScreen::Debug);
            }
        }
    }

    fn dispatch(&mut self, request: Result<CommandRequest, SPError>) {
        let result = request.and_then(|r| self.link.send(r));
        if let Err(e) = result {
            jerror!(func = "App::dispatch", error = format!("{:?}", e));
            let text = e.error_str().unwrap_or("Failed to queue command".to_owned());
            self.log.push(format!("COMMAND ERROR: {text}"));
            self.app_error = Some(text);
        }
    }

    fn post(&mut self, service: Service, path: &str, label: &str, lines: &[&str]) {
        let request = self
            .services
            .endpoint(service, path)
            .map(|url| CommandRequest::post(label, url).logging(lines));
        self.dispatch(request);
    }

    fn sim(&mut self, command: SimCommand) {
        let request = command.request(&self.services);
        self.dispatch(request);
    }

    fn inspect(&mut self) {
        let service = self.panel.service();
        let (label, path) = match self.panel {
            PanelKind::Hmi => ("DIAGNOSTICS", "/diagnostics"),
            _ => ("DEBUG", service.read_path()),
        };
        let request = self
            .services
            .endpoint(service, path)
            .map(|url| CommandRequest::inspect(label, url));
        self.dispatch(request);
    }

    pub fn breaker_trip(&mut self) {
        let request = self.services.endpoint(Service::Breaker, "/trip").map(|url| {
            CommandRequest::post("TRIP", url)
                .with_timeout(Duration::from_secs(1))
                .logging(&["MANUAL TRIP COMMAND ISSUED"])
        });
        self.dispatch(request);
    }

    pub fn breaker_close(&mut self) {
        let request = self.services.endpoint(Service::Breaker, "/close").map(|url| {
            CommandRequest::post("CLOSE", url)
                .with_timeout(Duration::from_secs(1))
                .logging(&["MANUAL CLOSE COMMAND ISSUED"])
        });
        self.dispatch(request);
    }

    pub fn hmi_read_values(&mut self) {
        for point in ["AnIn1", "AnIn2", "AnIn3"] {
            self.log
                .push(format!("MMS READ: GenericIO/GGIO1.{point}.mag.f"));
        }
    }

    pub fn hmi_reset_relay(&mut self) {
        let clear_fault = SimCommand::ToggleFault(false)
            .request(&self.services)
            .map(|r| r.logging(&[]));
        self.dispatch(clear_fault);

        let clear_trip = SimCommand::ToggleManualTrip(false)
            .request(&self.services)
            .map(|r| r.logging(&["MMS WRITE: Reset command sent"]));
        self.dispatch(clear_trip);
    }

    pub fn acknowledge_alarms(&mut self) {
        let count = self.alarms.acknowledge();
        jinfo!(func = "App::acknowledge_alarms", count = count);
        self.log.push("All alarms acknowledged");
    }

    pub fn adjust_setpoint(&mut self, field: SimField, steps: f64) {
        let (_, _, step) = field.range();
        let value = self
            .setpoints
            .set(field, self.setpoints.get(field) + steps * step);
        self.sim(field.command(value));
    }

    fn apply_all_setpoints(&mut self) {
        for field in SimField::ALL {
            self.sim(field.command(self.setpoints.get(field)));
        }
        self.sim(SimCommand::ToggleFault(self.setpoints.fault_active));
    }

    pub fn scenario_normal(&mut self) {
        self.setpoints = Setpoints {
            breaker_open: self.setpoints.breaker_open,
            manual_trip: self.setpoints.manual_trip,
            ..Setpoints::default()
        };
        self.apply_all_setpoints();
    }

    pub fn scenario_overcurrent(&mut self) {
        self.setpoints.set(SimField::Current, 1500.0);
        self.setpoints.set(SimField::FaultCurrent, 1500.0);
        self.apply_all_setpoints();
    }

    pub fn scenario_ground_fault(&mut self) {
        self.setpoints.set(SimField::FaultCurrent, 3000.0);
        self.setpoints.set(SimField::Current, 3000.0);
        self.setpoints.fault_active = true;
        self.apply_all_setpoints();
    }

    pub fn scenario_frequency_deviation(&mut self) {
        self.setpoints.set(SimField::Frequency, 48.0);
        self.apply_all_setpoints();
    }

    pub fn inject_fault(&mut self) {
        self.setpoints.set(SimField::FaultCurrent, 2500.0);
        self.setpoints.set(SimField::Current, 2500.0);
        self.setpoints.fault_active = true;
        self.sim(SimCommand::ToggleFault(true));
        self.sim(SimCommand::UpdateFaultCurrent(2500.0));
    }

    /// Pushes the simulator well past every trip threshold. The current
    /// setpoint is sent unclamped, beyond the adjustable range.
    pub fn emergency_stop(&mut self) {
        self.setpoints.set(SimField::FaultCurrent, 5000.0);
        self.setpoints.current = 5000.0;
        self.setpoints.fault_active = true;
        self.sim(SimCommand::UpdateFaultCurrent(5000.0));
        self.sim(SimCommand::UpdateCurrent(5000.0));
        self.sim(SimCommand::ToggleFault(true));
    }

    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    pub fn handle_events(&mut self) -> Result<(), SPError> {
        let has_new_event = event::poll(UI_TICK)
            .map_err(|e| Report::new(SPError::IOError).attach_printable(e))?;

        if has_new_event {
            let event = event::read().map_err(|_| Report::new(SPError::IOError))?;
            match event {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    self.handle_key_event(key_event)
                }
                _ => {}
            }
        }

        Ok(())
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) {
        match self.current_screen() {
            SPScreen::Main => match key_event.code {
                KeyCode::Char('q') => self.sp_screen_move_to(SPScreen::Exiting),
                KeyCode::Char('d') => self.inspect(),
                KeyCode::Char('g') if self.debug_text.is_some() => {
                    self.sp_screen_move_to(SPScreen::Debug)
                }
                code => match self.panel {
                    PanelKind::Breaker => self.handle_breaker_key(code),
                    PanelKind::Relay => self.handle_relay_key(code),
                    PanelKind::Hmi => self.handle_hmi_key(code),
                    PanelKind::Sim => self.handle_sim_key(code),
                },
            },
            SPScreen::Debug => match key_event.code {
                KeyCode::Enter | KeyCode::Esc => self.sp_screen_move_back(),
                KeyCode::Char('q') => self.sp_screen_move_to(SPScreen::Exiting),
                _ => {}
            },
            SPScreen::Exiting => match key_event.code {
                KeyCode::Char('y') => self.exit = true,
                KeyCode::Char('n') | KeyCode::Esc => self.sp_screen_move_back(),
                _ => {}
            },
        }
    }

    fn handle_breaker_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('t') => self.breaker_trip(),
            KeyCode::Char('c') => self.breaker_close(),
            _ => {}
        }
    }

    fn handle_relay_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('t') => self.post(
                Service::Relay,
                "/trip",
                "MANUAL TRIP",
                &["MANUAL TRIP: Command sent to protection relay"],
            ),
            KeyCode::Char('r') => self.post(
                Service::Relay,
                "/reset",
                "RESET",
                &["RESET: Trip reset command sent to relay"],
            ),
            KeyCode::Char('a') => self.post(
                Service::Relay,
                "/reset",
                "ALARM RESET",
                &["ALARM RESET: Command sent to relay"],
            ),
            KeyCode::Char('l') => self.post(
                Service::Hmi,
                "/reset",
                "LATCH RESET",
                &["LATCH RESET: Reset sent via HMI"],
            ),
            _ => {}
        }
    }

    fn handle_hmi_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('t') => self.post(
                Service::Hmi,
                "/trip",
                "MMS CONTROL",
                &[
                    "MMS CONTROL: GenericIO/GGIO1.SPCSO1.Oper.ctlVal = TRUE",
                    "MMS TRIP: Command sent via IEC 61850 MMS",
                ],
            ),
            KeyCode::Char('c') => self.post(
                Service::Hmi,
                "/close",
                "CLOSE",
                &["MMS CONTROL: Breaker close command sent"],
            ),
            KeyCode::Char('o') => self.post(
                Service::Hmi,
                "/open",
                "OPEN",
                &["MMS CONTROL: Breaker open command sent"],
            ),
            KeyCode::Char('x') => self.post(
                Service::Hmi,
                "/reset",
                "RESET",
                &["MMS CONTROL: Latch reset command sent"],
            ),
            KeyCode::Char('m') => self.post(
                Service::Hmi,
                "/mms/trip",
                "MMS TRIP",
                &["MMS TRIP: Direct MMS trip sent"],
            ),
            KeyCode::Char('n') => self.post(
                Service::Hmi,
                "/mms/reset",
                "MMS RESET",
                &["MMS RESET: Direct MMS reset sent"],
            ),
            KeyCode::Char('r') => self.hmi_reset_relay(),
            KeyCode::Char('a') => self.acknowledge_alarms(),
            KeyCode::Char('v') => self.hmi_read_values(),
            _ => {}
        }
    }

    fn handle_sim_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.sim_focus = self.sim_focus.prev(),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.sim_focus = self.sim_focus.next()
            }
            KeyCode::Right | KeyCode::Char('l') => self.adjust_setpoint(self.sim_focus, 1.0),
            KeyCode::Left | KeyCode::Char('h') => self.adjust_setpoint(self.sim_focus, -1.0),
            KeyCode::Char('+') | KeyCode::PageUp => self.adjust_setpoint(self.sim_focus, 10.0),
            KeyCode::Char('-') | KeyCode::PageDown => {
                self.adjust_setpoint(self.sim_focus, -10.0)
            }
            KeyCode::Char('f') => {
                self.setpoints.fault_active = !self.setpoints.fault_active;
                self.sim(SimCommand::ToggleFault(self.setpoints.fault_active));
            }
            KeyCode::Char('b') => {
                self.setpoints.breaker_open = !self.setpoints.breaker_open;
                self.sim(SimCommand::ToggleBreaker(self.setpoints.breaker_open));
            }
            KeyCode::Char('m') => {
                self.setpoints.manual_trip = !self.setpoints.manual_trip;
                self.sim(SimCommand::ToggleManualTrip(self.setpoints.manual_trip));
            }
            KeyCode::Char('s') => self.sim(SimCommand::SendTrip),
            KeyCode::Char('i') => self.inject_fault(),
            KeyCode::Char('1') | KeyCode::Char('0') => self.scenario_normal(),
            KeyCode::Char('2') => self.scenario_overcurrent(),
            KeyCode::Char('3') => self.scenario_ground_fault(),
            KeyCode::Char('4') => self.scenario_frequency_deviation(),
            KeyCode::Char('e') => self.emergency_stop(),
            _ => {}
        }
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub fn panel(&self) -> PanelKind {
        self.panel
    }

    pub fn status(&self) -> &LinkStatus {
        &self.status
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_update(&self) -> Option<&DateTime<Local>> {
        self.last_update.as_ref()
    }

    pub fn last_operation(&self) -> Option<&DateTime<Local>> {
        self.last_operation.as_ref()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn alarms(&self) -> &AlarmList {
        &self.alarms
    }

    pub fn debug_text(&self) -> Option<&str> {
        self.debug_text.as_deref()
    }

    pub fn setpoints(&self) -> &Setpoints {
        &self.setpoints
    }

    pub fn sim_focus(&self) -> SimField {
        self.sim_focus
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let draw_start = Instant::now();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(10),
                Constraint::Length(1),
            ])
            .split(area);

        if let Err(e) = ui_head::draw(chunks[0], buf, self) {
            jerror!(func = "App::render()", error = format!("{:?}", e));
        }

        let body = match self.current_screen() {
            SPScreen::Debug => ui_debug::draw(chunks[1], buf, self),
            SPScreen::Main | SPScreen::Exiting => match self.panel {
                PanelKind::Breaker => ui_breaker::draw(chunks[1], buf, self),
                PanelKind::Relay => ui_relay::draw(chunks[1], buf, self),
                PanelKind::Hmi => ui_hmi::draw(chunks[1], buf, self),
                PanelKind::Sim => ui_sim::draw(chunks[1], buf, self),
            },
        };
        if let Err(e) = body {
            jerror!(func = "App::render()", error = format!("{:?}", e));
        }

        if self.current_screen() == SPScreen::Exiting {
            if let Err(e) = ui_exit::draw(chunks[1], buf, self) {
                jerror!(func = "App::render()", error = format!("{:?}", e));
            }
        }

        if let Err(e) = ui_foot::draw(chunks[2], buf, self) {
            jerror!(func = "App::render()", error = format!("{:?}", e));
        }

        jdebug!(
            event = "TIME_MEASURE",
            draw_time = format!("{}ms", draw_start.elapsed().as_millis())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::command::{CommandReply, Method};
    use crossterm::event::KeyModifiers;
    use std::sync::mpsc;

    fn detached_app(
        panel: PanelKind,
    ) -> (App, mpsc::Sender<PanelMsg>, mpsc::Receiver<CommandRequest>) {
        let (link, tx, cmd_rx) = LinkCtrl::detached();
        let services = Services::new("localhost").unwrap();
        (App::with_link(panel, services, link), tx, cmd_rx)
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn snapshot(body: &str) -> PanelMsg {
        PanelMsg::Data(Snapshot::parse(body).unwrap())
    }

    #[test]
    fn test_update_with_empty_queue_is_noop() {
        let (mut app, _tx, _cmd_rx) = detached_app(PanelKind::Relay);
        let lines = app.log().len();
        app.update().unwrap();
        assert_eq!(*app.status(), LinkStatus::Connecting);
        assert!(app.snapshot().is_none());
        assert_eq!(app.log().len(), lines);
    }

    #[test]
    fn test_offline_then_back_online_keeps_stale_values() {
        let (mut app, tx, _cmd_rx) = detached_app(PanelKind::Relay);

        tx.send(snapshot(r#"{"voltage":132.0,"current":450}"#)).unwrap();
        app.update().unwrap();
        assert_eq!(*app.status(), LinkStatus::Connected);

        tx.send(PanelMsg::Error(PollError::NoConnection)).unwrap();
        app.update().unwrap();
        assert_eq!(*app.status(), LinkStatus::Disconnected);
        assert_eq!(app.snapshot().unwrap().voltage, 132.0);

        tx.send(snapshot(r#"{"voltage":131.0,"current":460}"#)).unwrap();
        app.update().unwrap();
        assert_eq!(*app.status(), LinkStatus::Connected);
        assert_eq!(app.snapshot().unwrap().voltage, 131.0);
    }

    #[test]
    fn test_batch_applies_in_order() {
        let (mut app, tx, _cmd_rx) = detached_app(PanelKind::Hmi);
        tx.send(snapshot(r#"{"voltage":130.0}"#)).unwrap();
        tx.send(PanelMsg::Error(PollError::Http(503))).unwrap();
        tx.send(snapshot(r#"{"voltage":133.0}"#)).unwrap();
        tx.send(PanelMsg::Error(PollError::Timeout)).unwrap();
        app.update().unwrap();
        assert_eq!(*app.status(), LinkStatus::Timeout);
        assert_eq!(app.snapshot().unwrap().voltage, 133.0);
    }

    #[test]
    fn test_failed_command_logs_and_leaves_telemetry() {
        let (mut app, tx, cmd_rx) = detached_app(PanelKind::Breaker);
        tx.send(snapshot(r#"{"position":"CLOSED","gooseStNum":3}"#)).unwrap();
        app.update().unwrap();
        let before = app.snapshot().cloned();

        app.handle_key_event(key('t'));
        let request = cmd_rx.try_recv().unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url.as_str(), "http://localhost:8081/trip");
        assert_eq!(request.timeout, Duration::from_secs(1));

        tx.send(PanelMsg::Command(CommandReport {
            request,
            outcome: Err("HTTP 500".to_owned()),
        }))
        .unwrap();
        app.update().unwrap();

        assert_eq!(app.log().last().unwrap().text(), "TRIP FAILED: HTTP 500");
        assert_eq!(app.snapshot().cloned(), before);
        assert_eq!(*app.status(), LinkStatus::Connected);
    }

    #[test]
    fn test_breaker_edges_and_goose_counter() {
        let (mut app, tx, _cmd_rx) = detached_app(PanelKind::Breaker);
        let start = app.log().len();

        tx.send(snapshot(r#"{"tripReceived":false,"messageCount":10}"#)).unwrap();
        tx.send(snapshot(
            r#"{"tripReceived":true,"messageCount":12,"stNum":2,"sqNum":0,"lastTime":"12:00:01"}"#,
        ))
        .unwrap();
        tx.send(snapshot(r#"{"tripReceived":true,"messageCount":12}"#)).unwrap();
        app.update().unwrap();

        let lines: Vec<&str> = app.log().lines().skip(start).map(|l| l.text()).collect();
        assert_eq!(
            lines,
            vec![
                "GOOSE TRIP SIGNAL RECEIVED",
                "GOOSE MSG: StNum=2 SqNum=0 Time=12:00:01"
            ]
        );
        assert!(app.last_operation().is_some());
    }

    #[test]
    fn test_hmi_alarm_list_and_acknowledge() {
        let (mut app, tx, _cmd_rx) = detached_app(PanelKind::Hmi);

        tx.send(snapshot(r#"{"faultDetected":true,"tripCommand":false}"#)).unwrap();
        tx.send(snapshot(r#"{"faultDetected":true,"tripCommand":true}"#)).unwrap();
        app.update().unwrap();
        let rows: Vec<&str> = app.alarms().rows().iter().map(|r| r.text()).collect();
        assert_eq!(rows, vec!["FAULT DETECTED", "TRIP COMMAND ISSUED"]);

        app.handle_key_event(key('a'));
        assert!(app.alarms().rows().is_empty());
        assert_eq!(app.log().last().unwrap().text(), "All alarms acknowledged");

        // Conditions still active: the list stays empty.
        tx.send(snapshot(r#"{"faultDetected":true,"tripCommand":true}"#)).unwrap();
        app.update().unwrap();
        assert!(app.alarms().rows().is_empty());

        tx.send(snapshot(r#"{"faultDetected":false,"tripCommand":true}"#)).unwrap();
        tx.send(snapshot(r#"{"faultDetected":true,"tripCommand":true}"#)).unwrap();
        app.update().unwrap();
        assert_eq!(app.alarms().rows().len(), 1);
    }

    #[test]
    fn test_hmi_reset_relay_targets_simulator() {
        let (mut app, _tx, cmd_rx) = detached_app(PanelKind::Hmi);
        app.handle_key_event(key('r'));
        let sent: Vec<CommandRequest> = cmd_rx.try_iter().collect();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].url.as_str(), "http://localhost:3000/api/command");
        assert_eq!(sent[0].body.as_ref().unwrap()["command"], "toggleFault");
        assert_eq!(sent[1].body.as_ref().unwrap()["command"], "toggleManualTrip");
        assert_eq!(sent[1].body.as_ref().unwrap()["data"]["active"], false);
    }

    #[test]
    fn test_hmi_read_values_is_local() {
        let (mut app, _tx, cmd_rx) = detached_app(PanelKind::Hmi);
        app.handle_key_event(key('v'));
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(
            app.log().last().unwrap().text(),
            "MMS READ: GenericIO/GGIO1.AnIn3.mag.f"
        );
    }

    #[test]
    fn test_inspect_reply_opens_debug_screen() {
        let (mut app, tx, cmd_rx) = detached_app(PanelKind::Hmi);
        app.handle_key_event(key('d'));
        let request = cmd_rx.try_recv().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url.as_str(), "http://localhost:8080/diagnostics");

        tx.send(PanelMsg::Command(CommandReport {
            request,
            outcome: Ok(CommandReply {
                status: 200,
                body: r#"{"mmsConnected":true}"#.to_owned(),
            }),
        }))
        .unwrap();
        app.update().unwrap();
        assert_eq!(app.current_screen(), SPScreen::Debug);
        assert!(app.debug_text().unwrap().contains("\"mmsConnected\": true"));

        app.handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(app.current_screen(), SPScreen::Main);
    }

    #[test]
    fn test_sim_setpoint_adjustment() {
        let (mut app, _tx, cmd_rx) = detached_app(PanelKind::Sim);
        app.handle_key_event(key('j'));
        assert_eq!(app.sim_focus(), SimField::Current);
        app.handle_key_event(key('l'));
        assert_eq!(app.setpoints().current, 460.0);

        let request = cmd_rx.try_recv().unwrap();
        assert_eq!(
            request.body.unwrap(),
            serde_json::json!({"type":"command","command":"updateCurrent","data":{"current":460.0}})
        );

        for _ in 0..400 {
            app.adjust_setpoint(SimField::Current, 10.0);
        }
        assert_eq!(app.setpoints().current, 3000.0);
    }

    #[test]
    fn test_sim_scenarios() {
        let (mut app, _tx, cmd_rx) = detached_app(PanelKind::Sim);

        app.handle_key_event(key('3'));
        let sent: Vec<CommandRequest> = cmd_rx.try_iter().collect();
        let names: Vec<&str> = sent
            .iter()
            .map(|r| r.body.as_ref().unwrap()["command"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "updateVoltage",
                "updateCurrent",
                "updateFrequency",
                "updateFaultCurrent",
                "toggleFault"
            ]
        );
        assert_eq!(sent[1].body.as_ref().unwrap()["data"]["current"], 3000.0);
        assert_eq!(sent[4].body.as_ref().unwrap()["data"]["active"], true);

        app.handle_key_event(key('e'));
        assert_eq!(cmd_rx.try_iter().count(), 3);
        assert_eq!(app.setpoints().current, 5000.0);

        app.handle_key_event(key('0'));
        assert_eq!(*app.setpoints(), Setpoints::default());
        assert_eq!(cmd_rx.try_iter().count(), 5);

        app.handle_key_event(key('s'));
        let trip = cmd_rx.try_recv().unwrap();
        assert_eq!(trip.body.unwrap()["command"], "sendTrip");
    }

    #[test]
    fn test_sim_syncs_setpoints_once() {
        let (mut app, tx, _cmd_rx) = detached_app(PanelKind::Sim);
        tx.send(snapshot(r#"{"voltage":140.0,"current":800,"frequency":49.5,"faultCurrent":0}"#))
            .unwrap();
        tx.send(snapshot(r#"{"voltage":120.0,"current":100,"frequency":50.0,"faultCurrent":0}"#))
            .unwrap();
        app.update().unwrap();
        assert_eq!(app.setpoints().voltage, 140.0);
        assert_eq!(app.setpoints().current, 800.0);
    }

    #[test]
    fn test_exit_flow() {
        let (mut app, _tx, _cmd_rx) = detached_app(PanelKind::Relay);
        app.handle_key_event(key('q'));
        assert_eq!(app.current_screen(), SPScreen::Exiting);
        app.handle_key_event(key('n'));
        assert_eq!(app.current_screen(), SPScreen::Main);
        app.handle_key_event(key('q'));
        app.handle_key_event(key('y'));
        assert!(app.should_exit());
    }

    #[test]
    fn test_setpoint_snapping() {
        let mut sp = Setpoints::default();
        assert_eq!(sp.set(SimField::FaultCurrent, 2549.0), 2500.0);
        assert_eq!(sp.set(SimField::Voltage, 200.0), 150.0);
        assert_eq!(sp.set(SimField::Current, -5.0), 0.0);
        let f = sp.set(SimField::Frequency, 49.987);
        assert!((f - 49.99).abs() < 1e-9);
    }
}
