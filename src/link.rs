pub mod command;
pub mod http;
pub mod tcp;

#[allow(unused)]
use {
    crate::{error::SPError, telemetry::Snapshot},
    command::{CommandReport, CommandRequest},
    core::result::Result as CoreResult,
    error_stack::{Report, Result},
    jlogger_tracing::{jdebug, jerror, jinfo},
    ratatui::prelude::Color,
    std::{
        sync::mpsc,
        thread::JoinHandle,
        time::{Duration, Instant},
    },
};

/// Why a poll produced no snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    NoConnection,
    Timeout,
    Parsing(String),
    Http(u16),
    Unknown(String),
}

impl PollError {
    pub fn reason(&self) -> String {
        match self {
            PollError::NoConnection => "NO CONNECTION".to_owned(),
            PollError::Timeout => "TIMEOUT".to_owned(),
            PollError::Parsing(_) => "PARSING ERROR".to_owned(),
            PollError::Http(code) => format!("HTTP {code}"),
            PollError::Unknown(text) => truncate(text, 15),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
    Timeout,
    ParseError,
    HttpError(u16),
    Unknown(String),
}

impl From<&PollError> for LinkStatus {
    fn from(value: &PollError) -> Self {
        match value {
            PollError::NoConnection => LinkStatus::Disconnected,
            PollError::Timeout => LinkStatus::Timeout,
            PollError::Parsing(_) => LinkStatus::ParseError,
            PollError::Http(code) => LinkStatus::HttpError(*code),
            PollError::Unknown(text) => LinkStatus::Unknown(truncate(text, 15)),
        }
    }
}

impl LinkStatus {
    pub fn label(&self) -> String {
        match self {
            LinkStatus::Connecting => "CONNECTING".to_owned(),
            LinkStatus::Connected => "ONLINE".to_owned(),
            LinkStatus::Disconnected => "NO CONNECTION".to_owned(),
            LinkStatus::Timeout => "TIMEOUT".to_owned(),
            LinkStatus::ParseError => "PARSING ERROR".to_owned(),
            LinkStatus::HttpError(code) => format!("HTTP {code}"),
            LinkStatus::Unknown(text) => text.clone(),
        }
    }

    pub fn color(&self) -> Color {
        match self {
            LinkStatus::Connecting => Color::DarkGray,
            LinkStatus::Connected => Color::Green,
            LinkStatus::Disconnected | LinkStatus::Timeout => Color::Red,
            LinkStatus::ParseError => Color::Yellow,
            LinkStatus::HttpError(_) | LinkStatus::Unknown(_) => Color::LightRed,
        }
    }

    pub fn is_online(&self) -> bool {
        *self == LinkStatus::Connected
    }
}

/// Everything the worker threads hand to the UI thread.
#[derive(Debug)]
pub enum PanelMsg {
    Data(Snapshot),
    Error(PollError),
    Command(CommandReport),
}

pub trait TelemetrySource: Send {
    fn describe(&self) -> String;

    fn fetch(&mut self) -> CoreResult<Snapshot, PollError>;
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn poll_thread(
    mut source: Box<dyn TelemetrySource>,
    interval: Duration,
    sender: mpsc::Sender<PanelMsg>,
) {
    let target = source.describe();
    jinfo!(func = "poll_thread", target = target.as_str(), interval = format!("{interval:?}"));

    loop {
        let started = Instant::now();
        let msg = match source.fetch() {
            Ok(snapshot) => PanelMsg::Data(snapshot),
            Err(e) => {
                jdebug!(
                    func = "poll_thread",
                    line = line!(),
                    target = target.as_str(),
                    error = format!("{e:?}")
                );
                PanelMsg::Error(e)
            }
        };

        jdebug!(
            func = "poll_thread",
            line = line!(),
            elapsed = format!("{}ms", started.elapsed().as_millis())
        );

        // Receiver gone means the process is shutting down.
        if sender.send(msg).is_err() {
            break;
        }

        std::thread::sleep(interval);
    }
}

fn command_thread(
    client: reqwest::blocking::Client,
    requests: mpsc::Receiver<CommandRequest>,
    sender: mpsc::Sender<PanelMsg>,
) {
    while let Ok(request) = requests.recv() {
        let report = http::execute(&client, request);
        match &report.outcome {
            Ok(reply) => jinfo!(
                func = "command_thread",
                label = report.request.label.as_str(),
                status = reply.status
            ),
            Err(e) => jerror!(
                func = "command_thread",
                label = report.request.label.as_str(),
                error = e.as_str()
            ),
        }

        if sender.send(PanelMsg::Command(report)).is_err() {
            break;
        }
    }
}

/// Owns the channel ends used by the UI thread. The worker threads are never
/// joined, they die with the process.
pub struct LinkCtrl {
    rx: mpsc::Receiver<PanelMsg>,
    cmd_tx: mpsc::Sender<CommandRequest>,
    #[allow(dead_code)]
    poller: Option<JoinHandle<()>>,
    #[allow(dead_code)]
    dispatcher: Option<JoinHandle<()>>,
}

impl LinkCtrl {
    pub fn start(
        source: Box<dyn TelemetrySource>,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Self, SPError> {
        let client = http::build_client(timeout)?;
        let (tx, rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel();

        let poll_tx = tx.clone();
        let poller = std::thread::Builder::new()
            .name("poller".to_owned())
            .spawn(move || poll_thread(source, interval, poll_tx))
            .map_err(|e| Report::new(SPError::IOError).attach_printable(e))?;

        let dispatcher = std::thread::Builder::new()
            .name("commands".to_owned())
            .spawn(move || command_thread(client, cmd_rx, tx))
            .map_err(|e| Report::new(SPError::IOError).attach_printable(e))?;

        Ok(Self {
            rx,
            cmd_tx,
            poller: Some(poller),
            dispatcher: Some(dispatcher),
        })
    }

    /// A link without worker threads. The returned ends stand in for the
    /// services: inject messages on the sender, inspect queued commands on
    /// the receiver.
    pub fn detached() -> (Self, mpsc::Sender<PanelMsg>, mpsc::Receiver<CommandRequest>) {
        let (tx, rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        (
            Self {
                rx,
                cmd_tx,
                poller: None,
                dispatcher: None,
            },
            tx,
            cmd_rx,
        )
    }

    /// Everything queued so far, never blocks.
    pub fn drain(&self) -> Vec<PanelMsg> {
        self.rx.try_iter().collect()
    }

    pub fn send(&self, request: CommandRequest) -> Result<(), SPError> {
        jdebug!(
            func = "LinkCtrl::send",
            label = request.label.as_str(),
            url = request.url.as_str()
        );
        self.cmd_tx.send(request).map_err(|_| {
            Report::new(SPError::IOError).attach_printable("Command worker is not running")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::{Arc, Mutex};

    struct ScriptedSource {
        outcomes: Arc<Mutex<Vec<CoreResult<Snapshot, PollError>>>>,
    }

    impl TelemetrySource for ScriptedSource {
        fn describe(&self) -> String {
            "scripted".to_owned()
        }

        fn fetch(&mut self) -> CoreResult<Snapshot, PollError> {
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                Err(PollError::NoConnection)
            } else {
                outcomes.remove(0)
            }
        }
    }

    #[test]
    fn test_reasons_and_status() {
        assert_eq!(PollError::NoConnection.reason(), "NO CONNECTION");
        assert_eq!(PollError::Http(503).reason(), "HTTP 503");
        assert_eq!(
            PollError::Unknown("something went badly wrong".to_owned()).reason(),
            "something went "
        );
        assert_eq!(LinkStatus::from(&PollError::Timeout), LinkStatus::Timeout);
        assert_eq!(
            LinkStatus::from(&PollError::Parsing("x".to_owned())).color(),
            Color::Yellow
        );
        assert_eq!(LinkStatus::from(&PollError::NoConnection).color(), Color::Red);
        assert!(LinkStatus::Connected.is_online());
    }

    #[test]
    #[serial]
    fn test_poll_thread_forwards_outcomes_in_order() {
        let outcomes = Arc::new(Mutex::new(vec![
            Ok(Snapshot {
                voltage: 132.0,
                ..Default::default()
            }),
            Err(PollError::Timeout),
        ]));
        let source = Box::new(ScriptedSource {
            outcomes: outcomes.clone(),
        });
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || poll_thread(source, Duration::from_millis(5), tx));

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(first, PanelMsg::Data(ref s) if s.voltage == 132.0));
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(second, PanelMsg::Error(PollError::Timeout)));
        let third = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(third, PanelMsg::Error(PollError::NoConnection)));
    }

    #[test]
    fn test_detached_link_round_trip() {
        let (link, tx, cmd_rx) = LinkCtrl::detached();
        assert!(link.drain().is_empty());

        tx.send(PanelMsg::Error(PollError::Timeout)).unwrap();
        tx.send(PanelMsg::Data(Snapshot::default())).unwrap();
        assert_eq!(link.drain().len(), 2);
        assert!(link.drain().is_empty());

        let services = crate::panel::Services::new("localhost").unwrap();
        let request = command::CommandRequest::post(
            "TRIP",
            services
                .endpoint(crate::panel::Service::Breaker, "/trip")
                .unwrap(),
        );
        link.send(request).unwrap();
        assert_eq!(cmd_rx.try_recv().unwrap().label, "TRIP");
    }
}
