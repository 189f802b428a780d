mod alarm;
mod app;
mod error;
#[cfg(test)]
mod fake_service;
mod link;
mod panel;
mod probe;
mod telemetry;

#[allow(unused)]
use {
    app::{App, AppConfig},
    clap::Parser,
    error::SPError,
    error_stack::{Report, Result},
    jlogger_tracing::{JloggerBuilder, LevelFilter, LogTimeFormat, jdebug, jerror, jinfo},
    panel::{PanelKind, Services},
    ratatui::{
        Terminal,
        crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        },
        prelude::{Backend, CrosstermBackend},
    },
    std::{io, time::Duration},
};

const HOST_ENV: &str = "SP_HOST";

#[derive(Parser, Debug)]
#[command(author, version, about = "Virtual substation visualization panels", long_about=None)]
pub struct Cli {
    /// Panel to run in this process.
    #[arg(short, long, value_enum, default_value_t = PanelKind::Hmi)]
    panel: PanelKind,

    /// Host running the services, SP_HOST or localhost when omitted.
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Read the breaker status from its raw TCP socket instead of HTTP.
    #[arg(long)]
    breaker_tcp: bool,

    /// Poll interval override.
    #[arg(short, long)]
    interval_ms: Option<u64>,

    #[arg(short, long, default_value_t = 2000)]
    timeout_ms: u64,

    #[arg(short, long, default_value_t = String::from("/tmp/substation-panels"))]
    log_file: String,

    #[arg(short, long, action=clap::ArgAction::Count)]
    verbose: u8,

    /// Check every service endpoint once and exit.
    #[arg(long)]
    probe: bool,
}

/// Command line first, then the environment, then localhost.
pub fn resolve_host(cli_host: Option<&str>, env_host: Option<&str>) -> String {
    cli_host
        .or(env_host)
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost")
        .to_owned()
}

impl Cli {
    pub fn app_config(&self) -> Result<AppConfig, SPError> {
        let env_host = std::env::var(HOST_ENV).ok();
        let host = resolve_host(self.host.as_deref(), env_host.as_deref());
        let services = Services::new(&host)?;

        if self.timeout_ms == 0 {
            return Err(Report::new(SPError::InvalidData).attach_printable("timeout must be > 0"));
        }

        let mut config = AppConfig::new(self.panel, services);
        config.breaker_tcp = self.breaker_tcp;
        config.timeout = Duration::from_millis(self.timeout_ms);
        if let Some(ms) = self.interval_ms {
            config.interval = Duration::from_millis(ms.max(1));
        }

        Ok(config)
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), SPError> {
    jdebug!(func = "run_app", line = line!(), note = "Main loop");
    loop {
        if app.should_exit() {
            break;
        }

        app.update()?;

        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| Report::new(SPError::IOError).attach_printable(e))?;

        app.handle_events()?;
    }

    Ok(())
}

fn run_probe(config: &AppConfig) -> Result<(), SPError> {
    let results = probe::probe(&config.services, config.timeout, config.breaker_tcp)?;
    for result in &results {
        println!("{}", result.render());
    }

    let failed = results.iter().filter(|r| !r.is_ok()).count();
    println!("{} of {} endpoints reachable", results.len() - failed, results.len());

    if failed > 0 {
        return Err(Report::new(SPError::NetworkError)
            .attach_printable(format!("{failed} endpoint(s) unreachable")));
    }

    Ok(())
}

fn main() -> Result<(), SPError> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        1 => LevelFilter::DEBUG,
        2 => LevelFilter::TRACE,
        _ => LevelFilter::INFO,
    };

    JloggerBuilder::new()
        .max_level(level)
        .log_file(Some((cli.log_file.as_str(), false)))
        .log_console(false)
        .log_time(LogTimeFormat::TimeLocal)
        .build();

    let config = cli.app_config()?;
    jinfo!(
        func = "main",
        panel = config.panel.title(),
        host = config.services.host(),
        interval = format!("{:?}", config.interval)
    );

    if cli.probe {
        return run_probe(&config);
    }

    let mut app = App::new(config)?;

    // Initial terminal
    enable_raw_mode().map_err(|e| Report::new(SPError::IOError).attach_printable(e))?;

    let mut stderr = io::stderr();
    execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| Report::new(SPError::IOError).attach_printable(e))?;

    let backend = CrosstermBackend::new(stderr);
    let mut terminal =
        Terminal::new(backend).map_err(|e| Report::new(SPError::IOError).attach_printable(e))?;
    let app_result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().map_err(|e| Report::new(SPError::IOError).attach_printable(e))?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .map_err(|e| Report::new(SPError::IOError).attach_printable(e))?;

    terminal
        .show_cursor()
        .map_err(|e| Report::new(SPError::IOError).attach_printable(e))?;

    if let Err(e) = app_result {
        jerror!("{:?}", e);
        return Err(e);
    }

    Ok(())
}
