//! One-shot reachability check of every service read endpoint.

#[allow(unused)]
use {
    crate::{
        error::SPError,
        link::{PollError, TelemetrySource, http::HttpSource, tcp::TcpSource},
        panel::{Service, Services},
        telemetry::Snapshot,
    },
    core::result::Result as CoreResult,
    error_stack::{Report, Result},
    jlogger_tracing::{jdebug, jerror, jinfo},
    std::time::{Duration, Instant},
};

#[derive(Debug)]
pub struct ProbeResult {
    pub name: &'static str,
    pub target: String,
    pub elapsed: Duration,
    pub outcome: CoreResult<Snapshot, PollError>,
}

impl ProbeResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn render(&self) -> String {
        let verdict = match &self.outcome {
            Ok(snapshot) => format!("OK ({} fields)", snapshot.raw().len()),
            Err(e) => e.reason(),
        };
        format!(
            "{:<8} {:<45} {:>5}ms  {}",
            self.name,
            self.target,
            self.elapsed.as_millis(),
            verdict
        )
    }
}

fn run(name: &'static str, mut source: Box<dyn TelemetrySource>) -> ProbeResult {
    let target = source.describe();
    let started = Instant::now();
    let outcome = source.fetch();
    let elapsed = started.elapsed();

    match &outcome {
        Ok(_) => jinfo!(func = "probe", target = target.as_str(), result = "ok"),
        Err(e) => jerror!(func = "probe", target = target.as_str(), error = e.reason()),
    }

    ProbeResult {
        name,
        target,
        elapsed,
        outcome,
    }
}

/// Polls every read endpoint once, the breaker status socket too when
/// `breaker_tcp` is set.
pub fn probe(
    services: &Services,
    timeout: Duration,
    breaker_tcp: bool,
) -> Result<Vec<ProbeResult>, SPError> {
    let mut results = Vec::new();

    for service in Service::ALL {
        let source = HttpSource::new(services.read_endpoint(service)?, timeout)?;
        results.push(run(service.name(), Box::new(source)));
    }

    if breaker_tcp {
        let source = TcpSource::new(&services.breaker_socket(), timeout);
        results.push(run("breaker-tcp", Box::new(source)));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_service::{self, FakeService};

    #[test]
    fn test_probe_classifies_each_service() {
        let sim = FakeService::spawn(vec![(200, r#"{"voltage":132.0,"current":450}"#)]);
        let hmi = FakeService::spawn(vec![(503, "{}")]);
        let relay = FakeService::spawn(vec![(200, "not json")]);
        let services = Services::with_ports(
            "127.0.0.1",
            sim.port(),
            hmi.port(),
            fake_service::refused_port(),
            relay.port(),
        )
        .unwrap();

        let results = probe(&services, Duration::from_secs(2), false).unwrap();
        assert_eq!(results.len(), 4);

        let by_name = |name: &str| results.iter().find(|r| r.name == name).unwrap();
        assert!(by_name(Service::Sim.name()).is_ok());
        assert!(by_name(Service::Sim.name()).render().contains("OK (2 fields)"));
        assert!(by_name(Service::Hmi.name()).render().ends_with("HTTP 503"));
        assert!(by_name(Service::Breaker.name()).render().ends_with("NO CONNECTION"));
        assert!(by_name(Service::Relay.name()).render().ends_with("PARSING ERROR"));

        sim.finish();
        hmi.finish();
        relay.finish();
    }

    #[test]
    fn test_probe_breaker_socket() {
        let services = Services::with_ports(
            "127.0.0.1",
            fake_service::refused_port(),
            fake_service::refused_port(),
            fake_service::refused_port(),
            fake_service::refused_port(),
        )
        .unwrap();

        let results = probe(&services, Duration::from_secs(1), true).unwrap();
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| !r.is_ok()));
        assert!(results[4].target.starts_with("TCP 127.0.0.1:"));
    }
}
