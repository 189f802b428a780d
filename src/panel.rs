#[allow(unused)]
use {
    crate::error::SPError,
    error_stack::{Report, Result},
    jlogger_tracing::{jdebug, jerror, jinfo},
    std::time::Duration,
    url::Url,
};

pub const SIM_PORT: u16 = 3000;
pub const HMI_PORT: u16 = 8080;
pub const BREAKER_PORT: u16 = 8081;
pub const RELAY_PORT: u16 = 8082;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PanelKind {
    /// Circuit breaker IED
    Breaker,
    /// Protection relay IED
    Relay,
    /// HMI/SCADA MMS client
    #[default]
    Hmi,
    /// Simulation control center
    Sim,
}

impl PanelKind {
    pub fn title(&self) -> &'static str {
        match self {
            PanelKind::Breaker => "Circuit Breaker IED - CB_LINE_01_001",
            PanelKind::Relay => "Protection Relay IED - PROT_REL_001",
            PanelKind::Hmi => "HMI/SCADA - MMS Client",
            PanelKind::Sim => "Simulation Control Center",
        }
    }

    pub fn service(&self) -> Service {
        match self {
            PanelKind::Breaker => Service::Breaker,
            PanelKind::Relay => Service::Relay,
            PanelKind::Hmi => Service::Hmi,
            PanelKind::Sim => Service::Sim,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        match self {
            PanelKind::Hmi => Duration::from_secs(2),
            _ => Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Sim,
    Hmi,
    Breaker,
    Relay,
}

impl Service {
    pub const ALL: [Service; 4] = [Service::Sim, Service::Hmi, Service::Breaker, Service::Relay];

    #[cfg(test)]
    pub fn default_port(&self) -> u16 {
        match self {
            Service::Sim => SIM_PORT,
            Service::Hmi => HMI_PORT,
            Service::Breaker => BREAKER_PORT,
            Service::Relay => RELAY_PORT,
        }
    }

    /// Path answering GET with a telemetry snapshot.
    pub fn read_path(&self) -> &'static str {
        match self {
            Service::Sim => "/api/simulation-data",
            _ => "/",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Service::Sim => "simulation",
            Service::Hmi => "hmi-scada",
            Service::Breaker => "circuit-breaker",
            Service::Relay => "protection-relay",
        }
    }
}

/// Base URLs of the external simulator services.
#[derive(Debug, Clone, PartialEq)]
pub struct Services {
    host: String,
    sim: Url,
    hmi: Url,
    breaker: Url,
    relay: Url,
}

impl Services {
    pub fn new(host: &str) -> Result<Self, SPError> {
        Self::with_ports(host, SIM_PORT, HMI_PORT, BREAKER_PORT, RELAY_PORT)
    }

    pub fn with_ports(
        host: &str,
        sim: u16,
        hmi: u16,
        breaker: u16,
        relay: u16,
    ) -> Result<Self, SPError> {
        let base = |port: u16| -> Result<Url, SPError> {
            Url::parse(&format!("http://{host}:{port}/")).map_err(|e| {
                Report::new(SPError::InvalidData)
                    .attach_printable(format!("Invalid host '{host}': {e}"))
            })
        };

        Ok(Self {
            host: host.to_owned(),
            sim: base(sim)?,
            hmi: base(hmi)?,
            breaker: base(breaker)?,
            relay: base(relay)?,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base(&self, service: Service) -> &Url {
        match service {
            Service::Sim => &self.sim,
            Service::Hmi => &self.hmi,
            Service::Breaker => &self.breaker,
            Service::Relay => &self.relay,
        }
    }

    pub fn endpoint(&self, service: Service, path: &str) -> Result<Url, SPError> {
        self.base(service).join(path).map_err(|e| {
            Report::new(SPError::InvalidData).attach_printable(format!("Invalid path '{path}': {e}"))
        })
    }

    pub fn read_endpoint(&self, service: Service) -> Result<Url, SPError> {
        self.endpoint(service, service.read_path())
    }

    /// host:port of the breaker's raw TCP status socket.
    pub fn breaker_socket(&self) -> String {
        let port = self.breaker.port_or_known_default().unwrap_or(BREAKER_PORT);
        format!("{}:{port}", self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let services = Services::new("localhost").unwrap();
        assert_eq!(
            services.read_endpoint(Service::Sim).unwrap().as_str(),
            "http://localhost:3000/api/simulation-data"
        );
        assert_eq!(
            services.read_endpoint(Service::Relay).unwrap().as_str(),
            "http://localhost:8082/"
        );
        assert_eq!(
            services.endpoint(Service::Hmi, "/mms/trip").unwrap().as_str(),
            "http://localhost:8080/mms/trip"
        );
        assert_eq!(services.breaker_socket(), "localhost:8081");
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        assert!(Services::new("bad host").is_err());
    }

    #[test]
    fn test_panel_defaults() {
        assert_eq!(PanelKind::Hmi.poll_interval(), Duration::from_secs(2));
        assert_eq!(PanelKind::Breaker.poll_interval(), Duration::from_secs(1));
        assert_eq!(PanelKind::Sim.service().default_port(), 3000);
        assert_eq!(Service::ALL.len(), 4);
    }
}
