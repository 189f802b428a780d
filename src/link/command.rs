/*
Copyright [2025] Seimizu Joukan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

#[allow(unused)]
use {
    crate::{
        error::SPError,
        panel::{Service, Services},
    },
    core::result::Result as CoreResult,
    error_stack::{Report, Result},
    jlogger_tracing::{jdebug, jerror, jinfo},
    serde_derive::Serialize,
    serde_json::{Value, json},
    std::time::Duration,
    url::Url,
};

pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);
pub const FAILURE_TEXT_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// What the UI does with a successful reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyUse {
    /// Append the given lines to the event log.
    Log(Vec<String>),
    /// Show the body in the debug pane.
    Inspect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    /// Prefix used in failure lines, e.g. "TRIP" gives "TRIP FAILED: ...".
    pub label: String,
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
    pub timeout: Duration,
    pub on_success: ReplyUse,
}

impl CommandRequest {
    pub fn post(label: &str, url: Url) -> Self {
        Self {
            label: label.to_owned(),
            method: Method::Post,
            url,
            body: None,
            timeout: COMMAND_TIMEOUT,
            on_success: ReplyUse::Log(vec![format!("{label} COMMAND SENT")]),
        }
    }

    pub fn inspect(label: &str, url: Url) -> Self {
        Self {
            label: label.to_owned(),
            method: Method::Get,
            url,
            body: None,
            timeout: COMMAND_TIMEOUT,
            on_success: ReplyUse::Inspect,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn logging(mut self, lines: &[&str]) -> Self {
        self.on_success = ReplyUse::Log(lines.iter().map(|l| (*l).to_owned()).collect());
        self
    }

    pub fn failure_line(&self, error: &str) -> String {
        format!("{} FAILED: {}", self.label, error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub status: u16,
    pub body: String,
}

/// Result of one dispatched request. `Err` holds the text shown after
/// "FAILED:", either `HTTP <code>` or the truncated transport error.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReport {
    pub request: CommandRequest,
    pub outcome: CoreResult<CommandReply, String>,
}

impl CommandReport {
    pub fn log_lines(&self) -> Vec<String> {
        match (&self.outcome, &self.request.on_success) {
            (Ok(_), ReplyUse::Log(lines)) => lines.clone(),
            (Ok(reply), ReplyUse::Inspect) => {
                vec![format!("{} OK: HTTP {}", self.request.label, reply.status)]
            }
            (Err(e), _) => vec![self.request.failure_line(e)],
        }
    }
}

/// Commands understood by the simulation service on `/api/command`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCommand {
    UpdateVoltage(f64),
    UpdateCurrent(f64),
    UpdateFrequency(f64),
    UpdateFaultCurrent(f64),
    ToggleFault(bool),
    ToggleBreaker(bool),
    ToggleManualTrip(bool),
    SendTrip,
}

#[derive(Serialize)]
struct CommandEnvelope<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    command: &'a str,
    data: Value,
}

impl SimCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SimCommand::UpdateVoltage(_) => "updateVoltage",
            SimCommand::UpdateCurrent(_) => "updateCurrent",
            SimCommand::UpdateFrequency(_) => "updateFrequency",
            SimCommand::UpdateFaultCurrent(_) => "updateFaultCurrent",
            SimCommand::ToggleFault(_) => "toggleFault",
            SimCommand::ToggleBreaker(_) => "toggleBreaker",
            SimCommand::ToggleManualTrip(_) => "toggleManualTrip",
            SimCommand::SendTrip => "sendTrip",
        }
    }

    pub fn data(&self) -> Value {
        match *self {
            SimCommand::UpdateVoltage(v) => json!({ "voltage": v }),
            SimCommand::UpdateCurrent(v) => json!({ "current": v }),
            SimCommand::UpdateFrequency(v) => json!({ "frequency": v }),
            SimCommand::UpdateFaultCurrent(v) => json!({ "faultCurrent": v }),
            SimCommand::ToggleFault(active) => json!({ "active": active }),
            SimCommand::ToggleBreaker(open) => json!({ "open": open }),
            SimCommand::ToggleManualTrip(active) => json!({ "active": active }),
            SimCommand::SendTrip => json!({}),
        }
    }

    pub fn body(&self) -> Value {
        serde_json::to_value(CommandEnvelope {
            kind: "command",
            command: self.name(),
            data: self.data(),
        })
        .unwrap_or(Value::Null)
    }

    pub fn request(&self, services: &Services) -> Result<CommandRequest, SPError> {
        let url = services.endpoint(Service::Sim, "/api/command")?;
        Ok(CommandRequest::post(self.name(), url)
            .with_body(self.body())
            .logging(&[format!("SIM: {} {}", self.name(), self.data()).as_str()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_command_envelope() {
        let body = SimCommand::UpdateVoltage(132.5).body();
        assert_eq!(
            body,
            json!({"type": "command", "command": "updateVoltage", "data": {"voltage": 132.5}})
        );
        assert_eq!(
            SimCommand::ToggleBreaker(true).body()["data"],
            json!({"open": true})
        );
        assert_eq!(SimCommand::SendTrip.body()["data"], json!({}));
    }

    #[test]
    fn test_sim_request_targets_command_endpoint() {
        let services = Services::new("localhost").unwrap();
        let request = SimCommand::ToggleFault(false).request(&services).unwrap();
        assert_eq!(request.url.as_str(), "http://localhost:3000/api/command");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body.as_ref().unwrap()["command"], "toggleFault");
    }

    #[test]
    fn test_report_lines() {
        let services = Services::new("localhost").unwrap();
        let request = CommandRequest::post(
            "TRIP",
            services.endpoint(Service::Breaker, "/trip").unwrap(),
        )
        .logging(&["MANUAL TRIP COMMAND ISSUED"]);

        let ok = CommandReport {
            request: request.clone(),
            outcome: Ok(CommandReply {
                status: 200,
                body: "{}".to_owned(),
            }),
        };
        assert_eq!(ok.log_lines(), vec!["MANUAL TRIP COMMAND ISSUED".to_owned()]);

        let failed = CommandReport {
            request,
            outcome: Err("HTTP 500".to_owned()),
        };
        assert_eq!(failed.log_lines(), vec!["TRIP FAILED: HTTP 500".to_owned()]);
    }
}
