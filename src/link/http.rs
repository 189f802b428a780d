#[allow(unused)]
use {
    super::{
        PollError, TelemetrySource,
        command::{CommandReply, CommandReport, CommandRequest, FAILURE_TEXT_CHARS, Method},
        truncate,
    },
    crate::{
        error::{SPError, SPErrorExt},
        telemetry::Snapshot,
    },
    core::result::Result as CoreResult,
    error_stack::{Report, Result},
    jlogger_tracing::{jdebug, jerror, jinfo},
    reqwest::{StatusCode, blocking::Client},
    std::time::Duration,
    url::Url,
};

pub fn build_client(timeout: Duration) -> Result<Client, SPError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| Report::new(SPError::NetworkError).attach_printable(e))
}

pub fn classify(e: &reqwest::Error) -> PollError {
    if e.is_timeout() {
        PollError::Timeout
    } else if e.is_connect() {
        PollError::NoConnection
    } else if let Some(status) = e.status() {
        PollError::Http(status.as_u16())
    } else if e.is_decode() || e.is_body() {
        PollError::Parsing(e.to_string())
    } else {
        PollError::Unknown(e.to_string())
    }
}

/// GETs a JSON snapshot from a fixed URL.
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, SPError> {
        Ok(Self {
            client: build_client(timeout)?,
            url,
        })
    }
}

impl TelemetrySource for HttpSource {
    fn describe(&self) -> String {
        format!("GET {}", self.url)
    }

    fn fetch(&mut self) -> CoreResult<Snapshot, PollError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(|e| classify(&e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PollError::Http(status.as_u16()));
        }

        let body = response.text().map_err(|e| classify(&e))?;
        Snapshot::parse(&body).map_err(|e| {
            PollError::Parsing(e.error_str().unwrap_or_else(|| "invalid telemetry".to_owned()))
        })
    }
}

/// Runs one command request. Never fails, the outcome is part of the report.
pub fn execute(client: &Client, request: CommandRequest) -> CommandReport {
    let builder = match request.method {
        Method::Get => client.get(request.url.clone()),
        Method::Post => client.post(request.url.clone()),
    }
    .timeout(request.timeout);

    let builder = match &request.body {
        Some(body) => builder.json(body),
        None => builder,
    };

    let outcome = match builder.send() {
        Ok(response) if response.status() == StatusCode::OK => {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            Ok(CommandReply { status, body })
        }
        Ok(response) => Err(format!("HTTP {}", response.status().as_u16())),
        Err(e) => Err(truncate(&e.to_string(), FAILURE_TEXT_CHARS)),
    };

    CommandReport { request, outcome }
}
