#[allow(unused)]
use {
    super::{PollError, TelemetrySource},
    crate::{error::SPErrorExt, telemetry::Snapshot},
    core::result::Result as CoreResult,
    jlogger_tracing::{jdebug, jerror, jinfo},
    std::{
        io::{self, Read},
        net::{TcpStream, ToSocketAddrs},
        time::Duration,
    },
};

const MAX_BLOB: usize = 1024;

/// Breaker status socket: connect, read the JSON blob the device writes,
/// done. One blob per connection.
pub struct TcpSource {
    addr: String,
    timeout: Duration,
}

impl TcpSource {
    pub fn new(addr: &str, timeout: Duration) -> Self {
        Self {
            addr: addr.to_owned(),
            timeout,
        }
    }

    fn read_blob(&self) -> io::Result<String> {
        let target = self
            .addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no address"))?;

        let mut stream = TcpStream::connect_timeout(&target, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;

        let mut data = Vec::with_capacity(MAX_BLOB);
        let mut buf = [0u8; 256];
        while data.len() < MAX_BLOB {
            match stream.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => data.extend_from_slice(&buf[..n]),
                // Some firmware keeps the socket open after the blob.
                Err(e) if is_timeout(&e) && !data.is_empty() => break,
                Err(e) => return Err(e),
            }
        }

        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

fn classify(e: &io::Error) -> PollError {
    match e.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected => PollError::NoConnection,
        _ if is_timeout(e) => PollError::Timeout,
        _ => PollError::Unknown(e.to_string()),
    }
}

/// Cuts the JSON object out of the blob, tolerating an HTTP header or
/// trailing bytes around it.
pub fn extract_json(blob: &str) -> Option<&str> {
    let start = blob.find('{')?;
    let end = blob.rfind('}')?;
    (end >= start).then(|| &blob[start..=end])
}

impl TelemetrySource for TcpSource {
    fn describe(&self) -> String {
        format!("TCP {}", self.addr)
    }

    fn fetch(&mut self) -> CoreResult<Snapshot, PollError> {
        let blob = self.read_blob().map_err(|e| classify(&e))?;
        jdebug!(func = "TcpSource::fetch", line = line!(), blob = blob.as_str());

        let json = extract_json(&blob)
            .ok_or_else(|| PollError::Parsing("no JSON object in reply".to_owned()))?;
        Snapshot::parse(json).map_err(|e| {
            PollError::Parsing(e.error_str().unwrap_or_else(|| "invalid telemetry".to_owned()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_service::{self, FakeService};

    #[test]
    fn test_extract_json() {
        assert_eq!(extract_json(r#"{"a":1}"#), Some(r#"{"a":1}"#));
        assert_eq!(
            extract_json("HTTP/1.1 200 OK\r\n\r\n{\"position\":\"OPEN\"}\n"),
            Some("{\"position\":\"OPEN\"}")
        );
        assert_eq!(extract_json("no json"), None);
        assert_eq!(extract_json("} {"), None);
    }

    #[test]
    fn test_fetch_breaker_blob() {
        let service = FakeService::spawn_raw(vec![
            r#"{"position":"OPEN","tripReceived":true,"status":"trip"}"#,
            "garbage",
        ]);
        let mut source = TcpSource::new(
            &format!("127.0.0.1:{}", service.port()),
            Duration::from_secs(2),
        );

        let snapshot = source.fetch().unwrap();
        assert!(snapshot.is_breaker_open());
        assert!(snapshot.trip_received);
        assert_eq!(snapshot.status.as_deref(), Some("trip"));

        assert!(matches!(source.fetch(), Err(PollError::Parsing(_))));
        service.finish();
    }

    #[test]
    fn test_fetch_refused() {
        let mut source = TcpSource::new(
            &format!("127.0.0.1:{}", fake_service::refused_port()),
            Duration::from_secs(1),
        );
        assert_eq!(source.fetch(), Err(PollError::NoConnection));
    }
}
