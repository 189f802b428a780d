//! Throwaway single-threaded HTTP responder standing in for a simulator
//! service in tests.

use std::{
    io::{Read, Write},
    net::{TcpListener, TcpStream},
    thread::JoinHandle,
    time::Duration,
};

pub struct FakeService {
    port: u16,
    handle: JoinHandle<Vec<String>>,
}

impl FakeService {
    /// Answers one connection per entry, in order, then stops listening.
    pub fn spawn(responses: Vec<(u16, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let responses: Vec<(u16, String)> = responses
            .into_iter()
            .map(|(code, body)| (code, body.to_owned()))
            .collect();

        let handle = std::thread::spawn(move || {
            let mut requests = Vec::new();
            for (code, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                requests.push(read_request(&mut stream));
                let reason = if code == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {code} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
            requests
        });

        Self { port, handle }
    }

    /// Raw TCP variant: writes the blob as soon as a client connects.
    pub fn spawn_raw(blobs: Vec<&str>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let blobs: Vec<String> = blobs.into_iter().map(|b| b.to_owned()).collect();

        let handle = std::thread::spawn(move || {
            for blob in &blobs {
                let (mut stream, _) = listener.accept().unwrap();
                stream.write_all(blob.as_bytes()).unwrap();
            }
            blobs
        });

        Self { port, handle }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Waits for every scripted exchange and returns the captured requests.
    pub fn finish(self) -> Vec<String> {
        self.handle.join().unwrap()
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = match stream.read(&mut buf) {
            Ok(n) => n,
            Err(_) => break,
        };
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.trim()
                        .eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&data).into_owned()
}

/// A local port with nothing listening on it.
pub fn refused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
