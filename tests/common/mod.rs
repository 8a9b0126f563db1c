// tests/common/mod.rs
//
// Canned HTTP/1.1 server on 127.0.0.1 for exercising the client without the
// real API. Serves the given responses in order, one per connection, then
// stops accepting.
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use scorecard::config::{Credential, FetchOptions};

pub struct StubServer {
    pub base: String,
    requests: Arc<Mutex<Vec<String>>>,
    _handle: JoinHandle<()>,
}

impl StubServer {
    /// Request targets (path + query) seen so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// FetchOptions pointed at this server.
    pub fn options(&self) -> FetchOptions {
        FetchOptions {
            base_url: self.base.clone(),
            dataset: "schools.json".into(),
            ..FetchOptions::default()
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

pub fn serve(script: Vec<(u16, String)>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    let handle = thread::spawn(move || {
        for (status, body) in script {
            let Ok((mut stream, _)) = listener.accept() else { return };

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            let head = String::from_utf8_lossy(&head);
            let target = head
                .lines()
                .next()
                .and_then(|l| l.split_whitespace().nth(1))
                .unwrap_or("")
                .to_string();
            seen.lock().unwrap().push(target);

            let resp = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason(status),
                body.len(),
                body
            );
            let _ = stream.write_all(resp.as_bytes());
            let _ = stream.flush();
        }
    });

    StubServer {
        base: format!("http://{addr}/v1/"),
        requests,
        _handle: handle,
    }
}

pub fn ok(body: &str) -> (u16, String) {
    (200, body.to_string())
}

pub fn key() -> Credential {
    Credential::new("TESTKEY").unwrap()
}

/// Fresh, empty temp directory per test name.
pub fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("scorecard_test_{}", name));
    let _ = std::fs::remove_dir_all(&p);
    std::fs::create_dir_all(&p).unwrap();
    p
}
