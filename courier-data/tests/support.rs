//! In-process HTTP stub standing in for the Distance Matrix service.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Path served by the stub.
pub const MATRIX_PATH: &str = "/maps/api/distancematrix/json";

/// How the stub answers its single connection.
#[derive(Debug, Clone)]
enum Reply {
    Respond { status: u16, body: String },
    Stall(Duration),
}

/// One-shot HTTP server bound to an ephemeral local port.
#[derive(Debug)]
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Serve one request with `status` and a JSON `body`.
    pub fn respond(status: u16, body: impl Into<String>) -> Self {
        Self::spawn(Reply::Respond {
            status,
            body: body.into(),
        })
    }

    /// Accept one request and hold the connection open for `delay`.
    pub fn stall(delay: Duration) -> Self {
        Self::spawn(Reply::Stall(delay))
    }

    /// Address of a port with nothing listening.
    pub fn closed_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local address");
        drop(listener);
        format!("http://{addr}{MATRIX_PATH}")
    }

    fn spawn(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            if let Some(Ok(stream)) = listener.incoming().next() {
                serve(stream, &reply, &recorded);
            }
        });
        Self { addr, requests }
    }

    /// Endpoint URL for the provider.
    pub fn url(&self) -> String {
        format!("http://{}{MATRIX_PATH}", self.addr)
    }

    /// Request lines received, e.g. `GET /path?query HTTP/1.1`.
    pub fn request_lines(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn serve(stream: TcpStream, reply: &Reply, recorded: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header.trim().is_empty() => break,
            Ok(_) => {}
        }
    }
    recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request_line.trim_end().to_owned());

    let mut stream = reader.into_inner();
    match reply {
        Reply::Respond { status, body } => {
            let response = format!(
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
        Reply::Stall(delay) => thread::sleep(*delay),
    }
}
