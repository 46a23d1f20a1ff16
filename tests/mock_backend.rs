use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A canned answer for one method + path.
#[derive(Clone)]
pub struct Route {
    method: &'static str,
    path: &'static str,
    status: u16,
    body: String,
}

#[allow(dead_code)]
pub fn json_route(
    method: &'static str,
    path: &'static str,
    status: u16,
    body: serde_json::Value,
) -> Route {
    Route {
        method,
        path,
        status,
        body: body.to_string(),
    }
}

#[allow(dead_code)]
pub fn raw_route(method: &'static str, path: &'static str, status: u16, body: &str) -> Route {
    Route {
        method,
        path,
        status,
        body: body.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is json")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Minimal HTTP/1.1 backend: one request per connection, canned answers.
pub struct MockBackend {
    port: u16,
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock backend");
        let port = listener.local_addr().unwrap().port();
        listener
            .set_nonblocking(true)
            .expect("set_nonblocking on listener");

        let shutdown = Arc::new(AtomicBool::new(false));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let shutdown_clone = shutdown.clone();
        let requests_clone = requests.clone();
        let handle = thread::spawn(move || {
            Self::serve(listener, routes, shutdown_clone, requests_clone);
        });

        MockBackend {
            port,
            shutdown,
            handle: Some(handle),
            requests,
        }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn serve(
        listener: TcpListener,
        routes: Vec<Route>,
        shutdown: Arc<AtomicBool>,
        requests: Arc<Mutex<Vec<Recorded>>>,
    ) {
        while !shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, _)) => {
                    stream
                        .set_nonblocking(false)
                        .expect("set blocking on stream");
                    stream.set_read_timeout(Some(Duration::from_secs(5))).ok();
                    Self::handle_connection(stream, &routes, &requests);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    }

    fn handle_connection(
        mut stream: TcpStream,
        routes: &[Route],
        requests: &Mutex<Vec<Recorded>>,
    ) {
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        if reader.read_line(&mut request_line).is_err() {
            return;
        }

        let mut content_length = 0usize;
        let mut chunked = false;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).is_err() {
                return;
            }
            let header = header.trim().to_ascii_lowercase();
            if header.is_empty() {
                break;
            }
            if let Some(v) = header.strip_prefix("content-length:") {
                content_length = v.trim().parse().unwrap_or(0);
            }
            if header.starts_with("transfer-encoding:") && header.contains("chunked") {
                chunked = true;
            }
        }

        let body = if chunked {
            Self::read_chunked(&mut reader)
        } else {
            let mut buf = vec![0u8; content_length];
            if reader.read_exact(&mut buf).is_err() {
                return;
            }
            buf
        };

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() < 2 {
            return;
        }
        let (method, path) = (parts[0], parts[1]);
        requests.lock().unwrap().push(Recorded {
            method: method.to_string(),
            path: path.to_string(),
            body,
        });

        let (status, payload) = routes
            .iter()
            .find(|r| r.method == method && r.path == path)
            .map(|r| (r.status, r.body.clone()))
            .unwrap_or((404, "not found".to_string()));

        let response = format!(
            "HTTP/1.1 {status} MOCK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
            payload.len()
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.flush();
    }

    fn read_chunked(reader: &mut BufReader<TcpStream>) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let mut size_line = String::new();
            if reader.read_line(&mut size_line).is_err() {
                break;
            }
            let size_hex = size_line.trim().split(';').next().unwrap_or("0");
            let size = usize::from_str_radix(size_hex, 16).unwrap_or(0);
            if size == 0 {
                let mut trailer = String::new();
                let _ = reader.read_line(&mut trailer);
                break;
            }
            let mut chunk = vec![0u8; size];
            if reader.read_exact(&mut chunk).is_err() {
                break;
            }
            out.extend_from_slice(&chunk);
            let mut crlf = [0u8; 2];
            let _ = reader.read_exact(&mut crlf);
        }
        out
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}
