#![forbid(unsafe_code)]
#![allow(dead_code)]

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

pub(crate) const DIRECTOR_EMAIL: &str = "directeur@optimum.com";
pub(crate) const SEED_PASSWORD: &str = "password123";

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) struct Server {
    child: Child,
    pub(crate) port: u16,
    pub(crate) storage_dir: PathBuf,
}

impl Server {
    pub(crate) fn start(test_name: &str) -> Self {
        Self::start_with_args(test_name, &[])
    }

    pub(crate) fn start_seeded(test_name: &str) -> Self {
        Self::start_with_args(test_name, &["--seed"])
    }

    pub(crate) fn start_with_args(test_name: &str, extra_args: &[&str]) -> Self {
        let storage_dir = temp_dir(test_name);
        let port = pick_free_port();
        let child = Command::new(env!("CARGO_BIN_EXE_om_api"))
            .arg("--storage-dir")
            .arg(&storage_dir)
            .arg("--port")
            .arg(port.to_string())
            .args(extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn om_api");

        let server = Self {
            child,
            port,
            storage_dir,
        };
        server.wait_until_ready();
        server
    }

    fn wait_until_ready(&self) {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if TcpStream::connect(("127.0.0.1", self.port)).is_ok() {
                return;
            }
            if Instant::now() >= deadline {
                panic!("om_api did not become reachable on 127.0.0.1:{}", self.port);
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }

    pub(crate) fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> (u16, Value) {
        let payload = body.map(|value| value.to_string()).unwrap_or_default();
        let mut head = format!("{method} {path} HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n");
        if let Some(token) = token {
            head.push_str(&format!("Authorization: Bearer {token}\r\n"));
        }
        if !payload.is_empty() {
            head.push_str("Content-Type: application/json\r\n");
        }
        head.push_str(&format!("Content-Length: {}\r\n\r\n", payload.len()));

        let mut stream = TcpStream::connect(("127.0.0.1", self.port)).expect("connect");
        let _ = stream.set_read_timeout(Some(CLIENT_TIMEOUT));
        let _ = stream.set_write_timeout(Some(CLIENT_TIMEOUT));
        stream.write_all(head.as_bytes()).expect("write head");
        stream.write_all(payload.as_bytes()).expect("write body");
        stream.flush().expect("flush request");

        read_response(stream)
    }

    pub(crate) fn get(&self, path: &str, token: Option<&str>) -> (u16, Value) {
        self.request("GET", path, token, None)
    }

    pub(crate) fn post(&self, path: &str, token: Option<&str>, body: Value) -> (u16, Value) {
        self.request("POST", path, token, Some(&body))
    }

    pub(crate) fn put(&self, path: &str, token: Option<&str>, body: Value) -> (u16, Value) {
        self.request("PUT", path, token, Some(&body))
    }

    pub(crate) fn delete(&self, path: &str, token: Option<&str>) -> (u16, Value) {
        self.request("DELETE", path, token, None)
    }

    pub(crate) fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self.post(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        );
        assert_eq!(status, 200, "login as {email} must succeed: {body}");
        body["token"].as_str().expect("login token").to_string()
    }

    /// Registers a DIRECTEUR account and returns its bearer token.
    pub(crate) fn bootstrap_director(&self) -> String {
        let (status, body) = self.post(
            "/api/auth/register",
            None,
            json!({
                "email": "direction@atelier.test",
                "password": "motdepasse",
                "firstName": "Paule",
                "lastName": "Essomba",
                "role": "DIRECTEUR",
            }),
        );
        assert_eq!(status, 201, "director registration must succeed: {body}");
        self.login("direction@atelier.test", "motdepasse")
    }

    /// Registers a consultant account and returns (token, user id,
    /// consultant id).
    pub(crate) fn bootstrap_consultant(&self, email: &str, tjm: f64) -> (String, String, String) {
        let (status, body) = self.post(
            "/api/auth/register",
            None,
            json!({
                "email": email,
                "password": "motdepasse",
                "firstName": "Brice",
                "lastName": "Moukoko",
                "tjm": tjm,
                "specialization": "Développeur Full-Stack",
                "skills": ["React", "Node.js"],
            }),
        );
        assert_eq!(status, 201, "consultant registration must succeed: {body}");
        let user_id = body["user"]["id"].as_str().expect("user id").to_string();
        let consultant_id = body["consultant"]["id"]
            .as_str()
            .expect("consultant id")
            .to_string();
        (self.login(email, "motdepasse"), user_id, consultant_id)
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.storage_dir);
    }
}

fn read_response(stream: TcpStream) -> (u16, Value) {
    let mut reader = BufReader::new(stream);
    let mut status_line = String::new();
    reader
        .read_line(&mut status_line)
        .expect("read status line");
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .unwrap_or_else(|| panic!("bad status line: {status_line:?}"));

    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).expect("read header");
        if read == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        if let Some((key, value)) = trimmed.split_once(':')
            && key.trim().eq_ignore_ascii_case("content-length")
        {
            content_length = value.trim().parse::<usize>().ok();
        }
    }

    let mut body = Vec::new();
    if let Some(len) = content_length {
        body.resize(len, 0);
        reader.read_exact(&mut body).expect("read body");
    } else {
        reader.read_to_end(&mut body).expect("read body");
    }
    if body.is_empty() {
        return (status, Value::Null);
    }
    (status, serde_json::from_slice(&body).expect("parse body json"))
}

pub(crate) fn pick_free_port() -> u16 {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

pub(crate) fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("om_api_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub(crate) fn error_code(body: &Value) -> String {
    body["error"]["code"].as_str().unwrap_or_default().to_string()
}

pub(crate) fn error_message(body: &Value) -> String {
    body["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn assert_api_error(status: u16, body: &Value, want_status: u16, want_message: &str) {
    assert_eq!(status, want_status, "unexpected status: {body}");
    assert_eq!(
        error_message(body),
        want_message,
        "unexpected error message: {body}"
    );
}
