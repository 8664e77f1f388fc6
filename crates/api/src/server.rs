#![forbid(unsafe_code)]

use crate::RequestLog;
use crate::handlers;
use om_storage::{SqliteStore, StoreError};
use serde_json::{Value, json};
use std::io::Read as _;
use std::io::Write as _;
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub(crate) const MAX_BODY_BYTES: usize = 64 * 1024;
const MAX_HEADER_BYTES: usize = 16 * 1024;
const IO_TIMEOUT: Duration = Duration::from_secs(2);
const IDLE_SLEEP: Duration = Duration::from_millis(25);

/// Ready-to-send outcome: HTTP status line tail plus the JSON body.
pub(crate) type ApiResponse = (&'static str, Value);

pub(crate) struct ServerConfig {
    pub(crate) storage_dir: PathBuf,
    pub(crate) port: u16,
    pub(crate) seed: bool,
}

pub(crate) struct HttpRequest {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) bearer: Option<String>,
    pub(crate) body: Vec<u8>,
    pub(crate) body_truncated: bool,
}

pub(crate) fn run(
    config: ServerConfig,
    shutdown: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = SqliteStore::open(&config.storage_dir)?;
    if config.seed && store.count_users()? == 0 {
        let summary = store.seed_demo(&crate::hash_password(crate::SEED_PASSWORD))?;
        println!(
            "seeded demo data: users={} consultants={} projects={} tasks={} transactions={}",
            summary.users, summary.consultants, summary.projects, summary.tasks,
            summary.transactions
        );
    }
    let mut request_log = RequestLog::new(&config.storage_dir);

    let listener = TcpListener::bind(("127.0.0.1", config.port))?;
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;
    println!("om_api listening on http://{addr}");

    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, _addr)) => {
                handle_connection(stream, &mut store, &mut request_log);
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(IDLE_SLEEP);
            }
            Err(_) => continue,
        }
    }
    Ok(())
}

fn handle_connection(mut stream: TcpStream, store: &mut SqliteStore, log: &mut RequestLog) {
    let _ = stream.set_read_timeout(Some(IO_TIMEOUT));
    let _ = stream.set_write_timeout(Some(IO_TIMEOUT));

    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let head_only = request.method == "HEAD";
    let started = Instant::now();
    let (status, body) = respond(store, &request);
    log.record(
        &request.method,
        &request.path,
        status,
        started.elapsed().as_millis(),
    );
    write_response(&mut stream, status, &body, head_only);
}

fn respond(store: &mut SqliteStore, request: &HttpRequest) -> ApiResponse {
    if request.body_truncated {
        return api_error(
            "413 Payload Too Large",
            "PAYLOAD_TOO_LARGE",
            "Corps de requête trop volumineux",
            Some("Limitez le corps de requête à 64 KiB."),
        );
    }
    if !matches!(
        request.method.as_str(),
        "GET" | "HEAD" | "POST" | "PUT" | "DELETE"
    ) {
        return api_error(
            "405 Method Not Allowed",
            "METHOD_NOT_ALLOWED",
            "Méthode non autorisée",
            None,
        );
    }
    route(store, request)
}

fn route(store: &mut SqliteStore, request: &HttpRequest) -> ApiResponse {
    let path = normalize_path(&request.path);
    let segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    // HEAD routes like GET; the body is withheld at write time.
    let method = if request.method == "HEAD" {
        "GET"
    } else {
        request.method.as_str()
    };

    match (method, segments.as_slice()) {
        ("GET", ["health"]) => {
            return (
                "200 OK",
                json!({ "status": "ok", "version": crate::SERVER_VERSION }),
            );
        }
        ("POST", ["api", "auth", "register"]) => return handlers::auth::register(store, request),
        ("POST", ["api", "auth", "login"]) => return handlers::auth::login(store, request),
        (_, ["health"] | ["api", "auth", "register" | "login"]) => return unmatched(&segments),
        _ => {}
    }

    let user = match crate::authenticate(store, request.bearer.as_deref()) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match (method, segments.as_slice()) {
        ("POST", ["api", "auth", "logout"]) => handlers::auth::logout(store, request),
        ("GET", ["api", "auth", "me"]) => handlers::auth::me(store, &user),

        ("GET", ["api", "projects"]) => handlers::projects::list(store, &user, request),
        ("POST", ["api", "projects"]) => handlers::projects::create(store, &user, request),
        ("GET", ["api", "projects", id]) => handlers::projects::detail(store, &user, id),
        ("PUT", ["api", "projects", id]) => handlers::projects::update(store, &user, id, request),
        ("DELETE", ["api", "projects", id]) => handlers::projects::delete(store, &user, id),
        ("PUT", ["api", "projects", id, "budget"]) => {
            handlers::projects::budget(store, &user, id, request)
        }
        ("GET", ["api", "projects", id, "tasks"]) => {
            handlers::projects::task_list(store, &user, id)
        }
        ("POST", ["api", "projects", id, "tasks"]) => {
            handlers::projects::task_create(store, &user, id, request)
        }

        ("GET", ["api", "tasks"]) => handlers::tasks::list(store, &user, request),
        ("POST", ["api", "tasks"]) => handlers::tasks::create(store, &user, request),
        ("GET", ["api", "tasks", id]) => handlers::tasks::detail(store, &user, id),
        ("POST", ["api", "tasks", id, "assign"]) => {
            handlers::tasks::assign(store, &user, id, request)
        }
        ("PUT", ["api", "tasks", id, "status"]) => {
            handlers::tasks::status(store, &user, id, request)
        }

        ("GET", ["api", "consultants"]) => handlers::consultants::list(store, request),
        ("POST", ["api", "consultants"]) => handlers::consultants::create(store, &user, request),
        ("GET", ["api", "consultants", "compare"]) => {
            handlers::consultants::compare(store, &user, request)
        }
        ("GET", ["api", "consultants", id]) => handlers::consultants::detail(store, &user, id),
        ("PUT", ["api", "consultants", id]) => {
            handlers::consultants::update(store, &user, id, request)
        }
        ("GET", ["api", "consultants", id, "stats"]) => {
            handlers::consultants::stats(store, &user, id)
        }

        ("GET", ["api", "transactions"]) => handlers::transactions::list(store, &user, request),
        ("POST", ["api", "transactions"]) => handlers::transactions::create(store, &user, request),
        ("GET", ["api", "transactions", "stats"]) => {
            handlers::transactions::stats(store, &user, request)
        }
        ("POST", ["api", "transactions", "consultant-payment"]) => {
            handlers::transactions::consultant_payment(store, &user, request)
        }
        ("PUT", ["api", "transactions", id, "pay"]) => {
            handlers::transactions::pay(store, &user, id)
        }

        ("GET", ["api", "notifications"]) => handlers::notifications::list(store, &user, request),
        ("PUT", ["api", "notifications", "mark-all-read"]) => {
            handlers::notifications::read_all(store, &user)
        }
        ("PUT", ["api", "notifications", id, "read"]) => {
            handlers::notifications::read(store, &user, id)
        }

        ("GET", ["api", "analytics"]) => handlers::analytics::overview(store, &user),
        ("GET", ["api", "analytics", "charts"]) => handlers::analytics::charts(store, &user),

        (_, segments) => unmatched(segments),
    }
}

fn unmatched(segments: &[&str]) -> ApiResponse {
    let known = matches!(
        segments,
        ["health"]
            | ["api", "auth", "register" | "login" | "logout" | "me"]
            | ["api", "projects"]
            | ["api", "projects", _]
            | ["api", "projects", _, "tasks" | "budget"]
            | ["api", "tasks"]
            | ["api", "tasks", _]
            | ["api", "tasks", _, "assign" | "status"]
            | ["api", "consultants"]
            | ["api", "consultants", _]
            | ["api", "consultants", _, "stats"]
            | ["api", "transactions"]
            | ["api", "transactions", "consultant-payment" | "stats"]
            | ["api", "transactions", _, "pay"]
            | ["api", "notifications"]
            | ["api", "notifications", "mark-all-read"]
            | ["api", "notifications", _, "read"]
            | ["api", "analytics"]
            | ["api", "analytics", "charts"]
    );
    if known {
        api_error(
            "405 Method Not Allowed",
            "METHOD_NOT_ALLOWED",
            "Méthode non autorisée",
            None,
        )
    } else {
        not_found("Ressource non trouvée")
    }
}

fn read_request(stream: &mut TcpStream) -> Option<HttpRequest> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 4096];
    let header_end;
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => return None,
            Ok(n) => {
                buffer.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find_header_end(&buffer) {
                    header_end = pos;
                    break;
                }
                if buffer.len() > MAX_HEADER_BYTES {
                    return None;
                }
            }
            Err(_) => return None,
        }
    }

    let header_text = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = header_text.split("\r\n");
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0usize;
    let mut bearer: Option<String> = None;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse().unwrap_or(0);
        } else if name.eq_ignore_ascii_case("authorization") {
            let mut words = value.splitn(2, ' ');
            let scheme = words.next().unwrap_or("");
            if scheme.eq_ignore_ascii_case("bearer") {
                bearer = words.next().map(|token| token.trim().to_string());
            }
        }
    }

    let body_truncated = content_length > MAX_BODY_BYTES;
    let body_start = (header_end + 4).min(buffer.len());
    let mut body = buffer[body_start..].to_vec();

    if body_truncated {
        // Drain the oversized remainder so the client can still read the 413.
        let mut remaining = content_length.saturating_sub(body.len());
        while remaining > 0 {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => remaining = remaining.saturating_sub(n),
                Err(_) => break,
            }
        }
        body.clear();
    } else {
        while body.len() < content_length {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => body.extend_from_slice(&chunk[..n]),
                Err(_) => break,
            }
        }
        body.truncate(content_length);
    }

    Some(HttpRequest {
        method,
        path,
        bearer,
        body,
        body_truncated,
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

/// Strips the query string and rejects oversized or escaped paths; bad
/// input routes as "/" which no handler claims.
pub(crate) fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_query = trimmed.split('?').next().unwrap_or("");
    if without_query.is_empty() {
        return "/".to_string();
    }
    if without_query.len() > 256 || without_query.contains("..") || without_query.contains('\\') {
        return "/".to_string();
    }
    without_query.to_string()
}

fn write_response(stream: &mut TcpStream, status: &str, body: &Value, head_only: bool) {
    use std::fmt::Write as _;
    let payload = body.to_string();
    let mut head = String::with_capacity(160);
    head.push_str("HTTP/1.1 ");
    head.push_str(status);
    head.push_str("\r\n");
    head.push_str("Content-Type: application/json; charset=utf-8\r\n");
    head.push_str("Cache-Control: no-store\r\n");
    head.push_str("X-Content-Type-Options: nosniff\r\n");
    let _ = write!(head, "Content-Length: {}\r\n", payload.len());
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    if !head_only {
        let _ = stream.write_all(payload.as_bytes());
    }
    let _ = stream.flush();
}

pub(crate) fn api_error(
    status: &'static str,
    code: &str,
    message: &str,
    recovery: Option<&str>,
) -> ApiResponse {
    let mut error = json!({ "code": code, "message": message });
    if let Some(recovery) = recovery
        && let Some(map) = error.as_object_mut()
    {
        map.insert("recovery".to_string(), Value::String(recovery.to_string()));
    }
    (status, json!({ "error": error }))
}

pub(crate) fn bad_request(message: &str) -> ApiResponse {
    api_error("400 Bad Request", "INVALID_INPUT", message, None)
}

pub(crate) fn forbidden(message: &str) -> ApiResponse {
    api_error("403 Forbidden", "FORBIDDEN", message, None)
}

pub(crate) fn not_found(message: &str) -> ApiResponse {
    api_error("404 Not Found", "NOT_FOUND", message, None)
}

pub(crate) fn conflict(message: &str) -> ApiResponse {
    api_error("409 Conflict", "CONFLICT", message, None)
}

pub(crate) fn internal_error(err: StoreError) -> ApiResponse {
    api_error(
        "500 Internal Server Error",
        "INTERNAL",
        "Erreur interne du serveur",
        Some(&err.to_string()),
    )
}
