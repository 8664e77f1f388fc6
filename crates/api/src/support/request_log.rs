#![forbid(unsafe_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const MAX_LINES: usize = 200;
const MAX_PATH_CHARS: usize = 160;

/// Bounded request log rewritten to `api_log.txt` in the storage dir.
/// Best-effort only: a failed write never fails the request.
#[derive(Debug)]
pub(crate) struct RequestLog {
    path: PathBuf,
    header: String,
    lines: VecDeque<String>,
}

impl RequestLog {
    pub(crate) fn new(storage_dir: &Path) -> Self {
        let mut header = String::new();
        push_kv(&mut header, "ts_start", &crate::ts_ms_to_rfc3339(crate::now_ms_i64()));
        push_kv(&mut header, "pid", &std::process::id().to_string());
        push_kv(&mut header, "build", &crate::build_fingerprint());
        push_kv(
            &mut header,
            "args",
            &format!("{:?}", std::env::args().collect::<Vec<_>>()),
        );
        let this = Self {
            path: storage_dir.join("api_log.txt"),
            header,
            lines: VecDeque::new(),
        };
        this.flush();
        this
    }

    pub(crate) fn record(&mut self, method: &str, path: &str, status: &str, elapsed_ms: u128) {
        use std::fmt::Write as _;
        let status_code = status.split_whitespace().next().unwrap_or("0");
        let mut line = String::new();
        let _ = write!(
            line,
            "ts={} method={} path={} status={} ms={}",
            crate::ts_ms_to_rfc3339(crate::now_ms_i64()),
            method,
            truncate(path, MAX_PATH_CHARS),
            status_code,
            elapsed_ms,
        );
        if self.lines.len() >= MAX_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        self.flush();
    }

    fn flush(&self) {
        let Some(dir) = self.path.parent() else {
            return;
        };
        let _ = std::fs::create_dir_all(dir);
        let mut out = self.header.clone();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        let _ = std::fs::write(&self.path, out);
    }
}

fn push_kv(out: &mut String, key: &str, value: &str) {
    use std::fmt::Write as _;
    let _ = writeln!(out, "{key}={value}");
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for (idx, ch) in value.chars().enumerate() {
        if idx >= max_chars {
            break;
        }
        out.push(ch);
    }
    out
}
