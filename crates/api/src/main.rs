#![forbid(unsafe_code)]

mod handlers;
mod server;
mod support;

pub(crate) use support::*;

use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub(crate) const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const DEFAULT_PORT: u16 = 8750;
pub(crate) const SEED_PASSWORD: &str = "password123";

fn write_last_crash(storage_dir: &std::path::Path, kind: &str, detail: &str) {
    // Best-effort crash report; never contains request bodies.
    let _ = std::fs::create_dir_all(storage_dir);
    let path = storage_dir.join("last_crash.txt");

    let mut out = String::new();
    let ts_ms = crate::now_ms_i64();
    let _ = writeln!(out, "ts={}", crate::ts_ms_to_rfc3339(ts_ms));
    let _ = writeln!(out, "pid={}", std::process::id());
    let _ = writeln!(out, "kind={kind}");
    let _ = writeln!(out, "build={}", crate::build_fingerprint());
    let cwd = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    let _ = writeln!(out, "cwd={}", cwd.to_string_lossy());
    let _ = writeln!(out, "args={:?}", std::env::args().collect::<Vec<_>>());
    let _ = writeln!(out, "detail={detail}");

    let _ = std::fs::write(path, out);
}

fn install_crash_reporter(storage_dir: std::path::PathBuf) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut detail = info.to_string();
        let backtrace = std::backtrace::Backtrace::force_capture();
        let _ = write!(&mut detail, "\nbacktrace:\n{backtrace}");
        write_last_crash(&storage_dir, "panic", &detail);
        default_hook(info);
    }));
}

fn usage() -> &'static str {
    "om_api — Optimum Manage HTTP API server\n\n\
USAGE:\n\
  om_api [--storage-dir DIR] [--port PORT] [--seed]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version/build and exit\n\
\n\
NOTES:\n\
  - Store default: ./om-data (or OM_STORAGE_DIR)\n\
  - Port default: 8750 (or OM_PORT)\n\
  - --seed loads the demo dataset when the store is empty\n"
}

fn version_line() -> String {
    format!("om_api {SERVER_VERSION} build={}", crate::build_fingerprint())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().collect::<Vec<_>>();
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print!("{}", usage());
        return Ok(());
    }
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        println!("{}", version_line());
        return Ok(());
    }

    let storage_dir = parse_storage_dir();
    install_crash_reporter(storage_dir.clone());

    let config = server::ServerConfig {
        storage_dir: storage_dir.clone(),
        port: parse_port(),
        seed: parse_seed_flag(),
    };
    let shutdown = Arc::new(AtomicBool::new(false));
    let result = server::run(config, shutdown);
    if let Err(err) = &result {
        write_last_crash(&storage_dir, "error", &format!("{err:?}"));
    }
    result
}
