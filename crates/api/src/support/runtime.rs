#![forbid(unsafe_code)]

use std::path::PathBuf;

pub(crate) fn parse_storage_dir() -> PathBuf {
    let mut args = std::env::args().skip(1);
    let mut storage_dir: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        if arg.as_str() == "--storage-dir"
            && let Some(value) = args.next()
        {
            storage_dir = Some(PathBuf::from(value));
        }
    }
    if let Some(dir) = storage_dir {
        return dir;
    }
    if let Some(dir) = std::env::var_os("OM_STORAGE_DIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from("./om-data")
}

pub(crate) fn parse_port() -> u16 {
    let mut args = std::env::args().skip(1);
    let mut cli: Option<String> = None;
    while let Some(arg) = args.next() {
        if arg.as_str() == "--port"
            && let Some(value) = args.next()
        {
            cli = Some(value);
        }
    }
    let value = cli.or_else(|| std::env::var("OM_PORT").ok());
    value
        .and_then(|v| v.trim().parse::<u16>().ok())
        .unwrap_or(crate::DEFAULT_PORT)
}

pub(crate) fn parse_seed_flag() -> bool {
    std::env::args().skip(1).any(|arg| arg.as_str() == "--seed")
}
