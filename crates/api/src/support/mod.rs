#![forbid(unsafe_code)]

mod auth;
mod body;
mod build_info;
mod payload;
mod query;
mod request_log;
mod runtime;
mod time;

pub(crate) use auth::*;
pub(crate) use body::*;
pub(crate) use build_info::*;
pub(crate) use payload::*;
pub(crate) use query::*;
pub(crate) use request_log::*;
pub(crate) use runtime::*;
pub(crate) use time::*;
