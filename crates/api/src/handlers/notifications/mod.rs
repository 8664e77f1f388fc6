#![forbid(unsafe_code)]

mod list;
mod read;
mod read_all;

pub(crate) use list::*;
pub(crate) use read::*;
pub(crate) use read_all::*;
