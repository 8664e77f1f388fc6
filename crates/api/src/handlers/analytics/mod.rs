#![forbid(unsafe_code)]

mod charts;
mod overview;

pub(crate) use charts::*;
pub(crate) use overview::*;
