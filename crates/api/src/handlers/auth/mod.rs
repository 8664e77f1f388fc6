#![forbid(unsafe_code)]

mod login;
mod logout;
mod me;
mod register;

pub(crate) use login::*;
pub(crate) use logout::*;
pub(crate) use me::*;
pub(crate) use register::*;
