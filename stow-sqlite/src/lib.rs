//! Sqlite backend, built on the bundled `libsqlite3-sys`.
mod backend;
mod bind;
mod cbox;
mod connection;
mod extract;

use std::{
    ffi::{CStr, c_char},
    ptr,
};

pub use backend::*;
pub(crate) use cbox::*;
pub use connection::*;

pub(crate) fn error_message_from_ptr(ptr: &'_ *const c_char) -> &'_ str {
    unsafe {
        if *ptr != ptr::null() {
            CStr::from_ptr(*ptr)
                .to_str()
                .unwrap_or("Unknown error (the message is not valid UTF-8)")
        } else {
            "Unknown error (sqlite returned no message)"
        }
    }
}
