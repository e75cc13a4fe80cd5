//! Postgres backend, built on the synchronous `postgres` client.
mod backend;
mod connection;
mod util;
mod value_holder;

pub use backend::*;
pub use connection::*;
pub(crate) use value_holder::*;
