mod as_value;
mod ast;
mod catalog;
mod connector;
mod driver;
mod error;
mod result_set;
mod schema;
mod statement;
mod storable;
mod transaction;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context as ErrorContext;
pub use as_value::*;
pub use ast::*;
pub use catalog::*;
pub use connector::*;
pub use driver::*;
pub use error::*;
pub use result_set::*;
pub use schema::*;
pub use statement::*;
pub use storable::*;
pub use transaction::*;
pub use util::*;
pub use value::*;
pub use writer::{CodeGenerator, Context, Dialect, Generated, SqlWriter};

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
