mod as_value;
mod batch;
mod condition;
mod config;
mod cursor;
mod data;
mod db;
mod diagnostics;
mod error;
mod executor;
mod format;
mod materialize;
mod quote;
mod record;
mod router;
mod sql_writer;
mod statement;
mod transaction;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use batch::*;
pub use condition::*;
pub use config::*;
pub use cursor::*;
pub use data::*;
pub use db::*;
pub use diagnostics::*;
pub use error::*;
pub use executor::*;
pub use format::*;
pub use materialize::*;
pub use quote::*;
pub use record::*;
pub use router::*;
pub use sql_writer::*;
pub use statement::*;
pub use transaction::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
