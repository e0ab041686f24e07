mod as_value;
mod catalog;
mod compiler;
mod config;
mod description;
mod driver;
mod engine;
mod error;
mod expression;
mod mapper;
mod placeholder;
mod registry;
mod session;
mod table_ref;
mod util;
mod value;
mod writer;

pub use ::anyhow::Context as ErrorContext;
pub use as_value::*;
pub use catalog::*;
pub use compiler::*;
pub use config::*;
pub use description::*;
pub use driver::*;
pub use engine::*;
pub use error::*;
pub use expression::*;
pub use mapper::*;
pub use placeholder::*;
pub use registry::*;
pub use session::*;
pub use table_ref::*;
pub use util::*;
pub use value::*;
pub use writer::*;
pub use ::futures::{future, stream};

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
