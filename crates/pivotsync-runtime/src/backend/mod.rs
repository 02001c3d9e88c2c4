mod api;
mod invoker;

pub use api::{Command, TableApi};
pub use invoker::Invoker;
