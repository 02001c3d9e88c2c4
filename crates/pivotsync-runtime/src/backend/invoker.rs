use futures::future::BoxFuture;
use serde_json::Value;

/// Generic backend RPC boundary.
///
/// Every command is fallible and asynchronous. Arguments and responses are
/// JSON objects keyed the way the backend names them (camelCase).
pub trait Invoker: Send + Sync {
    fn invoke<'a>(&'a self, command: &'a str, args: Value) -> BoxFuture<'a, anyhow::Result<Value>>;
}
