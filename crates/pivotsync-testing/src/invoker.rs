//! Scripted backend.
//!
//! Replies are set per command name. One-shot replies are consumed first,
//! in order; the sticky reply answers everything after. Calls are recorded
//! when they are issued, before any scripted delay.

use futures::future::BoxFuture;
use pivotsync_runtime::Invoker;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Ok(Value),
    Err(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub command: String,
    pub args: Value,
}

#[derive(Debug, Default)]
struct Script {
    sticky: HashMap<String, Reply>,
    once: HashMap<String, VecDeque<(Reply, Option<Duration>)>>,
    delays: HashMap<String, Duration>,
}

#[derive(Debug, Default)]
pub struct MockInvoker {
    script: Mutex<Script>,
    calls: Mutex<Vec<Call>>,
}

impl MockInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call to `command` with `value`.
    pub fn respond(&self, command: &str, value: Value) -> &Self {
        self.script
            .lock()
            .unwrap()
            .sticky
            .insert(command.to_string(), Reply::Ok(value));
        self
    }

    /// Answer the next call to `command` with `value`.
    pub fn respond_once(&self, command: &str, value: Value) -> &Self {
        self.push_once(command, Reply::Ok(value), None)
    }

    /// Answer the next call to `command` with `value` after `delay`.
    pub fn respond_once_after(&self, command: &str, value: Value, delay: Duration) -> &Self {
        self.push_once(command, Reply::Ok(value), Some(delay))
    }

    /// Fail every call to `command`.
    pub fn fail(&self, command: &str, message: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .sticky
            .insert(command.to_string(), Reply::Err(message.to_string()));
        self
    }

    /// Fail the next call to `command`.
    pub fn fail_once(&self, command: &str, message: &str) -> &Self {
        self.push_once(command, Reply::Err(message.to_string()), None)
    }

    /// Delay every reply to `command`.
    pub fn delay(&self, command: &str, delay: Duration) -> &Self {
        self.script
            .lock()
            .unwrap()
            .delays
            .insert(command.to_string(), delay);
        self
    }

    fn push_once(&self, command: &str, reply: Reply, delay: Option<Duration>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .once
            .entry(command.to_string())
            .or_default()
            .push_back((reply, delay));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Arguments of every call to `command`, oldest first.
    pub fn calls_to(&self, command: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.command == command)
            .map(|c| c.args.clone())
            .collect()
    }

    pub fn call_count(&self, command: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.command == command)
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn next_reply(&self, command: &str) -> (Option<Reply>, Option<Duration>) {
        let mut script = self.script.lock().unwrap();
        let default_delay = script.delays.get(command).copied();
        if let Some((reply, delay)) = script.once.get_mut(command).and_then(VecDeque::pop_front) {
            return (Some(reply), delay.or(default_delay));
        }
        (script.sticky.get(command).cloned(), default_delay)
    }
}

impl Invoker for MockInvoker {
    fn invoke<'a>(&'a self, command: &'a str, args: Value) -> BoxFuture<'a, anyhow::Result<Value>> {
        self.calls.lock().unwrap().push(Call {
            command: command.to_string(),
            args,
        });
        let (reply, delay) = self.next_reply(command);

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match reply {
                Some(Reply::Ok(value)) => Ok(value),
                Some(Reply::Err(message)) => Err(anyhow::anyhow!(message)),
                None => Err(anyhow::anyhow!("no scripted reply for '{}'", command)),
            }
        })
    }
}
