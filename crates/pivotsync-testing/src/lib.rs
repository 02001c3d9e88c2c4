//! Testing infrastructure for pivotsync integration tests.
//!
//! - `TestWorld`: an extension wired to scripted doubles
//! - `invoker`: `MockInvoker`, a scripted backend
//! - `hosts`: recording pane and drag hosts
//! - `fixtures`: backend payloads for a small sales table
//! - `assertions`: checks over recorded calls and pane activity

pub mod assertions;
pub mod fixtures;
pub mod hosts;
pub mod invoker;
pub mod world;

pub use hosts::{RecordingDragHost, RecordingPaneHost};
pub use invoker::MockInvoker;
pub use world::TestWorld;
