//! Use case layer: chat workflows and orchestration.

pub mod bootstrap;
pub mod commands;
pub mod context;
pub mod contracts;
pub mod event_channel;
pub mod interpreter;
pub mod send_message;
pub mod shell;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
