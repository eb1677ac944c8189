//! UI layer: terminal rendering and input.

mod event_source;
mod message_input;
pub mod shell;
mod styles;
mod terminal;
mod view;

pub(crate) use event_source::TerminalEventSource;

/// Returns the UI module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
