//! Domain layer: rooms, messages and client-side session state.

pub mod connection;
pub mod displayed_log;
pub mod events;
pub mod message;
pub mod message_input_state;
pub mod renderer;
pub mod room_store;
pub mod session;
pub mod shell_state;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
