//! Validation of an outgoing chat message before it reaches the server.

use thiserror::Error;

use crate::{domain::session::SessionConfig, usecases::contracts::PostMessage};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// Message text is empty after trimming whitespace.
    #[error("message is empty")]
    EmptyMessage,
    /// No username to post under.
    #[error("username is empty")]
    EmptyUsername,
}

/// Builds the post request for `text` in `room`.
///
/// Rejects empty text or username without touching the network.
pub fn prepare_post(
    room: &str,
    session: &SessionConfig,
    text: &str,
) -> Result<PostMessage, SendMessageError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SendMessageError::EmptyMessage);
    }

    let username = session.username().trim();
    if username.is_empty() {
        return Err(SendMessageError::EmptyUsername);
    }

    Ok(PostMessage {
        room: room.to_owned(),
        username: username.to_owned(),
        message: text.to_owned(),
        color: session.outgoing_color().to_wire().to_owned(),
    })
}
