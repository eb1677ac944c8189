use super::message::MessageColor;

pub const DEFAULT_USERNAME: &str = "guest";

/// Client-only settings for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    debug: bool,
    color_override: Option<String>,
    username: String,
    registered_username: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME)
    }
}

impl SessionConfig {
    pub fn new(username: &str) -> Self {
        let username = username.trim();
        Self {
            debug: false,
            color_override: None,
            username: if username.is_empty() {
                DEFAULT_USERNAME.to_owned()
            } else {
                username.to_owned()
            },
            registered_username: None,
        }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Flips debug mode and returns the new value.
    pub fn toggle_debug(&mut self) -> bool {
        self.debug = !self.debug;
        self.debug
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, username: &str) {
        self.username = username.to_owned();
    }

    /// Name the server currently knows us by; empty before first registration.
    pub fn registered_username(&self) -> &str {
        self.registered_username.as_deref().unwrap_or_default()
    }

    pub fn needs_registration(&self) -> bool {
        self.registered_username.as_deref() != Some(self.username.as_str())
    }

    pub fn mark_registered(&mut self, username: &str) {
        self.registered_username = Some(username.to_owned());
    }

    pub fn set_color_override(&mut self, color: Option<String>) {
        self.color_override = color;
    }

    /// Color attached to outgoing messages.
    pub fn outgoing_color(&self) -> MessageColor {
        MessageColor::from_wire(self.color_override.as_deref())
    }
}
