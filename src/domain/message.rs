use chrono::{DateTime, Local};

/// Globally unique, strictly increasing message identifier.
pub type MessageId = u64;

/// Wire value meaning "derive the color from the username".
pub const DERIVED_COLOR_SENTINEL: &str = "hash";

/// Display color attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MessageColor {
    /// Computed deterministically from the author's username.
    #[default]
    Derived,
    /// Explicit CSS color string as supplied by the author.
    Explicit(String),
}

impl MessageColor {
    /// Interprets an optional wire value. Absent, empty and sentinel values
    /// all mean [`MessageColor::Derived`].
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Derived,
            Some(value) if value.eq_ignore_ascii_case(DERIVED_COLOR_SENTINEL) => Self::Derived,
            Some(value) => Self::Explicit(value.to_owned()),
        }
    }

    pub fn to_wire(&self) -> &str {
        match self {
            Self::Derived => DERIVED_COLOR_SENTINEL,
            Self::Explicit(value) => value,
        }
    }

    /// Returns the CSS color to display for a message written by `username`.
    pub fn resolve(&self, username: &str) -> String {
        match self {
            Self::Derived => derive_color(username),
            Self::Explicit(value) => value.clone(),
        }
    }
}

/// Derives a stable `#rrggbb` color from a username.
///
/// Uses the classic `hash * 31 + unit` string hash over UTF-16 code units in
/// wrapping 32-bit arithmetic, then emits the low three bytes, lowest first.
pub fn derive_color(username: &str) -> String {
    let hash = username.encode_utf16().fold(0_i32, |hash, unit| {
        i32::from(unit).wrapping_add((hash << 5).wrapping_sub(hash))
    });

    let mut color = String::from("#");
    for shift in [0, 8, 16] {
        let byte = (hash >> shift) & 0xff;
        color.push_str(&format!("{byte:02x}"));
    }
    color
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub room: String,
    pub username: String,
    pub text: String,
    pub color: MessageColor,
    /// Local receive time, display only.
    pub received_at: DateTime<Local>,
}

impl Message {
    pub fn display_color(&self) -> String {
        self.color.resolve(&self.username)
    }
}
