//! Classification of one input line into a directive or a chat message.
//!
//! Directives start with `/`. The first whitespace-separated token is compared
//! exactly against the directive table, so `/remove_range` can never be
//! mistaken for `/remove`.

use thiserror::Error;

use crate::domain::message::MessageId;

const REMOVE_USAGE: &str = "/remove <id>";
const REMOVE_RANGE_USAGE: &str = "/remove_range <lower> <upper>";
const MUTE_USAGE: &str = "/mute <user>";
const UNMUTE_USAGE: &str = "/unmute <user>";
const COLOR_USAGE: &str = "/color <value|reset>";
const JOIN_USAGE: &str = "/join <room>";
const NICK_USAGE: &str = "/nick <name>";

/// Usage lines printed by `/help`.
pub const HELP_LINES: [&str; 12] = [
    "/remove <id>                   delete one message from this room",
    "/remove_range <lower> <upper>  delete ids lower..upper (upper excluded)",
    "/mute <user>                   hide messages from user",
    "/unmute <user>                 show messages from user again",
    "/color <value|reset>           color for your messages",
    "/debug                         toggle debug notices",
    "/clear                         clear the screen",
    "/online                        list online users",
    "/join <room>                   switch to room, creating it",
    "/rooms                         fetch the server's room list",
    "/nick <name>                   change your username",
    "/help                          show this help",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Remove { id: MessageId },
    /// Removes ids in `[lower, upper)`.
    RemoveRange { lower: MessageId, upper: MessageId },
    Mute { username: String },
    Unmute { username: String },
    /// `None` restores the username-derived color.
    Color { color: Option<String> },
    Debug,
    Clear,
    Help,
    Online,
    Join { room: String },
    Rooms,
    Nick { username: String },
    Chat { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("message is empty")]
    Empty,
    #[error("unknown directive '/{0}', try /help")]
    UnknownDirective(String),
    #[error("usage: {usage}")]
    MissingArgument { usage: &'static str },
    #[error("unexpected argument '{value}', usage: {usage}")]
    UnexpectedArgument { value: String, usage: &'static str },
    #[error("invalid id '{value}', usage: {usage}")]
    InvalidId { value: String, usage: &'static str },
    #[error("lower bound {lower} is above upper bound {upper}")]
    InvertedRange { lower: MessageId, upper: MessageId },
}

pub fn parse(input: &str) -> Result<Command, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }

    let Some(directive) = input.strip_prefix('/') else {
        return Ok(Command::Chat {
            text: input.to_owned(),
        });
    };

    let mut parts = directive.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match name {
        "remove" => {
            let [id] = exact_args(&args, REMOVE_USAGE)?;
            Ok(Command::Remove {
                id: parse_id(id, REMOVE_USAGE)?,
            })
        }
        "remove_range" => {
            let [lower, upper] = exact_args(&args, REMOVE_RANGE_USAGE)?;
            let lower = parse_id(lower, REMOVE_RANGE_USAGE)?;
            let upper = parse_id(upper, REMOVE_RANGE_USAGE)?;
            if lower > upper {
                return Err(ParseError::InvertedRange { lower, upper });
            }
            Ok(Command::RemoveRange { lower, upper })
        }
        "mute" => {
            let [username] = exact_args(&args, MUTE_USAGE)?;
            Ok(Command::Mute {
                username: username.to_owned(),
            })
        }
        "unmute" => {
            let [username] = exact_args(&args, UNMUTE_USAGE)?;
            Ok(Command::Unmute {
                username: username.to_owned(),
            })
        }
        "color" => {
            if args.is_empty() {
                return Err(ParseError::MissingArgument { usage: COLOR_USAGE });
            }
            // CSS values such as `rgb(1, 2, 3)` contain spaces.
            let value = args.join(" ");
            let color = match value.as_str() {
                "reset" | "hash" => None,
                _ => Some(value),
            };
            Ok(Command::Color { color })
        }
        "debug" => no_args(&args, "/debug").map(|()| Command::Debug),
        "clear" => no_args(&args, "/clear").map(|()| Command::Clear),
        "help" => no_args(&args, "/help").map(|()| Command::Help),
        "online" => no_args(&args, "/online").map(|()| Command::Online),
        "rooms" => no_args(&args, "/rooms").map(|()| Command::Rooms),
        "join" => {
            let [room] = exact_args(&args, JOIN_USAGE)?;
            Ok(Command::Join {
                room: room.to_owned(),
            })
        }
        "nick" => {
            let [username] = exact_args(&args, NICK_USAGE)?;
            Ok(Command::Nick {
                username: username.to_owned(),
            })
        }
        other => Err(ParseError::UnknownDirective(other.to_owned())),
    }
}

fn exact_args<'a, const N: usize>(
    args: &[&'a str],
    usage: &'static str,
) -> Result<[&'a str; N], ParseError> {
    if args.len() > N {
        return Err(ParseError::UnexpectedArgument {
            value: args[N].to_owned(),
            usage,
        });
    }

    <[&str; N]>::try_from(args).map_err(|_| ParseError::MissingArgument { usage })
}

fn no_args(args: &[&str], usage: &'static str) -> Result<(), ParseError> {
    exact_args::<0>(args, usage).map(|_| ())
}

fn parse_id(value: &str, usage: &'static str) -> Result<MessageId, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidId {
        value: value.to_owned(),
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_chat() {
        assert_eq!(
            parse("  hello there "),
            Ok(Command::Chat {
                text: "hello there".to_owned()
            })
        );
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn remove_range_is_not_misrouted_as_remove() {
        assert_eq!(
            parse("/remove_range 3 7"),
            Ok(Command::RemoveRange { lower: 3, upper: 7 })
        );
        assert_eq!(parse("/remove 3"), Ok(Command::Remove { id: 3 }));
    }

    #[test]
    fn directive_prefixes_are_not_matched() {
        assert_eq!(
            parse("/removeall"),
            Err(ParseError::UnknownDirective("removeall".to_owned()))
        );
        assert_eq!(
            parse("/mu bob"),
            Err(ParseError::UnknownDirective("mu".to_owned()))
        );
    }

    #[test]
    fn remove_requires_numeric_id() {
        assert_eq!(
            parse("/remove"),
            Err(ParseError::MissingArgument {
                usage: REMOVE_USAGE
            })
        );
        assert_eq!(
            parse("/remove x"),
            Err(ParseError::InvalidId {
                value: "x".to_owned(),
                usage: REMOVE_USAGE
            })
        );
        assert_eq!(
            parse("/remove -1"),
            Err(ParseError::InvalidId {
                value: "-1".to_owned(),
                usage: REMOVE_USAGE
            })
        );
    }

    #[test]
    fn remove_range_rejects_missing_and_inverted_bounds() {
        assert_eq!(
            parse("/remove_range 3"),
            Err(ParseError::MissingArgument {
                usage: REMOVE_RANGE_USAGE
            })
        );
        assert_eq!(
            parse("/remove_range 7 3"),
            Err(ParseError::InvertedRange { lower: 7, upper: 3 })
        );
        assert_eq!(
            parse("/remove_range 4 4"),
            Ok(Command::RemoveRange { lower: 4, upper: 4 })
        );
    }

    #[test]
    fn mute_without_user_reports_usage() {
        let error = parse("/mute").expect_err("must fail");

        assert_eq!(error.to_string(), "usage: /mute <user>");
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert_eq!(
            parse("/mute alice bob"),
            Err(ParseError::UnexpectedArgument {
                value: "bob".to_owned(),
                usage: MUTE_USAGE
            })
        );
        assert_eq!(
            parse("/debug now"),
            Err(ParseError::UnexpectedArgument {
                value: "now".to_owned(),
                usage: "/debug"
            })
        );
    }

    #[test]
    fn color_keeps_spaces_and_supports_reset() {
        assert_eq!(
            parse("/color rgb(1, 2, 3)"),
            Ok(Command::Color {
                color: Some("rgb(1, 2, 3)".to_owned())
            })
        );
        assert_eq!(parse("/color reset"), Ok(Command::Color { color: None }));
        assert_eq!(parse("/color hash"), Ok(Command::Color { color: None }));
    }

    #[test]
    fn bare_directives_parse() {
        assert_eq!(parse("/debug"), Ok(Command::Debug));
        assert_eq!(parse("/clear"), Ok(Command::Clear));
        assert_eq!(parse("/help"), Ok(Command::Help));
        assert_eq!(parse("/online"), Ok(Command::Online));
        assert_eq!(parse("/rooms"), Ok(Command::Rooms));
    }

    #[test]
    fn lone_slash_is_unknown_directive() {
        assert_eq!(
            parse("/"),
            Err(ParseError::UnknownDirective(String::new()))
        );
    }
}
