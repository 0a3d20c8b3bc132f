use std::fmt;

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A free action such as `inspect`, `report` or `click`. Unknown words land
    /// here too and score nothing.
    Action(String),
    /// Pick an option of the current question, 0-based.
    Answer(i64),
    Move(i64),
    /// Jump to a question, 0-based.
    Jump(i64),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    MissingArgument { command: &'static str },
    InvalidNumber { command: &'static str, raw: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::MissingArgument { command } => {
                write!(f, "{command} needs a number, e.g. `{command} 2`")
            }
            CommandError::InvalidNumber { command, raw } => {
                write!(f, "{command}: `{raw}` is not a number")
            }
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    /// Parse a line. Blank input yields `Ok(None)`.
    ///
    /// Players count options and questions from 1, so `answer 1` picks the
    /// first option.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if a numeric argument is missing or malformed.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let head = head.to_ascii_lowercase();

        let command = match head.as_str() {
            "answer" | "a" => Self::Answer(one_based(words.next(), "answer")?),
            "jump" | "j" => Self::Jump(one_based(words.next(), "jump")?),
            "next" | "n" => Self::Move(1),
            "prev" | "p" => Self::Move(-1),
            "status" | "s" => Self::Status,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => Self::Action(head),
        };
        Ok(Some(command))
    }
}

/// Read a 1-based number and turn it into an index.
fn one_based(raw: Option<&str>, command: &'static str) -> Result<i64, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument { command })?;
    raw.parse::<i64>()
        .map_err(|_| CommandError::InvalidNumber {
            command,
            raw: raw.to_string(),
        })
        .map(|value| value.saturating_sub(1))
}

pub fn help_text() -> &'static str {
    "Commands:\n\
     \x20 inspect | report | click   react to the suspicious email\n\
     \x20 answer <n>                 pick option n for the current question\n\
     \x20 next | prev                move between questions\n\
     \x20 jump <n>                   go to question n\n\
     \x20 status                     show score and progress\n\
     \x20 quit                       save and leave"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn answers_and_jumps_are_one_based() {
        assert_eq!(
            Command::parse("answer 1").unwrap(),
            Some(Command::Answer(0))
        );
        assert_eq!(Command::parse("a 4").unwrap(), Some(Command::Answer(3)));
        assert_eq!(Command::parse("jump 2").unwrap(), Some(Command::Jump(1)));
        assert_eq!(Command::parse("answer 0").unwrap(), Some(Command::Answer(-1)));
    }

    #[test]
    fn free_actions_are_lowercased() {
        assert_eq!(
            Command::parse("REPORT").unwrap(),
            Some(Command::Action("report".into()))
        );
        assert_eq!(
            Command::parse("wave hello").unwrap(),
            Some(Command::Action("wave".into()))
        );
    }

    #[test]
    fn navigation_words() {
        assert_eq!(Command::parse("next").unwrap(), Some(Command::Move(1)));
        assert_eq!(Command::parse("p").unwrap(), Some(Command::Move(-1)));
        assert_eq!(Command::parse("q").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn bad_numbers_are_reported() {
        assert_eq!(
            Command::parse("answer").unwrap_err(),
            CommandError::MissingArgument { command: "answer" }
        );
        assert!(matches!(
            Command::parse("jump two").unwrap_err(),
            CommandError::InvalidNumber { command: "jump", .. }
        ));
    }
}
