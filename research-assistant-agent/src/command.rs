//! Classification of interactive input lines

use std::fmt;

/// One parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `exit` or `quit`, any case
    Exit,
    /// `/summary`
    Summary,
    /// `/save`
    Save,
    /// Anything else, possibly empty
    Question(String),
}

impl Command {
    /// Parse one input line.
    ///
    /// `exit` and `quit` ignore case and surrounding whitespace. Slash
    /// commands must match exactly once the line ending is removed.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\n', '\r']);
        let text = line.trim();
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            return Command::Exit;
        }
        match line {
            "/summary" => Command::Summary,
            "/save" => Command::Save,
            _ => Command::Question(text.to_string()),
        }
    }

    /// Whether this is a question with no text
    pub fn is_empty_question(&self) -> bool {
        matches!(self, Command::Question(text) if text.is_empty())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Exit => f.write_str("exit"),
            Command::Summary => f.write_str("/summary"),
            Command::Save => f.write_str("/save"),
            Command::Question(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_is_case_insensitive() {
        for input in ["exit", "EXIT", "Quit", "quit\n", "  qUiT  "] {
            assert_eq!(Command::parse(input), Command::Exit, "input {:?}", input);
        }
    }

    #[test]
    fn test_slash_commands_are_case_sensitive() {
        assert_eq!(Command::parse("/summary"), Command::Summary);
        assert_eq!(Command::parse("/save\n"), Command::Save);
        assert_eq!(
            Command::parse("/SUMMARY"),
            Command::Question("/SUMMARY".to_string())
        );
        assert_eq!(Command::parse("/Save"), Command::Question("/Save".to_string()));
    }

    #[test]
    fn test_slash_commands_do_not_ignore_whitespace() {
        assert_eq!(Command::parse("/summary\r\n"), Command::Summary);
        assert_eq!(Command::parse(" /save "), Command::Question("/save".to_string()));
        assert_eq!(
            Command::parse("/summary  \n"),
            Command::Question("/summary".to_string())
        );
    }

    #[test]
    fn test_questions() {
        assert_eq!(
            Command::parse("What is an LSM tree?\n"),
            Command::Question("What is an LSM tree?".to_string())
        );
        assert_eq!(
            Command::parse("exit the vim editor?"),
            Command::Question("exit the vim editor?".to_string())
        );
        assert_eq!(
            Command::parse("/summary please"),
            Command::Question("/summary please".to_string())
        );
    }

    #[test]
    fn test_empty_input_is_an_empty_question() {
        assert!(Command::parse("").is_empty_question());
        assert!(Command::parse("   \n").is_empty_question());
        assert!(!Command::parse("hi").is_empty_question());
        assert!(!Command::parse("exit").is_empty_question());
    }

    #[test]
    fn test_display_round_trip() {
        for word in ["exit", "/summary", "/save"] {
            let command = Command::parse(word);
            assert!(!matches!(command, Command::Question(_)));
            assert_eq!(command.to_string(), word);
        }
    }
}
