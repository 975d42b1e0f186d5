//! Line-based terminal prompts.

use super::Prompter;
use crate::error::{IacGenError, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Asks questions on a writer and reads answers from a reader.
pub struct TerminalPrompter<R, W> {
    reader: R,
    writer: W,
    use_colors: bool,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr and read from stdin.
    #[must_use]
    pub fn stdio(use_colors: bool) -> Self {
        Self::new(io::stdin().lock(), io::stderr(), use_colors)
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    /// Read answers from `reader` and write questions to `writer`.
    #[must_use]
    pub fn new(reader: R, writer: W, use_colors: bool) -> Self {
        Self {
            reader,
            writer,
            use_colors,
        }
    }

    fn ask(&mut self, message: &str, hint: &str) -> Result<String> {
        let icon = if self.use_colors {
            "?".green().bold().to_string()
        } else {
            "?".to_string()
        };
        let hint = if hint.is_empty() {
            String::new()
        } else if self.use_colors {
            format!(" {}", hint.dimmed())
        } else {
            format!(" {hint}")
        };

        write!(self.writer, "{icon} {message}{hint} ")
            .and_then(|()| self.writer.flush())
            .map_err(|e| prompt_error(message, &e.to_string()))?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| prompt_error(message, &e.to_string()))?;
        if read == 0 {
            return Err(prompt_error(message, "input stream closed"));
        }
        Ok(line.trim().to_string())
    }

    fn warn(&mut self, text: &str) -> Result<()> {
        let text = if self.use_colors {
            text.red().to_string()
        } else {
            text.to_string()
        };
        writeln!(self.writer, "{text}").map_err(|e| prompt_error("", &e.to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        let answer = self.ask(message, hint)?;
        match answer.to_lowercase().as_str() {
            "" => Ok(default),
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            other => Err(prompt_error(
                message,
                &format!("'{other}' is not a valid answer, expected yes or no"),
            )),
        }
    }

    fn input(&mut self, message: &str, default: &str, required: bool) -> Result<String> {
        let hint = if default.is_empty() {
            String::new()
        } else {
            format!("({default})")
        };
        loop {
            let answer = self.ask(message, &hint)?;
            let value = if answer.is_empty() {
                default.to_string()
            } else {
                answer
            };
            if !required || !value.is_empty() {
                return Ok(value);
            }
            self.warn("Value is required")?;
        }
    }
}

fn prompt_error(question: &str, message: &str) -> IacGenError {
    crate::err!(Prompt {
        question: question.to_string(),
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), false)
    }

    #[test]
    fn test_confirm_answers() {
        let mut p = prompter("y\nNO\n\n");
        assert!(p.confirm("Enable?", false).unwrap());
        assert!(!p.confirm("Enable?", true).unwrap());
        assert!(p.confirm("Enable?", true).unwrap());

        let written = String::from_utf8(p.writer.clone()).unwrap();
        assert!(written.contains("? Enable? (y/N) "));
        assert!(written.contains("? Enable? (Y/n) "));
    }

    #[test]
    fn test_confirm_malformed_answer_fails() {
        let mut p = prompter("maybe\n");
        let err = p.confirm("Enable?", false).unwrap_err();
        assert!(matches!(err, IacGenError::Prompt { .. }));
    }

    #[test]
    fn test_input_default_and_trim() {
        let mut p = prompter("\n  us-east-2  \n");
        assert_eq!(p.input("Region?", "us-west-1", false).unwrap(), "us-west-1");
        assert_eq!(p.input("Region?", "", false).unwrap(), "us-east-2");
    }

    #[test]
    fn test_required_input_asks_again() {
        let mut p = prompter("\n\nmain\n");
        assert_eq!(p.input("Profile?", "", true).unwrap(), "main");

        let written = String::from_utf8(p.writer.clone()).unwrap();
        assert_eq!(written.matches("Value is required").count(), 2);
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut p = prompter("");
        let err = p.input("Profile?", "", true).unwrap_err();
        assert!(err.to_string().contains("input stream closed"));
    }
}
