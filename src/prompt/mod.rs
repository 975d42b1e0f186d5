//! Operator prompts.
//!
//! The collection engine only talks to the [`Prompter`] trait, so it can be
//! driven by a terminal, a scripted answer list, or a mock.

mod scripted;
mod terminal;

pub use scripted::{Answer, ScriptedPrompter};
pub use terminal::TerminalPrompter;

use crate::error::Result;

/// A source of answers to yes/no and free-text questions.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns a `Prompt` error if the answer cannot be read.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Ask for a line of text. An empty reply takes `default`; a `required`
    /// question keeps asking until the result is non-empty.
    ///
    /// # Errors
    ///
    /// Returns a `Prompt` error if the answer cannot be read.
    fn input(&mut self, message: &str, default: &str, required: bool) -> Result<String>;
}
