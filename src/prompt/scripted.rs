//! Prompter that replays a fixed list of answers.

use super::Prompter;
use crate::error::{IacGenError, Result};
use std::collections::VecDeque;

/// A prepared answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Reply to a yes/no question
    Confirm(bool),
    /// Reply to a text question; empty takes the default
    Input(String),
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Self::Confirm(value)
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Self::Input(value.to_string())
    }
}

/// Answers questions from a queue and records what was asked.
///
/// Running out of answers, or an answer of the wrong kind, is a prompt error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    /// Create a prompter that replays `answers` in order.
    pub fn new<I, A>(answers: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Answer>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far, in order.
    #[must_use]
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Result<Answer> {
        self.asked.push(message.to_string());
        self.answers.pop_front().ok_or_else(|| mismatch(message, "no answer left"))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool> {
        match self.next(message)? {
            Answer::Confirm(value) => Ok(value),
            Answer::Input(text) => Err(mismatch(message, &format!("expected yes/no, got '{text}'"))),
        }
    }

    fn input(&mut self, message: &str, default: &str, required: bool) -> Result<String> {
        match self.next(message)? {
            Answer::Input(text) => {
                let value = if text.is_empty() { default.to_string() } else { text };
                if required && value.is_empty() {
                    return Err(mismatch(message, "value is required"));
                }
                Ok(value)
            }
            Answer::Confirm(value) => Err(mismatch(message, &format!("expected text, got {value}"))),
        }
    }
}

fn mismatch(question: &str, message: &str) -> IacGenError {
    crate::err!(Prompt {
        question: question.to_string(),
        message: message.to_string(),
    })
}
