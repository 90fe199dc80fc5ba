//! ui::prompts
//!
//! Line-oriented prompts over any reader and writer.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message. End of input is reported as
//! [`PromptError::Cancelled`].

use std::io::{BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err.to_string())
    }
}

/// Reads answers from `input`, writing prompt text to `output`.
#[derive(Debug)]
pub struct Prompter<R, W> {
    input: R,
    output: W,
    interactive: bool,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// `interactive` controls whether prompt text is written at all.
    pub fn new(input: R, output: W, interactive: bool) -> Self {
        Self {
            input,
            output,
            interactive,
        }
    }

    /// Read one line with the trailing newline removed.
    ///
    /// # Errors
    ///
    /// `Cancelled` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        if self.interactive && !prompt.is_empty() {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
        }
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Prompt for text input, falling back to `default` on a blank answer.
    pub fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, PromptError> {
        if !self.interactive {
            return default
                .map(str::to_string)
                .ok_or(PromptError::NotInteractive);
        }
        let prompt = match default {
            Some(d) => format!("{} [{}]: ", message, d),
            None => format!("{}: ", message),
        };
        let answer = self.read_line(&prompt)?;
        let answer = answer.trim();
        if answer.is_empty() {
            Ok(default.unwrap_or_default().to_string())
        } else {
            Ok(answer.to_string())
        }
    }

    /// Prompt for confirmation (yes/no).
    ///
    /// Returns `default` on a blank answer; re-asks on anything else that
    /// is not yes or no.
    pub fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError> {
        if !self.interactive {
            return Err(PromptError::NotInteractive);
        }
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.read_line(&format!("{} [{}] ", message, hint))?;
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer y or n.")?,
            }
        }
    }

    /// Writer used for prompt text.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }
}
