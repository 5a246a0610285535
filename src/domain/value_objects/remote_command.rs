//! Remote Command Value Object
//!
//! A typed builder for remote shell command lines. Separates the command
//! verb from interpolated arguments so components never concatenate raw
//! strings, then renders to one opaque line for the remote channel.
//!
//! Arguments added with `arg` are fixed tokens trusted as written (flags,
//! subcommand names). Interpolated values go through `value`, `option`, or
//! `secret_option` and are always single-quoted for a POSIX shell.

use std::fmt;

use crate::domain::value_objects::SecretString;
use crate::domain::value_objects::secret::REDACTED;

/// Quote a value for a POSIX shell
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Fixed token, rendered as written
    Fixed(String),
    /// Interpolated value, always quoted
    Value(String),
    /// Interpolated secret, quoted when rendered and hidden when redacted
    Secret(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Redirect {
    Write(String),
    Append(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Segment {
    tokens: Vec<Token>,
    redirect: Option<Redirect>,
}

impl Segment {
    fn render(&self, redact: bool) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.tokens.len() + 1);
        for token in &self.tokens {
            parts.push(match token {
                Token::Fixed(t) => t.clone(),
                Token::Value(v) => shell_quote(v),
                Token::Secret(v) => {
                    if redact {
                        REDACTED.to_string()
                    } else {
                        shell_quote(v)
                    }
                }
            });
        }
        match &self.redirect {
            Some(Redirect::Write(path)) => parts.push(format!("> {}", shell_quote(path))),
            Some(Redirect::Append(path)) => parts.push(format!(">> {}", shell_quote(path))),
            None => {}
        }
        parts.join(" ")
    }

    fn has_secrets(&self) -> bool {
        self.tokens.iter().any(|t| matches!(t, Token::Secret(_)))
    }
}

/// A remote command line under construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    segments: Vec<Segment>,
}

impl RemoteCommand {
    /// Start a command with its program verb
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment {
                tokens: vec![Token::Fixed(program.into())],
                redirect: None,
            }],
        }
    }

    fn current(&mut self) -> &mut Segment {
        self.segments.last_mut().expect("at least one segment")
    }

    /// Append a fixed token (flag or subcommand), trusted as written
    pub fn arg(mut self, token: impl Into<String>) -> Self {
        self.current().tokens.push(Token::Fixed(token.into()));
        self
    }

    /// Append an interpolated value, always quoted
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.current().tokens.push(Token::Value(value.into()));
        self
    }

    /// Append `--key=<value>` with the value quoted
    pub fn option(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.current().tokens.push(Token::Value(format!(
            "--{}={}",
            key,
            value.as_ref()
        )));
        self
    }

    /// Append a sensitive interpolated value
    pub fn secret_value(mut self, value: &SecretString) -> Self {
        self.current()
            .tokens
            .push(Token::Secret(value.expose().to_string()));
        self
    }

    /// Append `--key=<value>` where the value is sensitive
    pub fn secret_option(mut self, key: &str, value: &SecretString) -> Self {
        self.current()
            .tokens
            .push(Token::Secret(format!("--{}={}", key, value.expose())));
        self
    }

    /// Redirect this segment's stdout to a remote file (`>`)
    pub fn write_to(mut self, path: impl Into<String>) -> Self {
        self.current().redirect = Some(Redirect::Write(path.into()));
        self
    }

    /// Append this segment's stdout to a remote file (`>>`)
    pub fn append_to(mut self, path: impl Into<String>) -> Self {
        self.current().redirect = Some(Redirect::Append(path.into()));
        self
    }

    /// Chain another command with `&&`
    pub fn and_then(mut self, next: RemoteCommand) -> Self {
        self.segments.extend(next.segments);
        self
    }

    /// Render the full command line, secrets included
    pub fn render(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.render(false))
            .collect::<Vec<_>>()
            .join(" && ")
    }

    /// Render for display, secrets replaced with a placeholder
    pub fn redacted(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.render(true))
            .collect::<Vec<_>>()
            .join(" && ")
    }

    /// Whether any argument is sensitive
    pub fn has_secrets(&self) -> bool {
        self.segments.iter().any(Segment::has_secrets)
    }
}

impl fmt::Display for RemoteCommand {
    /// Displays the redacted form; `render()` is the only way to the raw line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}
