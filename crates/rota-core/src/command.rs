//! Slash-command text parsing.
//!
//! Parsing never fails: anything that is not a recognised verb becomes
//! [`Verb::Empty`] or [`Verb::Unknown`], and the dispatcher answers those
//! with [`USAGE`].

use chrono::{DateTime, NaiveDate};

use crate::error::{Result, RotaError};

pub const USAGE: &str = "Usage:
  /knowledgesharing next
  /knowledgesharing log [@user [yyyy-mm-dd]]
  /knowledgesharing remove @user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Log,
    Remove,
    Next,
    Unknown(String),
    Empty,
}

impl Verb {
    fn from_token(token: &str) -> Self {
        match token {
            "log" => Verb::Log,
            "remove" => Verb::Remove,
            "next" => Verb::Next,
            other => Verb::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verb::Log => write!(f, "log"),
            Verb::Remove => write!(f, "remove"),
            Verb::Next => write!(f, "next"),
            Verb::Unknown(s) => write!(f, "{s}"),
            Verb::Empty => write!(f, ""),
        }
    }
}

/// A parsed command line: the verb plus the tokens that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: Verb,
    pub args: Vec<String>,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let mut tokens = text.split_whitespace();
        let Some(first) = tokens.next() else {
            return Self {
                verb: Verb::Empty,
                args: vec![],
            };
        };
        Self {
            verb: Verb::from_token(first),
            args: tokens.map(str::to_string).collect(),
        }
    }

    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).map(String::as_str)
    }
}

/// Convert a `log` date argument to epoch milliseconds.
///
/// Date-only strings are taken as UTC midnight. Full RFC 3339 timestamps are
/// also accepted.
pub fn parse_delivered_at(s: &str) -> Result<i64> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().timestamp_millis());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| RotaError::InvalidDate(s.to_string()))
}
