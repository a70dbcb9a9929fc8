//! Deterministic answers for trivial intents.
//!
//! A handful of queries (greetings, asking for the time or date) need no
//! language model. The responder checks the English-normalized query against
//! word-boundary patterns in a fixed priority order and answers from the
//! system clock. This is the only component allowed to skip the generator.

use chrono::Local;
use regex::Regex;
use std::sync::OnceLock;

const GREETING_REPLY: &str = "Hello! How can I help you today?";

static GREETING_PATTERN: OnceLock<Regex> = OnceLock::new();
static TIME_PATTERN: OnceLock<Regex> = OnceLock::new();
static DATE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn greeting_pattern() -> &'static Regex {
    GREETING_PATTERN.get_or_init(|| Regex::new(r"(?i)\b(hi|hello|hey)\b").unwrap())
}

fn time_pattern() -> &'static Regex {
    TIME_PATTERN.get_or_init(|| Regex::new(r"(?i)\b(time|clock)\b").unwrap())
}

fn date_pattern() -> &'static Regex {
    DATE_PATTERN.get_or_init(|| Regex::new(r"(?i)\b(date|day|today)\b").unwrap())
}

/// Rule-table responder for queries that never need the model.
pub struct HeuristicResponder;

impl HeuristicResponder {
    /// Try to answer an English query locally.
    ///
    /// Patterns are checked greeting, then time, then date; the first match
    /// wins. Returns `None` when no pattern matches and the query should go
    /// to the generator.
    pub fn try_answer(english_text: &str) -> Option<String> {
        if greeting_pattern().is_match(english_text) {
            return Some(GREETING_REPLY.to_string());
        }

        if time_pattern().is_match(english_text) {
            let now = Local::now();
            return Some(format!("The current time is {}.", now.format("%I:%M %p")));
        }

        if date_pattern().is_match(english_text) {
            let now = Local::now();
            return Some(format!("Today is {}.", now.format("%A, %d %B %Y")));
        }

        None
    }
}
