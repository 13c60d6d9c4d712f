//! Intent classification from transcript text.
//!
//! Classification is a linear scan over an ordered pattern table: the first
//! pattern that matches anywhere in the normalized text wins. The table is
//! immutable after construction, so classification is deterministic and the
//! precedence of overlapping patterns is fixed by table order.

use crate::error::{Result, VoxlampError};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Classified meaning of an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    LightsOn,
    LightsOff,
    BrightnessUp,
    BrightnessDown,
    Unknown,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Intent::LightsOn => "lights_on",
            Intent::LightsOff => "lights_off",
            Intent::BrightnessUp => "brightness_up",
            Intent::BrightnessDown => "brightness_down",
            Intent::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One rule in the command table: a compiled pattern and the intent it maps to.
#[derive(Debug, Clone)]
pub struct CommandPattern {
    pattern: Regex,
    intent: Intent,
}

impl CommandPattern {
    /// Compile a pattern string into a rule.
    ///
    /// # Errors
    /// Returns `VoxlampError::ConfigInvalidValue` if the pattern is not a
    /// valid regular expression.
    pub fn new(pattern: &str, intent: Intent) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| VoxlampError::ConfigInvalidValue {
            key: format!("command pattern '{}'", pattern),
            message: e.to_string(),
        })?;
        Ok(Self { pattern, intent })
    }

    /// The intent this rule maps to.
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// The source pattern string.
    pub fn pattern_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Matches transcript text against an ordered command table.
#[derive(Debug, Clone)]
pub struct CommandMatcher {
    table: Vec<CommandPattern>,
}

impl CommandMatcher {
    /// Create a matcher over an ordered rule table.
    ///
    /// Table order is significant: earlier rules take precedence on overlap.
    pub fn new(table: Vec<CommandPattern>) -> Self {
        Self { table }
    }

    /// Create a matcher over the built-in rule table.
    pub fn with_default_table() -> Self {
        Self::new(default_command_table())
    }

    /// Classify one utterance.
    ///
    /// The text is lowercased and trimmed, then scanned against the table;
    /// a pattern may match anywhere in the utterance. Returns
    /// `Intent::Unknown` when no rule matches.
    pub fn match_text(&self, text: &str) -> Intent {
        let normalized = text.trim().to_lowercase();
        self.table
            .iter()
            .find(|rule| rule.pattern.is_match(&normalized))
            .map(|rule| rule.intent)
            .unwrap_or(Intent::Unknown)
    }

    /// Number of rules in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True when the table has no rules (everything maps to Unknown).
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// The built-in command table.
///
/// Patterns deliberately tolerate common misrecognitions: the leading
/// `.*ights` also catches "rights on", and the "whiteness" rules catch the
/// usual mishearing of "brightness". The bare "toggle" rule maps to
/// LightsOff; that mirrors the legacy rule table verbatim and is worth
/// revisiting once per-device state is tracked.
pub fn default_command_table() -> Vec<CommandPattern> {
    let rules = [
        (r"\b.*ights\s*on\b", Intent::LightsOn),
        (r"\b.*ights\s*off\b", Intent::LightsOff),
        (r"toggle", Intent::LightsOff),
        (r"\b.*rightness\s*(up)\b", Intent::BrightnessUp),
        (r"\b.*rightness\s*(down)\b", Intent::BrightnessDown),
        (r"\bwhiteness\s*(up)\b", Intent::BrightnessUp),
        (r"\bwhiteness\s*(down)\b", Intent::BrightnessDown),
    ];

    rules
        .into_iter()
        .map(|(pattern, intent)| {
            // Built-in patterns are compile-checked by tests.
            CommandPattern::new(pattern, intent)
                .unwrap_or_else(|_| unreachable!("built-in pattern failed to compile"))
        })
        .collect()
}
