//! # Badge Tones
//!
//! Every status pill in the office UI is one of five tones. Resource
//! statuses (see [`crate::status`]) map onto a tone; the mapping is the only
//! place that decides what "red" means.

use serde::{Deserialize, Serialize};

/// Visual tone of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Success,
    Warning,
    Danger,
    Info,
    Neutral,
}

impl BadgeTone {
    /// Stable name used by renderers and terminal output.
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeTone::Success => "success",
            BadgeTone::Warning => "warning",
            BadgeTone::Danger => "danger",
            BadgeTone::Info => "info",
            BadgeTone::Neutral => "neutral",
        }
    }

    /// ANSI SGR colour code for terminal rendering.
    pub fn ansi_code(self) -> u8 {
        match self {
            BadgeTone::Success => 32,
            BadgeTone::Warning => 33,
            BadgeTone::Danger => 31,
            BadgeTone::Info => 36,
            BadgeTone::Neutral => 37,
        }
    }

    /// Wrap `label` in this tone's ANSI colour.
    pub fn paint(self, label: &str) -> String {
        format!("\x1b[{}m{label}\x1b[0m", self.ansi_code())
    }
}

impl std::fmt::Display for BadgeTone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that renders as a badge.
pub trait Badge {
    fn tone(&self) -> BadgeTone;
    fn label(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_wraps_in_sgr() {
        assert_eq!(BadgeTone::Danger.paint("late"), "\x1b[31mlate\x1b[0m");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&BadgeTone::Warning).unwrap();
        assert_eq!(json, r#""warning""#);
        assert_eq!(BadgeTone::Warning.to_string(), "warning");
    }
}
