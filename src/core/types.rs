// src/core/types.rs
use crate::core::hangul::{is_hangul, is_hangul_char};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Milliseconds, used for every clock value the engine sees.
pub type Millis = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Ko,
    En,
}

impl Lang {
    /// Language a dictionary word is indexed under, decided by its first character.
    pub fn of_word(word: &str) -> Lang {
        match word.chars().next() {
            Some(c) if is_hangul_char(c) => Lang::Ko,
            _ => Lang::En,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Normal,
    Mission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintMode {
    Auto,
    Manual,
}

/// Snapshot of the rules a round is played under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSetting {
    pub lang: Lang,
    pub mode: GameMode,
    pub hint_mode: HintMode,
    pub not_again_same_char: bool,
    /// Round length in milliseconds.
    pub round_time: Millis,
    /// Allowed first characters; empty means unrestricted.
    pub want_start_char: BTreeSet<char>,
}

impl Default for GameSetting {
    fn default() -> Self {
        Self {
            lang: Lang::Ko,
            mode: GameMode::Normal,
            hint_mode: HintMode::Manual,
            not_again_same_char: false,
            round_time: 60_000,
            want_start_char: BTreeSet::new(),
        }
    }
}

/// One dictionary record. `word` is the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    #[serde(default)]
    pub themes: Vec<String>,
}

impl WordEntry {
    pub fn new(word: impl Into<String>, themes: Vec<String>) -> Self {
        Self { word: word.into(), themes }
    }
}

/// Characters that survive normalization: Hangul, ASCII letters and digits.
pub fn is_word_char(c: char) -> bool {
    is_hangul_char(c) || c.is_ascii_alphanumeric()
}

/// Korean words keep their form (trimmed); anything else is lowercased
/// with non-word characters stripped.
pub fn normalize_word(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_hangul(trimmed) {
        return trimmed.to_string();
    }
    trimmed
        .chars()
        .filter(|&c| is_word_char(c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Entry invariant: more than one character, at least one word character.
pub fn is_valid_word_form(word: &str) -> bool {
    word.chars().count() > 1 && word.chars().any(is_word_char)
}

/// What the next submitted word has to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentState {
    pub start_char: char,
    pub mission_char: Option<char>,
}

/// One accepted or failed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedWordEntry {
    /// Start character the turn was prompted with.
    pub prompt_char: char,
    pub word: String,
    pub mission_char: Option<char>,
    pub hint_use_count: u32,
    pub failed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    TooShort,
    NotFound,
    StartMismatch,
    MissionMissing,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailReason::TooShort => "word too short",
            FailReason::NotFound => "not found in dictionary",
            FailReason::StartMismatch => "start character mismatch",
            FailReason::MissionMissing => "mission character missing",
        };
        f.write_str(text)
    }
}

/// Payload handed to the UI when a round begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundStart {
    pub start_char: char,
    pub mission_char: Option<char>,
    pub turn_speed: u8,
    pub turn_budget_ms: Millis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accepted {
    pub word_entry: UsedWordEntry,
    pub next_char: char,
    pub next_mission_char: Option<char>,
    pub turn_speed: u8,
    pub turn_budget_ms: Millis,
}

/// Result of one submission. A rejection is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    Accepted(Accepted),
    Rejected { reason: FailReason },
}

impl SubmitOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }

    pub fn reason(&self) -> Option<FailReason> {
        match self {
            SubmitOutcome::Accepted(_) => None,
            SubmitOutcome::Rejected { reason } => Some(*reason),
        }
    }
}

/// Totals derived from a finished round's log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub accepted: usize,
    pub failed: usize,
    pub hints_used: u32,
    pub longest_word: Option<String>,
}

impl RoundSummary {
    pub fn from_log(log: &[UsedWordEntry]) -> Self {
        let mut summary = RoundSummary::default();
        for entry in log {
            summary.hints_used += entry.hint_use_count;
            if entry.failed {
                summary.failed += 1;
                continue;
            }
            summary.accepted += 1;
            let longer = summary
                .longest_word
                .as_ref()
                .map_or(true, |w| entry.word.chars().count() > w.chars().count());
            if longer {
                summary.longest_word = Some(entry.word.clone());
            }
        }
        summary
    }
}
