// File: src/core/context.rs
use crate::core::types::{CurrentState, UsedWordEntry};
use std::collections::BTreeSet;

/// Everything one round accumulates: the turn log, the prompt characters
/// already used, and the hint counter of the turn in progress.
#[derive(Debug, Clone, Default)]
pub struct RoundContext {
    history: Vec<UsedWordEntry>,
    used_chars: BTreeSet<char>,
    hint_uses: u32,
}

impl RoundContext {
    pub fn new(opening: &CurrentState) -> Self {
        let mut ctx = Self::default();
        ctx.used_chars.insert(opening.start_char);
        ctx
    }

    /// Logs a turn against `state`. Accepted turns reset the hint counter.
    pub fn add_word(&mut self, state: &CurrentState, word: &str, failed: bool) -> UsedWordEntry {
        let entry = UsedWordEntry {
            prompt_char: state.start_char,
            word: word.to_string(),
            mission_char: state.mission_char,
            hint_use_count: self.hint_uses,
            failed,
        };
        self.history.push(entry.clone());
        if !failed {
            self.hint_uses = 0;
        }
        entry
    }

    pub fn mark_used(&mut self, c: char) {
        self.used_chars.insert(c);
    }

    pub fn record_hint(&mut self) -> u32 {
        self.hint_uses += 1;
        self.hint_uses
    }

    pub fn used_chars(&self) -> &BTreeSet<char> {
        &self.used_chars
    }

    pub fn history(&self) -> &[UsedWordEntry] {
        &self.history
    }

    /// Words accepted so far this round.
    pub fn accepted_words(&self) -> impl Iterator<Item = &str> + '_ {
        self.history.iter().filter(|e| !e.failed).map(|e| e.word.as_str())
    }

    pub fn into_history(self) -> Vec<UsedWordEntry> {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_counter_survives_failures_and_resets_on_accept() {
        let state = CurrentState { start_char: '가', mission_char: None };
        let mut ctx = RoundContext::new(&state);
        ctx.record_hint();
        let failed = ctx.add_word(&state, "가", true);
        assert_eq!(failed.hint_use_count, 1);
        ctx.record_hint();
        let accepted = ctx.add_word(&state, "가방", false);
        assert_eq!(accepted.hint_use_count, 2);
        let next = ctx.add_word(&state, "", true);
        assert_eq!(next.hint_use_count, 0);
        assert_eq!(ctx.accepted_words().collect::<Vec<_>>(), vec!["가방"]);
        assert_eq!(ctx.into_history().len(), 3);
    }

    #[test]
    fn tracks_used_chars() {
        let state = CurrentState { start_char: '가', mission_char: None };
        let mut ctx = RoundContext::new(&state);
        ctx.mark_used('방');
        assert!(ctx.used_chars().contains(&'가'));
        assert!(ctx.used_chars().contains(&'방'));
    }
}
