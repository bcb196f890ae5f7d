// File: src/core/rules.rs
use crate::core::dictionary::WordService;
use crate::core::hangul::duem_char;
use crate::core::types::{normalize_word, CurrentState, FailReason, GameMode, GameSetting, Millis};
use crate::error::{KkutuError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

/// (elapsed round ms, speed). Each breakpoint is the inclusive lower bound
/// of its speed.
const TURN_SPEED_TABLE: [(Millis, u8); 11] = [
    (0, 10),
    (4_000, 9),
    (10_000, 8),
    (17_000, 7),
    (25_000, 6),
    (34_000, 5),
    (44_000, 4),
    (55_000, 3),
    (67_000, 2),
    (80_000, 1),
    (94_000, 0),
];

pub const MAX_TURN_SPEED: u8 = 10;
pub const BASE_TURN_MS: Millis = 15_000;
pub const TURN_STEP_MS: Millis = 1_400;

/// Source of uniform draws. Injected so draws can be replayed in tests.
pub trait RandomSource {
    /// Uniform index in `0..upper`. Never called with `upper == 0`.
    fn next_index(&mut self, upper: usize) -> usize;
}

/// `StdRng`-backed source, seeded from entropy or a fixed seed.
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl RandomSource for StdRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }
}

pub fn turn_speed(elapsed_round_ms: Millis) -> u8 {
    TURN_SPEED_TABLE
        .iter()
        .rev()
        .find(|&&(at, _)| elapsed_round_ms >= at)
        .map_or(MAX_TURN_SPEED, |&(_, speed)| speed)
}

/// Time granted for one turn: shrinks by `TURN_STEP_MS` per lost speed
/// step and never outlasts the round.
pub fn turn_budget_ms(speed: u8, remaining_round_ms: Millis) -> Millis {
    let lost = Millis::from(MAX_TURN_SPEED.saturating_sub(speed));
    let budget = BASE_TURN_MS.saturating_sub(TURN_STEP_MS * lost);
    budget.min(remaining_round_ms)
}

/// Why `word` does not satisfy `state`, checked in order: length, start
/// character, mission character, dictionary membership. `word` is
/// normalized first, the same way the dictionary keys it.
pub fn check_word(word: &str, state: &CurrentState, dictionary: &WordService) -> std::result::Result<(), FailReason> {
    let word = normalize_word(word);
    let Some(first) = word.chars().next().filter(|_| word.chars().count() > 1) else {
        return Err(FailReason::TooShort);
    };
    if first != state.start_char && first != duem_char(state.start_char) {
        return Err(FailReason::StartMismatch);
    }
    if let Some(mission) = state.mission_char {
        if !word.contains(mission) {
            return Err(FailReason::MissionMissing);
        }
    }
    if !dictionary.has_word(&word) {
        return Err(FailReason::NotFound);
    }
    Ok(())
}

pub fn is_valid_word(word: &str, state: Option<&CurrentState>, dictionary: &WordService) -> bool {
    state.is_some_and(|state| check_word(word, state, dictionary).is_ok())
}

/// Draws the opening prompt for a round.
pub fn pick_start_state(
    setting: &GameSetting,
    dictionary: &WordService,
    exclusion: &BTreeSet<char>,
    random: &mut dyn RandomSource,
) -> Result<CurrentState> {
    match setting.mode {
        GameMode::Normal => {
            let candidates = dictionary.start_candidates(setting, exclusion);
            let start_char = *pick(&candidates, random)?;
            Ok(CurrentState { start_char, mission_char: None })
        }
        GameMode::Mission => {
            let candidates = dictionary.pair_candidates(setting, exclusion);
            let &(start_char, mission_char) = pick(&candidates, random)?;
            Ok(CurrentState { start_char, mission_char: Some(mission_char) })
        }
    }
}

/// Draws the mission for a turn whose start character is already fixed.
/// The chain dictates the start, so the mission is the only free draw:
/// characters in `exclusion` (prompts already used this round) are avoided
/// while any other choice is left.
pub fn pick_mission_char(
    setting: &GameSetting,
    dictionary: &WordService,
    start_char: char,
    exclusion: &BTreeSet<char>,
    random: &mut dyn RandomSource,
) -> Result<char> {
    let all = dictionary.mission_chars_for(setting.lang, start_char);
    if setting.not_again_same_char {
        let fresh: Vec<char> = all.iter().copied().filter(|c| !exclusion.contains(c)).collect();
        if !fresh.is_empty() {
            return pick(&fresh, random).copied();
        }
        tracing::debug!("[rules] mission exclusion emptied candidates start={start_char}");
    }
    pick(&all, random).copied()
}

fn pick<'a, T>(candidates: &'a [T], random: &mut dyn RandomSource) -> Result<&'a T> {
    if candidates.is_empty() {
        return Err(KkutuError::NoCandidate);
    }
    let index = random.next_index(candidates.len()).min(candidates.len() - 1);
    Ok(&candidates[index])
}
