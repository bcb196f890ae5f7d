use crate::core::context::RoundContext;
use crate::core::dictionary::{LoadReport, WordService};
use crate::core::hangul::{disassemble, duem_char};
use crate::core::rules::{
    check_word, pick_mission_char, pick_start_state, turn_budget_ms, turn_speed, RandomSource,
    StdRandom,
};
use crate::core::types::{
    normalize_word, Accepted, CurrentState, GameMode, GameSetting, Millis, RoundStart,
    RoundSummary, SubmitOutcome, UsedWordEntry, WordEntry,
};
use crate::error::{KkutuError, Result};
use crate::persistence::{restore_dictionary, save_dictionary, WordStore};
use std::collections::BTreeSet;

/// How long a failed-submission cue stays up before the caller clears it.
pub const FAIL_CUE_MS: Millis = 2_500;

/// Placeholder for non-Hangul letters past the first in a hint skeleton.
const HINT_MASK: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
}

struct ActiveRound {
    state: CurrentState,
    ctx: RoundContext,
}

/// The word-chain engine for one local player.
///
/// Owns the dictionary, the setting, and at most one running round. Holds
/// no timers: the caller owns the round clock and turn countdown and
/// reports elapsed time on every submission.
pub struct GameSession {
    dictionary: WordService,
    setting: GameSetting,
    random: Box<dyn RandomSource>,
    round: Option<ActiveRound>,
}

impl GameSession {
    pub fn new(setting: GameSetting, random: Box<dyn RandomSource>) -> Self {
        Self {
            dictionary: WordService::new(),
            setting,
            random,
            round: None,
        }
    }

    pub fn with_entropy(setting: GameSetting) -> Self {
        Self::new(setting, Box::new(StdRandom::from_entropy()))
    }

    /// Builds a session whose dictionary is read back from `store`.
    pub fn from_store(
        store: &dyn WordStore,
        setting: GameSetting,
        random: Box<dyn RandomSource>,
    ) -> Result<Self> {
        let mut session = Self::new(setting, random);
        session.dictionary = restore_dictionary(store, &session.setting)?;
        Ok(session)
    }

    pub fn save_dictionary(&self, store: &mut dyn WordStore) -> Result<()> {
        save_dictionary(&self.dictionary, store)
    }

    pub fn phase(&self) -> Phase {
        if self.round.is_some() {
            Phase::Active
        } else {
            Phase::Idle
        }
    }

    pub fn setting(&self) -> &GameSetting {
        &self.setting
    }

    pub fn dictionary(&self) -> &WordService {
        &self.dictionary
    }

    /// Settings only change between rounds.
    pub fn update_setting(&mut self, setting: GameSetting) -> Result<()> {
        if self.round.is_some() {
            return Err(KkutuError::RoundInProgress);
        }
        tracing::debug!("[session] setting updated {setting:?}");
        self.setting = setting;
        Ok(())
    }

    pub fn can_game_start(&self) -> bool {
        self.dictionary.has_candidate(&self.setting, &BTreeSet::new())
    }

    pub fn game_start(&mut self) -> Result<RoundStart> {
        if self.round.is_some() {
            return Err(KkutuError::RoundInProgress);
        }
        if !self.can_game_start() {
            return Err(KkutuError::CannotStart);
        }
        let state = pick_start_state(
            &self.setting,
            &self.dictionary,
            &BTreeSet::new(),
            self.random.as_mut(),
        )
        .map_err(|_| KkutuError::CannotStart)?;

        let speed = turn_speed(0);
        let start = RoundStart {
            start_char: state.start_char,
            mission_char: state.mission_char,
            turn_speed: speed,
            turn_budget_ms: turn_budget_ms(speed, self.setting.round_time),
        };
        tracing::info!(
            "[session] round start char={} mission={:?}",
            state.start_char,
            state.mission_char
        );
        self.round = Some(ActiveRound { state, ctx: RoundContext::new(&state) });
        Ok(start)
    }

    /// Value copy of the prompt the next word must satisfy.
    pub fn current_state(&self) -> Option<CurrentState> {
        self.round.as_ref().map(|r| r.state)
    }

    /// Turns logged so far in the running round.
    pub fn history(&self) -> &[UsedWordEntry] {
        self.round.as_ref().map(|r| r.ctx.history()).unwrap_or(&[])
    }

    pub fn submit_word(&mut self, word: &str, round_elapsed_ms: Millis) -> Result<SubmitOutcome> {
        let round = self.round.as_mut().ok_or(KkutuError::NotActive)?;
        let word = normalize_word(word);
        let state = round.state;

        if let Err(reason) = check_word(&word, &state, &self.dictionary) {
            round.ctx.add_word(&state, &word, true);
            tracing::debug!("[session] rejected word={word:?} reason={reason}");
            return Ok(SubmitOutcome::Rejected { reason });
        }

        let word_entry = round.ctx.add_word(&state, &word, false);
        let Some(next_char) = word.chars().last() else {
            return Err(KkutuError::InvalidInput { input: word });
        };
        let next_mission_char = match self.setting.mode {
            GameMode::Normal => None,
            GameMode::Mission => pick_mission_char(
                &self.setting,
                &self.dictionary,
                next_char,
                round.ctx.used_chars(),
                self.random.as_mut(),
            )
            .ok(),
        };
        round.ctx.mark_used(next_char);
        round.state = CurrentState { start_char: next_char, mission_char: next_mission_char };

        let speed = turn_speed(round_elapsed_ms);
        let remaining = self.setting.round_time.saturating_sub(round_elapsed_ms);
        tracing::debug!("[session] accepted word={word} next={next_char} speed={speed}");
        Ok(SubmitOutcome::Accepted(Accepted {
            word_entry,
            next_char,
            next_mission_char,
            turn_speed: speed,
            turn_budget_ms: turn_budget_ms(speed, remaining),
        }))
    }

    /// What the caller submits when the turn countdown runs out.
    pub fn turn_timeout(&mut self, round_elapsed_ms: Millis) -> Result<SubmitOutcome> {
        self.submit_word("", round_elapsed_ms)
    }

    /// Replaces the current prompt, e.g. for a moderator.
    pub fn force_state(&mut self, state: CurrentState) -> Result<()> {
        let round = self.round.as_mut().ok_or(KkutuError::NotActive)?;
        round.ctx.mark_used(state.start_char);
        round.state = state;
        Ok(())
    }

    /// The shortest dictionary word answering the current prompt, preferring
    /// words not yet played this round. Ties go to key order.
    pub fn get_hint(&self) -> Option<String> {
        let round = self.round.as_ref()?;
        let state = round.state;
        let played: BTreeSet<&str> = round.ctx.accepted_words().collect();

        let mut firsts = vec![state.start_char];
        let softened = duem_char(state.start_char);
        if softened != state.start_char {
            firsts.push(softened);
        }

        let mut best: Option<(bool, usize, &str)> = None;
        for first in firsts {
            for word in self.dictionary.words_starting_with(first) {
                if state.mission_char.is_some_and(|m| !word.contains(m)) {
                    continue;
                }
                let key = (played.contains(word), word.chars().count(), word);
                if best.map_or(true, |b| key < b) {
                    best = Some(key);
                }
            }
        }
        best.map(|(_, _, word)| word.to_string())
    }

    /// Leading consonants of the hint word. Counts as one hint use for the
    /// turn in progress.
    pub fn get_hint_word(&mut self) -> Option<String> {
        let hint = self.get_hint()?;
        let round = self.round.as_mut()?;
        let uses = round.ctx.record_hint();
        tracing::debug!("[session] hint served uses={uses}");
        Some(hint_skeleton(&hint))
    }

    pub fn end_round(&mut self) -> Result<Vec<UsedWordEntry>> {
        let round = self.round.take().ok_or(KkutuError::NotActive)?;
        let log = round.ctx.into_history();
        let summary = RoundSummary::from_log(&log);
        tracing::info!(
            "[session] round end accepted={} failed={} hints={}",
            summary.accepted,
            summary.failed,
            summary.hints_used
        );
        Ok(log)
    }

    pub fn add_word_to_db(&mut self, word: &str, themes: Vec<String>) -> bool {
        self.dictionary.add_word(word, themes)
    }

    pub fn edit_word_in_db(&mut self, old_word: &str, new_word: &str) -> bool {
        self.dictionary.edit_word(old_word, new_word)
    }

    pub fn delete_word_from_db(&mut self, word: &str) -> bool {
        self.dictionary.delete_word(word)
    }

    pub fn load_word_db<I>(&mut self, entries: I) -> LoadReport
    where
        I: IntoIterator<Item = WordEntry>,
    {
        self.dictionary.load(entries, &self.setting)
    }

    pub fn clear_db(&mut self) {
        self.dictionary.clear();
    }
}

/// Hangul syllables become their leading consonant; other characters keep
/// only the first one visible.
pub fn hint_skeleton(word: &str) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| match disassemble(c) {
            Some(jamo) => jamo.lead,
            None if i == 0 => c,
            None => HINT_MASK,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(usize);

    impl RandomSource for Fixed {
        fn next_index(&mut self, upper: usize) -> usize {
            self.0 % upper
        }
    }

    fn session(words: &[&str], setting: GameSetting) -> GameSession {
        let mut s = GameSession::new(setting, Box::new(Fixed(0)));
        s.load_word_db(words.iter().map(|w| WordEntry::new(*w, vec![])));
        s
    }

    #[test]
    fn skeleton_takes_leading_consonants() {
        assert_eq!(hint_skeleton("가방"), "ㄱㅂ");
        assert_eq!(hint_skeleton("apple"), "a____");
    }

    #[test]
    fn cannot_start_on_empty_dictionary() {
        let mut s = session(&[], GameSetting::default());
        assert!(!s.can_game_start());
        assert!(matches!(s.game_start(), Err(KkutuError::CannotStart)));
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn start_payload_uses_full_speed() {
        let mut s = session(&["가방"], GameSetting::default());
        let start = s.game_start().unwrap();
        assert_eq!(start.start_char, '가');
        assert_eq!(start.mission_char, None);
        assert_eq!(start.turn_speed, 10);
        assert_eq!(start.turn_budget_ms, 15_000);
        assert_eq!(s.phase(), Phase::Active);
        assert!(matches!(s.game_start(), Err(KkutuError::RoundInProgress)));
    }

    #[test]
    fn submit_requires_active_round() {
        let mut s = session(&["가방"], GameSetting::default());
        assert!(matches!(s.submit_word("가방", 0), Err(KkutuError::NotActive)));
        assert!(matches!(s.end_round(), Err(KkutuError::NotActive)));
        assert_eq!(s.get_hint(), None);
    }

    #[test]
    fn accepted_word_advances_prompt() {
        let mut s = session(&["가방", "방문"], GameSetting::default());
        s.game_start().unwrap();
        let outcome = s.submit_word("가방", 5_000).unwrap();
        let SubmitOutcome::Accepted(accepted) = outcome else {
            panic!("expected acceptance");
        };
        assert_eq!(accepted.next_char, '방');
        assert_eq!(accepted.turn_speed, 9);
        assert_eq!(accepted.turn_budget_ms, 13_600);
        assert_eq!(s.current_state(), Some(CurrentState { start_char: '방', mission_char: None }));
    }

    #[test]
    fn rejection_keeps_prompt_and_logs_failure() {
        let mut s = session(&["가방"], GameSetting::default());
        s.game_start().unwrap();
        let outcome = s.turn_timeout(1_000).unwrap();
        assert_eq!(outcome.reason(), Some(crate::core::types::FailReason::TooShort));
        assert_eq!(s.current_state().map(|st| st.start_char), Some('가'));
        let log = s.end_round().unwrap();
        assert_eq!(log.len(), 1);
        assert!(log[0].failed);
        assert_eq!(s.current_state(), None);
    }

    #[test]
    fn hint_prefers_shortest_unplayed_word() {
        let mut s = session(&["가방", "가나다라", "방가", "가위"], GameSetting::default());
        s.game_start().unwrap();
        assert_eq!(s.get_hint().as_deref(), Some("가방"));
        s.submit_word("가방", 0).unwrap();
        s.submit_word("방가", 0).unwrap();
        assert_eq!(s.get_hint().as_deref(), Some("가위"));
        assert_eq!(s.get_hint_word().as_deref(), Some("ㄱㅇ"));
        s.submit_word("가위", 0).unwrap();
        let log = s.end_round().unwrap();
        assert_eq!(log[2].hint_use_count, 1);
    }

    #[test]
    fn hint_follows_initial_sound_law() {
        let mut s = session(&["리본", "이발"], GameSetting::default());
        s.game_start().unwrap();
        s.force_state(CurrentState { start_char: '니', mission_char: None }).unwrap();
        assert_eq!(s.get_hint().as_deref(), Some("이발"));
    }

    #[test]
    fn settings_locked_during_round() {
        let mut s = session(&["가방"], GameSetting::default());
        s.game_start().unwrap();
        assert!(matches!(
            s.update_setting(GameSetting::default()),
            Err(KkutuError::RoundInProgress)
        ));
        s.end_round().unwrap();
        assert!(s.update_setting(GameSetting::default()).is_ok());
    }

    #[test]
    fn dictionary_edits_allowed_mid_round() {
        let mut s = session(&["가방"], GameSetting::default());
        s.game_start().unwrap();
        assert!(s.add_word_to_db("방석", vec![]));
        s.submit_word("가방", 0).unwrap();
        assert!(s.submit_word("방석", 0).unwrap().is_ok());
        assert!(s.edit_word_in_db("방석", "석방"));
        assert!(s.delete_word_from_db("석방"));
        s.clear_db();
        assert!(s.dictionary().is_empty());
    }
}
