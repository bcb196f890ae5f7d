// --- File: src/core/dictionary.rs
use crate::core::hangul::duem_char;
use crate::core::types::{is_valid_word_form, normalize_word, GameMode, GameSetting, Lang, WordEntry};
use std::collections::{BTreeMap, BTreeSet};

/// Counts reported by a bulk load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub rejected: usize,
    /// Whether the setting passed as a hint can start a round on the new word set.
    pub can_start: bool,
}

/// The user-editable word set and the indices the rules draw from.
///
/// Indices are rebuilt eagerly on load/edit/delete; `add_word` extends them
/// in place since an insertion can only grow them.
#[derive(Debug, Clone, Default)]
pub struct WordService {
    words: BTreeMap<String, Vec<String>>,
    start_chars: BTreeMap<Lang, BTreeSet<char>>,
    /// (first character, any character of the same word), first included.
    mission_pairs: BTreeMap<Lang, BTreeSet<(char, char)>>,
}

impl WordService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole word set. Invalid entries are dropped; for
    /// duplicate words the first occurrence wins.
    pub fn load<I>(&mut self, entries: I, hint: &GameSetting) -> LoadReport
    where
        I: IntoIterator<Item = WordEntry>,
    {
        self.words.clear();
        let mut rejected = 0;
        for entry in entries {
            let word = normalize_word(&entry.word);
            if !is_valid_word_form(&word) {
                rejected += 1;
                continue;
            }
            self.words.entry(word).or_insert(entry.themes);
        }
        self.rebuild_indices();

        let report = LoadReport {
            loaded: self.words.len(),
            rejected,
            can_start: self.has_candidate(hint, &BTreeSet::new()),
        };
        tracing::info!(
            "[dictionary] load done count={} rejected={} can_start={}",
            report.loaded,
            report.rejected,
            report.can_start
        );
        report
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.words.contains_key(&normalize_word(word))
    }

    pub fn add_word(&mut self, word: &str, themes: Vec<String>) -> bool {
        let word = normalize_word(word);
        if !is_valid_word_form(&word) || self.words.contains_key(&word) {
            return false;
        }
        self.index_word(&word);
        tracing::debug!("[dictionary] add word={word}");
        self.words.insert(word, themes);
        true
    }

    /// Renames `old_word` to `new_word`, keeping its themes. Refuses to
    /// overwrite a different existing word.
    pub fn edit_word(&mut self, old_word: &str, new_word: &str) -> bool {
        let old_word = normalize_word(old_word);
        let new_word = normalize_word(new_word);
        if !is_valid_word_form(&new_word) || !self.words.contains_key(&old_word) {
            return false;
        }
        if new_word != old_word && self.words.contains_key(&new_word) {
            return false;
        }
        let Some(themes) = self.words.remove(&old_word) else {
            return false;
        };
        tracing::debug!("[dictionary] edit {old_word} -> {new_word}");
        self.words.insert(new_word, themes);
        self.rebuild_indices();
        true
    }

    pub fn delete_word(&mut self, word: &str) -> bool {
        if self.words.remove(&normalize_word(word)).is_none() {
            return false;
        }
        tracing::debug!("[dictionary] delete word={word}");
        self.rebuild_indices();
        true
    }

    pub fn get_themes(&self, word: &str) -> Vec<String> {
        self.words.get(&normalize_word(word)).cloned().unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.start_chars.clear();
        self.mission_pairs.clear();
        tracing::info!("[dictionary] cleared");
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = WordEntry> + '_ {
        self.words
            .iter()
            .map(|(word, themes)| WordEntry::new(word.clone(), themes.clone()))
    }

    pub fn start_chars(&self, lang: Lang) -> impl Iterator<Item = char> + '_ {
        self.start_chars.get(&lang).into_iter().flatten().copied()
    }

    pub fn mission_pairs(&self, lang: Lang) -> impl Iterator<Item = (char, char)> + '_ {
        self.mission_pairs.get(&lang).into_iter().flatten().copied()
    }

    /// Words whose first character is `first`, in key order.
    pub fn words_starting_with(&self, first: char) -> impl Iterator<Item = &str> + '_ {
        self.words
            .range(first.to_string()..)
            .map(|(word, _)| word.as_str())
            .take_while(move |word| word.starts_with(first))
    }

    /// Start characters a new round may draw under `setting`.
    pub fn start_candidates(&self, setting: &GameSetting, exclusion: &BTreeSet<char>) -> Vec<char> {
        self.start_chars(setting.lang)
            .filter(|&c| allowed_start(setting, exclusion, c))
            .collect()
    }

    /// Mission pairs a new round may draw under `setting`; the filters
    /// apply to the start element.
    pub fn pair_candidates(
        &self,
        setting: &GameSetting,
        exclusion: &BTreeSet<char>,
    ) -> Vec<(char, char)> {
        self.mission_pairs(setting.lang)
            .filter(|&(start, _)| allowed_start(setting, exclusion, start))
            .collect()
    }

    /// Characters that can be demanded as a mission for a word starting
    /// with `start` (or its initial-sound form).
    pub fn mission_chars_for(&self, lang: Lang, start: char) -> Vec<char> {
        let softened = duem_char(start);
        let mut out: BTreeSet<char> = BTreeSet::new();
        for (first, contained) in self.mission_pairs(lang) {
            if first == start || first == softened {
                out.insert(contained);
            }
        }
        out.into_iter().collect()
    }

    pub fn has_candidate(&self, setting: &GameSetting, exclusion: &BTreeSet<char>) -> bool {
        match setting.mode {
            GameMode::Normal => self
                .start_chars(setting.lang)
                .any(|c| allowed_start(setting, exclusion, c)),
            GameMode::Mission => self
                .mission_pairs(setting.lang)
                .any(|(c, _)| allowed_start(setting, exclusion, c)),
        }
    }

    fn index_word(&mut self, word: &str) {
        let Some(first) = word.chars().next() else {
            return;
        };
        let lang = Lang::of_word(word);
        self.start_chars.entry(lang).or_default().insert(first);
        let pairs = self.mission_pairs.entry(lang).or_default();
        for contained in word.chars() {
            pairs.insert((first, contained));
        }
    }

    fn rebuild_indices(&mut self) {
        self.start_chars.clear();
        self.mission_pairs.clear();
        let words: Vec<String> = self.words.keys().cloned().collect();
        for word in &words {
            self.index_word(word);
        }
    }
}

fn allowed_start(setting: &GameSetting, exclusion: &BTreeSet<char>, c: char) -> bool {
    if !setting.want_start_char.is_empty() && !setting.want_start_char.contains(&c) {
        return false;
    }
    !(setting.not_again_same_char && exclusion.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(words: &[&str]) -> Vec<WordEntry> {
        words.iter().map(|w| WordEntry::new(*w, vec![])).collect()
    }

    #[test]
    fn load_filters_and_indexes() {
        let mut dict = WordService::new();
        let report = dict.load(entries(&["가방", "가위", "나", "!!", "Apple"]), &GameSetting::default());
        assert_eq!(report.loaded, 3);
        assert_eq!(report.rejected, 2);
        assert!(report.can_start);
        assert!(dict.has_word("apple"));
        assert!(dict.has_word("APPLE"));
        assert_eq!(dict.start_chars(Lang::Ko).collect::<Vec<_>>(), vec!['가']);
        assert_eq!(dict.start_chars(Lang::En).collect::<Vec<_>>(), vec!['a']);
        let pairs: Vec<_> = dict.mission_pairs(Lang::Ko).collect();
        assert!(pairs.contains(&('가', '가')));
        assert!(pairs.contains(&('가', '방')));
        assert!(pairs.contains(&('가', '위')));
    }

    #[test]
    fn load_is_idempotent() {
        let mut dict = WordService::new();
        dict.load(entries(&["사과", "과자"]), &GameSetting::default());
        let first: Vec<_> = dict.entries().collect();
        dict.load(entries(&["사과", "과자"]), &GameSetting::default());
        assert_eq!(first, dict.entries().collect::<Vec<_>>());
    }

    #[test]
    fn add_rejects_duplicates_and_short_words() {
        let mut dict = WordService::new();
        assert!(dict.add_word("사과", vec!["과일".into()]));
        assert!(!dict.add_word("사과", vec![]));
        assert!(!dict.add_word("사", vec![]));
        assert_eq!(dict.get_themes("사과"), vec!["과일".to_string()]);
        assert!(dict.start_chars(Lang::Ko).any(|c| c == '사'));
    }

    #[test]
    fn edit_moves_themes_and_reindexes() {
        let mut dict = WordService::new();
        dict.add_word("사과", vec!["과일".into()]);
        assert!(!dict.edit_word("없음", "다른말"));
        assert!(!dict.edit_word("사과", "x"));
        assert!(dict.edit_word("사과", "바나나"));
        assert!(!dict.has_word("사과"));
        assert_eq!(dict.get_themes("바나나"), vec!["과일".to_string()]);
        assert_eq!(dict.start_chars(Lang::Ko).collect::<Vec<_>>(), vec!['바']);
    }

    #[test]
    fn edit_refuses_to_overwrite() {
        let mut dict = WordService::new();
        dict.add_word("사과", vec![]);
        dict.add_word("바나나", vec![]);
        assert!(!dict.edit_word("사과", "바나나"));
        assert!(dict.has_word("사과"));
    }

    #[test]
    fn delete_and_clear() {
        let mut dict = WordService::new();
        dict.add_word("사과", vec![]);
        assert!(!dict.delete_word("바나나"));
        assert!(dict.delete_word("사과"));
        assert!(dict.is_empty());
        assert_eq!(dict.start_chars(Lang::Ko).count(), 0);
        dict.add_word("사과", vec![]);
        dict.clear();
        assert_eq!(dict.len(), 0);
        assert_eq!(dict.mission_pairs(Lang::Ko).count(), 0);
    }

    #[test]
    fn candidates_honor_filters() {
        let mut dict = WordService::new();
        dict.load(entries(&["가방", "나무", "다리"]), &GameSetting::default());
        let mut setting = GameSetting::default();
        setting.want_start_char = ['가', '나'].into_iter().collect();
        assert_eq!(dict.start_candidates(&setting, &BTreeSet::new()), vec!['가', '나']);

        let exclusion: BTreeSet<char> = ['가'].into_iter().collect();
        assert_eq!(dict.start_candidates(&setting, &exclusion).len(), 2);
        setting.not_again_same_char = true;
        assert_eq!(dict.start_candidates(&setting, &exclusion), vec!['나']);

        setting.mode = GameMode::Mission;
        assert!(dict.pair_candidates(&setting, &exclusion).iter().all(|&(s, _)| s == '나'));
        assert!(dict.has_candidate(&setting, &exclusion));
    }

    #[test]
    fn words_by_first_char_and_mission_chars() {
        let mut dict = WordService::new();
        dict.load(entries(&["이발", "이사", "리본", "가방"]), &GameSetting::default());
        assert_eq!(dict.words_starting_with('이').collect::<Vec<_>>(), vec!["이발", "이사"]);
        let missions = dict.mission_chars_for(Lang::Ko, '리');
        for c in ['리', '본', '이', '발', '사'] {
            assert!(missions.contains(&c), "missing {c}");
        }
        assert!(!missions.contains(&'방'));
    }
}
