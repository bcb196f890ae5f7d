// File: src/core/hangul.rs
use crate::error::{KkutuError, Result};

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const COMPAT_JAMO_FIRST: u32 = 0x3131;
const COMPAT_JAMO_LAST: u32 = 0x318E;

const VOWEL_COUNT: u32 = 21;
const TRAIL_COUNT: u32 = 28;

/// Leading consonants in syllable-composition order.
const LEADS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ',
    'ㅌ', 'ㅍ', 'ㅎ',
];

const VOWELS: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ', 'ㅞ',
    'ㅟ', 'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

/// Index 0 is "no trailing consonant".
const TRAILS: [Option<char>; 28] = [
    None, Some('ㄱ'), Some('ㄲ'), Some('ㄳ'), Some('ㄴ'), Some('ㄵ'), Some('ㄶ'), Some('ㄷ'),
    Some('ㄹ'), Some('ㄺ'), Some('ㄻ'), Some('ㄼ'), Some('ㄽ'), Some('ㄾ'), Some('ㄿ'), Some('ㅀ'),
    Some('ㅁ'), Some('ㅂ'), Some('ㅄ'), Some('ㅅ'), Some('ㅆ'), Some('ㅇ'), Some('ㅈ'), Some('ㅊ'),
    Some('ㅋ'), Some('ㅌ'), Some('ㅍ'), Some('ㅎ'),
];

const LEAD_NIEUN: u32 = 2;
const LEAD_RIEUL: u32 = 5;
const LEAD_IEUNG: u32 = 11;

// Vowel indices, see VOWELS.
const RIEUL_TO_NIEUN_VOWELS: [u32; 6] = [0, 1, 8, 11, 13, 18]; // ㅏ ㅐ ㅗ ㅚ ㅜ ㅡ
const RIEUL_TO_IEUNG_VOWELS: [u32; 6] = [2, 6, 7, 12, 17, 20]; // ㅑ ㅕ ㅖ ㅛ ㅠ ㅣ
const NIEUN_TO_IEUNG_VOWELS: [u32; 4] = [6, 12, 17, 20]; // ㅕ ㅛ ㅠ ㅣ

/// The three jamo making up one syllable block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jamo {
    pub lead: char,
    pub vowel: char,
    pub trail: Option<char>,
}

/// Index triple of a precomposed syllable: (lead, vowel, trail).
fn split(c: char) -> Option<(u32, u32, u32)> {
    let code = c as u32;
    if !(SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code) {
        return None;
    }
    let offset = code - SYLLABLE_BASE;
    Some((
        offset / (VOWEL_COUNT * TRAIL_COUNT),
        (offset / TRAIL_COUNT) % VOWEL_COUNT,
        offset % TRAIL_COUNT,
    ))
}

fn compose(lead: u32, vowel: u32, trail: u32) -> char {
    let code = SYLLABLE_BASE + (lead * VOWEL_COUNT + vowel) * TRAIL_COUNT + trail;
    char::from_u32(code).unwrap_or('\u{FFFD}')
}

pub fn is_hangul_char(c: char) -> bool {
    let code = c as u32;
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code)
        || (COMPAT_JAMO_FIRST..=COMPAT_JAMO_LAST).contains(&code)
}

/// True iff every character is a Hangul syllable or compatibility jamo.
/// The empty string is not Hangul.
pub fn is_hangul(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_hangul_char)
}

/// Initial-sound law on a single character. Anything that is not a
/// precomposed syllable comes back unchanged.
pub fn duem_char(c: char) -> char {
    let Some((lead, vowel, trail)) = split(c) else {
        return c;
    };
    match lead {
        LEAD_RIEUL if RIEUL_TO_NIEUN_VOWELS.contains(&vowel) => compose(LEAD_NIEUN, vowel, trail),
        LEAD_RIEUL if RIEUL_TO_IEUNG_VOWELS.contains(&vowel) => compose(LEAD_IEUNG, vowel, trail),
        LEAD_NIEUN if NIEUN_TO_IEUNG_VOWELS.contains(&vowel) => compose(LEAD_IEUNG, vowel, trail),
        _ => c,
    }
}

/// `c` followed by every character `duem_char` maps onto it:
/// the ㄹ precedent first, then the ㄴ precedent.
pub fn reverse_duem_char(c: char) -> Vec<char> {
    let mut out = vec![c];
    let Some((lead, vowel, trail)) = split(c) else {
        return out;
    };
    match lead {
        LEAD_NIEUN if RIEUL_TO_NIEUN_VOWELS.contains(&vowel) => {
            out.push(compose(LEAD_RIEUL, vowel, trail));
        }
        LEAD_IEUNG => {
            if RIEUL_TO_IEUNG_VOWELS.contains(&vowel) {
                out.push(compose(LEAD_RIEUL, vowel, trail));
            }
            if NIEUN_TO_IEUNG_VOWELS.contains(&vowel) {
                out.push(compose(LEAD_NIEUN, vowel, trail));
            }
        }
        _ => {}
    }
    out
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// String-level initial-sound law. Input must be exactly one character;
/// with `ignore_error` a malformed input is returned as-is instead.
pub fn duem_law(text: &str, ignore_error: bool) -> Result<String> {
    match single_char(text) {
        Some(c) => Ok(duem_char(c).to_string()),
        None if ignore_error => Ok(text.to_string()),
        None => Err(KkutuError::InvalidInput { input: text.to_string() }),
    }
}

/// String-level inverse of [`duem_law`], same input contract.
pub fn reverse_duem_law(text: &str, ignore_error: bool) -> Result<Vec<String>> {
    match single_char(text) {
        Some(c) => Ok(reverse_duem_char(c).into_iter().map(String::from).collect()),
        None if ignore_error => Ok(vec![text.to_string()]),
        None => Err(KkutuError::InvalidInput { input: text.to_string() }),
    }
}

/// Splits a precomposed syllable into lead/vowel/trail jamo.
pub fn disassemble(c: char) -> Option<Jamo> {
    let (lead, vowel, trail) = split(c)?;
    Some(Jamo {
        lead: LEADS[lead as usize],
        vowel: VOWELS[vowel as usize],
        trail: TRAILS[trail as usize],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_hangul() {
        assert!(is_hangul("가방"));
        assert!(is_hangul("ㄱㅂ"));
        assert!(!is_hangul(""));
        assert!(!is_hangul("가a"));
        assert!(!is_hangul("apple"));
    }

    #[test]
    fn applies_each_duem_rule() {
        assert_eq!(duem_char('라'), '나');
        assert_eq!(duem_char('로'), '노');
        assert_eq!(duem_char('륵'), '늑');
        assert_eq!(duem_char('리'), '이');
        assert_eq!(duem_char('량'), '양');
        assert_eq!(duem_char('녀'), '여');
        assert_eq!(duem_char('니'), '이');
        assert_eq!(duem_char('나'), '나');
        assert_eq!(duem_char('가'), '가');
        assert_eq!(duem_char('a'), 'a');
    }

    #[test]
    fn duem_never_chains() {
        for code in SYLLABLE_BASE..=SYLLABLE_LAST {
            let c = char::from_u32(code).unwrap();
            let once = duem_char(c);
            assert_eq!(duem_char(once), once, "chained on {c}");
        }
    }

    #[test]
    fn every_rule_source_is_in_reverse_of_target() {
        for code in SYLLABLE_BASE..=SYLLABLE_LAST {
            let source = char::from_u32(code).unwrap();
            let target = duem_char(source);
            if target != source {
                assert!(reverse_duem_char(target).contains(&source), "{source} -> {target}");
            }
        }
    }

    #[test]
    fn reverse_orders_rieul_before_nieun() {
        assert_eq!(reverse_duem_char('이'), vec!['이', '리', '니']);
        assert_eq!(reverse_duem_char('나'), vec!['나', '라']);
        assert_eq!(reverse_duem_char('야'), vec!['야', '랴']);
        assert_eq!(reverse_duem_char('가'), vec!['가']);
    }

    #[test]
    fn string_contract_rejects_multi_char() {
        assert_eq!(duem_law("리", false).unwrap(), "이");
        assert!(matches!(duem_law("리본", false), Err(KkutuError::InvalidInput { .. })));
        assert!(matches!(duem_law("", false), Err(KkutuError::InvalidInput { .. })));
        assert_eq!(duem_law("리본", true).unwrap(), "리본");
        assert_eq!(reverse_duem_law("리본", true).unwrap(), vec!["리본".to_string()]);
        assert_eq!(reverse_duem_law("여", false).unwrap(), vec!["여", "려", "녀"]);
    }

    #[test]
    fn disassembles_syllables() {
        assert_eq!(disassemble('가'), Some(Jamo { lead: 'ㄱ', vowel: 'ㅏ', trail: None }));
        assert_eq!(disassemble('방'), Some(Jamo { lead: 'ㅂ', vowel: 'ㅏ', trail: Some('ㅇ') }));
        assert_eq!(disassemble('ㄱ'), None);
        assert_eq!(disassemble('a'), None);
    }
}
