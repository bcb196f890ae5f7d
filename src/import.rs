// File: src/import.rs
use crate::core::types::{is_word_char, WordEntry};
use crate::error::{KkutuError, Result};
use std::fs;
use std::path::Path;

/// Largest accepted upload, 1 MiB.
pub const MAX_IMPORT_BYTES: u64 = 1024 * 1024;
pub const ACCEPTED_EXTENSION: &str = ".txt";

/// An uploaded word list: name, byte size, and its text.
#[derive(Debug, Clone)]
pub struct WordFile {
    pub name: String,
    pub size: u64,
    pub text: String,
}

impl WordFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self { name: name.into(), size: text.len() as u64, text }
    }

    /// Reads a file from disk. The size check happens before the contents
    /// are read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let size = fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        check_limits(&name, size)?;
        let text = fs::read_to_string(path)?;
        Ok(Self { name, size, text })
    }
}

fn check_limits(name: &str, size: u64) -> Result<()> {
    if size > MAX_IMPORT_BYTES {
        return Err(KkutuError::FileTooLarge { size, limit: MAX_IMPORT_BYTES });
    }
    if !name.to_lowercase().ends_with(ACCEPTED_EXTENSION) {
        return Err(KkutuError::UnsupportedExtension { name: name.to_string() });
    }
    Ok(())
}

/// One cleaned word per usable line, in file order. Duplicates are kept.
pub fn parse_word_list(file: &WordFile) -> Result<Vec<String>> {
    check_limits(&file.name, file.size)?;
    let mut skipped = 0usize;
    let words: Vec<String> = file
        .text
        .lines()
        .filter_map(|line| {
            let cleaned: String = line
                .chars()
                .filter(|&c| is_word_char(c))
                .flat_map(char::to_lowercase)
                .collect();
            if cleaned.chars().count() <= 1 {
                skipped += 1;
                None
            } else {
                Some(cleaned)
            }
        })
        .collect();
    if skipped > 0 {
        tracing::warn!("[import] {} skipped lines={skipped}", file.name);
    }
    tracing::info!("[import] {} parsed words={}", file.name, words.len());
    Ok(words)
}

pub fn to_entries(words: Vec<String>) -> Vec<WordEntry> {
    words.into_iter().map(|w| WordEntry::new(w, Vec::new())).collect()
}
