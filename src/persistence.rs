// File: src/persistence.rs
use crate::core::dictionary::WordService;
use crate::core::types::{normalize_word, GameSetting, WordEntry};
use crate::error::Result;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Key-value record store for dictionary entries, keyed by `word`.
pub trait WordStore {
    fn get_all(&self) -> Result<Vec<WordEntry>>;
    fn get(&self, word: &str) -> Result<Option<WordEntry>>;
    fn put(&mut self, entry: WordEntry) -> Result<()>;
    /// Returns whether a record was removed.
    fn delete(&mut self, word: &str) -> Result<bool>;
    fn count(&self) -> Result<usize>;
    fn clear(&mut self) -> Result<()>;

    /// Replaces every record with `entries`.
    fn replace_all(&mut self, entries: Vec<WordEntry>) -> Result<()> {
        self.clear()?;
        for entry in entries {
            self.put(entry)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryWordStore {
    records: BTreeMap<String, WordEntry>,
}

impl MemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WordStore for MemoryWordStore {
    fn get_all(&self) -> Result<Vec<WordEntry>> {
        Ok(self.records.values().cloned().collect())
    }

    fn get(&self, word: &str) -> Result<Option<WordEntry>> {
        Ok(self.records.get(word).cloned())
    }

    fn put(&mut self, entry: WordEntry) -> Result<()> {
        self.records.insert(entry.word.clone(), entry);
        Ok(())
    }

    fn delete(&mut self, word: &str) -> Result<bool> {
        Ok(self.records.remove(word).is_some())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn clear(&mut self) -> Result<()> {
        self.records.clear();
        Ok(())
    }
}

/// A bincode snapshot on disk, rewritten atomically after every mutation.
pub struct FileWordStore {
    path: PathBuf,
    records: BTreeMap<String, WordEntry>,
}

impl FileWordStore {
    /// Opens `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records: BTreeMap<String, WordEntry> = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            bincode::deserialize_from(reader)?
        } else {
            BTreeMap::new()
        };
        tracing::info!("[store] opened {} records={}", path.display(), records.len());
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let parent_dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            bincode::serialize_into(&mut writer, &self.records)?;
            writer.flush()?;
        }
        temp_file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl WordStore for FileWordStore {
    fn get_all(&self) -> Result<Vec<WordEntry>> {
        Ok(self.records.values().cloned().collect())
    }

    fn get(&self, word: &str) -> Result<Option<WordEntry>> {
        Ok(self.records.get(word).cloned())
    }

    fn put(&mut self, entry: WordEntry) -> Result<()> {
        self.records.insert(entry.word.clone(), entry);
        self.flush()
    }

    fn delete(&mut self, word: &str) -> Result<bool> {
        let removed = self.records.remove(word).is_some();
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.flush()
    }

    fn replace_all(&mut self, entries: Vec<WordEntry>) -> Result<()> {
        self.records = entries.into_iter().map(|e| (e.word.clone(), e)).collect();
        self.flush()
    }
}

pub fn save_dictionary(dictionary: &WordService, store: &mut dyn WordStore) -> Result<()> {
    store.replace_all(dictionary.entries().collect())?;
    tracing::info!("[store] saved records={}", dictionary.len());
    Ok(())
}

pub fn restore_dictionary(store: &dyn WordStore, hint: &GameSetting) -> Result<WordService> {
    let mut dictionary = WordService::new();
    dictionary.load(store.get_all()?, hint);
    Ok(dictionary)
}

/// Mirrors one dictionary word into `store` under its normalized key.
pub fn store_word(dictionary: &WordService, store: &mut dyn WordStore, word: &str) -> Result<()> {
    let key = normalize_word(word);
    let themes = dictionary.get_themes(&key);
    store.put(WordEntry::new(key, themes))
}

/// Drops the record for `word`, keyed the way `store_word` keys it.
pub fn forget_word(store: &mut dyn WordStore, word: &str) -> Result<bool> {
    store.delete(&normalize_word(word))
}

/// Writes the word list as a JSON array of `{word, themes}`.
pub fn export_json(dictionary: &WordService, path: &Path) -> Result<()> {
    let entries: Vec<WordEntry> = dictionary.entries().collect();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &entries)?;
    writer.flush()?;
    Ok(())
}

pub fn import_json(path: &Path) -> Result<Vec<WordEntry>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str) -> WordEntry {
        WordEntry::new(word, vec!["테마".into()])
    }

    #[test]
    fn memory_store_crud() {
        let mut store = MemoryWordStore::new();
        store.put(entry("사과")).unwrap();
        store.put(entry("바나나")).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.get("사과").unwrap(), Some(entry("사과")));
        assert!(store.delete("사과").unwrap());
        assert!(!store.delete("사과").unwrap());
        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.bin");
        {
            let mut store = FileWordStore::open(&path).unwrap();
            store.put(entry("사과")).unwrap();
            store.put(entry("바나나")).unwrap();
            store.delete("바나나").unwrap();
        }
        let store = FileWordStore::open(&path).unwrap();
        assert_eq!(store.get_all().unwrap(), vec![entry("사과")]);
    }

    #[test]
    fn dictionary_round_trips_through_store() {
        let mut dictionary = WordService::new();
        dictionary.add_word("사과", vec!["과일".into()]);
        dictionary.add_word("apple", vec![]);
        let mut store = MemoryWordStore::new();
        save_dictionary(&dictionary, &mut store).unwrap();

        let restored = restore_dictionary(&store, &GameSetting::default()).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get_themes("사과"), vec!["과일".to_string()]);
    }

    #[test]
    fn json_export_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        let mut dictionary = WordService::new();
        dictionary.add_word("사과", vec!["과일".into()]);
        export_json(&dictionary, &path).unwrap();
        assert_eq!(import_json(&path).unwrap(), vec![WordEntry::new("사과", vec!["과일".into()])]);
    }

    #[test]
    fn single_word_sync_uses_normalized_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.bin");
        let mut dictionary = WordService::new();
        dictionary.add_word("Apple", vec!["fruit".into()]);
        dictionary.add_word(" 사과 ", vec![]);
        {
            let mut store = FileWordStore::open(&path).unwrap();
            store_word(&dictionary, &mut store, "Apple").unwrap();
            store_word(&dictionary, &mut store, " 사과 ").unwrap();
            assert_eq!(store.get("apple").unwrap(), Some(WordEntry::new("apple", vec!["fruit".into()])));
            assert!(forget_word(&mut store, "APPLE!").unwrap());
            assert!(!forget_word(&mut store, "apple").unwrap());
        }
        let store = FileWordStore::open(&path).unwrap();
        assert_eq!(store.get_all().unwrap(), vec![WordEntry::new("사과", vec![])]);
    }
}
