use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde_json::Value;

use crate::core::{
    TangochoError,
    TextRun,
    WordEntry,
};

const APP_NAME: &str = "tangocho";
const WORDS_FILE: &str = "words.json";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

/// Loads and saves the word list as a single JSON document.
///
/// The document is either a bare array of records or `{"words": [...]}`.
/// Loading is tolerant: malformed records are dropped field-by-field and a
/// file that is not JSON at all is moved aside instead of aborting startup.
#[derive(Debug, Clone)]
pub struct WordStore {
    path: PathBuf,
}

impl Default for WordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WordStore {
    pub fn new() -> Self {
        WordStore { path: get_app_data_dir().join(WORDS_FILE) }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        WordStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Vec<WordEntry> {
        if !self.path.exists() {
            return Vec::new();
        }

        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("Failed to read {}: {}", self.path.display(), e);
                self.quarantine();
                return Vec::new();
            }
        };

        let root: Value = match serde_json::from_str(&raw) {
            Ok(root) => root,
            Err(e) => {
                eprintln!("Failed to parse {}: {}", self.path.display(), e);
                self.quarantine();
                return Vec::new();
            }
        };

        let records = match &root {
            Value::Array(records) => records.as_slice(),
            Value::Object(map) => match map.get("words") {
                Some(Value::Array(records)) => records.as_slice(),
                _ => return Vec::new(),
            },
            _ => return Vec::new(),
        };

        records.iter().filter_map(sanitize_record).collect()
    }

    /// Writes the full list, pretty-printed with non-ASCII left intact, via a
    /// sibling temp file so a crash mid-write cannot truncate the target.
    pub fn save(&self, words: &[WordEntry]) -> Result<(), TangochoError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(words)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    // Rename a broken words file to words.bad-<timestamp>.json so the next
    // save does not overwrite the evidence.
    fn quarantine(&self) {
        let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let stem = self.path.file_stem().and_then(|s| s.to_str()).unwrap_or("words");
        let ext = match self.path.extension().and_then(|s| s.to_str()) {
            Some(ext) => format!(".{}", ext),
            None => String::new(),
        };
        let backup = self.path.with_file_name(format!("{}.bad-{}{}", stem, ts, ext));

        match fs::rename(&self.path, &backup) {
            Ok(()) => eprintln!("Moved unreadable word list to {}", backup.display()),
            Err(e) => eprintln!("Failed to move {} aside: {}", self.path.display(), e),
        }
    }
}

fn sanitize_record(record: &Value) -> Option<WordEntry> {
    let map = record.as_object()?;

    let mut entry = WordEntry {
        word: string_field(map.get("word")),
        meaning: string_field(map.get("meaning")),
        genre: None,
        word_runs: None,
        meaning_runs: None,
    };

    if let Some(Value::String(genre)) = map.get("genre") {
        if !genre.is_empty() {
            entry.genre = Some(genre.clone());
        }
    }

    entry.word_runs = sanitize_runs(map.get("word_runs"));
    entry.meaning_runs = sanitize_runs(map.get("meaning_runs"));

    Some(entry)
}

fn string_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

// A runs list survives only as an array of objects with a string "text";
// a list emptied by filtering is dropped rather than stored as [].
fn sanitize_runs(value: Option<&Value>) -> Option<Vec<TextRun>> {
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return None,
    };

    let runs: Vec<TextRun> = items.iter().filter_map(sanitize_run).collect();
    if runs.is_empty() {
        None
    } else {
        Some(runs)
    }
}

fn sanitize_run(value: &Value) -> Option<TextRun> {
    let map = value.as_object()?;

    let text = match map.get("text") {
        Some(Value::String(text)) => text.clone(),
        _ => return None,
    };

    let string_attr = |key: &str| match map.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };
    let bool_attr = |key: &str| match map.get(key) {
        Some(Value::Bool(b)) => Some(*b),
        _ => None,
    };

    Some(TextRun {
        text,
        fg: string_attr("fg"),
        bg: string_attr("bg"),
        bold: bool_attr("bold"),
        italic: bool_attr("italic"),
        underline: bool_attr("underline"),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };

    use super::*;

    fn temp_store(name: &str) -> WordStore {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "tangocho-test-{}-{}-{}",
            std::process::id(),
            name,
            n
        ));
        fs::create_dir_all(&dir).unwrap();
        WordStore::with_path(dir.join("words.json"))
    }

    #[test]
    fn missing_file_loads_empty() {
        let store = temp_store("missing");
        assert!(store.load().is_empty());
    }

    #[test]
    fn round_trip_preserves_entries_and_runs() {
        let store = temp_store("roundtrip");

        let entries = vec![
            WordEntry::with_genre("apple", "りんご", "食べ物/果物"),
            WordEntry {
                word_runs: Some(vec![
                    TextRun { fg: Some("red".to_string()), ..TextRun::plain("ab") },
                    TextRun::plain("cd"),
                ]),
                ..WordEntry::new("abcd", "意味")
            },
        ];

        store.save(&entries).unwrap();
        assert_eq!(store.load(), entries);

        // saving what was loaded must not change the document
        store.save(&store.load()).unwrap();
        assert_eq!(store.load(), entries);
    }

    #[test]
    fn saved_document_keeps_japanese_unescaped() {
        let store = temp_store("unescaped");
        store.save(&[WordEntry::new("犬", "dog")]).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("犬"));
        assert!(!raw.contains("\\u"));
    }

    #[test]
    fn words_wrapper_object_is_accepted() {
        let store = temp_store("wrapper");
        fs::write(store.path(), r#"{"words": [{"word": "a", "meaning": "b"}]}"#).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, vec![WordEntry::new("a", "b")]);
    }

    #[test]
    fn malformed_fields_are_dropped_per_record() {
        let store = temp_store("sanitize");
        fs::write(
            store.path(),
            r#"[
                {"word": 5, "meaning": null, "genre": ""},
                {"word": "ok", "meaning": "fine", "genre": 3},
                "not a record",
                {"word": "runs", "meaning": "", "word_runs": [
                    {"text": "keep", "fg": "red", "bold": "yes"},
                    {"fg": "blue"},
                    {"text": 7}
                ]}
            ]"#,
        )
        .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0], WordEntry::new("", ""));
        assert_eq!(loaded[1], WordEntry::new("ok", "fine"));
        assert_eq!(
            loaded[2].word_runs,
            Some(vec![TextRun { fg: Some("red".to_string()), ..TextRun::plain("keep") }])
        );
    }

    #[test]
    fn runs_list_emptied_by_filtering_is_omitted() {
        let store = temp_store("empty-runs");
        fs::write(
            store.path(),
            r#"[{"word": "x", "meaning": "y", "word_runs": [], "meaning_runs": [{"fg": "red"}]}]"#,
        )
        .unwrap();

        let loaded = store.load();
        assert_eq!(loaded[0].word_runs, None);
        assert_eq!(loaded[0].meaning_runs, None);
    }

    #[test]
    fn invalid_json_is_quarantined_and_loads_empty() {
        let store = temp_store("quarantine");
        fs::write(store.path(), "not json").unwrap();

        assert!(store.load().is_empty());
        assert!(!store.path().exists());

        let dir = store.path().parent().unwrap();
        let quarantined = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().starts_with("words.bad-"));
        assert!(quarantined);
    }

    #[test]
    fn wrong_shape_root_loads_empty_without_quarantine() {
        let store = temp_store("wrong-shape");
        fs::write(store.path(), r#"{"notwords": []}"#).unwrap();

        assert!(store.load().is_empty());
        assert!(store.path().exists());
    }

    #[test]
    fn save_replaces_atomically_without_leftover_temp() {
        let store = temp_store("atomic");
        store.save(&[WordEntry::new("a", "b")]).unwrap();
        store.save(&[WordEntry::new("c", "d")]).unwrap();

        assert_eq!(store.load(), vec![WordEntry::new("c", "d")]);

        let dir = store.path().parent().unwrap();
        let leftover = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().ends_with(".tmp"));
        assert!(!leftover);
    }

    #[test]
    fn save_into_unwritable_location_reports_failure() {
        let blocker = temp_store("blocked");
        fs::write(blocker.path(), "file, not a directory").unwrap();

        // parent of the target path is a regular file
        let store = WordStore::with_path(blocker.path().join("words.json"));
        assert!(store.save(&[WordEntry::new("a", "b")]).is_err());
    }
}
