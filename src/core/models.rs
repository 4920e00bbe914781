use serde::{
    Deserialize,
    Serialize,
};

/// A styled span of text inside a word or meaning. Attributes are independent
/// and only persisted when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TextRun {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        TextRun { text: text.into(), ..Default::default() }
    }
}

/// One flashcard. The run lists are optional overlays: when present they take
/// display precedence over the plain `word`/`meaning` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WordEntry {
    pub word: String,
    pub meaning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_runs: Option<Vec<TextRun>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning_runs: Option<Vec<TextRun>>,
}

impl WordEntry {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        WordEntry { word: word.into(), meaning: meaning.into(), ..Default::default() }
    }

    pub fn with_genre(
        word: impl Into<String>,
        meaning: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        WordEntry { genre: Some(genre.into()), ..WordEntry::new(word, meaning) }
    }

    /// Raw genre string, `""` when absent.
    pub fn genre_raw(&self) -> &str {
        self.genre.as_deref().unwrap_or("")
    }
}
