use crate::{
    core::{
        TangochoError,
        TextRun,
        WordEntry,
    },
    genre::{
        self,
        GenreIndex,
        NodeRef,
    },
    persistence::WordStore,
    render::{
        expand,
        Fragment,
    },
};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyState {
    Idle,
    ShowingWord { index: usize, revealed: bool },
}

/// Partial update for `edit`. A `None` field keeps the stored value — run
/// lists included, so an editor that only touches the meaning leaves the
/// coloring alone. `Some(vec![])` clears a run list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WordPatch {
    pub word: Option<String>,
    pub meaning: Option<String>,
    pub genre: Option<String>,
    pub word_runs: Option<Vec<TextRun>>,
    pub meaning_runs: Option<Vec<TextRun>>,
}

/// Owns the word list, its genre index, and the session cursor. Every
/// mutation persists, rebuilds the index from scratch, and repairs the
/// selection; displays read back through the accessors and hold no state of
/// their own.
pub struct StudyController {
    store: WordStore,
    words: Vec<WordEntry>,
    index: GenreIndex,
    active_group: Option<String>,
    cursor: isize,
    state: StudyState,
    last_persist_error: Option<TangochoError>,
}

impl StudyController {
    pub fn new(store: WordStore) -> Self {
        let words = store.load();
        Self::with_words(store, words)
    }

    /// Starts from a caller-supplied list instead of loading, e.g. a seed
    /// collection after a failed load.
    pub fn with_words(store: WordStore, words: Vec<WordEntry>) -> Self {
        let index = GenreIndex::build(&words);
        StudyController {
            store,
            words,
            index,
            active_group: None,
            cursor: -1,
            state: StudyState::Idle,
            last_persist_error: None,
        }
    }

    // ----- reads --------------------------------------------------------

    pub fn state(&self) -> StudyState {
        self.state
    }

    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    pub fn genre_index(&self) -> &GenreIndex {
        &self.index
    }

    pub fn active_group(&self) -> Option<&str> {
        self.active_group.as_deref()
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            StudyState::ShowingWord { index, .. } => Some(index),
            StudyState::Idle => None,
        }
    }

    pub fn current_word(&self) -> Option<&WordEntry> {
        self.current_index().and_then(|i| self.words.get(i))
    }

    pub fn revealed(&self) -> bool {
        matches!(self.state, StudyState::ShowingWord { revealed: true, .. })
    }

    /// Last failed save, kept until a save succeeds. Frontends surface this;
    /// it is never silently dropped.
    pub fn last_persist_error(&self) -> Option<&TangochoError> {
        self.last_persist_error.as_ref()
    }

    /// Draw-ready fragments for the word field; empty when idle.
    pub fn word_fragments(&self) -> Vec<Fragment> {
        match self.current_word() {
            Some(entry) => expand(&entry.word, entry.word_runs.as_deref()),
            None => Vec::new(),
        }
    }

    /// Fragments for the meaning field, `None` while the meaning is hidden
    /// (the display shows its own placeholder).
    pub fn meaning_fragments(&self) -> Option<Vec<Fragment>> {
        let entry = self.current_word()?;
        if !self.revealed() {
            return None;
        }
        Some(expand(&entry.meaning, entry.meaning_runs.as_deref()))
    }

    // ----- navigation ---------------------------------------------------

    /// Enters a group at a random card. An empty group parks the session in
    /// `Idle` and reports `EmptyGroup`; the caller shows a placeholder.
    pub fn select(&mut self, group_path: &str) -> Result<(), TangochoError> {
        let path = genre::normalize_path(group_path);
        self.active_group = Some(path.clone());

        match self.index.pick_random(&path) {
            Ok(cursor) => {
                self.cursor = cursor as isize;
                self.apply_cursor();
                Ok(())
            }
            Err(e) => {
                self.cursor = -1;
                self.state = StudyState::Idle;
                Err(e)
            }
        }
    }

    /// Tree-pane selection: a genre heading enters the group at a random
    /// card, a word leaf shows exactly that card.
    pub fn select_node(&mut self, node: &NodeRef) -> Result<(), TangochoError> {
        match node {
            NodeRef::Group(path) => self.select(path),
            NodeRef::Word(index) => self.select_word(*index),
        }
    }

    /// Shows a specific card and makes its group the active one.
    pub fn select_word(&mut self, index: usize) -> Result<(), TangochoError> {
        let path = self.index.group_for(index)?.to_string();
        let pos = self
            .index
            .siblings(&path)
            .iter()
            .position(|&i| i == index)
            .ok_or(TangochoError::NotFound(index))?;

        self.active_group = Some(path);
        self.cursor = pos as isize;
        self.apply_cursor();
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), TangochoError> {
        self.step(1)
    }

    pub fn prev(&mut self) -> Result<(), TangochoError> {
        self.step(-1)
    }

    /// Shows the meaning of the current card. No-op when idle or already
    /// revealed.
    pub fn reveal(&mut self) {
        if let StudyState::ShowingWord { index, revealed: false } = self.state {
            self.state = StudyState::ShowingWord { index, revealed: true };
        }
    }

    fn step(&mut self, delta: isize) -> Result<(), TangochoError> {
        let path = match &self.active_group {
            Some(path) => path.clone(),
            None => {
                // Nothing selected yet: start in the first displayed group,
                // which is the uncategorized node.
                let path = genre::UNCATEGORIZED_PATH.to_string();
                self.active_group = Some(path.clone());
                path
            }
        };

        match self.index.advance(&path, self.cursor, delta) {
            Ok(cursor) => {
                self.cursor = cursor as isize;
                self.apply_cursor();
                Ok(())
            }
            Err(e) => {
                self.cursor = -1;
                self.state = StudyState::Idle;
                Err(e)
            }
        }
    }

    // Maps the cursor to an entry and shows it with the meaning hidden.
    fn apply_cursor(&mut self) {
        let path = match &self.active_group {
            Some(path) => path.as_str(),
            None => {
                self.state = StudyState::Idle;
                return;
            }
        };

        let siblings = self.index.siblings(path);
        if self.cursor < 0 || self.cursor as usize >= siblings.len() {
            self.state = StudyState::Idle;
            return;
        }

        let index = siblings[self.cursor as usize];
        self.state = StudyState::ShowingWord { index, revealed: false };
    }

    // ----- mutations ----------------------------------------------------

    /// Appends a card, persists, and reindexes. The shown card stays put;
    /// with nothing shown the cursor clamps onto the active group.
    pub fn add(&mut self, entry: WordEntry) {
        self.words.push(entry);
        self.persist();
        self.index = GenreIndex::build(&self.words);
        self.repair_selection(self.current_index());
    }

    /// Merges `patch` into the entry at `index`; out-of-range indices are
    /// ignored. Persists, reindexes, and re-locates the shown card in its
    /// rebuilt group.
    pub fn edit(&mut self, index: usize, patch: WordPatch) {
        let entry = match self.words.get_mut(index) {
            Some(entry) => entry,
            None => return,
        };

        if let Some(word) = patch.word {
            entry.word = word;
        }
        if let Some(meaning) = patch.meaning {
            entry.meaning = meaning;
        }
        if let Some(genre) = patch.genre {
            entry.genre = if genre.trim().is_empty() { None } else { Some(genre) };
        }
        if let Some(runs) = patch.word_runs {
            entry.word_runs = if runs.is_empty() { None } else { Some(runs) };
        }
        if let Some(runs) = patch.meaning_runs {
            entry.meaning_runs = if runs.is_empty() { None } else { Some(runs) };
        }

        self.persist();
        self.index = GenreIndex::build(&self.words);
        self.repair_selection(self.current_index());
    }

    /// Removes the entries at `indices` (deduplicated, deleted back-to-front
    /// so earlier removals cannot shift later targets). Out-of-range elements
    /// are skipped, not fatal. If the shown card survives it stays current;
    /// otherwise the session falls back to the first card of the active
    /// group, or to `Idle` when the group emptied.
    pub fn delete(&mut self, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }

        let mut targets: Vec<usize> =
            indices.iter().copied().filter(|&i| i < self.words.len()).collect();
        targets.sort_unstable();
        targets.dedup();

        let survivor = match self.state {
            StudyState::ShowingWord { index, .. } if !targets.contains(&index) => {
                Some(index - targets.iter().filter(|&&t| t < index).count())
            }
            _ => None,
        };

        for &i in targets.iter().rev() {
            self.words.remove(i);
        }

        self.persist();
        self.index = GenreIndex::build(&self.words);

        match survivor {
            Some(index) => self.repair_selection(Some(index)),
            None => self.reset_to_first(),
        }
    }

    /// Explicit flush, e.g. on window close.
    pub fn save(&mut self) -> Result<(), TangochoError> {
        self.store.save(&self.words)
    }

    // ----- selection repair ---------------------------------------------

    fn persist(&mut self) {
        match self.store.save(&self.words) {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                eprintln!("Failed to save word list: {}", e);
                self.last_persist_error = Some(e);
            }
        }
    }

    // Keep showing `current` if the active group still lists it, else clamp
    // the cursor back into range.
    fn repair_selection(&mut self, current: Option<usize>) {
        let path = match &self.active_group {
            Some(path) => path.clone(),
            None => return,
        };

        if let Some(index) = current {
            if let Some(pos) = self.index.siblings(&path).iter().position(|&i| i == index) {
                self.cursor = pos as isize;
                self.apply_cursor();
                return;
            }
        }
        self.clamp_cursor(&path);
    }

    fn clamp_cursor(&mut self, path: &str) {
        let size = self.index.siblings(path).len();
        if size == 0 {
            self.cursor = -1;
            self.state = StudyState::Idle;
            return;
        }
        self.cursor = self.cursor.clamp(0, size as isize - 1);
        self.apply_cursor();
    }

    fn reset_to_first(&mut self) {
        let path = match &self.active_group {
            Some(path) => path.clone(),
            None => {
                self.state = StudyState::Idle;
                return;
            }
        };

        if self.index.siblings(&path).is_empty() {
            self.cursor = -1;
            self.state = StudyState::Idle;
        } else {
            self.cursor = 0;
            self.apply_cursor();
        }
    }
}
