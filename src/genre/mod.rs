use std::collections::{
    BTreeMap,
    BTreeSet,
    HashMap,
};

use rand::Rng;

use crate::core::{
    TangochoError,
    WordEntry,
};

/// Canonical path of the group for entries with no genre.
pub const UNCATEGORIZED_PATH: &str = "";

/// Label the tree pane shows for that group.
pub const UNCATEGORIZED_LABEL: &str = "(未分類)";

/// Collapses a raw genre string to its canonical path: surrounding whitespace
/// ignored, empty `/` segments dropped. `"食べ物//果物 "` and `"食べ物/果物"`
/// name the same group.
pub fn normalize_path(raw: &str) -> String {
    raw.trim().split('/').filter(|seg| !seg.is_empty()).collect::<Vec<_>>().join("/")
}

/// Identity of a row in the genre tree: a genre heading or a word leaf.
/// Typed, so displays never round-trip through `"g:food"`/`"w:3"` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    Group(String),
    Word(usize),
}

/// One node of the displayed genre tree. `members` holds only the entries
/// tagged with exactly this path; descendants keep their own.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreNode {
    pub path: String,
    /// Last path segment, used as the node label.
    pub name: String,
    pub members: Vec<usize>,
    pub children: Vec<GenreNode>,
}

impl GenreNode {
    /// Member count including every descendant, for the tree pane's badges.
    pub fn word_count(&self) -> usize {
        self.members.len() + self.children.iter().map(GenreNode::word_count).sum::<usize>()
    }
}

/// Grouping of the word list by genre path, recomputed from scratch after
/// every change to the list. The index is the single source of truth for
/// sibling order; displays project it and never feed an order back.
///
/// Display order is the depth-first walk of the tree with the uncategorized
/// node first and named siblings sorted by segment.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreIndex {
    roots: Vec<GenreNode>,
    members: HashMap<String, Vec<usize>>,
    owner: Vec<String>,
}

impl Default for GenreIndex {
    fn default() -> Self {
        Self::build(&[])
    }
}

impl GenreIndex {
    pub fn build(entries: &[WordEntry]) -> Self {
        let mut members: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut owner = Vec::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            let path = normalize_path(entry.genre_raw());
            members.entry(path.clone()).or_default().push(i);
            owner.push(path);
        }

        // The uncategorized node is always shown, even with nothing in it.
        let mut roots = vec![GenreNode {
            path: UNCATEGORIZED_PATH.to_string(),
            name: UNCATEGORIZED_LABEL.to_string(),
            members: members.get(UNCATEGORIZED_PATH).cloned().unwrap_or_default(),
            children: Vec::new(),
        }];

        for name in child_segments(&members, "") {
            roots.push(build_node(&members, "", &name));
        }

        GenreIndex { roots, members: members.into_iter().collect(), owner }
    }

    /// Top-level nodes of the displayed tree, uncategorized first.
    pub fn roots(&self) -> &[GenreNode] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
    }

    /// Path of the group that owns the entry.
    pub fn group_for(&self, entry_index: usize) -> Result<&str, TangochoError> {
        self.owner
            .get(entry_index)
            .map(String::as_str)
            .ok_or(TangochoError::NotFound(entry_index))
    }

    /// Entries tagged with exactly this path, in word-list order.
    pub fn siblings(&self, group_path: &str) -> &[usize] {
        self.members.get(&normalize_path(group_path)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries under this path and all of its sub-genres, in display order.
    pub fn collect_under(&self, group_path: &str) -> Vec<usize> {
        let path = normalize_path(group_path);
        let mut out = Vec::new();
        if let Some(node) = self.find_node(&path) {
            collect_node(node, &mut out);
        }
        out
    }

    /// Moves a cursor by `delta` within the group, wrapping at both ends.
    /// An unset cursor (-1) advanced by +1 lands on the first member.
    pub fn advance(
        &self,
        group_path: &str,
        cursor: isize,
        delta: isize,
    ) -> Result<usize, TangochoError> {
        let size = self.siblings(group_path).len();
        if size == 0 {
            return Err(TangochoError::EmptyGroup(normalize_path(group_path)));
        }
        Ok((cursor + delta).rem_euclid(size as isize) as usize)
    }

    /// Uniform random cursor for the group, from the OS-seeded generator so
    /// repeated sessions do not open on the same card.
    pub fn pick_random(&self, group_path: &str) -> Result<usize, TangochoError> {
        let size = self.siblings(group_path).len();
        if size == 0 {
            return Err(TangochoError::EmptyGroup(normalize_path(group_path)));
        }
        Ok(rand::rng().random_range(0..size))
    }

    fn find_node(&self, path: &str) -> Option<&GenreNode> {
        let mut stack: Vec<&GenreNode> = self.roots.iter().collect();
        while let Some(node) = stack.pop() {
            if node.path == path {
                return Some(node);
            }
            stack.extend(node.children.iter());
        }
        None
    }
}

// Distinct next segments of the tagged paths directly below `prefix`,
// sorted. Intermediate nodes exist even when no entry is tagged with the
// prefix itself.
fn child_segments(members: &BTreeMap<String, Vec<usize>>, prefix: &str) -> Vec<String> {
    let mut segments = BTreeSet::new();

    for path in members.keys() {
        let rest = if prefix.is_empty() {
            path.as_str()
        } else {
            match path.strip_prefix(prefix).and_then(|r| r.strip_prefix('/')) {
                Some(rest) => rest,
                None => continue,
            }
        };
        if rest.is_empty() {
            continue;
        }
        if let Some(first) = rest.split('/').next() {
            segments.insert(first.to_string());
        }
    }

    segments.into_iter().collect()
}

fn build_node(members: &BTreeMap<String, Vec<usize>>, prefix: &str, name: &str) -> GenreNode {
    let path =
        if prefix.is_empty() { name.to_string() } else { format!("{}/{}", prefix, name) };

    let children = child_segments(members, &path)
        .into_iter()
        .map(|child| build_node(members, &path, &child))
        .collect();

    GenreNode {
        name: name.to_string(),
        members: members.get(&path).cloned().unwrap_or_default(),
        children,
        path,
    }
}

fn collect_node(node: &GenreNode, out: &mut Vec<usize>) {
    out.extend(node.members.iter().copied());
    for child in &node.children {
        collect_node(child, out);
    }
}
