use crate::core::TextRun;

/// Script class used for fallback styling when an entry has no explicit runs.
/// The display layer maps it to the Japanese or Latin font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptClass {
    Japanese,
    Other,
}

impl ScriptClass {
    pub fn of(ch: char) -> Self {
        if is_japanese_script(ch) {
            ScriptClass::Japanese
        } else {
            ScriptClass::Other
        }
    }
}

/// Hiragana/Katakana, CJK unified ideographs, and half-width Katakana.
/// These exact ranges drive line wrapping and font grouping downstream, so
/// widening or narrowing them changes what users see.
pub fn is_japanese_script(ch: char) -> bool {
    matches!(ch,
        '\u{3040}'..='\u{30FF}' | '\u{4E00}'..='\u{9FFF}' | '\u{FF66}'..='\u{FF9D}')
}

/// Style attributes carried verbatim from an explicit run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunStyle {
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
}

impl From<&TextRun> for RunStyle {
    fn from(run: &TextRun) -> Self {
        RunStyle {
            fg: run.fg.clone(),
            bg: run.bg.clone(),
            bold: run.bold,
            italic: run.italic,
            underline: run.underline,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FragmentStyle {
    /// Script-based fallback, no colors.
    Script(ScriptClass),
    /// Explicit styling from a run.
    Explicit(RunStyle),
}

/// One piece of text the display draws with a single style.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub style: FragmentStyle,
}

/// Turns a field's text and optional runs into draw-ready fragments.
///
/// Explicit runs win outright: each run becomes one fragment with its style,
/// in order, and script classification is not consulted. Without runs the
/// text splits at Japanese/other script boundaries so mixed text keeps the
/// legacy two-font look.
pub fn expand(text: &str, runs: Option<&[TextRun]>) -> Vec<Fragment> {
    match runs {
        Some(runs) if !runs.is_empty() => runs
            .iter()
            .filter(|run| !run.text.is_empty())
            .map(|run| Fragment {
                text: run.text.clone(),
                style: FragmentStyle::Explicit(run.into()),
            })
            .collect(),
        _ => split_by_script(text),
    }
}

fn split_by_script(text: &str) -> Vec<Fragment> {
    let mut fragments: Vec<Fragment> = Vec::new();

    for ch in text.chars() {
        let class = ScriptClass::of(ch);
        match fragments.last_mut() {
            Some(last) if last.style == FragmentStyle::Script(class) => last.text.push(ch),
            _ => fragments.push(Fragment {
                text: ch.to_string(),
                style: FragmentStyle::Script(class),
            }),
        }
    }

    fragments
}
