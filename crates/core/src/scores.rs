//! Score tables
//!
//! A [`ScoreList`] is always sorted by descending score; equal scores keep the
//! order they arrived in. The textual form is one `name:score` pair per line,
//! shared by the server's `SCORES`/`HISCORES` messages and local score files.

use crate::types::{ScoreEntry, MAX_SCORES};

/// Parse a single `name:score` line
///
/// Returns None for lines without a colon or with a non-numeric score.
pub fn parse_score_line(line: &str) -> Option<ScoreEntry> {
    let (name, score) = line.trim().split_once(':')?;
    let score = score.trim().parse::<u32>().ok()?;
    Some(ScoreEntry::new(name.trim(), score))
}

/// Format a single entry as `name:score`
pub fn format_score_line(entry: &ScoreEntry) -> String {
    format!("{}:{}", entry.name, entry.score)
}

/// Descending, stable-sorted list of scores
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreList {
    entries: Vec<ScoreEntry>,
}

impl ScoreList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries in arrival order
    pub fn from_entries(entries: impl IntoIterator<Item = ScoreEntry>) -> Self {
        let mut entries: Vec<ScoreEntry> = entries.into_iter().collect();
        // `sort_by` is stable: ties keep arrival order.
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Self { entries }
    }

    /// Parse newline-separated `name:score` lines, skipping malformed ones
    pub fn parse_lines(text: &str) -> Self {
        Self::from_entries(text.lines().filter_map(parse_score_line))
    }

    /// The highest [`MAX_SCORES`] entries as `name:score` lines
    pub fn to_lines(&self) -> String {
        let mut out = String::new();
        for entry in self.top(MAX_SCORES) {
            out.push_str(&format_score_line(entry));
            out.push('\n');
        }
        out
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// At most `n` leading entries
    pub fn top(&self, n: usize) -> &[ScoreEntry] {
        &self.entries[..self.entries.len().min(n)]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a score would enter the persisted top table
    pub fn qualifies(&self, score: u32) -> bool {
        let table = self.top(MAX_SCORES);
        table.len() < MAX_SCORES || table.iter().any(|e| e.score < score)
    }

    /// Insert below every entry with an equal or higher score
    ///
    /// Colons are stripped from the name so the entry stays representable on
    /// the wire. Returns the position of the new entry.
    pub fn insert(&mut self, mut entry: ScoreEntry) -> usize {
        entry.name.retain(|c| c != ':');
        let pos = self
            .entries
            .iter()
            .position(|e| e.score < entry.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        pos
    }
}
