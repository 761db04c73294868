use regex::Regex;
use std::sync::LazyLock;

/// Minimum similarity (0–100) a synonym needs against either title.
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 30;

/// Whole-string match of romanized Japanese syllables.
///
/// Vowels, consonant(s) + vowel, the palatal/affricate digraphs, the
/// syllabic "n", separators and digits.
static RE_ROMANIZED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:[aeiou]|[bkstgzdnhpmr]{1,2}[aeiou]|(?:sh|ch|j|ts|f|y|w|k)(?:y[auo]|[aeiou])|n|\W|[0-9])+$",
    )
    .unwrap()
});

/// Decides which alternate titles are worth keeping for an entry.
#[derive(Debug, Clone, Copy)]
pub struct SynonymFilter {
    threshold: u32,
}

impl SynonymFilter {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Keep a candidate when it resembles either title or reads as romaji.
    pub fn accepts(&self, candidate: &str, english: &str, romaji: &str) -> bool {
        if !candidate.is_ascii() {
            return false;
        }
        similarity(candidate, english) > self.threshold
            || similarity(candidate, romaji) > self.threshold
            || is_romanized(candidate)
    }
}

impl Default for SynonymFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

/// [`SynonymFilter::accepts`] with the default threshold.
pub fn is_likely_synonym(candidate: &str, english: &str, romaji: &str) -> bool {
    SynonymFilter::default().accepts(candidate, english, romaji)
}

/// Indel similarity on a 0–100 scale: `2 * LCS / (len(a) + len(b))`.
///
/// Unlike edit distance over the longer string, this keeps short
/// abbreviations ("AoT") within reach of their full title.
pub fn similarity(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let lcs = longest_common_subsequence(&a, &b);
    ((200 * lcs) as f64 / total as f64).round_ties_even() as u32
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

fn is_romanized(candidate: &str) -> bool {
    RE_ROMANIZED.is_match(candidate)
}
