//! Season and ending-number extraction from catalog titles.
//!
//! Two signals are read from a title:
//! - an explicit season marker ("2nd Season", "Season 2", "Part 2", "Cour 2")
//! - a trailing numeral ("Fate/Zero II", "Mob Psycho 100")
//!
//! An explicit marker always wins; the trailing numeral only decides the
//! season when no marker is present on either title.

use regex::Regex;
use std::sync::LazyLock;

/// Which phrasing a season marker used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonMarkerKind {
    /// "3rd Season".
    Ordinal,
    /// "Season 3".
    Explicit,
    /// "Part 3".
    Part,
    /// "Cour 3".
    Cour,
}

/// Result of a successful season marker search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonMarker {
    pub kind: SeasonMarkerKind,
    pub number: u32,
}

// ── Regex patterns ──────────────────────────────────────────────

static RE_SEASON_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(?P<ordinal>\d+)(?:st|nd|rd|th)\s+Season\b)|(?:\bSeason\s+(?P<explicit>\d+))|(?:\bPart\s+(?P<part>\d+))|(?:\bCour\s+(?P<cour>\d+))",
    )
    .unwrap()
});

/// Trailing integer or well-formed Roman numeral, anchored at the end.
static RE_ENDING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(?P<digits>\d+)|(?P<roman>M{0,3}(?:CM|CD|D?C{0,3})(?:XC|XL|L?X{0,3})(?:IX|IV|V?I{0,3})))$",
    )
    .unwrap()
});

const MARKER_GROUPS: [(&str, SeasonMarkerKind); 4] = [
    ("ordinal", SeasonMarkerKind::Ordinal),
    ("explicit", SeasonMarkerKind::Explicit),
    ("part", SeasonMarkerKind::Part),
    ("cour", SeasonMarkerKind::Cour),
];

/// Find the first season marker in a title.
pub fn season_marker(title: &str) -> Option<SeasonMarker> {
    let caps = RE_SEASON_MARKER.captures(title)?;
    MARKER_GROUPS.iter().find_map(|&(group, kind)| {
        let number = caps.name(group)?.as_str().parse().ok()?;
        Some(SeasonMarker { kind, number })
    })
}

/// Season number from an explicit marker, if the title has one.
pub fn extract_season_number(title: &str) -> Option<u32> {
    season_marker(title).map(|m| m.number)
}

/// Trailing integer or Roman numeral of a title. Zero is not an ending number.
pub fn extract_ending_number(title: &str) -> Option<u32> {
    let caps = RE_ENDING_NUMBER.captures(title.trim_end())?;

    let number = if let Some(digits) = caps.name("digits") {
        digits.as_str().parse().ok()?
    } else {
        let roman = caps.name("roman")?.as_str();
        if roman.is_empty() {
            return None;
        }
        roman_to_u32(roman)?
    };

    (number > 0).then_some(number)
}

/// Season number a record represents, judging by both of its titles.
pub fn resolve_season_number(english: &str, romaji: &str) -> u32 {
    let titles = [english, romaji];

    let explicit = titles.iter().filter_map(|t| extract_season_number(t)).max();
    match explicit {
        Some(number) => number.max(1),
        None => titles
            .iter()
            .filter_map(|t| extract_ending_number(t))
            .max()
            .unwrap_or(1),
    }
}

/// Convert an already validated Roman numeral.
fn roman_to_u32(s: &str) -> Option<u32> {
    let mut total: u32 = 0;
    let mut prev = 0;

    for c in s.chars().rev() {
        let value = match c {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => return None,
        };
        if value < prev {
            total = total.checked_sub(value)?;
        } else {
            total += value;
        }
        prev = value;
    }

    (total > 0).then_some(total)
}
