use std::str::FromStr;

use chrono::Datelike;

/// Anime broadcast season (quarter of the year).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimeSeason {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl AnimeSeason {
    pub const ALL: &[AnimeSeason] = &[Self::Winter, Self::Spring, Self::Summer, Self::Fall];

    /// Convert to AniList GraphQL `MediaSeason` enum value.
    pub fn to_anilist_str(self) -> &'static str {
        match self {
            Self::Winter => "WINTER",
            Self::Spring => "SPRING",
            Self::Summer => "SUMMER",
            Self::Fall => "FALL",
        }
    }

    /// Position within the year, 0 for winter through 3 for fall.
    pub fn index(self) -> usize {
        match self {
            Self::Winter => 0,
            Self::Spring => 1,
            Self::Summer => 2,
            Self::Fall => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Determine the current anime season from the current month.
    pub fn current() -> Self {
        let month = chrono::Utc::now().month();
        match month {
            1..=3 => Self::Winter,
            4..=6 => Self::Spring,
            7..=9 => Self::Summer,
            _ => Self::Fall,
        }
    }

    pub fn current_year() -> i32 {
        chrono::Utc::now().year()
    }
}

impl FromStr for AnimeSeason {
    type Err = String;

    /// Accepts a season name in any case or its index `0`–`3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index).ok_or_else(|| format!("season index {index} is not 0-3"));
        }
        match s.to_ascii_lowercase().as_str() {
            "winter" => Ok(Self::Winter),
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "fall" | "autumn" => Ok(Self::Fall),
            other => Err(format!("unknown season '{other}'")),
        }
    }
}

impl std::fmt::Display for AnimeSeason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Winter => write!(f, "Winter"),
            Self::Spring => write!(f, "Spring"),
            Self::Summer => write!(f, "Summer"),
            Self::Fall => write!(f, "Fall"),
        }
    }
}
