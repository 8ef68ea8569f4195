//! Types produced by the release title parser.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::quality::QualityModel;

/// How a release identifies the item(s) it contains.
///
/// Exactly one variant per parse. A parse without numbering is a title-only
/// release (a movie, or an item whose numbering could not be recognised).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReleaseNumbering {
    /// Date-based release (daily shows, scene-dated releases).
    AirDate {
        date: NaiveDate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        part: Option<u32>,
    },
    /// Season/episode numbering. An empty episode list is a full season pack.
    SeasonEpisode { season: u32, episodes: Vec<u32> },
    /// Absolute episode numbers (anime style).
    Absolute { episodes: Vec<u32> },
    /// Special episode identified by subject title plus item/performer name.
    Special { title: String },
}

impl ReleaseNumbering {
    pub fn kind(&self) -> &'static str {
        match self {
            ReleaseNumbering::AirDate { .. } => "air_date",
            ReleaseNumbering::SeasonEpisode { .. } => "season_episode",
            ReleaseNumbering::Absolute { .. } => "absolute",
            ReleaseNumbering::Special { .. } => "special",
        }
    }

    /// True for a season pack without explicit episode numbers.
    pub fn is_full_season(&self) -> bool {
        matches!(self, ReleaseNumbering::SeasonEpisode { episodes, .. } if episodes.is_empty())
    }
}

/// Structured metadata extracted from a raw release title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReleaseInfo {
    /// The raw title as given to the parser (trimmed).
    pub release_title: String,
    /// Candidate subject titles; the first one is the primary title.
    pub titles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numbering: Option<ReleaseNumbering>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    pub quality: QualityModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
    #[serde(default)]
    pub is_special: bool,
    #[serde(default)]
    pub scene_numbered: bool,
}

impl ParsedReleaseInfo {
    /// Primary subject title.
    pub fn primary_title(&self) -> &str {
        self.titles.first().map(String::as_str).unwrap_or_default()
    }

    /// True when no numbering variant was recognised.
    pub fn is_title_only(&self) -> bool {
        self.numbering.is_none()
    }

    pub fn air_date(&self) -> Option<NaiveDate> {
        match &self.numbering {
            Some(ReleaseNumbering::AirDate { date, .. }) => Some(*date),
            _ => None,
        }
    }

    pub fn season_number(&self) -> Option<u32> {
        match &self.numbering {
            Some(ReleaseNumbering::SeasonEpisode { season, .. }) => Some(*season),
            _ => None,
        }
    }
}

/// Why a title produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailureReason {
    /// Nothing left after trimming.
    Empty,
    /// Numbering or noise was found but no subject title precedes it.
    NoTitle,
    /// The text does not look like a release title at all.
    Unrecognized,
}

impl ParseFailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseFailureReason::Empty => "empty",
            ParseFailureReason::NoTitle => "no_title",
            ParseFailureReason::Unrecognized => "unrecognized",
        }
    }
}

/// A title that could not be parsed. This is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub raw_title: String,
    pub reason: ParseFailureReason,
    /// Best-effort cleaned title for title-only fallbacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_hint: Option<String>,
}

impl ParseFailure {
    pub(crate) fn new(raw_title: &str, reason: ParseFailureReason) -> Self {
        Self {
            raw_title: raw_title.to_string(),
            reason,
            title_hint: None,
        }
    }

    pub(crate) fn with_hint(mut self, hint: Option<String>) -> Self {
        self.title_hint = hint.filter(|h| !h.is_empty());
        self
    }
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unable to parse '{}' ({:?})", self.raw_title, self.reason)
    }
}

/// Library context used by the special-episode fallback.
#[derive(Debug, Clone, Default)]
pub struct SpecialContext {
    /// Titles of the parent series (primary + alternates).
    pub subject_titles: Vec<String>,
    /// Titles of candidate items (episodes/scenes).
    pub item_titles: Vec<String>,
    /// Performer names attached to candidate items.
    pub performers: Vec<String>,
}

impl SpecialContext {
    pub fn new(subject_titles: Vec<String>) -> Self {
        Self {
            subject_titles,
            ..Default::default()
        }
    }

    pub fn with_item_titles(mut self, titles: Vec<String>) -> Self {
        self.item_titles = titles;
        self
    }

    pub fn with_performers(mut self, performers: Vec<String>) -> Self {
        self.performers = performers;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.subject_titles.is_empty()
    }
}
