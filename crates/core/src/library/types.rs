//! Library entities as seen by the acquisition core.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::quality::Quality;

/// A series (show, site, channel) in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: i64,
    pub title: String,
    /// Default per-episode runtime in minutes.
    #[serde(default)]
    pub runtime: u32,
    #[serde(default = "default_true")]
    pub monitored: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub alternate_titles: Vec<String>,
    /// Qualities the series may be downloaded in. Empty means any.
    #[serde(default)]
    pub allowed_qualities: Vec<Quality>,
}

impl Series {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            runtime: 0,
            monitored: true,
            tags: Vec::new(),
            alternate_titles: Vec::new(),
            allowed_qualities: Vec::new(),
        }
    }

    pub fn with_runtime(mut self, runtime: u32) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_alternate_titles(mut self, titles: Vec<String>) -> Self {
        self.alternate_titles = titles;
        self
    }

    pub fn with_allowed_qualities(mut self, qualities: Vec<Quality>) -> Self {
        self.allowed_qualities = qualities;
        self
    }

    pub fn unmonitored(mut self) -> Self {
        self.monitored = false;
        self
    }

    /// Primary title followed by alternates.
    pub fn all_titles(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.title).chain(self.alternate_titles.iter())
    }
}

/// A single episode (or scene) belonging to a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    pub series_id: i64,
    pub season_number: u32,
    pub episode_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<NaiveDate>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub performers: Vec<String>,
    /// Runtime in minutes; 0 means unknown.
    #[serde(default)]
    pub runtime: u32,
    #[serde(default = "default_true")]
    pub monitored: bool,
}

impl Episode {
    pub fn new(id: i64, series_id: i64, season_number: u32, episode_number: u32) -> Self {
        Self {
            id,
            series_id,
            season_number,
            episode_number,
            absolute_number: None,
            air_date: None,
            title: String::new(),
            performers: Vec::new(),
            runtime: 0,
            monitored: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_absolute_number(mut self, number: u32) -> Self {
        self.absolute_number = Some(number);
        self
    }

    pub fn with_air_date(mut self, date: NaiveDate) -> Self {
        self.air_date = Some(date);
        self
    }

    pub fn with_performers(mut self, performers: Vec<String>) -> Self {
        self.performers = performers;
        self
    }

    pub fn with_runtime(mut self, runtime: u32) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn unmonitored(mut self) -> Self {
        self.monitored = false;
        self
    }

    pub fn key(&self) -> LibraryItemKey {
        LibraryItemKey::Episode(self.id)
    }
}

/// A movie in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Runtime in minutes; 0 means unknown.
    #[serde(default)]
    pub runtime: u32,
    #[serde(default = "default_true")]
    pub monitored: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub allowed_qualities: Vec<Quality>,
}

impl Movie {
    pub fn new(id: i64, title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            id,
            title: title.into(),
            year,
            runtime: 0,
            monitored: true,
            tags: Vec::new(),
            allowed_qualities: Vec::new(),
        }
    }

    pub fn with_runtime(mut self, runtime: u32) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_allowed_qualities(mut self, qualities: Vec<Quality>) -> Self {
        self.allowed_qualities = qualities;
        self
    }

    pub fn unmonitored(mut self) -> Self {
        self.monitored = false;
        self
    }

    pub fn key(&self) -> LibraryItemKey {
        LibraryItemKey::Movie(self.id)
    }
}

/// Identity of a searchable library item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum LibraryItemKey {
    Episode(i64),
    Movie(i64),
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_all_titles() {
        let series = Series::new(1, "The Office")
            .with_alternate_titles(vec!["The Office US".to_string()]);
        let titles: Vec<&String> = series.all_titles().collect();
        assert_eq!(titles, vec!["The Office", "The Office US"]);
    }

    #[test]
    fn test_item_key_serialization() {
        let key = LibraryItemKey::Episode(42);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"type":"episode","id":42}"#);
        let parsed: LibraryItemKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_episode_defaults_from_json() {
        let json = r#"{"id": 1, "series_id": 2, "season_number": 1, "episode_number": 3}"#;
        let episode: Episode = serde_json::from_str(json).unwrap();
        assert!(episode.monitored);
        assert_eq!(episode.runtime, 0);
        assert!(episode.air_date.is_none());
    }
}
