//! Release qualities, revisions and per-quality size definitions.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Video quality of a release (source + resolution).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    #[default]
    Unknown,
    Sdtv,
    Dvd,
    #[serde(rename = "webdl_480p")]
    WebDl480p,
    #[serde(rename = "webrip_480p")]
    WebRip480p,
    #[serde(rename = "bluray_480p")]
    Bluray480p,
    #[serde(rename = "hdtv_720p")]
    Hdtv720p,
    #[serde(rename = "webrip_720p")]
    WebRip720p,
    #[serde(rename = "webdl_720p")]
    WebDl720p,
    #[serde(rename = "bluray_720p")]
    Bluray720p,
    #[serde(rename = "hdtv_1080p")]
    Hdtv1080p,
    #[serde(rename = "webrip_1080p")]
    WebRip1080p,
    #[serde(rename = "webdl_1080p")]
    WebDl1080p,
    #[serde(rename = "bluray_1080p")]
    Bluray1080p,
    #[serde(rename = "remux_1080p")]
    Remux1080p,
    #[serde(rename = "hdtv_2160p")]
    Hdtv2160p,
    #[serde(rename = "webrip_2160p")]
    WebRip2160p,
    #[serde(rename = "webdl_2160p")]
    WebDl2160p,
    #[serde(rename = "bluray_2160p")]
    Bluray2160p,
    #[serde(rename = "remux_2160p")]
    Remux2160p,
}

impl Quality {
    /// All known qualities, lowest weight first.
    pub const ALL: [Quality; 20] = [
        Quality::Unknown,
        Quality::Sdtv,
        Quality::Dvd,
        Quality::WebDl480p,
        Quality::WebRip480p,
        Quality::Bluray480p,
        Quality::Hdtv720p,
        Quality::WebRip720p,
        Quality::WebDl720p,
        Quality::Bluray720p,
        Quality::Hdtv1080p,
        Quality::WebRip1080p,
        Quality::WebDl1080p,
        Quality::Bluray1080p,
        Quality::Remux1080p,
        Quality::Hdtv2160p,
        Quality::WebRip2160p,
        Quality::WebDl2160p,
        Quality::Bluray2160p,
        Quality::Remux2160p,
    ];

    /// Display name used in logs and rejection reasons.
    pub fn name(&self) -> &'static str {
        match self {
            Quality::Unknown => "Unknown",
            Quality::Sdtv => "SDTV",
            Quality::Dvd => "DVD",
            Quality::WebDl480p => "WEBDL-480p",
            Quality::WebRip480p => "WEBRip-480p",
            Quality::Bluray480p => "Bluray-480p",
            Quality::Hdtv720p => "HDTV-720p",
            Quality::WebRip720p => "WEBRip-720p",
            Quality::WebDl720p => "WEBDL-720p",
            Quality::Bluray720p => "Bluray-720p",
            Quality::Hdtv1080p => "HDTV-1080p",
            Quality::WebRip1080p => "WEBRip-1080p",
            Quality::WebDl1080p => "WEBDL-1080p",
            Quality::Bluray1080p => "Bluray-1080p",
            Quality::Remux1080p => "Remux-1080p",
            Quality::Hdtv2160p => "HDTV-2160p",
            Quality::WebRip2160p => "WEBRip-2160p",
            Quality::WebDl2160p => "WEBDL-2160p",
            Quality::Bluray2160p => "Bluray-2160p",
            Quality::Remux2160p => "Remux-2160p",
        }
    }

    /// Ranking weight; higher is better.
    pub fn weight(&self) -> u32 {
        Quality::ALL
            .iter()
            .position(|q| q == self)
            .map(|p| p as u32)
            .unwrap_or(0)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Release revision (PROPER/REPACK/vN and REAL markers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Revision {
    pub version: u32,
    pub real: u32,
    #[serde(default)]
    pub is_repack: bool,
}

impl Default for Revision {
    fn default() -> Self {
        Self {
            version: 1,
            real: 0,
            is_repack: false,
        }
    }
}

impl PartialOrd for Revision {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Revision {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.real
            .cmp(&other.real)
            .then(self.version.cmp(&other.version))
    }
}

/// Parsed quality of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityModel {
    pub quality: Quality,
    #[serde(default)]
    pub revision: Revision,
}

impl QualityModel {
    pub fn new(quality: Quality) -> Self {
        Self {
            quality,
            revision: Revision::default(),
        }
    }
}

/// Size bounds for one quality, in megabytes per minute of runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityDefinition {
    pub quality: Quality,
    pub min_size_per_minute: f64,
    /// `None` means no upper bound.
    #[serde(default)]
    pub max_size_per_minute: Option<f64>,
}

impl QualityDefinition {
    pub fn new(quality: Quality, min_size_per_minute: f64, max_size_per_minute: Option<f64>) -> Self {
        Self {
            quality,
            min_size_per_minute,
            max_size_per_minute,
        }
    }

    /// A definition that accepts any size.
    pub fn unbounded(quality: Quality) -> Self {
        Self::new(quality, 0.0, None)
    }
}

/// Read-only access to configured quality definitions.
pub trait QualityDefinitionLookup: Send + Sync {
    fn get(&self, quality: Quality) -> QualityDefinition;
}

/// Quality definitions built once from configuration.
///
/// Qualities without an explicit entry are unbounded.
#[derive(Debug, Clone, Default)]
pub struct StaticQualityDefinitions {
    definitions: HashMap<Quality, QualityDefinition>,
}

impl StaticQualityDefinitions {
    pub fn new(definitions: impl IntoIterator<Item = QualityDefinition>) -> Self {
        Self {
            definitions: definitions.into_iter().map(|d| (d.quality, d)).collect(),
        }
    }

    /// Defaults loosely following common community guides.
    pub fn with_defaults() -> Self {
        Self::new(Quality::ALL.iter().map(|q| {
            let (min, max) = match q {
                Quality::Unknown => (1.0, Some(199.9)),
                Quality::Sdtv | Quality::Dvd => (2.0, Some(100.0)),
                Quality::WebDl480p | Quality::WebRip480p | Quality::Bluray480p => {
                    (2.0, Some(100.0))
                }
                Quality::Hdtv720p | Quality::WebRip720p | Quality::WebDl720p => {
                    (3.0, Some(137.3))
                }
                Quality::Bluray720p => (4.0, Some(137.3)),
                Quality::Hdtv1080p | Quality::WebRip1080p | Quality::WebDl1080p => {
                    (4.0, Some(137.3))
                }
                Quality::Bluray1080p => (4.0, Some(137.3)),
                Quality::Remux1080p => (35.0, None),
                Quality::Hdtv2160p | Quality::WebRip2160p | Quality::WebDl2160p => {
                    (35.0, None)
                }
                Quality::Bluray2160p => (35.0, None),
                Quality::Remux2160p => (35.0, None),
            };
            QualityDefinition::new(*q, min, max)
        }))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl QualityDefinitionLookup for StaticQualityDefinitions {
    fn get(&self, quality: Quality) -> QualityDefinition {
        self.definitions
            .get(&quality)
            .copied()
            .unwrap_or_else(|| QualityDefinition::unbounded(quality))
    }
}
