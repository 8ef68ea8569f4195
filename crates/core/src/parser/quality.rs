//! Quality and revision detection from release titles.

use crate::quality::{Quality, QualityModel, Revision};

use super::clean::words;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Remux,
    Bluray,
    WebDl,
    WebRip,
    Hdtv,
    Dvd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    R480,
    R720,
    R1080,
    R2160,
}

fn has_pair(tokens: &[String], first: &str, second: &str) -> bool {
    tokens.windows(2).any(|w| w[0] == first && w[1] == second)
}

fn has_any(tokens: &[String], candidates: &[&str]) -> bool {
    tokens.iter().any(|t| candidates.contains(&t.as_str()))
}

fn detect_resolution(tokens: &[String]) -> Option<Resolution> {
    if has_any(tokens, &["2160p", "4k", "uhd"]) {
        Some(Resolution::R2160)
    } else if has_any(tokens, &["1080p", "1080i"]) {
        Some(Resolution::R1080)
    } else if has_any(tokens, &["720p"]) {
        Some(Resolution::R720)
    } else if has_any(tokens, &["480p", "480i", "576p", "360p"]) {
        Some(Resolution::R480)
    } else {
        None
    }
}

fn detect_source(tokens: &[String]) -> Option<Source> {
    if has_any(tokens, &["remux"]) {
        Some(Source::Remux)
    } else if has_any(tokens, &["bluray", "bdrip", "brrip", "bd"]) || has_pair(tokens, "blu", "ray")
    {
        Some(Source::Bluray)
    } else if has_any(tokens, &["webrip"]) || has_pair(tokens, "web", "rip") {
        Some(Source::WebRip)
    } else if has_any(tokens, &["webdl", "web", "amzn", "nf", "dsnp", "hmax"]) {
        Some(Source::WebDl)
    } else if has_any(tokens, &["hdtv", "pdtv", "sdtv", "dsr", "tvrip"]) {
        Some(Source::Hdtv)
    } else if has_any(tokens, &["dvd", "dvdrip", "dvd5", "dvd9"]) {
        Some(Source::Dvd)
    } else {
        None
    }
}

fn combine(source: Option<Source>, resolution: Option<Resolution>) -> Quality {
    use Resolution::*;
    match (source, resolution) {
        (Some(Source::Remux), Some(R2160)) => Quality::Remux2160p,
        (Some(Source::Remux), _) => Quality::Remux1080p,
        (Some(Source::Bluray), Some(R2160)) => Quality::Bluray2160p,
        (Some(Source::Bluray), Some(R1080)) => Quality::Bluray1080p,
        (Some(Source::Bluray), Some(R720)) => Quality::Bluray720p,
        (Some(Source::Bluray), _) => Quality::Bluray480p,
        (Some(Source::WebDl), Some(R2160)) => Quality::WebDl2160p,
        (Some(Source::WebDl), Some(R1080)) => Quality::WebDl1080p,
        (Some(Source::WebDl), Some(R720)) => Quality::WebDl720p,
        (Some(Source::WebDl), _) => Quality::WebDl480p,
        (Some(Source::WebRip), Some(R2160)) => Quality::WebRip2160p,
        (Some(Source::WebRip), Some(R1080)) => Quality::WebRip1080p,
        (Some(Source::WebRip), Some(R720)) => Quality::WebRip720p,
        (Some(Source::WebRip), _) => Quality::WebRip480p,
        (Some(Source::Hdtv), Some(R2160)) => Quality::Hdtv2160p,
        (Some(Source::Hdtv), Some(R1080)) => Quality::Hdtv1080p,
        (Some(Source::Hdtv), Some(R720)) => Quality::Hdtv720p,
        (Some(Source::Hdtv), _) => Quality::Sdtv,
        (Some(Source::Dvd), _) => Quality::Dvd,
        (None, Some(R2160)) => Quality::Hdtv2160p,
        (None, Some(R1080)) => Quality::Hdtv1080p,
        (None, Some(R720)) => Quality::Hdtv720p,
        (None, Some(R480)) => Quality::Sdtv,
        (None, None) => Quality::Unknown,
    }
}

fn anime_version(token: &str) -> Option<u32> {
    // "v2" or "12v2"
    let idx = token.rfind('v')?;
    let (prefix, suffix) = token.split_at(idx);
    if !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let version: u32 = suffix[1..].parse().ok()?;
    (2..=9).contains(&version).then_some(version)
}

fn detect_revision(raw: &str, tokens: &[String]) -> Revision {
    let mut revision = Revision::default();

    if has_any(tokens, &["proper", "repack", "rerip"]) {
        revision.version = 2;
        revision.is_repack = has_any(tokens, &["repack", "rerip"]);
    }

    if let Some(version) = tokens.iter().find_map(|t| anime_version(t)) {
        revision.version = version;
    }

    // REAL is only meaningful in upper case; "real" is a common title word.
    revision.real = raw
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| *t == "REAL")
        .count() as u32;

    revision
}

/// Detect the quality model of a release title.
pub fn parse_quality(title: &str) -> QualityModel {
    let tokens = words(title);
    QualityModel {
        quality: combine(detect_source(&tokens), detect_resolution(&tokens)),
        revision: detect_revision(title, &tokens),
    }
}

/// True when the token is a recognised quality, source or codec marker.
pub(crate) fn is_quality_token(token: &str) -> bool {
    const MARKERS: &[&str] = &[
        "480p", "480i", "576p", "720p", "1080p", "1080i", "2160p", "4k", "uhd", "hdtv", "pdtv",
        "sdtv", "dsr", "web", "webdl", "webrip", "bluray", "bdrip", "brrip", "remux", "dvd",
        "dvdrip", "x264", "x265", "h264", "h265", "hevc", "xvid", "proper", "repack", "internal",
        "multi", "complete",
    ];
    MARKERS.contains(&token.to_lowercase().as_str())
}
