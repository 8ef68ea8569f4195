//! Release title parsing.
//!
//! Titles are run through an ordered chain of matchers, most specific first.
//! A matcher either produces a complete, validated numbering or is skipped;
//! nothing is partially populated. When no matcher applies the title is
//! returned as a title-only release.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};
use tracing::trace;

use crate::quality::QualityModel;

use super::clean::{clean_title, contains_words, is_noise_token};
use super::quality::{is_quality_token, parse_quality};
use super::types::{
    ParseFailure, ParseFailureReason, ParsedReleaseInfo, ReleaseNumbering, SpecialContext,
};

static FILE_EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(?:mkv|mp4|avi|m4v|wmv|ts|mov|mpg|nzb|torrent)$").unwrap()
});

static SITE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:\[\s*(?:www\.)?[a-z0-9\-]+\.[a-z]{2,4}\s*\]|www\.[a-z0-9\-]+\.[a-z]{2,4})[\s._\-]*",
    )
    .unwrap()
});

static GROUP_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?P<group>[^\]]+)\][\s._\-]*").unwrap());

static GROUP_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-(?P<group>[A-Za-z0-9]+)(?:\[[^\]]*\])?$").unwrap());

static HASH_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-fA-F0-9]{24,}$").unwrap());

static TRAILING_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<title>.+?)\s*[\(\[]?(?P<year>(?:19|20)\d{2})[\)\]]?$").unwrap()
});

static ALIAS_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+(?:/|aka)\s+").unwrap());

static DATE_YMD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<title>.+?)[\s._\-]+\(?(?P<year>(?:19|20)\d{2})[._\- ](?P<month>\d{2})[._\- ](?P<day>\d{2})\)?(?:[\s._\-]+Part[\s._\-]?(?P<part>\d{1,2}))?(?:[\s._\-\[\(]|$)",
    )
    .unwrap()
});

static DATE_SHORT_YMD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<title>.+?)[\s._\-]+(?P<year>\d{2})\.(?P<month>\d{2})\.(?P<day>\d{2})(?:[\s._\-\[\(]|$)",
    )
    .unwrap()
});

static DATE_DMY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<title>.+?)[\s._\-]+\(?(?P<day>\d{2})[._\- ](?P<month>\d{2})[._\- ](?P<year>(?:19|20)\d{2})\)?(?:[\s._\-\[\(]|$)",
    )
    .unwrap()
});

static DATE_ANYWHERE_YMD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<year>(?:19|20)\d{2})[._\-\s](?P<month>\d{2})[._\-\s](?P<day>\d{2})").unwrap()
});

static DATE_ANYWHERE_DMY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<day>\d{2})[._\-\s](?P<month>\d{2})[._\-\s](?P<year>(?:19|20)\d{2})").unwrap()
});

static SEASON_EPISODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<title>.+?)[\s._\-]+S(?P<season>\d{1,2})[\s._\-]?(?P<episodes>E\d{1,3}(?:(?:[\s._\-]?E|-)\d{1,3})*)(?:[\s._\-\[\(]|$)",
    )
    .unwrap()
});

static SEASON_X_EPISODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<title>.+?)[\s._\-]+(?P<season>\d{1,2})x(?P<episodes>\d{2,3}(?:-\d{2,3})?)(?:[\s._\-\[\(]|$)",
    )
    .unwrap()
});

static SEASON_EPISODE_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<title>.+?)[\s._\-]+Season[\s._\-]?(?P<season>\d{1,2})[\s._\-]+Episode[\s._\-]?(?P<episodes>\d{1,3})(?:[\s._\-\[\(]|$)",
    )
    .unwrap()
});

static FULL_SEASON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<title>.+?)[\s._\-]+(?:S|Season[\s._\-]?)(?P<season>\d{1,2})(?:[\s._\-\[\(]|$)",
    )
    .unwrap()
});

static ABSOLUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<title>.+?)[\s._]+-[\s._]+(?:E|EP|Episode[\s._]?)?(?P<first>\d{1,4})(?:v\d)?(?:[\s._]*-[\s._]*(?P<last>\d{1,4})(?:v\d)?)?(?:[\s._\[\(]|$)",
    )
    .unwrap()
});

static NUMBERING_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:s\d{1,2}(?:e\d{1,3})*|\d{1,2}x\d{2,3})$").unwrap());

const MAX_EPISODE_RANGE: u32 = 200;

/// A structurally valid numbering found by one matcher.
struct Matched {
    title: String,
    numbering: ReleaseNumbering,
    scene_numbered: bool,
}

type Matcher = fn(&str) -> Option<Matched>;

/// Matchers in priority order.
const MATCHERS: &[(&str, Matcher)] = &[
    ("explicit_date", match_explicit_date),
    ("season_episode", match_season_episode),
    ("absolute", match_absolute),
    ("scene_numbering", match_scene_numbering),
    ("daily_fallback", match_daily_fallback),
];

/// Title after the cheap, always-applicable normalisation steps.
struct Prepared {
    raw: String,
    text: String,
    release_group: Option<String>,
    quality: QualityModel,
}

impl Prepared {
    fn new(raw: &str) -> Result<Self, ParseFailure> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ParseFailure::new(raw, ParseFailureReason::Empty));
        }

        let without_ext = FILE_EXTENSION.replace(raw, "");
        let without_site = SITE_PREFIX.replace(&without_ext, "").trim().to_string();

        if HASH_LIKE.is_match(&without_site) {
            return Err(ParseFailure::new(raw, ParseFailureReason::Unrecognized));
        }

        let (text, release_group) = split_release_group(&without_site);

        Ok(Self {
            raw: raw.to_string(),
            text,
            release_group,
            quality: parse_quality(raw),
        })
    }

    fn build(
        &self,
        title: &str,
        numbering: Option<ReleaseNumbering>,
        year: Option<u16>,
        scene_numbered: bool,
    ) -> Option<ParsedReleaseInfo> {
        let (titles, title_year) = finish_title(title, year.is_none())?;
        let is_special = matches!(
            numbering,
            Some(ReleaseNumbering::Special { .. })
                | Some(ReleaseNumbering::SeasonEpisode { season: 0, .. })
        );

        Some(ParsedReleaseInfo {
            release_title: self.raw.clone(),
            titles,
            numbering,
            year: year.or(title_year),
            quality: self.quality,
            release_group: self.release_group.clone(),
            is_special,
            scene_numbered,
        })
    }
}

fn split_release_group(text: &str) -> (String, Option<String>) {
    if let Some(caps) = GROUP_PREFIX.captures(text) {
        let group = caps["group"].trim().to_string();
        if is_plausible_group(&group) {
            let rest = text[caps.get(0).map(|m| m.end()).unwrap_or(0)..].to_string();
            if !rest.trim().is_empty() {
                return (rest, Some(group));
            }
        }
    }

    if let Some(caps) = GROUP_SUFFIX.captures(text) {
        let group = caps["group"].to_string();
        if is_plausible_group(&group) {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(text.len());
            return (text[..start].to_string(), Some(group));
        }
    }

    (text.to_string(), None)
}

fn is_plausible_group(group: &str) -> bool {
    !group.is_empty()
        && !group.chars().all(|c| c.is_ascii_digit())
        && !is_quality_token(group)
        && !is_noise_token(&group.to_lowercase())
        && !group.contains(['.', ' '])
}

/// Normalise a raw title segment into candidate titles and an optional year.
fn finish_title(segment: &str, split_year: bool) -> Option<(Vec<String>, Option<u16>)> {
    let spaced: String = segment
        .chars()
        .map(|c| if c == '.' || c == '_' { ' ' } else { c })
        .collect();
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '[' | '(' | ']' | ')'))
        .to_string();

    let trailing = if split_year {
        TRAILING_YEAR.captures(&trimmed)
    } else {
        None
    };
    let (title, year) = match trailing {
        Some(caps) if caps["title"].chars().any(char::is_alphanumeric) => {
            let year = caps["year"].parse::<u16>().ok();
            (
                caps["title"]
                    .trim_matches(|c: char| c.is_whitespace() || c == '-')
                    .to_string(),
                year,
            )
        }
        _ => (trimmed, None),
    };

    let titles: Vec<String> = ALIAS_SPLIT
        .split(&title)
        .map(|t| t.trim().to_string())
        .filter(|t| t.chars().any(char::is_alphanumeric))
        .collect();

    if titles.is_empty() {
        None
    } else {
        Some((titles, year))
    }
}

fn capture_u32(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn make_date(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    let year = match year {
        0..=49 => 2000 + year,
        50..=99 => 1900 + year,
        y => y,
    };
    if year < 1951 {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn date_from_captures(caps: &Captures<'_>) -> Option<NaiveDate> {
    make_date(
        capture_u32(caps, "year")?,
        capture_u32(caps, "month")?,
        capture_u32(caps, "day")?,
    )
}

fn match_explicit_date(text: &str) -> Option<Matched> {
    for regex in [&*DATE_YMD, &*DATE_SHORT_YMD, &*DATE_DMY] {
        if let Some(caps) = regex.captures(text) {
            if let Some(date) = date_from_captures(&caps) {
                return Some(Matched {
                    title: caps["title"].to_string(),
                    numbering: ReleaseNumbering::AirDate {
                        date,
                        part: capture_u32(&caps, "part"),
                    },
                    scene_numbered: false,
                });
            }
        }
    }
    None
}

/// Expand an episode segment such as `E01E02`, `E01-E03` or `01-03`.
fn parse_episode_segment(segment: &str) -> Option<Vec<u32>> {
    let mut numbers: Vec<(u32, bool)> = Vec::new();
    let mut current = String::new();
    let mut dash_pending = false;

    for c in segment.chars().chain(std::iter::once(' ')) {
        if c.is_ascii_digit() {
            current.push(c);
            continue;
        }
        if !current.is_empty() {
            numbers.push((current.parse().ok()?, dash_pending));
            current.clear();
            dash_pending = false;
        }
        if c == '-' {
            dash_pending = true;
        }
    }

    let mut episodes: Vec<u32> = Vec::new();
    for (number, ranged) in numbers {
        match episodes.last().copied() {
            Some(prev) if ranged && number > prev => {
                if number - prev > MAX_EPISODE_RANGE {
                    return None;
                }
                episodes.extend(prev + 1..=number);
            }
            _ => episodes.push(number),
        }
    }

    if episodes.is_empty() || episodes.iter().any(|e| *e == 0 || *e > 999) {
        return None;
    }
    episodes.dedup();
    Some(episodes)
}

fn match_season_episode(text: &str) -> Option<Matched> {
    for regex in [
        &*SEASON_EPISODE,
        &*SEASON_X_EPISODE,
        &*SEASON_EPISODE_WORDS,
    ] {
        if let Some(caps) = regex.captures(text) {
            let season = capture_u32(&caps, "season")?;
            if let Some(episodes) = parse_episode_segment(&caps["episodes"]) {
                return Some(Matched {
                    title: caps["title"].to_string(),
                    numbering: ReleaseNumbering::SeasonEpisode { season, episodes },
                    scene_numbered: false,
                });
            }
        }
    }

    let caps = FULL_SEASON.captures(text)?;
    let season = capture_u32(&caps, "season")?;
    Some(Matched {
        title: caps["title"].to_string(),
        numbering: ReleaseNumbering::SeasonEpisode {
            season,
            episodes: Vec::new(),
        },
        scene_numbered: false,
    })
}

fn is_year_like(number: u32) -> bool {
    (1900..=2099).contains(&number)
}

fn match_absolute(text: &str) -> Option<Matched> {
    let caps = ABSOLUTE.captures(text)?;
    let first = capture_u32(&caps, "first")?;
    if first == 0 || is_year_like(first) {
        return None;
    }

    let episodes = match capture_u32(&caps, "last") {
        Some(last) if last > first && last - first <= MAX_EPISODE_RANGE => (first..=last).collect(),
        Some(_) => return None,
        None => vec![first],
    };

    Some(Matched {
        title: caps["title"].to_string(),
        numbering: ReleaseNumbering::Absolute { episodes },
        scene_numbered: false,
    })
}

/// Scene style `Title.102.720p`: season digit + two episode digits,
/// accepted only when directly followed by a quality or source token.
fn match_scene_numbering(text: &str) -> Option<Matched> {
    let tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == '.' || c == '_')
        .filter(|t| !t.is_empty())
        .collect();

    for i in 1..tokens.len().saturating_sub(1) {
        let token = tokens[i];
        let bytes = token.as_bytes();
        if bytes.len() != 3 || !token.chars().all(|c| c.is_ascii_digit()) || bytes[0] == b'0' {
            continue;
        }
        if !is_quality_token(tokens[i + 1]) {
            continue;
        }
        let season = u32::from(bytes[0] - b'0');
        let episode: u32 = token[1..].parse().ok()?;
        if episode == 0 {
            continue;
        }
        return Some(Matched {
            title: tokens[..i].join(" "),
            numbering: ReleaseNumbering::SeasonEpisode {
                season,
                episodes: vec![episode],
            },
            scene_numbered: true,
        });
    }
    None
}

fn match_daily_fallback(text: &str) -> Option<Matched> {
    for regex in [&*DATE_ANYWHERE_YMD, &*DATE_ANYWHERE_DMY] {
        for caps in regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let title = &text[..whole.start()];
            if !title.chars().any(char::is_alphabetic) {
                continue;
            }
            if let Some(date) = date_from_captures(&caps) {
                return Some(Matched {
                    title: title.to_string(),
                    numbering: ReleaseNumbering::AirDate { date, part: None },
                    scene_numbered: false,
                });
            }
        }
    }
    None
}

/// Title-only parse: everything before the first year, numbering or quality token.
fn title_only(prepared: &Prepared) -> Result<ParsedReleaseInfo, ParseFailure> {
    let tokens: Vec<&str> = prepared
        .text
        .split(|c: char| {
            c.is_whitespace() || matches!(c, '.' | '_' | '(' | ')' | '[' | ']' | '{' | '}')
        })
        .filter(|t| !t.is_empty() && *t != "-")
        .collect();

    let stop = tokens
        .iter()
        .position(|t| is_quality_token(t) || NUMBERING_TOKEN.is_match(t))
        .unwrap_or(tokens.len());

    let year_idx = (1..stop).rev().find(|&i| {
        tokens[i].len() == 4 && tokens[i].parse::<u32>().map(is_year_like).unwrap_or(false)
    });
    let end = year_idx.unwrap_or(stop);
    let year = year_idx.and_then(|i| tokens[i].parse::<u16>().ok());

    let title_tokens = &tokens[..end];
    if title_tokens.is_empty() {
        return Err(ParseFailure::new(&prepared.raw, ParseFailureReason::NoTitle));
    }
    // A purely numeric title ("1917", "300") needs a year or quality token
    // after it to be told apart from noise.
    let bounded = end < tokens.len();
    if !bounded && !title_tokens.iter().any(|t| t.chars().any(char::is_alphabetic)) {
        return Err(ParseFailure::new(&prepared.raw, ParseFailureReason::Unrecognized)
            .with_hint(Some(clean_title(&title_tokens.join(" ")))));
    }

    prepared
        .build(&title_tokens.join(" "), None, year, false)
        .ok_or_else(|| ParseFailure::new(&prepared.raw, ParseFailureReason::NoTitle))
}

/// Parse a raw release title.
///
/// Returns `Err(ParseFailure)` only when no subject title can be extracted.
/// A title without recognisable numbering is returned with `numbering: None`.
pub fn parse_title(raw: &str) -> Result<ParsedReleaseInfo, ParseFailure> {
    parse_with(raw, true)
}

/// Parse a title known to name a movie.
///
/// Scene-style three digit tokens (`Room.237.1080p`) stay part of the title
/// instead of being read as season and episode.
pub fn parse_movie_title(raw: &str) -> Result<ParsedReleaseInfo, ParseFailure> {
    parse_with(raw, false)
}

fn parse_with(raw: &str, scene_numbering: bool) -> Result<ParsedReleaseInfo, ParseFailure> {
    let prepared = Prepared::new(raw)?;

    for (name, matcher) in MATCHERS {
        if !scene_numbering && *name == "scene_numbering" {
            continue;
        }
        let Some(matched) = matcher(&prepared.text) else {
            continue;
        };
        if let Some(info) = prepared.build(
            &matched.title,
            Some(matched.numbering),
            None,
            matched.scene_numbered,
        ) {
            trace!(matcher = name, title = %prepared.raw, "Release title parsed");
            return Ok(info);
        }
    }

    title_only(&prepared)
}

fn remove_words(haystack: &str, needle: &str) -> String {
    format!(" {} ", haystack)
        .replacen(&format!(" {} ", needle), " ", 1)
        .trim()
        .to_string()
}

/// Parse a title as a special episode using library context.
///
/// Succeeds when the cleaned title contains one of the subject titles and,
/// in what remains, one of the item titles or performer names.
pub fn parse_special_title(
    raw: &str,
    context: &SpecialContext,
) -> Result<ParsedReleaseInfo, ParseFailure> {
    let prepared = Prepared::new(raw)?;
    let cleaned = clean_title(&prepared.text);

    for subject in &context.subject_titles {
        let clean_subject = clean_title(subject);
        if !contains_words(&cleaned, &clean_subject) {
            continue;
        }
        let remainder = remove_words(&cleaned, &clean_subject);

        let names = context.item_titles.iter().chain(context.performers.iter());
        for name in names {
            if !contains_words(&remainder, &clean_title(name)) {
                continue;
            }
            trace!(title = %prepared.raw, special = %name, "Release title parsed as special");
            return Ok(ParsedReleaseInfo {
                release_title: prepared.raw.clone(),
                titles: vec![subject.clone()],
                numbering: Some(ReleaseNumbering::Special { title: name.clone() }),
                year: None,
                quality: prepared.quality,
                release_group: prepared.release_group.clone(),
                is_special: true,
                scene_numbered: false,
            });
        }
    }

    Err(ParseFailure::new(raw, ParseFailureReason::Unrecognized).with_hint(Some(cleaned)))
}

/// Run the regular chain, then the special fallback when nothing numbered matched.
pub fn parse_title_with_context(
    raw: &str,
    context: &SpecialContext,
) -> Result<ParsedReleaseInfo, ParseFailure> {
    let regular = parse_title(raw);
    if matches!(&regular, Ok(info) if info.numbering.is_some()) || context.is_empty() {
        return regular;
    }
    match parse_special_title(raw, context) {
        Ok(special) => Ok(special),
        Err(_) => regular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::Quality;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn numbering(title: &str) -> Option<ReleaseNumbering> {
        parse_title(title).unwrap().numbering
    }

    #[test]
    fn test_standard_season_episode() {
        let info = parse_title("The.Office.US.S01E02.720p.HDTV.x264-GRP").unwrap();
        assert_eq!(info.primary_title(), "The Office US");
        assert_eq!(
            info.numbering,
            Some(ReleaseNumbering::SeasonEpisode {
                season: 1,
                episodes: vec![2]
            })
        );
        assert_eq!(info.quality.quality, Quality::Hdtv720p);
        assert_eq!(info.release_group.as_deref(), Some("GRP"));
        assert!(!info.is_special);
    }

    #[test]
    fn test_multi_episode_forms() {
        assert_eq!(
            numbering("Show.S01E02E03.720p"),
            Some(ReleaseNumbering::SeasonEpisode {
                season: 1,
                episodes: vec![2, 3]
            })
        );
        assert_eq!(
            numbering("Show.S01E02-E04.720p"),
            Some(ReleaseNumbering::SeasonEpisode {
                season: 1,
                episodes: vec![2, 3, 4]
            })
        );
        assert_eq!(
            numbering("Show 2x05 HDTV"),
            Some(ReleaseNumbering::SeasonEpisode {
                season: 2,
                episodes: vec![5]
            })
        );
        assert_eq!(
            numbering("Show Season 3 Episode 7"),
            Some(ReleaseNumbering::SeasonEpisode {
                season: 3,
                episodes: vec![7]
            })
        );
    }

    #[test]
    fn test_full_season_pack() {
        let info = parse_title("Show.Name.S02.1080p.BluRay.x264-GRP").unwrap();
        assert_eq!(info.primary_title(), "Show Name");
        assert!(info.numbering.as_ref().unwrap().is_full_season());
        assert_eq!(info.season_number(), Some(2));
    }

    #[test]
    fn test_season_zero_is_special() {
        let info = parse_title("Show.S00E03.720p.WEB-DL").unwrap();
        assert!(info.is_special);
    }

    #[test]
    fn test_explicit_dates() {
        let info = parse_title("Site.24.01.15.Performer.Name.XXX.1080p.MP4-GRP").unwrap();
        assert_eq!(info.primary_title(), "Site");
        assert_eq!(info.air_date(), Some(date(2024, 1, 15)));

        let info = parse_title("The Daily Show 2023.11.02 720p WEB").unwrap();
        assert_eq!(info.primary_title(), "The Daily Show");
        assert_eq!(info.air_date(), Some(date(2023, 11, 2)));

        let info = parse_title("Show - 15-03-2022 - Guest").unwrap();
        assert_eq!(info.air_date(), Some(date(2022, 3, 15)));
    }

    #[test]
    fn test_date_part() {
        let info = parse_title("Show.2020.05.01.Part.2.720p").unwrap();
        assert_eq!(
            info.numbering,
            Some(ReleaseNumbering::AirDate {
                date: date(2020, 5, 1),
                part: Some(2)
            })
        );
    }

    #[test]
    fn test_invalid_date_falls_through() {
        // Month 13 is not a date; nothing else matches, so it is title-only.
        let info = parse_title("Show 2020.13.45").unwrap();
        assert!(info.numbering.is_none());
    }

    #[test]
    fn test_absolute_numbering() {
        let info = parse_title("[SubsPlease] Jujutsu Kaisen - 24 (1080p) [A1B2C3D4].mkv").unwrap();
        assert_eq!(info.primary_title(), "Jujutsu Kaisen");
        assert_eq!(
            info.numbering,
            Some(ReleaseNumbering::Absolute { episodes: vec![24] })
        );
        assert_eq!(info.release_group.as_deref(), Some("SubsPlease"));

        assert_eq!(
            numbering("[Group] Show - 01-03 [720p]"),
            Some(ReleaseNumbering::Absolute {
                episodes: vec![1, 2, 3]
            })
        );
    }

    #[test]
    fn test_absolute_rejects_year() {
        let info = parse_title("Show - 2024").unwrap();
        assert!(info.numbering.is_none());
        assert_eq!(info.year, Some(2024));
    }

    #[test]
    fn test_scene_numbering() {
        let info = parse_title("Show.Name.102.720p.HDTV.x264-GRP").unwrap();
        assert_eq!(info.primary_title(), "Show Name");
        assert_eq!(
            info.numbering,
            Some(ReleaseNumbering::SeasonEpisode {
                season: 1,
                episodes: vec![2]
            })
        );
        assert!(info.scene_numbered);
    }

    #[test]
    fn test_numbers_in_titles_are_not_numbering() {
        let info = parse_title("24.S01E01.720p.HDTV").unwrap();
        assert_eq!(info.primary_title(), "24");
        assert_eq!(info.season_number(), Some(1));

        let info = parse_title("9-1-1.S03E04.1080p.WEB").unwrap();
        assert_eq!(info.primary_title(), "9-1-1");

        let info = parse_title("Blade.Runner.2049.2017.1080p.BluRay.x264-GRP").unwrap();
        assert!(info.numbering.is_none());
        assert_eq!(info.primary_title(), "Blade Runner 2049");
        assert_eq!(info.year, Some(2017));
    }

    #[test]
    fn test_numeric_movie_titles() {
        for (raw, title, year) in [
            ("1917.2019.1080p.BluRay.x264-GRP", "1917", 2019),
            ("2012.2009.720p.BluRay", "2012", 2009),
            ("300.2006.1080p.BluRay", "300", 2006),
        ] {
            let info = parse_title(raw).unwrap();
            assert_eq!(info.primary_title(), title, "{}", raw);
            assert_eq!(info.year, Some(year), "{}", raw);
            assert!(info.numbering.is_none(), "{}", raw);
        }

        assert_eq!(
            parse_title("12345").unwrap_err().reason,
            ParseFailureReason::Unrecognized
        );
    }

    #[test]
    fn test_movie_parse_keeps_scene_digits_in_title() {
        assert!(parse_title("Room.237.1080p.BluRay").unwrap().scene_numbered);

        let info = parse_movie_title("Room.237.1080p.BluRay").unwrap();
        assert_eq!(info.primary_title(), "Room 237");
        assert!(info.numbering.is_none());
        assert!(!info.scene_numbered);

        let info = parse_movie_title("Heat.S01E01.720p.HDTV").unwrap();
        assert_eq!(info.season_number(), Some(1));
    }

    #[test]
    fn test_title_year_is_split() {
        let info = parse_title("Doctor.Who.2005.S10E01.720p").unwrap();
        assert_eq!(info.primary_title(), "Doctor Who");
        assert_eq!(info.year, Some(2005));
    }

    #[test]
    fn test_alias_titles() {
        let info = parse_title("Show One / Show Uno S01E01 720p").unwrap();
        assert_eq!(info.titles, vec!["Show One".to_string(), "Show Uno".to_string()]);
    }

    #[test]
    fn test_daily_fallback() {
        let info = parse_title("Site - Performer Name [2024-01-15]").unwrap();
        assert_eq!(info.air_date(), Some(date(2024, 1, 15)));
        assert_eq!(info.primary_title(), "Site - Performer Name");
    }

    #[test]
    fn test_site_prefix_removed() {
        let info = parse_title("[www.Torrenting.com] - Show.Name.S02E03.720p").unwrap();
        assert_eq!(info.primary_title(), "Show Name");
        assert!(info.release_group.is_none());
    }

    #[test]
    fn test_failures() {
        assert_eq!(
            parse_title("   ").unwrap_err().reason,
            ParseFailureReason::Empty
        );
        assert_eq!(
            parse_title("0123456789abcdef0123456789abcdef").unwrap_err().reason,
            ParseFailureReason::Unrecognized
        );
        assert_eq!(
            parse_title("S01E01.mkv").unwrap_err().reason,
            ParseFailureReason::NoTitle
        );
        assert_eq!(
            parse_title("1080p.x264").unwrap_err().reason,
            ParseFailureReason::NoTitle
        );
    }

    #[test]
    fn test_unnumbered_titles_never_crash() {
        let samples = [
            "Just Some Words",
            "!!!",
            "a",
            "Movie (2010)",
            "---",
            "[]",
            "Ünïcödé Title 720p",
            "12345",
        ];
        for sample in samples {
            if let Ok(info) = parse_title(sample) {
                assert!(info.numbering.is_none(), "{} parsed numbering", sample);
            }
        }
    }

    #[test]
    fn test_special_title() {
        let context = SpecialContext::new(vec!["Site Name".to_string()])
            .with_performers(vec!["Jane Doe".to_string()]);
        let info = parse_special_title("Site.Name.Jane.Doe.Behind.The.Scenes.1080p", &context)
            .unwrap();
        assert!(info.is_special);
        assert_eq!(info.primary_title(), "Site Name");
        assert_eq!(
            info.numbering,
            Some(ReleaseNumbering::Special {
                title: "Jane Doe".to_string()
            })
        );
    }

    #[test]
    fn test_special_requires_both_parts() {
        let context = SpecialContext::new(vec!["Site Name".to_string()])
            .with_performers(vec!["Jane Doe".to_string()]);
        assert!(parse_special_title("Site.Name.Someone.Else.1080p", &context).is_err());
        assert!(parse_special_title("Other.Site.Jane.Doe.1080p", &context).is_err());
    }

    #[test]
    fn test_with_context_prefers_numbering() {
        let context = SpecialContext::new(vec!["Show".to_string()])
            .with_item_titles(vec!["Pilot".to_string()]);
        let info = parse_title_with_context("Show.S01E01.Pilot.720p", &context).unwrap();
        assert!(!info.is_special);

        let info = parse_title_with_context("Show.Pilot.Extended.720p", &context).unwrap();
        assert!(info.is_special);
    }
}
