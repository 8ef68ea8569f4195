//! Title normalisation for comparisons.

/// Tokens that never carry subject-title meaning.
const NOISE_TOKENS: &[&str] = &[
    // resolutions
    "480p", "480i", "576p", "720p", "1080p", "1080i", "2160p", "4k", "uhd", "sd", "hd",
    // codecs
    "x264", "x265", "h264", "h265", "hevc", "avc", "xvid", "divx", "10bit", "8bit", "hdr",
    "hdr10", "dv", "aac", "ac3", "eac3", "dts", "ddp5", "dd5", "flac", "atmos", "truehd",
    // sources
    "bluray", "bdrip", "brrip", "remux", "webdl", "webrip", "hdtv", "pdtv", "sdtv", "dsr",
    "dvdrip", "dvd", "web", "dl",
    // revision / scene markers
    "proper", "repack", "internal", "rerip",
    // site tags
    "www", "com", "org", "net", "xxx", "mkv", "mp4", "avi",
];

/// English stop words dropped from comparisons.
const STOP_WORDS: &[&str] = &["a", "an", "the", "and", "or", "of"];

pub(crate) fn is_noise_token(token: &str) -> bool {
    NOISE_TOKENS.contains(&token)
}

/// Split lowercased text into alphanumeric words.
pub(crate) fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalise a title for comparison.
///
/// Lowercases, drops punctuation, noise tokens and stop words, and joins the
/// remaining words with single spaces. If only stop words remain they are
/// kept. Idempotent: `clean_title(&clean_title(x)) == clean_title(x)`.
pub fn clean_title(title: &str) -> String {
    let kept: Vec<String> = words(title)
        .into_iter()
        .filter(|w| !is_noise_token(w))
        .collect();

    let without_stop: Vec<&String> = kept
        .iter()
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect();

    if without_stop.is_empty() {
        kept.join(" ")
    } else {
        without_stop
            .into_iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// True when `needle` appears in `haystack` as a run of whole words.
///
/// Both arguments are expected to be cleaned.
pub(crate) fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    format!(" {} ", haystack).contains(&format!(" {} ", needle))
}
