//! Release title parsing.
//!
//! Turns free-text release titles as returned by providers and download
//! clients into structured [`ParsedReleaseInfo`]. Parsing never errors: a
//! title that yields nothing usable is a [`ParseFailure`] value.

mod clean;
mod quality;
mod title;
mod types;

pub use clean::clean_title;
pub use quality::parse_quality;
pub use title::{parse_movie_title, parse_special_title, parse_title, parse_title_with_context};
pub use types::*;

pub(crate) use clean::contains_words;
