use crate::format::NameTemplate;
use mediahook_models::ParsedTitle;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, error};

// First four-digit token starting with 1 or 2. Resolutions like 1080 can match.
static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[12][0-9]{3}").unwrap());

static RE_SEASON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)S(\d{1,2})").unwrap());

static RE_EPISODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)E(\d{1,3})").unwrap());

/// Everything from the first season marker to the end of the title. A single
/// trailing newline still counts as the end.
static RE_SEASON_TAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[sS]\d{1,2}.*\n?$").unwrap());

/// One Unicode decimal digit (general category Nd).
static RE_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d$").unwrap());

/// "(2021)"
static RE_PAREN_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([12][0-9]{3}\)").unwrap());

#[derive(Debug, Error)]
pub enum TitleError {
    #[error("invalid {field} number '{raw}'")]
    InvalidNumber { field: &'static str, raw: String },
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    RE_DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Value of any Unicode decimal digit, so "١٢" reads as 12.
///
/// Nd digits come in contiguous runs that start at zero, so the value is the
/// distance from the start of the run.
fn digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }
    Some((c as u32 - start) % 10)
}

fn parse_number(raw: &str) -> Option<u32> {
    raw.chars().try_fold(0u32, |acc, c| {
        acc.checked_mul(10)?.checked_add(digit_value(c)?)
    })
}

fn capture_number(re: &Regex, title: &str, field: &'static str) -> Result<Option<u32>, TitleError> {
    let Some(caps) = re.captures(title) else {
        return Ok(None);
    };
    let raw = &caps[1];
    parse_number(raw)
        .map(Some)
        .ok_or_else(|| TitleError::InvalidNumber {
            field,
            raw: raw.to_string(),
        })
}

/// Remove the season marker and everything after it, then any "(YYYY)", then trim.
pub fn clean_name(title: &str) -> String {
    let name = RE_SEASON_TAIL.replace(title, "");
    let name = RE_PAREN_YEAR.replace_all(&name, "");
    name.trim().to_string()
}

/// Extract year, season, episode and cleaned name without any formatting.
pub fn parse_title(title: &str) -> Result<ParsedTitle, TitleError> {
    let year = RE_YEAR.find(title).map(|m| m.as_str().to_string());
    let season = capture_number(&RE_SEASON, title, "season")?;
    let episode = capture_number(&RE_EPISODE, title, "episode")?;

    Ok(ParsedTitle {
        title: title.to_string(),
        name: Some(clean_name(title)),
        year,
        season,
        episode,
    })
}

/// Title parser with an optional name template.
///
/// [`TitleParser::parse`] never fails: a parse error is logged and the caller
/// gets [`ParsedTitle::empty`], a template error is logged and the
/// unformatted name is kept.
#[derive(Debug, Clone, Default)]
pub struct TitleParser {
    name_format: Option<String>,
}

impl TitleParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank templates are treated as "no template".
    pub fn with_name_format(mut self, template: impl Into<String>) -> Self {
        let template = template.into();
        self.name_format = if template.trim().is_empty() { None } else { Some(template) };
        self
    }

    pub fn name_format(&self) -> Option<&str> {
        self.name_format.as_deref()
    }

    pub fn parse(&self, title: &str) -> ParsedTitle {
        let mut parsed = match parse_title(title) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(title = title, error = %e, "Title recognition failed");
                return ParsedTitle::empty(title);
            }
        };

        if let (Some(template), Some(name)) = (self.name_format.as_deref(), parsed.name.as_ref()) {
            if !name.is_empty() {
                match NameTemplate::parse(template) {
                    Ok(template) => parsed.name = Some(template.render(name)),
                    Err(e) => error!(template = template, error = %e, "Failed to apply name format"),
                }
            }
        }

        debug!(
            title = title,
            name = ?parsed.name,
            year = ?parsed.year,
            season = ?parsed.season,
            episode = ?parsed.episode,
            "Title parsed"
        );
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_with_season_episode_and_year() {
        let parsed = parse_title("Show.Name.S02E05.2021.1080p").unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Show.Name."));
        assert_eq!(parsed.year.as_deref(), Some("2021"));
        assert_eq!(parsed.season, Some(2));
        assert_eq!(parsed.episode, Some(5));
        assert_eq!(parsed.title, "Show.Name.S02E05.2021.1080p");
    }

    #[test]
    fn test_movie_without_markers() {
        let parsed = parse_title("  Blade Runner (1982) ").unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Blade Runner"));
        assert_eq!(parsed.year.as_deref(), Some("1982"));
        assert_eq!(parsed.season, None);
        assert_eq!(parsed.episode, None);
    }

    #[test]
    fn test_lowercase_markers() {
        let parsed = parse_title("the office s03e012").unwrap();
        assert_eq!(parsed.season, Some(3));
        assert_eq!(parsed.episode, Some(12));
        assert_eq!(parsed.name.as_deref(), Some("the office"));
    }

    #[test]
    fn test_resolution_taken_as_year() {
        // Known limitation: the first four-digit token wins
        let parsed = parse_title("Movie 1080p 2019").unwrap();
        assert_eq!(parsed.year.as_deref(), Some("1080"));
    }

    #[test]
    fn test_episode_letter_inside_words() {
        // Only an E followed by digits counts as an episode marker
        let parsed = parse_title("Eternal Sunshine").unwrap();
        assert_eq!(parsed.episode, None);
        assert_eq!(parsed.season, None);
    }

    #[test]
    fn test_every_paren_year_removed() {
        assert_eq!(clean_name("Dune (1984) (2021)"), "Dune");
    }

    #[test]
    fn test_unrecognizable_title_still_has_title() {
        let parsed = TitleParser::new().parse("???");
        assert_eq!(parsed.title, "???");
        assert_eq!(parsed.name.as_deref(), Some("???"));
        assert!(parsed.year.is_none());
        assert!(parsed.season.is_none());
        assert!(parsed.episode.is_none());
    }

    #[test]
    fn test_non_ascii_decimal_digits() {
        // Arabic-Indic season, Devanagari episode
        let parsed = parse_title("Show S\u{0661}\u{0662}E\u{0967}\u{0966}").unwrap();
        assert_eq!(parsed.season, Some(12));
        assert_eq!(parsed.episode, Some(10));
        assert_eq!(parsed.name.as_deref(), Some("Show"));
    }

    #[test]
    fn test_digit_value() {
        assert_eq!(digit_value('7'), Some(7));
        assert_eq!(digit_value('\u{0660}'), Some(0));
        assert_eq!(digit_value('\u{FF19}'), Some(9));
        // mathematical digits are five runs back to back
        assert_eq!(digit_value('\u{1D7D9}'), Some(1));
        assert_eq!(digit_value('x'), None);
        assert_eq!(digit_value('\u{00B2}'), None);
    }

    #[test]
    fn test_trailing_newline_still_ends_title() {
        let parsed = parse_title("Show S01E01\n").unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Show"));
        assert_eq!(parsed.season, Some(1));
    }

    #[test]
    fn test_name_format_applied() {
        let parser = TitleParser::new().with_name_format("[AI]{name}");
        let parsed = parser.parse("Show.Name.S01E01");
        assert_eq!(parsed.name.as_deref(), Some("[AI]Show.Name."));
    }

    #[test]
    fn test_name_format_without_placeholder_is_literal() {
        let parser = TitleParser::new().with_name_format("Fixed");
        assert_eq!(parser.parse("Anything").name.as_deref(), Some("Fixed"));
    }

    #[test]
    fn test_bad_name_format_falls_back() {
        let parser = TitleParser::new().with_name_format("{title} - {name}");
        assert_eq!(parser.parse("Show S01").name.as_deref(), Some("Show"));

        let parser = TitleParser::new().with_name_format("{name");
        assert_eq!(parser.parse("Show S01").name.as_deref(), Some("Show"));
    }

    #[test]
    fn test_name_format_skipped_for_empty_name() {
        let parser = TitleParser::new().with_name_format("[AI]{name}");
        let parsed = parser.parse("S01E01");
        assert_eq!(parsed.name.as_deref(), Some(""));
        assert_eq!(parsed.season, Some(1));
    }

    #[test]
    fn test_blank_name_format_ignored() {
        assert!(TitleParser::new().with_name_format("   ").name_format().is_none());
    }
}
