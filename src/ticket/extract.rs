//! Field extraction from recognized ticket text.
//!
//! OCR output is noisy, so every line is tried independently and lines that
//! do not look like ticket data are skipped without error. A ticket yields
//! at most one draw period, any number of bets, and a supplementary flag.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::normalize::normalize;
use super::types::{Bet, DrawPeriod, BACK_MAX};

/// Period token: `2` plus four digits, not part of a longer digit run.
const PERIOD_PATTERN: &str = r"(?:^|[^0-9])(2[0-9]{4})(?:[^0-9]|$)";

/// Front group, separator glyph, back group. The minimum group lengths are
/// enough for five and two two-digit numbers.
const BET_PATTERN: &str = r"([0-9 ]{10,}) ?[+\-－＋:：] ?([0-9 ]{4,})";

/// Compound-bet ceiling for the front zone. Scoring cost grows with
/// `C(n, 5)`, so larger selections are treated as noise.
pub const DEFAULT_MAX_FRONT_NUMBERS: usize = 20;

/// Keywords printed on tickets bought with the supplementary stake.
pub const DEFAULT_SUPPLEMENTARY_MARKERS: &[&str] = &["追加", "追投"];

static PERIOD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PERIOD_PATTERN).expect("period pattern is valid"));
static BET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BET_PATTERN).expect("bet pattern is valid"));

/// Everything read off one ticket.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketFields {
    pub period: Option<DrawPeriod>,
    pub bets: Vec<Bet>,
    pub supplementary: bool,
}

/// Tunable parts of extraction.
#[derive(Debug, Clone)]
pub struct ExtractRules {
    /// Largest accepted front-zone selection.
    pub max_front_numbers: usize,
    /// Any of these anywhere on the ticket marks a supplementary stake.
    pub supplementary_markers: Vec<String>,
}

impl Default for ExtractRules {
    fn default() -> Self {
        Self {
            max_front_numbers: DEFAULT_MAX_FRONT_NUMBERS,
            supplementary_markers: DEFAULT_SUPPLEMENTARY_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl ExtractRules {
    /// Extracts period, bets and supplementary flag from OCR lines.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> TicketFields {
        let period = lines.iter().find_map(|line| find_period(line.as_ref()));

        let supplementary = lines
            .iter()
            .any(|line| self.has_supplementary_marker(line.as_ref()));

        let bets = lines
            .iter()
            .filter_map(|line| parse_bet_line(line.as_ref(), self.max_front_numbers))
            .collect();

        TicketFields {
            period,
            bets,
            supplementary,
        }
    }

    /// Checks the raw line, its normalized form, and the line with all
    /// whitespace removed (OCR tends to space out CJK glyphs).
    fn has_supplementary_marker(&self, raw: &str) -> bool {
        let normalized = normalize(raw);
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

        self.supplementary_markers.iter().any(|marker| {
            !marker.is_empty()
                && (raw.contains(marker.as_str())
                    || normalized.contains(marker.as_str())
                    || compact.contains(marker.as_str()))
        })
    }
}

/// Extracts ticket fields with the default rules.
pub fn extract<S: AsRef<str>>(lines: &[S]) -> TicketFields {
    ExtractRules::default().extract(lines)
}

/// Returns the first period token in a raw line.
pub fn find_period(raw: &str) -> Option<DrawPeriod> {
    PERIOD_REGEX
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| DrawPeriod::parse(m.as_str()))
}

/// Parses one raw line as a bet.
///
/// Returns `None` unless the line has the front/separator/back shape and the
/// numbers pass every range and count check.
pub fn parse_bet_line(raw: &str, max_front_numbers: usize) -> Option<Bet> {
    let normalized = normalize(raw);
    let caps = BET_REGEX.captures(&normalized)?;

    let front = parse_numbers(caps.get(1)?.as_str())?;
    let back = parse_numbers(caps.get(2)?.as_str())?;

    let bet = Bet::new(front, back)?;
    if bet.front().len() > max_front_numbers || bet.back().len() > BACK_MAX as usize {
        return None;
    }
    Some(bet)
}

/// Splits a digit group into numbers, one per maximal digit run.
/// Runs too large for a ball number reject the whole group.
fn parse_numbers(group: &str) -> Option<Vec<u8>> {
    group
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .map(|run| run.parse::<u8>().ok())
        .collect()
}
