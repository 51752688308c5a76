//! Draw results scraped from the public result page.
//!
//! The page lists the winning balls as `ball_red` / `ball_blue` elements and
//! the per-tier payouts in a table. Balls are required; payouts for the two
//! floating tiers fall back to configured amounts when the table can't be read.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use super::record::{DrawRecord, DrawSource, PrizeTable};
use crate::log;
use crate::ticket::DrawPeriod;

pub const DEFAULT_URL_TEMPLATE: &str = "https://kaijiang.500.com/shtml/dlt/{period}.shtml";
pub const DEFAULT_FIRST_PRIZE: u64 = 10_000_000;
pub const DEFAULT_SECOND_PRIZE: u64 = 200_000;

/// The result page is served in GB2312.
const PAGE_CHARSET: &str = "gb2312";

static RED_BALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"class="ball_red[^"]*"[^>]*>\s*([0-9]{1,2})\s*<"#).expect("red ball pattern is valid")
});
static BLUE_BALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"class="ball_blue[^"]*"[^>]*>\s*([0-9]{1,2})\s*<"#)
        .expect("blue ball pattern is valid")
});
static ROW_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("row pattern is valid"));
static CELL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").expect("cell pattern is valid"));
static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Fetches results over HTTP with a bounded timeout.
pub struct WebDrawSource {
    client: reqwest::blocking::Client,
    url_template: String,
    fallback: PrizeTable,
}

impl WebDrawSource {
    /// `url_template` must contain `{period}`.
    pub fn new(url_template: &str, timeout: Duration, fallback: PrizeTable) -> Result<Self> {
        if !url_template.contains("{period}") {
            return Err(anyhow!(
                "Draw URL template has no {{period}} placeholder: {}",
                url_template
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url_template: url_template.to_string(),
            fallback: PrizeTable::fallback(fallback.first, fallback.second),
        })
    }

    pub fn url_for(&self, period: &DrawPeriod) -> String {
        self.url_template.replace("{period}", period.as_str())
    }

    fn try_fetch(&self, period: &DrawPeriod) -> Result<DrawRecord> {
        let url = self.url_for(period);
        log(&format!("Fetching draw {} from {}", period, url));

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "dlt-checker")
            .send()
            .context("Draw request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Draw page for {} returned HTTP {}",
                period,
                response.status()
            ));
        }

        let html = response
            .text_with_charset(PAGE_CHARSET)
            .context("Failed to read draw page body")?;

        parse_result_page(period, &html, self.fallback)
    }
}

impl DrawSource for WebDrawSource {
    fn fetch(&self, period: &DrawPeriod) -> Option<DrawRecord> {
        match self.try_fetch(period) {
            Ok(record) => {
                log(&format!("Draw loaded: {}", record));
                Some(record)
            }
            Err(e) => {
                log(&format!("Draw {} unavailable: {:#}", period, e));
                None
            }
        }
    }
}

/// Parses a result page into a draw record.
///
/// `fallback` is used for any floating-tier amount the table doesn't yield;
/// the returned table is then marked estimated.
pub fn parse_result_page(
    period: &DrawPeriod,
    html: &str,
    fallback: PrizeTable,
) -> Result<DrawRecord> {
    let front = collect_balls(&RED_BALL_REGEX, html);
    let back = collect_balls(&BLUE_BALL_REGEX, html);

    if front.is_empty() && back.is_empty() {
        return Err(anyhow!("No winning numbers on the page for {}", period));
    }

    let first = find_tier_amount(html, "一等奖");
    let second = find_tier_amount(html, "二等奖");
    let prizes = match (first, second) {
        (Some(first), Some(second)) => PrizeTable::new(first, second),
        (first, second) => PrizeTable::fallback(
            first.unwrap_or(fallback.first),
            second.unwrap_or(fallback.second),
        ),
    };

    DrawRecord::new(period.clone(), front.iter().copied(), back.iter().copied(), prizes).ok_or_else(
        || {
            anyhow!(
                "Unexpected winning numbers for {}: front {:?}, back {:?}",
                period,
                front,
                back
            )
        },
    )
}

fn collect_balls(regex: &Regex, html: &str) -> Vec<u8> {
    regex
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Finds the per-bet amount in the base-stake row for `label`.
///
/// Rows read `tier | [stake kind] | winners | amount per bet | ...`; the
/// amount is the second numeric cell. Supplementary rows are skipped.
fn find_tier_amount(html: &str, label: &str) -> Option<u64> {
    ROW_REGEX
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|row| row.as_str())
        .filter(|row| row.contains(label) && !row.contains("追加"))
        .find_map(|row| {
            let numbers: Vec<u64> = CELL_REGEX
                .captures_iter(row)
                .filter_map(|caps| caps.get(1))
                .filter_map(|cell| parse_amount(cell.as_str()))
                .collect();
            numbers.get(1).copied().filter(|amount| *amount > 0)
        })
}

/// Reads a table cell like `10,000,000` as a number.
fn parse_amount(cell: &str) -> Option<u64> {
    let text = TAG_REGEX.replace_all(cell, "");
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r#"
        <div class="ball_box01"><ul>
          <li class="ball_red">03</li><li class="ball_red">08</li>
          <li class="ball_red">15</li><li class="ball_red">22</li>
          <li class="ball_red">31</li>
          <li class="ball_blue">04</li><li class="ball_blue">11</li>
        </ul></div>
        <table class="kj_tablelist02">
          <tr><td>奖项</td><td>中奖注数</td><td>单注奖金(元)</td><td>应派奖金合计(元)</td></tr>
          <tr><td rowspan="2">一等奖</td><td>基本</td><td>3</td><td>8,123,456</td><td>24,370,368</td></tr>
          <tr><td>追加</td><td>1</td><td>6,498,764</td><td>6,498,764</td></tr>
          <tr><td rowspan="2">二等奖</td><td>基本</td><td>92</td><td><b>156,003</b></td><td>14,352,276</td></tr>
          <tr><td>三等奖</td><td>基本</td><td>505</td><td>10,000</td><td>5,050,000</td></tr>
        </table>
    "#;

    fn period() -> DrawPeriod {
        DrawPeriod::parse("23056").unwrap()
    }

    fn fallback() -> PrizeTable {
        PrizeTable::fallback(DEFAULT_FIRST_PRIZE, DEFAULT_SECOND_PRIZE)
    }

    #[test]
    fn test_parse_result_page() {
        let record = parse_result_page(&period(), SAMPLE_PAGE, fallback()).unwrap();
        assert_eq!(record.front().iter().copied().collect::<Vec<_>>(), vec![3, 8, 15, 22, 31]);
        assert_eq!(record.back().iter().copied().collect::<Vec<_>>(), vec![4, 11]);
        assert_eq!(record.prizes().first, 8_123_456);
        assert_eq!(record.prizes().second, 156_003);
        assert!(!record.prizes().estimated);
    }

    #[test]
    fn test_missing_amounts_use_fallback() {
        let html = r#"<li class="ball_red">01</li><li class="ball_red">02</li>
            <li class="ball_red">03</li><li class="ball_red">04</li><li class="ball_red">05</li>
            <li class="ball_blue">01</li><li class="ball_blue">02</li>"#;
        let record = parse_result_page(&period(), html, fallback()).unwrap();
        assert_eq!(record.prizes().first, DEFAULT_FIRST_PRIZE);
        assert_eq!(record.prizes().second, DEFAULT_SECOND_PRIZE);
        assert!(record.prizes().estimated);
    }

    #[test]
    fn test_page_without_balls() {
        assert!(parse_result_page(&period(), "<html>not drawn yet</html>", fallback()).is_err());
    }

    #[test]
    fn test_page_with_wrong_ball_count() {
        let html = r#"<li class="ball_red">01</li><li class="ball_blue">02</li>"#;
        assert!(parse_result_page(&period(), html, fallback()).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("10,000,000"), Some(10_000_000));
        assert_eq!(parse_amount(" <b>156,003</b> "), Some(156_003));
        assert_eq!(parse_amount("基本"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_url_template() {
        let source = WebDrawSource::new(
            DEFAULT_URL_TEMPLATE,
            Duration::from_secs(10),
            fallback(),
        )
        .unwrap();
        assert_eq!(
            source.url_for(&period()),
            "https://kaijiang.500.com/shtml/dlt/23056.shtml"
        );

        assert!(WebDrawSource::new("https://example.com/", Duration::from_secs(1), fallback())
            .is_err());
    }

    #[test]
    fn test_unreachable_server_is_absent() {
        // Nothing listens on port 1, so the connection is refused
        let source = WebDrawSource::new(
            "http://127.0.0.1:1/{period}",
            Duration::from_secs(2),
            fallback(),
        )
        .unwrap();
        assert!(source.fetch(&period()).is_none());
    }
}
