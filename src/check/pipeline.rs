use serde::Serialize;

use crate::draw::{DrawRecord, DrawSource};
use crate::log;
use crate::prize::{score_detailed, BetScore};
use crate::ticket::{ExtractRules, TicketFields};

/// Why a ticket did or didn't get scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Checked,
    MissingPeriod,
    NoBets,
    DrawUnavailable,
    RecognitionFailed { error: String },
}

/// Result of checking one ticket.
#[derive(Debug, Clone, Serialize)]
pub struct TicketReport {
    /// File name or other label the lines came from
    pub source: String,
    pub fields: TicketFields,
    pub outcome: Outcome,
    pub draw: Option<DrawRecord>,
    /// One entry per bet in `fields.bets`, empty unless checked
    pub scores: Vec<BetScore>,
    pub total: u64,
}

impl TicketReport {
    fn incomplete(source: &str, fields: TicketFields, outcome: Outcome) -> Self {
        Self {
            source: source.to_string(),
            fields,
            outcome,
            draw: None,
            scores: Vec::new(),
            total: 0,
        }
    }

    /// Report for a ticket whose text couldn't be recognized at all.
    pub fn recognition_failed(source: &str, error: String) -> Self {
        Self::incomplete(
            source,
            TicketFields::default(),
            Outcome::RecognitionFailed { error },
        )
    }
}

/// Extracts ticket fields from recognized lines and scores every bet.
///
/// Missing period, missing bets and missing draw data are reported through
/// the outcome, never as errors.
pub fn check_lines<S: AsRef<str>>(
    source: &str,
    lines: &[S],
    draws: &dyn DrawSource,
    rules: &ExtractRules,
) -> TicketReport {
    let fields = rules.extract(lines);

    let Some(period) = fields.period.clone() else {
        log(&format!("{}: no draw period found", source));
        return TicketReport::incomplete(source, fields, Outcome::MissingPeriod);
    };

    if fields.bets.is_empty() {
        log(&format!("{}: no bets found for period {}", source, period));
        return TicketReport::incomplete(source, fields, Outcome::NoBets);
    }

    log(&format!(
        "{}: period {}, {} bet(s){}",
        source,
        period,
        fields.bets.len(),
        if fields.supplementary { ", supplementary" } else { "" }
    ));

    let Some(draw) = draws.fetch(&period) else {
        return TicketReport::incomplete(source, fields, Outcome::DrawUnavailable);
    };

    let scores: Vec<BetScore> = fields
        .bets
        .iter()
        .map(|bet| score_detailed(bet, &draw, fields.supplementary))
        .collect();
    let total = scores
        .iter()
        .fold(0u64, |sum, s| sum.saturating_add(s.total));

    log(&format!("{}: total {}", source, total));

    TicketReport {
        source: source.to_string(),
        fields,
        outcome: Outcome::Checked,
        draw: Some(draw),
        scores,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{PrizeTable, StaticDrawSource};
    use crate::prize::PrizeTier;
    use crate::ticket::DrawPeriod;

    fn draws() -> StaticDrawSource {
        let mut source = StaticDrawSource::new();
        source.insert(
            DrawRecord::new(
                DrawPeriod::parse("23056").unwrap(),
                [1, 2, 3, 4, 5],
                [1, 2],
                PrizeTable::new(10_000_000, 200_000),
            )
            .unwrap(),
        );
        source
    }

    #[test]
    fn test_checked_ticket() {
        let lines = [
            "体彩超级大乐透",
            "第23056期",
            "① 01 02 03 04 05 + 01 02",
            "② 01 02 03 09 10 + 01 11",
        ];
        let report = check_lines("ticket", &lines, &draws(), &ExtractRules::default());

        assert_eq!(report.outcome, Outcome::Checked);
        assert_eq!(report.scores.len(), 2);
        assert_eq!(report.scores[0].total, 10_000_000);
        // 3+1 hits
        assert_eq!(report.scores[1].tallies[0].tier, PrizeTier::Eighth);
        assert_eq!(report.total, 10_000_015);
        assert!(report.draw.is_some());
    }

    #[test]
    fn test_supplementary_ticket() {
        let lines = ["第23056期 追加", "01 02 03 04 05 + 01 09"];
        let report = check_lines("ticket", &lines, &draws(), &ExtractRules::default());
        assert!(report.fields.supplementary);
        assert_eq!(report.total, 360_000);
    }

    #[test]
    fn test_missing_period() {
        let lines = ["01 02 03 04 05 + 01 02"];
        let report = check_lines("ticket", &lines, &draws(), &ExtractRules::default());
        assert_eq!(report.outcome, Outcome::MissingPeriod);
        assert_eq!(report.fields.bets.len(), 1);
        assert_eq!(report.total, 0);
    }

    #[test]
    fn test_no_bets() {
        let lines = ["第23056期", "12345"];
        let report = check_lines("ticket", &lines, &draws(), &ExtractRules::default());
        assert_eq!(report.outcome, Outcome::NoBets);
    }

    #[test]
    fn test_draw_unavailable() {
        let lines = ["第23099期", "01 02 03 04 05 + 01 02"];
        let report = check_lines("ticket", &lines, &draws(), &ExtractRules::default());
        assert_eq!(report.outcome, Outcome::DrawUnavailable);
        assert!(report.scores.is_empty());
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(Outcome::RecognitionFailed {
            error: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "recognition_failed");
        assert_eq!(json["error"], "boom");

        let json = serde_json::to_value(Outcome::NoBets).unwrap();
        assert_eq!(json["status"], "no_bets");
    }
}
