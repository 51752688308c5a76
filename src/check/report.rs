use anyhow::{Context, Result};
use std::fmt::Write;

use super::pipeline::{Outcome, TicketReport};

/// Renders a report the way results are read out at a lottery counter:
/// one line per bet with the tiers it hit, then the ticket total.
pub fn render_text(report: &TicketReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", report.source);

    if let Some(period) = &report.fields.period {
        let _ = writeln!(
            out,
            "识别期号: {}{}",
            period,
            if report.fields.supplementary { " (追加)" } else { "" }
        );
    }

    match &report.outcome {
        Outcome::MissingPeriod => {
            let _ = writeln!(out, "未识别到期号，请手动核对");
        }
        Outcome::NoBets => {
            let _ = writeln!(out, "未识别到投注号码，请手动核对");
        }
        Outcome::DrawUnavailable => {
            let _ = writeln!(out, "暂无开奖数据");
        }
        Outcome::RecognitionFailed { error } => {
            let _ = writeln!(out, "识别失败: {}", error);
        }
        Outcome::Checked => {}
    }

    if let Some(draw) = &report.draw {
        let _ = writeln!(out, "开奖号码: {}", draw);
    }

    for (i, bet) in report.fields.bets.iter().enumerate() {
        let kind = if bet.is_single() {
            "单式".to_string()
        } else {
            format!("复式 {}注", bet.combination_count())
        };
        let _ = write!(out, "第{}注：{} [{}]", i + 1, bet, kind);

        match report.scores.get(i) {
            Some(score) if score.is_winning() => {
                let tiers: Vec<String> = score
                    .tallies
                    .iter()
                    .map(|t| format!("{} x{} ({}元)", t.tier, t.count, t.amount))
                    .collect();
                let _ = writeln!(out, " → {}", tiers.join(", "));
            }
            Some(_) => {
                let _ = writeln!(out, " → 未中奖");
            }
            None => {
                let _ = writeln!(out);
            }
        }
    }

    if report.outcome == Outcome::Checked {
        let _ = writeln!(out, "中奖总额: ￥{}", report.total);
    }

    out
}

/// Renders several reports followed by a grand total when there is more
/// than one.
pub fn render_text_all(reports: &[TicketReport]) -> String {
    let mut out = reports
        .iter()
        .map(render_text)
        .collect::<Vec<_>>()
        .join("\n");

    if reports.len() > 1 {
        let checked = reports
            .iter()
            .filter(|r| r.outcome == Outcome::Checked)
            .count();
        let total = reports
            .iter()
            .fold(0u64, |sum, r| sum.saturating_add(r.total));
        let _ = writeln!(
            out,
            "\n共 {} 张彩票，已核对 {} 张，合计中奖 ￥{}",
            reports.len(),
            checked,
            total
        );
    }

    out
}

pub fn render_json(reports: &[TicketReport]) -> Result<String> {
    serde_json::to_string_pretty(reports).context("Failed to serialize reports")
}
