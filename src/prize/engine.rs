//! Prize computation for single and compound bets.
//!
//! A compound bet is scored by expanding it into every 5+2 single bet it
//! covers (all 5-subsets of the front selection times all 2-subsets of the
//! back selection), resolving a tier for each and summing the payouts.

use serde::Serialize;
use std::collections::BTreeMap;

use super::tier::PrizeTier;
use crate::draw::DrawRecord;
use crate::ticket::{Bet, BACK_PICK, FRONT_PICK};

/// How many single bets landed in one tier, and what they pay together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierTally {
    pub tier: PrizeTier,
    pub count: u64,
    pub amount: u64,
}

/// Scoring result for one printed bet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetScore {
    /// Single bets evaluated.
    pub combinations: u64,
    pub total: u64,
    /// Winning tiers only, best first.
    pub tallies: Vec<TierTally>,
}

impl BetScore {
    pub fn is_winning(&self) -> bool {
        self.total > 0
    }
}

/// Total payout for a bet against a draw.
pub fn score(bet: &Bet, draw: &DrawRecord, supplementary: bool) -> u64 {
    score_detailed(bet, draw, supplementary).total
}

/// Scores a bet and keeps the per-tier breakdown.
///
/// # Panics
///
/// If the bet has fewer than five front or two back numbers. `Bet::new`
/// never builds such a bet.
pub fn score_detailed(bet: &Bet, draw: &DrawRecord, supplementary: bool) -> BetScore {
    assert!(
        bet.front().len() >= FRONT_PICK && bet.back().len() >= BACK_PICK,
        "bet below single-bet shape: {}",
        bet
    );

    let front: Vec<u8> = bet.front().iter().copied().collect();
    let back: Vec<u8> = bet.back().iter().copied().collect();

    // Back hits depend only on the back subset, so count them once.
    let back_hits: Vec<usize> = combinations(&back, BACK_PICK)
        .map(|subset| subset.iter().filter(|n| draw.back().contains(n)).count())
        .collect();

    let mut tiers: BTreeMap<PrizeTier, TierTally> = BTreeMap::new();
    let mut combinations_seen = 0u64;
    let mut total = 0u64;

    for front_subset in combinations(&front, FRONT_PICK) {
        let front_hits = front_subset
            .iter()
            .filter(|n| draw.front().contains(n))
            .count();

        for &back_hit in &back_hits {
            combinations_seen += 1;

            let tier = PrizeTier::from_hits(front_hits, back_hit);
            if tier == PrizeTier::None {
                continue;
            }

            let amount = tier.amount(draw.prizes(), supplementary);
            total = total.saturating_add(amount);

            let tally = tiers.entry(tier).or_insert(TierTally {
                tier,
                count: 0,
                amount: 0,
            });
            tally.count += 1;
            tally.amount = tally.amount.saturating_add(amount);
        }
    }

    BetScore {
        combinations: combinations_seen,
        total,
        tallies: tiers.into_values().collect(),
    }
}

/// Lexicographic k-subsets of `items`.
pub fn combinations(items: &[u8], k: usize) -> Combinations<'_> {
    Combinations {
        items,
        indices: (0..k).collect(),
        done: k > items.len(),
    }
}

pub struct Combinations<'a> {
    items: &'a [u8],
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for Combinations<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current = self.indices.iter().map(|&i| self.items[i]).collect();

        // Advance: find the rightmost index that can still move right.
        let n = self.items.len();
        let k = self.indices.len();
        match (0..k).rev().find(|&i| self.indices[i] < n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(current)
    }
}
