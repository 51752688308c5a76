use serde::Serialize;
use std::fmt;

use crate::draw::PrizeTable;

/// Prize class of one single bet, decided by how many front and back
/// numbers it hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PrizeTier {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
    Ninth,
    None,
}

impl PrizeTier {
    /// Resolves the tier for a (front hits, back hits) pair.
    pub fn from_hits(front: usize, back: usize) -> Self {
        match (front, back) {
            (5, 2) => Self::First,
            (5, 1) => Self::Second,
            (5, 0) => Self::Third,
            (4, 2) => Self::Fourth,
            (4, 1) => Self::Fifth,
            (3, 2) => Self::Sixth,
            (4, 0) => Self::Seventh,
            (3, 1) | (2, 2) => Self::Eighth,
            (3, 0) | (1, 2) | (2, 1) | (0, 2) => Self::Ninth,
            _ => Self::None,
        }
    }

    /// Base payout for one winning single bet.
    pub fn base_amount(self, prizes: &PrizeTable) -> u64 {
        match self {
            Self::First => prizes.first,
            Self::Second => prizes.second,
            Self::Third => 10_000,
            Self::Fourth => 3_000,
            Self::Fifth => 300,
            Self::Sixth => 200,
            Self::Seventh => 100,
            Self::Eighth => 15,
            Self::Ninth => 5,
            Self::None => 0,
        }
    }

    /// Only the floating tiers pay extra on a supplementary stake.
    pub fn supplementary_applies(self) -> bool {
        matches!(self, Self::First | Self::Second)
    }

    /// Payout including the supplementary stake, truncated to whole yuan.
    /// Saturates at `u64::MAX`.
    pub fn amount(self, prizes: &PrizeTable, supplementary: bool) -> u64 {
        let base = self.base_amount(prizes);
        if supplementary && self.supplementary_applies() {
            // x1.8
            u64::try_from(u128::from(base) * 18 / 10).unwrap_or(u64::MAX)
        } else {
            base
        }
    }

    /// Name as printed on results boards.
    pub fn label(self) -> &'static str {
        match self {
            Self::First => "一等奖",
            Self::Second => "二等奖",
            Self::Third => "三等奖",
            Self::Fourth => "四等奖",
            Self::Fifth => "五等奖",
            Self::Sixth => "六等奖",
            Self::Seventh => "七等奖",
            Self::Eighth => "八等奖",
            Self::Ninth => "九等奖",
            Self::None => "未中奖",
        }
    }
}

impl fmt::Display for PrizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prizes() -> PrizeTable {
        PrizeTable::new(10_000_000, 200_000)
    }

    #[test]
    fn test_tier_table() {
        let cases = [
            ((5, 2), PrizeTier::First, 10_000_000),
            ((5, 1), PrizeTier::Second, 200_000),
            ((5, 0), PrizeTier::Third, 10_000),
            ((4, 2), PrizeTier::Fourth, 3_000),
            ((4, 1), PrizeTier::Fifth, 300),
            ((3, 2), PrizeTier::Sixth, 200),
            ((4, 0), PrizeTier::Seventh, 100),
            ((3, 1), PrizeTier::Eighth, 15),
            ((2, 2), PrizeTier::Eighth, 15),
            ((3, 0), PrizeTier::Ninth, 5),
            ((1, 2), PrizeTier::Ninth, 5),
            ((2, 1), PrizeTier::Ninth, 5),
            ((0, 2), PrizeTier::Ninth, 5),
            ((2, 0), PrizeTier::None, 0),
            ((1, 1), PrizeTier::None, 0),
            ((0, 1), PrizeTier::None, 0),
            ((0, 0), PrizeTier::None, 0),
            ((1, 0), PrizeTier::None, 0),
        ];

        for ((front, back), tier, amount) in cases {
            let resolved = PrizeTier::from_hits(front, back);
            assert_eq!(resolved, tier, "hits {}+{}", front, back);
            assert_eq!(resolved.base_amount(&prizes()), amount, "hits {}+{}", front, back);
        }
    }

    #[test]
    fn test_supplementary_top_tiers_only() {
        assert_eq!(PrizeTier::First.amount(&prizes(), true), 18_000_000);
        assert_eq!(PrizeTier::Second.amount(&prizes(), true), 360_000);
        assert_eq!(PrizeTier::Third.amount(&prizes(), true), 10_000);
        assert_eq!(PrizeTier::Ninth.amount(&prizes(), true), 5);
        assert_eq!(PrizeTier::None.amount(&prizes(), true), 0);
    }

    #[test]
    fn test_supplementary_truncates() {
        let odd = PrizeTable::new(1_234_567, 99_999);
        // 1_234_567 * 1.8 = 2_222_220.6
        assert_eq!(PrizeTier::First.amount(&odd, true), 2_222_220);
        // 99_999 * 1.8 = 179_998.2
        assert_eq!(PrizeTier::Second.amount(&odd, true), 179_998);
    }

    #[test]
    fn test_supplementary_large_amounts() {
        let big = PrizeTable::new(u64::MAX / 10, 1);
        let expected = (u128::from(u64::MAX / 10) * 18 / 10) as u64;
        assert_eq!(PrizeTier::First.amount(&big, true), expected);

        let huge = PrizeTable::new(2_000_000_000_000_000_000, u64::MAX);
        assert_eq!(PrizeTier::First.amount(&huge, true), u64::MAX);
        assert_eq!(PrizeTier::Second.amount(&huge, true), u64::MAX);
        assert_eq!(PrizeTier::Second.amount(&huge, false), u64::MAX);
    }

    #[test]
    fn test_label() {
        assert_eq!(PrizeTier::First.to_string(), "一等奖");
        assert_eq!(PrizeTier::None.label(), "未中奖");
        assert_eq!(PrizeTier::Ninth.to_string(), "九等奖");
    }
}
