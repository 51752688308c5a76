use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::ticket::types::{BACK_MAX, BACK_PICK, FRONT_MAX, FRONT_PICK};
use crate::ticket::{parse_bet_line, DrawPeriod};

/// Per-bet amounts for the two floating tiers.
///
/// Every other tier pays a fixed amount, see [`crate::prize::PrizeTier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTable {
    pub first: u64,
    pub second: u64,
    /// True when the amounts are fallbacks rather than published figures.
    #[serde(default)]
    pub estimated: bool,
}

impl PrizeTable {
    pub fn new(first: u64, second: u64) -> Self {
        Self {
            first,
            second,
            estimated: false,
        }
    }

    pub fn fallback(first: u64, second: u64) -> Self {
        Self {
            first,
            second,
            estimated: true,
        }
    }
}

/// Official result of one draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDrawRecord")]
pub struct DrawRecord {
    period: DrawPeriod,
    front: BTreeSet<u8>,
    back: BTreeSet<u8>,
    prizes: PrizeTable,
}

/// Unchecked shape used while deserializing.
#[derive(Deserialize)]
struct RawDrawRecord {
    period: DrawPeriod,
    front: BTreeSet<u8>,
    back: BTreeSet<u8>,
    prizes: PrizeTable,
}

impl TryFrom<RawDrawRecord> for DrawRecord {
    type Error = String;

    fn try_from(raw: RawDrawRecord) -> Result<Self, Self::Error> {
        let period = raw.period.clone();
        DrawRecord::new(raw.period, raw.front, raw.back, raw.prizes)
            .ok_or_else(|| format!("invalid winning numbers for period {}", period))
    }
}

impl DrawRecord {
    /// Builds a record, requiring exactly five front and two back numbers
    /// within their zone ranges.
    pub fn new(
        period: DrawPeriod,
        front: impl IntoIterator<Item = u8>,
        back: impl IntoIterator<Item = u8>,
        prizes: PrizeTable,
    ) -> Option<Self> {
        let front: BTreeSet<u8> = front.into_iter().collect();
        let back: BTreeSet<u8> = back.into_iter().collect();

        let valid = front.len() == FRONT_PICK
            && back.len() == BACK_PICK
            && front.iter().all(|n| (1..=FRONT_MAX).contains(n))
            && back.iter().all(|n| (1..=BACK_MAX).contains(n));

        valid.then_some(Self {
            period,
            front,
            back,
            prizes,
        })
    }

    /// Parses winning numbers written like a ticket line,
    /// e.g. `"03 08 15 22 31 + 04 11"`.
    pub fn from_numbers_text(period: DrawPeriod, text: &str, prizes: PrizeTable) -> Option<Self> {
        let bet = parse_bet_line(text, FRONT_PICK)?;
        if !bet.is_single() {
            return None;
        }
        Self::new(
            period,
            bet.front().iter().copied(),
            bet.back().iter().copied(),
            prizes,
        )
    }

    pub fn period(&self) -> &DrawPeriod {
        &self.period
    }

    pub fn front(&self) -> &BTreeSet<u8> {
        &self.front
    }

    pub fn back(&self) -> &BTreeSet<u8> {
        &self.back
    }

    pub fn prizes(&self) -> &PrizeTable {
        &self.prizes
    }
}

impl fmt::Display for DrawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<u8>| {
            set.iter()
                .map(|n| format!("{:02}", n))
                .collect::<Vec<_>>()
                .join(" ")
        };
        write!(
            f,
            "第{}期 {} + {} (一等奖 {}元, 二等奖 {}元{})",
            self.period,
            join(&self.front),
            join(&self.back),
            self.prizes.first,
            self.prizes.second,
            if self.prizes.estimated { ", 估算" } else { "" }
        )
    }
}

/// Looks up the official result for a period.
///
/// Implementations never fail loudly: network, parse or missing-data
/// problems all come back as `None`, meaning "no result yet".
pub trait DrawSource: Send + Sync {
    fn fetch(&self, period: &DrawPeriod) -> Option<DrawRecord>;
}

/// A fixed set of known results.
#[derive(Debug, Default, Clone)]
pub struct StaticDrawSource {
    records: HashMap<DrawPeriod, DrawRecord>,
}

impl StaticDrawSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: DrawRecord) {
        self.records.insert(record.period().clone(), record);
    }
}

impl DrawSource for StaticDrawSource {
    fn fetch(&self, period: &DrawPeriod) -> Option<DrawRecord> {
        self.records.get(period).cloned()
    }
}

/// Winning numbers supplied by hand, applied to whatever period a ticket
/// carries.
#[derive(Debug, Clone)]
pub struct ManualDrawSource {
    front: BTreeSet<u8>,
    back: BTreeSet<u8>,
    prizes: PrizeTable,
}

impl ManualDrawSource {
    /// Parses `"03 08 15 22 31 + 04 11"`-style numbers.
    pub fn parse(numbers: &str, prizes: PrizeTable) -> Option<Self> {
        // Any valid period works for validation; the real one is set per fetch.
        let probe = DrawPeriod::parse("20000")?;
        let record = DrawRecord::from_numbers_text(probe, numbers, prizes)?;
        Some(Self {
            front: record.front,
            back: record.back,
            prizes,
        })
    }
}

impl DrawSource for ManualDrawSource {
    fn fetch(&self, period: &DrawPeriod) -> Option<DrawRecord> {
        DrawRecord::new(
            period.clone(),
            self.front.iter().copied(),
            self.back.iter().copied(),
            self.prizes,
        )
    }
}
