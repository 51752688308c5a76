use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Numbers picked in the front zone of a single bet.
pub const FRONT_PICK: usize = 5;
/// Numbers picked in the back zone of a single bet.
pub const BACK_PICK: usize = 2;
/// Highest front-zone number.
pub const FRONT_MAX: u8 = 35;
/// Highest back-zone number.
pub const BACK_MAX: u8 = 12;

/// Draw period identifier, e.g. `23056`.
///
/// Always five ASCII digits starting with `2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DrawPeriod(String);

impl DrawPeriod {
    /// Validates a period string. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let valid = text.len() == 5
            && text.starts_with('2')
            && text.bytes().all(|b| b.is_ascii_digit());
        valid.then(|| Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DrawPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DrawPeriod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid draw period: {}", value))
    }
}

impl From<DrawPeriod> for String {
    fn from(period: DrawPeriod) -> Self {
        period.0
    }
}

/// One printed bet: a front-zone and a back-zone selection.
///
/// A 5+2 bet is a single bet; anything larger is a compound bet covering
/// every 5+2 sub-selection. The constructor is the only way in, so every
/// `Bet` satisfies the zone ranges and minimum sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bet {
    front: BTreeSet<u8>,
    back: BTreeSet<u8>,
}

impl Bet {
    /// Builds a bet from raw numbers. Duplicates collapse.
    ///
    /// Returns `None` if a number is out of its zone's range or a zone has
    /// fewer numbers than a single bet needs.
    pub fn new(
        front: impl IntoIterator<Item = u8>,
        back: impl IntoIterator<Item = u8>,
    ) -> Option<Self> {
        let front: BTreeSet<u8> = front.into_iter().collect();
        let back: BTreeSet<u8> = back.into_iter().collect();

        if front.len() < FRONT_PICK || back.len() < BACK_PICK {
            return None;
        }
        if !front.iter().all(|n| (1..=FRONT_MAX).contains(n)) {
            return None;
        }
        if !back.iter().all(|n| (1..=BACK_MAX).contains(n)) {
            return None;
        }

        Some(Self { front, back })
    }

    pub fn front(&self) -> &BTreeSet<u8> {
        &self.front
    }

    pub fn back(&self) -> &BTreeSet<u8> {
        &self.back
    }

    /// True for a plain 5+2 bet.
    pub fn is_single(&self) -> bool {
        self.front.len() == FRONT_PICK && self.back.len() == BACK_PICK
    }

    /// Number of single bets this bet expands to: `C(front, 5) * C(back, 2)`.
    pub fn combination_count(&self) -> u64 {
        binomial(self.front.len() as u64, FRONT_PICK as u64)
            * binomial(self.back.len() as u64, BACK_PICK as u64)
    }
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<u8>| {
            set.iter()
                .map(|n| format!("{:02}", n))
                .collect::<Vec<_>>()
                .join(" ")
        };
        write!(f, "{} + {}", join(&self.front), join(&self.back))
    }
}

pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}
