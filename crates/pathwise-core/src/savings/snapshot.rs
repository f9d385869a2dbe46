//! Savings plan value types
//!
//! A `SavingsPlanSnapshot` is immutable; every engine call returns a new one.
//! Bucket values are rounded to cents on construction and `monthly_savings`
//! is always recomputed from the buckets, including when deserialized.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::units::{from_cents, non_negative, to_cents};

/// A post-tax savings bucket the user can edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Emergency fund
    Ef,
    /// Extra high-APR debt paydown
    Debt,
    /// Tax-advantaged retirement beyond the employer match
    RetirementExtra,
    /// Taxable brokerage
    Brokerage,
}

impl Bucket {
    /// Highest priority first
    pub const PRIORITY_ORDER: [Bucket; 4] = [
        Bucket::Ef,
        Bucket::Debt,
        Bucket::RetirementExtra,
        Bucket::Brokerage,
    ];

    /// Order in which buckets absorb an overflow (lowest value-add first)
    pub const REDUCTION_ORDER: [Bucket; 4] = [
        Bucket::Brokerage,
        Bucket::RetirementExtra,
        Bucket::Debt,
        Bucket::Ef,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ef => "ef",
            Self::Debt => "debt",
            Self::RetirementExtra => "retirement_extra",
            Self::Brokerage => "brokerage",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ef => "Emergency fund",
            Self::Debt => "Debt paydown",
            Self::RetirementExtra => "Retirement",
            Self::Brokerage => "Brokerage",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Ef => 0,
            Self::Debt => 1,
            Self::RetirementExtra => 2,
            Self::Brokerage => 3,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ef" | "emergency_fund" | "emergency-fund" => Ok(Self::Ef),
            "debt" => Ok(Self::Debt),
            "retirement" | "retirement_extra" | "retirement-extra" => Ok(Self::RetirementExtra),
            "brokerage" => Ok(Self::Brokerage),
            _ => Err(format!("Unknown bucket: {}", s)),
        }
    }
}

/// A committed or proposed monthly allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SnapshotRecord")]
pub struct SavingsPlanSnapshot {
    pub ef: f64,
    pub debt: f64,
    /// Pre-tax employee contribution capturing the employer match. Not part
    /// of `monthly_savings`.
    #[serde(rename = "match401k")]
    pub match_401k: f64,
    pub hsa: f64,
    pub retirement_tax_adv: f64,
    pub brokerage: f64,
    /// Sum of ef, debt, hsa, retirement and brokerage
    pub monthly_savings: f64,
}

/// Wire shape accepted on input; `monthlySavings` is ignored and recomputed
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SnapshotRecord {
    ef: f64,
    debt: f64,
    #[serde(rename = "match401k")]
    match_401k: f64,
    hsa: f64,
    retirement_tax_adv: f64,
    brokerage: f64,
}

impl From<SnapshotRecord> for SavingsPlanSnapshot {
    fn from(r: SnapshotRecord) -> Self {
        SavingsPlanSnapshot::new(
            r.ef,
            r.debt,
            r.match_401k,
            r.hsa,
            r.retirement_tax_adv,
            r.brokerage,
        )
    }
}

impl Default for SavingsPlanSnapshot {
    fn default() -> Self {
        Self::zero()
    }
}

impl SavingsPlanSnapshot {
    /// Build a snapshot, flooring every bucket at zero and rounding to cents
    pub fn new(
        ef: f64,
        debt: f64,
        match_401k: f64,
        hsa: f64,
        retirement_tax_adv: f64,
        brokerage: f64,
    ) -> Self {
        Self::from_cents(
            [
                to_cents(non_negative(ef)),
                to_cents(non_negative(debt)),
                to_cents(non_negative(retirement_tax_adv)),
                to_cents(non_negative(brokerage)),
            ],
            to_cents(non_negative(match_401k)),
            to_cents(non_negative(hsa)),
        )
    }

    pub fn zero() -> Self {
        Self::from_cents([0; 4], 0, 0)
    }

    /// Build from integer cents; post-tax values are in `Bucket::index` order
    pub(crate) fn from_cents(post_tax: [i64; 4], match_401k: i64, hsa: i64) -> Self {
        let post_tax = post_tax.map(|c| c.max(0));
        let hsa = hsa.max(0);
        let total = post_tax.iter().fold(hsa, |acc, c| acc.saturating_add(*c));
        Self {
            ef: from_cents(post_tax[0]),
            debt: from_cents(post_tax[1]),
            match_401k: from_cents(match_401k.max(0)),
            hsa: from_cents(hsa),
            retirement_tax_adv: from_cents(post_tax[2]),
            brokerage: from_cents(post_tax[3]),
            monthly_savings: from_cents(total),
        }
    }

    pub fn get(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::Ef => self.ef,
            Bucket::Debt => self.debt,
            Bucket::RetirementExtra => self.retirement_tax_adv,
            Bucket::Brokerage => self.brokerage,
        }
    }

    /// Sum of the post-tax buckets (everything drawn from the post-tax pool)
    pub fn post_tax_total(&self) -> f64 {
        from_cents(self.post_tax_cents().total())
    }

    /// Amount by which the post-tax buckets exceed `pool`
    pub fn excess_over(&self, pool: f64) -> f64 {
        let pool = to_cents(non_negative(pool));
        from_cents(self.post_tax_cents().total().saturating_sub(pool).max(0))
    }

    /// Cash left to allocate from `pool`
    pub fn unallocated(&self, pool: f64) -> f64 {
        let pool = to_cents(non_negative(pool));
        from_cents(pool.saturating_sub(self.post_tax_cents().total()).max(0))
    }

    pub(crate) fn post_tax_cents(&self) -> PostTaxCents {
        PostTaxCents([
            to_cents(self.ef),
            to_cents(self.debt),
            to_cents(self.retirement_tax_adv),
            to_cents(self.brokerage),
        ])
    }
}

/// Post-tax buckets in integer cents, indexed by `Bucket::index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PostTaxCents(pub [i64; 4]);

impl PostTaxCents {
    pub fn get(&self, bucket: Bucket) -> i64 {
        self.0[bucket.index()]
    }

    pub fn set(&mut self, bucket: Bucket, cents: i64) {
        self.0[bucket.index()] = cents.max(0);
    }

    pub fn total(&self) -> i64 {
        self.0.iter().fold(0i64, |acc, c| acc.saturating_add(*c))
    }
}

/// Signed per-bucket dollar edits applied against a baseline snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavingsOverrides {
    pub ef_delta: f64,
    pub debt_delta: f64,
    pub retirement_extra_delta: f64,
    pub brokerage_delta: f64,
    /// Change to the pre-tax 401(k) employee contribution
    #[serde(rename = "preTax401kDelta")]
    pub pre_tax_401k_delta: f64,
    /// Change to the pre-tax HSA contribution
    pub hsa_delta: f64,
}

impl SavingsOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delta(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::Ef => self.ef_delta,
            Bucket::Debt => self.debt_delta,
            Bucket::RetirementExtra => self.retirement_extra_delta,
            Bucket::Brokerage => self.brokerage_delta,
        }
    }

    /// Accumulate another edit onto a post-tax bucket
    pub fn accumulate(&mut self, bucket: Bucket, amount: f64) {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        match bucket {
            Bucket::Ef => self.ef_delta += amount,
            Bucket::Debt => self.debt_delta += amount,
            Bucket::RetirementExtra => self.retirement_extra_delta += amount,
            Bucket::Brokerage => self.brokerage_delta += amount,
        }
    }

    /// True when no post-tax bucket has a non-zero (cent-rounded) edit
    pub fn is_post_tax_empty(&self) -> bool {
        Bucket::PRIORITY_ORDER
            .iter()
            .all(|b| to_cents(self.delta(*b)) == 0)
    }

    pub fn is_pre_tax_empty(&self) -> bool {
        to_cents(self.pre_tax_401k_delta) == 0 && to_cents(self.hsa_delta) == 0
    }

    pub fn is_empty(&self) -> bool {
        self.is_post_tax_empty() && self.is_pre_tax_empty()
    }

    /// Reset after a commit or an explicit reset
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Copy with the pre-tax edits removed
    pub fn post_tax_only(&self) -> Self {
        Self {
            pre_tax_401k_delta: 0.0,
            hsa_delta: 0.0,
            ..self.clone()
        }
    }
}
