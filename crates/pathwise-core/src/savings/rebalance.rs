//! Override & Rebalance Engine
//!
//! Applies user edits to a baseline snapshot and keeps the post-tax buckets
//! within the post-tax pool. Overflow is absorbed in reverse priority order
//! (brokerage, retirement, debt, emergency fund). A bucket the user just
//! increased never pays for its own increase; it is only clipped once every
//! other bucket is empty.
//!
//! All arithmetic is in integer cents so repeated edits cannot drift.

use serde::{Deserialize, Serialize};

use crate::config::RebalanceConfig;
use crate::units::{from_cents, non_negative, to_cents};

use super::snapshot::{Bucket, PostTaxCents, SavingsOverrides, SavingsPlanSnapshot};

/// Why a bucket was reduced during a rebalance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionKind {
    /// Cut to make room for an increase elsewhere (or a smaller pool)
    AutoReduced,
    /// The user's own increase was trimmed because nothing else was left
    IncreaseClipped,
}

/// One reduction applied while fitting buckets to the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reduction {
    pub bucket: Bucket,
    pub amount: f64,
    pub kind: ReductionKind,
}

/// Fit `cents` under `pool`, skipping `protected` buckets until the others
/// are exhausted. Returns the reductions in the order they were applied.
fn waterfall(cents: &mut PostTaxCents, pool: i64, protected: &[bool; 4]) -> Vec<Reduction> {
    let mut excess = cents.total() - pool;
    let mut reductions = Vec::new();
    if excess <= 0 {
        return reductions;
    }

    let passes = [
        (false, ReductionKind::AutoReduced),
        (true, ReductionKind::IncreaseClipped),
    ];
    for (take_protected, kind) in passes {
        for bucket in Bucket::REDUCTION_ORDER {
            if excess == 0 {
                break;
            }
            if protected[bucket.index()] != take_protected {
                continue;
            }
            let take = excess.min(cents.get(bucket));
            if take > 0 {
                cents.set(bucket, cents.get(bucket) - take);
                excess -= take;
                reductions.push(Reduction {
                    bucket,
                    amount: from_cents(take),
                    kind,
                });
            }
        }
    }

    debug_assert!(cents.total() <= pool, "rebalance left buckets over the pool");
    reductions
}

/// Apply per-bucket cent deltas and rebalance against the pool
fn rebalance_cents(
    baseline: &SavingsPlanSnapshot,
    deltas: [i64; 4],
    pool: f64,
    clamp_to_pool: bool,
) -> (SavingsPlanSnapshot, Vec<Reduction>) {
    let pool = to_cents(non_negative(pool));
    let mut cents = baseline.post_tax_cents();
    let mut increased = [false; 4];

    for bucket in Bucket::PRIORITY_ORDER {
        let delta = deltas[bucket.index()];
        if delta > 0 {
            increased[bucket.index()] = true;
        }
        cents.set(bucket, cents.get(bucket).saturating_add(delta));
    }

    let reductions = if clamp_to_pool {
        waterfall(&mut cents, pool, &increased)
    } else {
        Vec::new()
    };

    for r in &reductions {
        tracing::debug!(
            bucket = r.bucket.as_str(),
            amount = r.amount,
            kind = ?r.kind,
            "Rebalance reduction"
        );
    }

    let snapshot = SavingsPlanSnapshot::from_cents(
        cents.0,
        to_cents(baseline.match_401k),
        to_cents(baseline.hsa),
    );
    (snapshot, reductions)
}

fn override_deltas(overrides: &SavingsOverrides) -> [i64; 4] {
    let mut deltas = [0; 4];
    for bucket in Bucket::PRIORITY_ORDER {
        deltas[bucket.index()] = to_cents(overrides.delta(bucket));
    }
    deltas
}

/// Apply accumulated post-tax overrides to `baseline`.
///
/// With `clamp_to_pool` the result never exceeds `pool`; without it the edits
/// are applied as-is and any overflow is left for the caller to surface (see
/// [`SavingsPlanSnapshot::excess_over`]). A shortfall is always left
/// unallocated. Pre-tax deltas are ignored here; see [`apply_all_overrides`].
pub fn apply_overrides_and_rebalance(
    baseline: &SavingsPlanSnapshot,
    overrides: &SavingsOverrides,
    pool: f64,
    clamp_to_pool: bool,
) -> SavingsPlanSnapshot {
    if overrides.is_post_tax_empty() {
        return baseline.clone();
    }
    rebalance_cents(baseline, override_deltas(overrides), pool, clamp_to_pool).0
}

/// Explicit trim pass against a (usually smaller) pool.
///
/// Reduces in reverse priority order with no protected buckets. When
/// `fill_shortfall` is set, leftover pool cash goes to brokerage; only the
/// pre-tax path asks for that, never a mid-edit caller.
pub fn trim_to_pool(
    snapshot: &SavingsPlanSnapshot,
    pool: f64,
    fill_shortfall: bool,
) -> (SavingsPlanSnapshot, Vec<Reduction>) {
    let pool = to_cents(non_negative(pool));
    let mut cents = snapshot.post_tax_cents();
    let reductions = waterfall(&mut cents, pool, &[false; 4]);

    if fill_shortfall {
        let residual = pool.saturating_sub(cents.total());
        if residual > 0 {
            cents.set(Bucket::Brokerage, cents.get(Bucket::Brokerage).saturating_add(residual));
        }
    }

    let trimmed = SavingsPlanSnapshot::from_cents(
        cents.0,
        to_cents(snapshot.match_401k),
        to_cents(snapshot.hsa),
    );
    (trimmed, reductions)
}

/// Direction of a single stepper nudge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    Up,
    Down,
}

/// Result of one stepper nudge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepperOutcome {
    pub snapshot: SavingsPlanSnapshot,
    pub bucket: Bucket,
    /// Net change to the nudged bucket after flooring and clipping
    pub applied_delta: f64,
    pub reductions: Vec<Reduction>,
}

impl StepperOutcome {
    /// The first other bucket that paid for this nudge, if any
    pub fn auto_reduced(&self) -> Option<Bucket> {
        self.reductions
            .iter()
            .find(|r| r.kind == ReductionKind::AutoReduced)
            .map(|r| r.bucket)
    }
}

/// Nudge one post-tax bucket by the configured increment, rebalancing the
/// others with the same rule as [`apply_overrides_and_rebalance`]
pub fn apply_post_tax_stepper_change(
    base: &SavingsPlanSnapshot,
    bucket: Bucket,
    direction: StepDirection,
    pool: f64,
    config: &RebalanceConfig,
) -> StepperOutcome {
    let step = to_cents(non_negative(config.stepper_increment));
    let mut deltas = [0; 4];
    deltas[bucket.index()] = match direction {
        StepDirection::Up => step,
        StepDirection::Down => -step,
    };

    let (snapshot, reductions) = rebalance_cents(base, deltas, pool, true);
    let applied_delta = snapshot.get(bucket) - base.get(bucket);

    StepperOutcome {
        snapshot,
        bucket,
        applied_delta: from_cents(to_cents(applied_delta)),
        reductions,
    }
}

/// Result of applying pre-tax (401(k) / HSA) overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreTaxOutcome {
    pub snapshot: SavingsPlanSnapshot,
    /// Budget less effective pre-tax contributions
    pub post_tax_pool: f64,
    pub reductions: Vec<Reduction>,
}

/// Apply the pre-tax deltas, recompute the post-tax pool, and re-trim the
/// post-tax buckets against it.
///
/// Effective pre-tax contributions are the HSA plus any 401(k) contribution
/// beyond the baseline's match amount (which sits outside the budget).
/// Pre-tax elections are bounded by the budget itself.
pub fn apply_pre_tax_overrides(
    baseline: &SavingsPlanSnapshot,
    overrides: &SavingsOverrides,
    budget: f64,
) -> PreTaxOutcome {
    let budget = to_cents(non_negative(budget));
    let base_401k = to_cents(baseline.match_401k);
    let base_hsa = to_cents(baseline.hsa);

    if overrides.is_pre_tax_empty() {
        return PreTaxOutcome {
            snapshot: baseline.clone(),
            post_tax_pool: from_cents((budget - base_hsa).max(0)),
            reductions: Vec::new(),
        };
    }

    let mut new_401k = (base_401k + to_cents(overrides.pre_tax_401k_delta)).max(0);
    let mut new_hsa = (base_hsa + to_cents(overrides.hsa_delta)).max(0);

    // Pre-tax elections cannot draw more than the whole budget
    let mut over = new_hsa + (new_401k - base_401k) - budget;
    if over > 0 {
        let hsa_cut = over.min(new_hsa);
        new_hsa -= hsa_cut;
        over -= hsa_cut;
        new_401k -= over.min((new_401k - base_401k).max(0));
    }

    let effective = new_hsa + (new_401k - base_401k);
    let pool = (budget - effective).max(0);

    let adjusted = SavingsPlanSnapshot::from_cents(baseline.post_tax_cents().0, new_401k, new_hsa);
    let (snapshot, reductions) = trim_to_pool(&adjusted, from_cents(pool), true);

    tracing::debug!(
        post_tax_pool = from_cents(pool),
        hsa = snapshot.hsa,
        match_401k = snapshot.match_401k,
        reductions = reductions.len(),
        "Pre-tax overrides applied"
    );

    PreTaxOutcome {
        snapshot,
        post_tax_pool: from_cents(pool),
        reductions,
    }
}

/// Result of applying a full set of overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEditOutcome {
    pub snapshot: SavingsPlanSnapshot,
    pub post_tax_pool: f64,
}

/// Pre-tax pass, then the post-tax pass against the resulting pool
pub fn apply_all_overrides(
    baseline: &SavingsPlanSnapshot,
    overrides: &SavingsOverrides,
    budget: f64,
) -> PlanEditOutcome {
    let pre_tax = apply_pre_tax_overrides(baseline, overrides, budget);
    let snapshot = apply_overrides_and_rebalance(
        &pre_tax.snapshot,
        &overrides.post_tax_only(),
        pre_tax.post_tax_pool,
        true,
    );
    PlanEditOutcome {
        snapshot,
        post_tax_pool: pre_tax.post_tax_pool,
    }
}
