//! Savings plan command implementations (allocate, rebalance, step, pretax)

use std::path::Path;

use anyhow::{Context, Result};
use pathwise_core::units::format_dollars;
use pathwise_core::{
    allocate, apply_all_overrides, apply_overrides_and_rebalance, apply_post_tax_stepper_change,
    post_tax_pool, AllocationRequest, Bucket, PlannerConfig, Reduction, ReductionKind,
    SavingsOverrides, SavingsPlanSnapshot, StepDirection,
};
use serde::Serialize;

use super::{print_json, read_json};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AllocateOutput<'a> {
    snapshot: &'a SavingsPlanSnapshot,
    post_tax_pool: f64,
}

pub fn cmd_allocate(config: &PlannerConfig, input: &Path, json: bool) -> Result<()> {
    let request: AllocationRequest = read_json(input)?;
    let snapshot = allocate(&request, &config.allocation);
    let pool = post_tax_pool(request.budget, &snapshot);

    tracing::debug!(budget = request.budget, pool, "Allocation complete");

    if json {
        return print_json(&AllocateOutput {
            snapshot: &snapshot,
            post_tax_pool: pool,
        });
    }

    println!();
    println!("💰 Savings Plan ({}/mo budget)", format_dollars(request.budget));
    print_snapshot(&snapshot, pool);
    Ok(())
}

pub fn cmd_rebalance(
    baseline: &Path,
    overrides: &Path,
    pool: f64,
    clamp_to_pool: bool,
    json: bool,
) -> Result<()> {
    let baseline: SavingsPlanSnapshot = read_json(baseline)?;
    let overrides: SavingsOverrides = read_json(overrides)?;

    if !overrides.is_pre_tax_empty() {
        tracing::warn!("Pre-tax deltas are ignored by rebalance; use 'pathwise pretax'");
    }

    let snapshot = apply_overrides_and_rebalance(&baseline, &overrides, pool, clamp_to_pool);

    if json {
        return print_json(&snapshot);
    }

    println!();
    println!("⚖️  Rebalanced Plan");
    print_snapshot(&snapshot, pool);
    print_changes(&baseline, &snapshot);
    Ok(())
}

pub fn cmd_step(
    config: &PlannerConfig,
    baseline: &Path,
    bucket: &str,
    direction: StepDirection,
    pool: f64,
    json: bool,
) -> Result<()> {
    let baseline: SavingsPlanSnapshot = read_json(baseline)?;
    let bucket: Bucket = bucket
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("Expected one of: ef, debt, retirement, brokerage")?;

    let outcome =
        apply_post_tax_stepper_change(&baseline, bucket, direction, pool, &config.rebalance);

    if json {
        return print_json(&outcome);
    }

    let arrow = match direction {
        StepDirection::Up => "▲",
        StepDirection::Down => "▼",
    };
    println!();
    println!(
        "{} {} {:+.2}",
        arrow,
        outcome.bucket.label(),
        outcome.applied_delta
    );
    print_snapshot(&outcome.snapshot, pool);
    print_reductions(&outcome.reductions);
    if let Some(reduced) = outcome.auto_reduced() {
        println!("   Paid for by: {}", reduced.label());
    }
    Ok(())
}

pub fn cmd_pretax(baseline: &Path, overrides: &Path, budget: f64, json: bool) -> Result<()> {
    let baseline: SavingsPlanSnapshot = read_json(baseline)?;
    let overrides: SavingsOverrides = read_json(overrides)?;

    let outcome = apply_all_overrides(&baseline, &overrides, budget);

    if json {
        return print_json(&outcome);
    }

    println!();
    println!(
        "🧾 Plan after pre-tax changes (post-tax pool {})",
        format_dollars(outcome.post_tax_pool)
    );
    print_snapshot(&outcome.snapshot, outcome.post_tax_pool);
    print_changes(&baseline, &outcome.snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &SavingsPlanSnapshot, pool: f64) {
    println!("   ─────────────────────────────────────────");
    println!("   {:<22} {:>12.2}", "Emergency fund", snapshot.ef);
    println!("   {:<22} {:>12.2}", "Debt paydown", snapshot.debt);
    println!("   {:<22} {:>12.2}", "HSA (pre-tax)", snapshot.hsa);
    println!("   {:<22} {:>12.2}", "Retirement", snapshot.retirement_tax_adv);
    println!("   {:<22} {:>12.2}", "Brokerage", snapshot.brokerage);
    println!("   ─────────────────────────────────────────");
    println!("   {:<22} {:>12.2}", "Monthly savings", snapshot.monthly_savings);
    println!("   {:<22} {:>12.2}", "401(k) match (pre-tax)", snapshot.match_401k);

    let excess = snapshot.excess_over(pool);
    let unallocated = snapshot.unallocated(pool);
    if excess > 0.0 {
        println!("   ⚠️  Over pool by {:.2}", excess);
    } else if unallocated > 0.0 {
        println!("   Left to allocate: {:.2}", unallocated);
    }
}

fn print_changes(before: &SavingsPlanSnapshot, after: &SavingsPlanSnapshot) {
    let changed: Vec<(Bucket, f64)> = Bucket::PRIORITY_ORDER
        .iter()
        .map(|&b| (b, after.get(b) - before.get(b)))
        .filter(|(_, delta)| delta.abs() >= 0.005)
        .collect();

    if changed.is_empty() {
        return;
    }

    println!();
    println!("   Changes:");
    for (bucket, delta) in changed {
        println!("     {:<18} {:+.2}", bucket.label(), delta);
    }
}

fn print_reductions(reductions: &[Reduction]) {
    for r in reductions {
        let note = match r.kind {
            ReductionKind::AutoReduced => "auto-reduced",
            ReductionKind::IncreaseClipped => "increase clipped",
        };
        println!("   {} {:.2} ({})", r.bucket.label(), r.amount, note);
    }
}
