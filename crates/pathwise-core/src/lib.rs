//! Pathwise Core Library
//!
//! Deterministic planning engines for the Pathwise personal finance tool:
//! - Savings allocation across prioritized buckets
//! - Override and waterfall rebalance of a savings plan
//! - Leap recommendation feed with on-track suppression
//! - Preview metrics for each recommendation
//! - Engine tuning loaded from TOML

pub mod config;
pub mod error;
pub mod leaps;
pub mod models;
pub mod savings;
pub mod units;

/// Fixtures shared by unit, integration and CLI tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{
    AllocationConfig, LeapConfig, PlannerConfig, RebalanceConfig, SuppressionConfig,
};
pub use error::{Error, Result};
pub use leaps::{
    compute_preview_metric, generate_candidate_leaps, should_show_emergency_fund_leap,
    EfGateDecision, EfTrajectoryDebug, Leap, LeapEngine, LeapFeed, LeapPayload, LeapRule,
    LeapType, OriginatingTool, PreviewMetric, Severity, SuppressedReason,
};
pub use models::{
    AllocationPreferences, HighAprDebt, HsaCoverage, HsaState, RetirementFocus, TriggerSignals,
    UnimplementedLeapEntry, UserFinancialState,
};
pub use savings::{
    allocate, apply_all_overrides, apply_overrides_and_rebalance, apply_post_tax_stepper_change,
    apply_pre_tax_overrides, post_tax_pool, trim_to_pool, AllocationRequest, Bucket,
    PlanEditOutcome, PreTaxOutcome, Reduction, ReductionKind, SavingsOverrides,
    SavingsPlanSnapshot, StepDirection, StepperOutcome,
};
pub use units::{Fraction, Percent100};
