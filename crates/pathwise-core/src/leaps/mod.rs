//! Leap Engine - ranked next-action recommendations
//!
//! Each pass runs every registered rule against a snapshot of the user's
//! finances and the current trigger signals. Candidates then go through:
//!
//! - **Suppression** - emergency-fund advice is withheld while an applied
//!   plan keeps the user on track
//! - **Preview** - one deterministic benefit metric per Leap
//! - **Dedupe** - one Leap per dedupe key, highest score wins
//! - **Ranking** - stable sort by descending priority score
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pathwise_core::leaps::LeapEngine;
//!
//! let engine = LeapEngine::new();
//! let feed = engine.generate(&state, &signals, &config);
//! for leap in feed.visible() {
//!     println!("{} {:?}", leap.leap_type, leap.display_metric());
//! }
//! ```

pub mod engine;
pub mod preview;
pub mod rules;
pub mod suppression;
pub mod types;

pub use engine::{dedupe_candidates, generate_candidate_leaps, LeapEngine, LeapFeed, LeapRule, RuleContext};
pub use preview::compute_preview_metric;
pub use rules::{
    CashRiskRule, EmergencyFundRule, EmployerMatchRule, FirstIncomePlanRule, FollowUpRule,
    HighAprDebtRule, HsaOpportunityRule, IncomeDriftRule, MonthClosedReviewRule, SurplusCashRule,
};
pub use suppression::{
    ef_trajectory, should_show_emergency_fund_leap, EfGateDecision, EfTrajectory,
    EfTrajectoryDebug,
};
pub use types::{
    Leap, LeapPayload, LeapType, OriginatingTool, PreviewMetric, Severity, SuppressedReason,
};
