//! Emergency-fund on-track gate
//!
//! Withholds emergency-fund advice the user's applied plan already covers.
//! Decision order (first match wins):
//!
//! 1. Target met
//! 2. On track: the applied plan's EF contribution covers at least
//!    `on_track_ratio` of the pace needed to close the gap over the horizon
//! 3. Grace period: a plan was applied recently and coverage is not
//!    critically low
//! 4. Otherwise show
//!
//! Pace comparisons are made in whole cents so the threshold is exact.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SuppressionConfig;
use crate::models::UserFinancialState;
use crate::units::{non_negative, round_cents, to_cents};

use super::types::SuppressedReason;

/// Telemetry behind a gate decision; never shown outside debug views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfTrajectoryDebug {
    pub monthly_expense_baseline: f64,
    pub ef_gap_dollars: f64,
    pub ef_required_per_month: f64,
    /// Minimum applied contribution that counts as on track
    pub on_track_threshold: f64,
    pub actual_per_month: Option<f64>,
    pub target_met: bool,
    pub on_track: bool,
    pub plan_applied_at: Option<DateTime<Utc>>,
    pub days_since_applied: Option<i64>,
    pub within_grace_period: bool,
    pub critically_low: bool,
}

/// Result of [`should_show_emergency_fund_leap`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfGateDecision {
    pub show: bool,
    pub suppressed_reason: Option<SuppressedReason>,
    pub debug: EfTrajectoryDebug,
}

/// Gap and required pace for the emergency fund
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EfTrajectory {
    pub monthly_expense_baseline: f64,
    pub gap_dollars: f64,
    pub required_per_month: f64,
}

/// Compute the EF gap and the monthly pace needed to close it over the horizon
pub fn ef_trajectory(state: &UserFinancialState, config: &SuppressionConfig) -> EfTrajectory {
    let baseline = state.monthly_expense_baseline(config.default_expense_baseline);
    let target = non_negative(state.emergency_fund_target_months) * baseline;
    let current = non_negative(state.emergency_fund_months) * baseline;
    let gap = non_negative(target - current);
    let horizon = config.horizon_months.max(1) as f64;

    EfTrajectory {
        monthly_expense_baseline: baseline,
        gap_dollars: gap,
        required_per_month: gap / horizon,
    }
}

/// Decide whether emergency-fund advice should be shown right now
pub fn should_show_emergency_fund_leap(
    state: &UserFinancialState,
    now: DateTime<Utc>,
    config: &SuppressionConfig,
) -> EfGateDecision {
    let trajectory = ef_trajectory(state, config);
    let months = non_negative(state.emergency_fund_months);

    let target_met = months >= non_negative(state.emergency_fund_target_months);

    let threshold_cents = to_cents(config.on_track_ratio.of(trajectory.required_per_month));
    let actual = state.applied_plan_ef_monthly.map(non_negative);
    let on_track = match actual {
        Some(a) => {
            let actual_cents = to_cents(a);
            actual_cents > 0 && actual_cents >= threshold_cents
        }
        None => false,
    };

    let elapsed = state.savings_plan_applied_at.map(|at| now - at);
    // A grace period too long to represent grants no grace
    let grace = Duration::try_days(config.grace_period_days);
    let within_grace_period = match (elapsed, grace) {
        (Some(e), Some(g)) => e <= g,
        _ => false,
    };
    let critically_low = months < config.critically_low_months;

    let suppressed_reason = if target_met {
        Some(SuppressedReason::TargetMet)
    } else if on_track {
        Some(SuppressedReason::OnTrack)
    } else if within_grace_period && !critically_low {
        Some(SuppressedReason::GracePeriod)
    } else {
        None
    };

    let telemetry = EfTrajectoryDebug {
        monthly_expense_baseline: round_cents(trajectory.monthly_expense_baseline),
        ef_gap_dollars: round_cents(trajectory.gap_dollars),
        ef_required_per_month: round_cents(trajectory.required_per_month),
        on_track_threshold: threshold_cents as f64 / 100.0,
        actual_per_month: actual,
        target_met,
        on_track,
        plan_applied_at: state.savings_plan_applied_at,
        days_since_applied: elapsed.map(|e| e.num_days()),
        within_grace_period,
        critically_low,
    };

    tracing::debug!(
        show = suppressed_reason.is_none(),
        reason = suppressed_reason.map(|r| r.as_str()),
        required = telemetry.ef_required_per_month,
        actual = ?telemetry.actual_per_month,
        "Emergency fund gate evaluated"
    );

    EfGateDecision {
        show: suppressed_reason.is_none(),
        suppressed_reason,
        debug: telemetry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Percent100;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn state(ef_months: f64, applied_ef: Option<f64>) -> UserFinancialState {
        UserFinancialState {
            take_home_pay_monthly: 5000.0,
            needs_percent: Some(Percent100(55.0)),
            emergency_fund_months: ef_months,
            emergency_fund_target_months: 6.0,
            applied_plan_ef_monthly: applied_ef,
            ..Default::default()
        }
    }

    fn gate(state: &UserFinancialState) -> EfGateDecision {
        should_show_emergency_fund_leap(state, now(), &SuppressionConfig::default())
    }

    #[test]
    fn test_on_track_suppresses() {
        let decision = gate(&state(2.0, Some(850.0)));

        assert!(!decision.show);
        assert_eq!(decision.suppressed_reason, Some(SuppressedReason::OnTrack));
        assert_eq!(decision.debug.ef_required_per_month, 916.67);
        assert_eq!(decision.debug.on_track_threshold, 825.0);
        assert_eq!(decision.debug.ef_gap_dollars, 11_000.0);
    }

    #[test]
    fn test_not_on_track_shows() {
        let decision = gate(&state(2.0, Some(0.0)));
        assert!(decision.show);
        assert_eq!(decision.suppressed_reason, None);
        assert!(!decision.debug.on_track);
    }

    #[test]
    fn test_target_met_suppresses() {
        let decision = gate(&state(6.0, None));
        assert!(!decision.show);
        assert_eq!(decision.suppressed_reason, Some(SuppressedReason::TargetMet));
        assert_eq!(decision.debug.ef_gap_dollars, 0.0);
    }

    #[test]
    fn test_grace_period_suppresses() {
        let mut s = state(2.0, Some(0.0));
        s.savings_plan_applied_at = Some(now() - Duration::days(1));

        let decision = gate(&s);
        assert!(!decision.show);
        assert_eq!(decision.suppressed_reason, Some(SuppressedReason::GracePeriod));
        assert_eq!(decision.debug.days_since_applied, Some(1));
    }

    #[test]
    fn test_critically_low_overrides_grace() {
        let mut s = state(0.5, Some(0.0));
        s.savings_plan_applied_at = Some(now() - Duration::days(1));

        let decision = gate(&s);
        assert!(decision.show);
        assert!(decision.debug.within_grace_period);
        assert!(decision.debug.critically_low);
    }

    #[test]
    fn test_grace_period_expires() {
        let mut s = state(2.0, Some(0.0));
        s.savings_plan_applied_at = Some(now() - Duration::days(15));

        let decision = gate(&s);
        assert!(decision.show);
        assert!(!decision.debug.within_grace_period);
    }

    #[test]
    fn test_unrepresentable_grace_period_grants_none() {
        let mut s = state(2.0, Some(0.0));
        s.savings_plan_applied_at = Some(now() - Duration::days(1));
        let config = SuppressionConfig {
            grace_period_days: i64::MAX,
            ..Default::default()
        };

        let decision = should_show_emergency_fund_leap(&s, now(), &config);
        assert!(decision.show);
        assert!(!decision.debug.within_grace_period);
    }

    #[test]
    fn test_threshold_boundary() {
        let at_threshold = gate(&state(2.0, Some(825.0)));
        assert!(!at_threshold.show);
        assert_eq!(at_threshold.suppressed_reason, Some(SuppressedReason::OnTrack));

        let one_below = gate(&state(2.0, Some(824.0)));
        assert!(one_below.show);
    }

    #[test]
    fn test_missing_baseline_uses_default() {
        let s = UserFinancialState {
            emergency_fund_months: 3.0,
            emergency_fund_target_months: 6.0,
            ..Default::default()
        };
        let decision = gate(&s);
        assert_eq!(decision.debug.monthly_expense_baseline, 2000.0);
        assert_eq!(decision.debug.ef_gap_dollars, 6000.0);
        assert_eq!(decision.debug.ef_required_per_month, 500.0);
        assert!(decision.show);
    }

    #[test]
    fn test_no_applied_plan_is_not_on_track() {
        let decision = gate(&state(2.0, None));
        assert!(decision.show);
        assert_eq!(decision.debug.actual_per_month, None);
    }
}
