//! Built-in Leap rules
//!
//! One rule per condition. Each rule reads the shared [`RuleContext`] and
//! returns zero or one Leap, except follow-ups, which replay every dismissed
//! entry. Suppression and preview metrics are applied by the engine.

use crate::units::{non_negative, Percent100};

use super::engine::{LeapRule, RuleContext};
use super::suppression::ef_trajectory;
use super::types::{Leap, LeapPayload, LeapType, OriginatingTool};

/// Employer match available but not fully captured
pub struct EmployerMatchRule;

impl LeapRule for EmployerMatchRule {
    fn id(&self) -> LeapType {
        LeapType::MissingEmployerMatch
    }

    fn name(&self) -> &'static str {
        "Missing Employer Match"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Leap> {
        let state = ctx.state;
        if !state.employer_match_eligible || state.employer_match_met {
            return vec![];
        }

        vec![Leap::new(
            "employer_match",
            OriginatingTool::BenefitsOptimizer,
            LeapPayload::MissingEmployerMatch {
                match_gap_monthly: non_negative(state.employer_match_gap_monthly),
            },
        )]
    }
}

/// Cash at or under the safety buffer, or flagged by the signals provider
pub struct CashRiskRule;

impl LeapRule for CashRiskRule {
    fn id(&self) -> LeapType {
        LeapType::CashRisk
    }

    fn name(&self) -> &'static str {
        "Cash Risk"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Leap> {
        let state = ctx.state;
        let buffer = non_negative(state.safety_buffer_target);
        let cash = non_negative(state.cash_balance);
        let below_buffer = buffer > 0.0 && cash < buffer;

        if !ctx.signals.cash_risk && !below_buffer {
            return vec![];
        }

        vec![Leap::new(
            format!("cash_risk:{}", ctx.period_key()),
            OriginatingTool::CashFlowMonitor,
            LeapPayload::CashRisk {
                cash_balance: cash,
                safety_buffer_target: buffer,
                shortfall: non_negative(buffer - cash),
                from_signal: ctx.signals.cash_risk,
            },
        )]
    }
}

/// Emergency fund below its target
pub struct EmergencyFundRule;

impl LeapRule for EmergencyFundRule {
    fn id(&self) -> LeapType {
        LeapType::EmergencyFundGap
    }

    fn name(&self) -> &'static str {
        "Emergency Fund Gap"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Leap> {
        let state = ctx.state;
        let target = non_negative(state.emergency_fund_target_months);
        let current = non_negative(state.emergency_fund_months);
        if target <= 0.0 || current >= target {
            return vec![];
        }

        let trajectory = ef_trajectory(state, &ctx.config.suppression);
        vec![Leap::new(
            "emergency_fund",
            OriginatingTool::EmergencyFundPlanner,
            LeapPayload::EmergencyFundGap {
                current_months: current,
                target_months: target,
                gap_dollars: trajectory.gap_dollars,
                required_per_month: trajectory.required_per_month,
            },
        )]
    }
}

pub struct HighAprDebtRule;

impl LeapRule for HighAprDebtRule {
    fn id(&self) -> LeapType {
        LeapType::HighAprDebt
    }

    fn name(&self) -> &'static str {
        "High-APR Debt"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Leap> {
        if !ctx.state.has_high_apr_debt {
            return vec![];
        }

        vec![Leap::new(
            "high_apr_debt",
            OriginatingTool::DebtPlanner,
            LeapPayload::HighAprDebt {
                apr: ctx.state.high_apr_debt_apr,
            },
        )]
    }
}

/// HSA-eligible but not contributing
pub struct HsaOpportunityRule;

impl LeapRule for HsaOpportunityRule {
    fn id(&self) -> LeapType {
        LeapType::HsaOpportunity
    }

    fn name(&self) -> &'static str {
        "HSA Opportunity"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Leap> {
        if !ctx.state.hsa_eligible || ctx.state.hsa_contributing {
            return vec![];
        }

        vec![Leap::new(
            "hsa_opportunity",
            OriginatingTool::BenefitsOptimizer,
            LeapPayload::HsaOpportunity {
                suggested_monthly: non_negative(ctx.config.allocation.hsa_baseline_monthly),
            },
        )]
    }
}

/// Replays dismissed recommendations that are still relevant
///
/// A follow-up keeps its origin's dedupe key, so a live rule for the same
/// condition outranks it.
pub struct FollowUpRule;

impl LeapRule for FollowUpRule {
    fn id(&self) -> LeapType {
        LeapType::UnimplementedRecommendation
    }

    fn name(&self) -> &'static str {
        "Unimplemented Follow-up"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Leap> {
        ctx.state
            .unimplemented_leaps
            .iter()
            .filter(|entry| entry.leap_type != LeapType::UnimplementedRecommendation)
            .map(|entry| {
                Leap::new(
                    entry.dedupe_key.clone(),
                    OriginatingTool::FollowUp,
                    LeapPayload::UnimplementedRecommendation {
                        original_type: entry.leap_type,
                        times_ignored: entry.times_ignored,
                        last_surfaced_at: entry.last_surfaced_at,
                    },
                )
            })
            .collect()
    }
}

/// Income is arriving but no savings plan has ever been applied
pub struct FirstIncomePlanRule;

impl LeapRule for FirstIncomePlanRule {
    fn id(&self) -> LeapType {
        LeapType::FirstIncomePlanNeeded
    }

    fn name(&self) -> &'static str {
        "First Income Plan"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Leap> {
        let state = ctx.state;
        if state.has_applied_plan() {
            return vec![];
        }

        let take_home = non_negative(state.take_home_pay_monthly);
        let last_paycheck = ctx.signals.last_paycheck;
        if take_home <= 0.0 && last_paycheck.is_none() {
            return vec![];
        }

        vec![Leap::new(
            "first_income_plan",
            OriginatingTool::SavingsAllocator,
            LeapPayload::FirstIncomePlanNeeded {
                take_home_monthly: take_home,
                last_paycheck,
            },
        )]
    }
}

/// Previous month has closed
pub struct MonthClosedReviewRule;

impl LeapRule for MonthClosedReviewRule {
    fn id(&self) -> LeapType {
        LeapType::MonthClosedReview
    }

    fn name(&self) -> &'static str {
        "Month Closed Review"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Leap> {
        if !ctx.signals.month_closed {
            return vec![];
        }

        let month = ctx.previous_period_key();
        vec![Leap::new(
            format!("month_review:{}", month),
            OriginatingTool::MonthlyReview,
            LeapPayload::MonthClosedReview { month },
        )]
    }
}

/// Take-home pay moved past the drift threshold since the last plan
pub struct IncomeDriftRule;

impl LeapRule for IncomeDriftRule {
    fn id(&self) -> LeapType {
        LeapType::IncomeDrift
    }

    fn name(&self) -> &'static str {
        "Income Drift"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Leap> {
        let previous = non_negative(ctx.state.previous_take_home_monthly.unwrap_or(0.0));
        let current = non_negative(ctx.state.take_home_pay_monthly);
        if previous <= 0.0 || current <= 0.0 {
            return vec![];
        }

        let drift = (current - previous) / previous * 100.0;
        let threshold = ctx.config.leaps.income_drift_threshold.value().abs();
        if drift.abs() < threshold {
            return vec![];
        }

        vec![Leap::new(
            format!("income_drift:{}", ctx.period_key()),
            OriginatingTool::SavingsAllocator,
            LeapPayload::IncomeDrift {
                previous_monthly: previous,
                current_monthly: current,
                drift: Percent100(drift),
            },
        )]
    }
}

/// Cash above the buffer flagged as idle by the signals provider
pub struct SurplusCashRule;

impl LeapRule for SurplusCashRule {
    fn id(&self) -> LeapType {
        LeapType::SurplusCash
    }

    fn name(&self) -> &'static str {
        "Surplus Cash"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Leap> {
        if !ctx.signals.surplus_cash {
            return vec![];
        }

        let cash = non_negative(ctx.state.cash_balance);
        let buffer = non_negative(ctx.state.safety_buffer_target);
        vec![Leap::new(
            format!("surplus_cash:{}", ctx.period_key()),
            OriginatingTool::CashFlowMonitor,
            LeapPayload::SurplusCash {
                cash_balance: cash,
                safety_buffer_target: buffer,
                surplus: non_negative(cash - buffer),
            },
        )]
    }
}
