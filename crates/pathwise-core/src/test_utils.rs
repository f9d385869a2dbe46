//! Test fixtures for pathwise-core
//!
//! Canonical inputs used across unit, integration and CLI tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::leaps::LeapType;
use crate::models::{
    AllocationPreferences, HighAprDebt, HsaState, TriggerSignals, UnimplementedLeapEntry,
    UserFinancialState,
};
use crate::savings::AllocationRequest;
use crate::units::Percent100;

/// Fixed clock for deterministic tests (2026-10-16 12:00 UTC)
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Signals at [`fixed_now`] with no flags raised
pub fn quiet_signals() -> TriggerSignals {
    TriggerSignals::at(fixed_now())
}

/// $5,000 take-home, 55% needs, 2 of 6 months of emergency fund
pub fn ef_gap_state(applied_ef_monthly: Option<f64>) -> UserFinancialState {
    UserFinancialState {
        take_home_pay_monthly: 5000.0,
        needs_percent: Some(Percent100(55.0)),
        wants_percent: Some(Percent100(25.0)),
        savings_percent: Some(Percent100(20.0)),
        emergency_fund_months: 2.0,
        emergency_fund_target_months: 6.0,
        applied_plan_ef_monthly: applied_ef_monthly,
        ..Default::default()
    }
}

/// A state that trips most rules at once
pub fn busy_state() -> UserFinancialState {
    UserFinancialState {
        cash_balance: 800.0,
        safety_buffer_target: 1500.0,
        has_high_apr_debt: true,
        high_apr_debt_apr: Some(Percent100(24.99)),
        employer_match_eligible: true,
        employer_match_gap_monthly: 210.0,
        hsa_eligible: true,
        unimplemented_leaps: vec![
            UnimplementedLeapEntry {
                dedupe_key: "high_apr_debt".to_string(),
                leap_type: LeapType::HighAprDebt,
                last_surfaced_at: fixed_now(),
                times_ignored: 2,
            },
            UnimplementedLeapEntry {
                dedupe_key: "review:budget".to_string(),
                leap_type: LeapType::MonthClosedReview,
                last_surfaced_at: fixed_now(),
                times_ignored: 1,
            },
        ],
        previous_take_home_monthly: Some(4000.0),
        ..ef_gap_state(Some(0.0))
    }
}

/// $1,000 budget with an EF gap, card debt, eligible HSA and a match need
pub fn standard_request() -> AllocationRequest {
    AllocationRequest {
        budget: 1000.0,
        ef_target: 10_000.0,
        ef_balance: 2_000.0,
        high_apr_debts: vec![HighAprDebt {
            name: "Visa".to_string(),
            balance: 5_000.0,
            apr: Percent100(24.0),
        }],
        match_need_this_period: 250.0,
        income_annual: 90_000.0,
        hsa: HsaState {
            eligible: true,
            ..Default::default()
        },
        preferences: AllocationPreferences::default(),
    }
}
