//! Domain models for Pathwise
//!
//! Normalized inputs supplied by the surrounding application. All dollar
//! figures are monthly unless the field name says otherwise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::leaps::LeapType;
use crate::units::{non_negative, Percent100};

/// How strongly the user wants to prioritize retirement saving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetirementFocus {
    #[default]
    Low,
    Medium,
    High,
}

impl RetirementFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Medium and High focus raise the HSA baseline
    pub fn is_focused(&self) -> bool {
        matches!(self, Self::Medium | Self::High)
    }
}

impl std::str::FromStr for RetirementFocus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown retirement focus: {}", s)),
        }
    }
}

impl std::fmt::Display for RetirementFocus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HSA coverage tier, which selects the annual contribution limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HsaCoverage {
    #[default]
    SelfOnly,
    Family,
}

/// HSA facts consumed by the allocation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HsaState {
    pub eligible: bool,
    pub coverage: HsaCoverage,
    /// Contributions already made this calendar year
    pub contributed_ytd: f64,
    /// Months left in the year, including the current one
    pub months_remaining: u32,
}

impl Default for HsaState {
    fn default() -> Self {
        Self {
            eligible: false,
            coverage: HsaCoverage::SelfOnly,
            contributed_ytd: 0.0,
            months_remaining: 12,
        }
    }
}

/// A debt balance charging a high interest rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighAprDebt {
    pub name: String,
    pub balance: f64,
    pub apr: Percent100,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllocationPreferences {
    pub retirement_focus: RetirementFocus,
}

/// A recommendation the user dismissed that is still relevant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnimplementedLeapEntry {
    pub dedupe_key: String,
    pub leap_type: LeapType,
    pub last_surfaced_at: DateTime<Utc>,
    #[serde(default)]
    pub times_ignored: u32,
}

/// Normalized facts about the user's finances
///
/// Percentages are on the 0–100 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserFinancialState {
    pub take_home_pay_monthly: f64,
    pub needs_percent: Option<Percent100>,
    pub wants_percent: Option<Percent100>,
    pub savings_percent: Option<Percent100>,
    pub cash_balance: f64,
    pub safety_buffer_target: f64,
    pub emergency_fund_months: f64,
    pub emergency_fund_target_months: f64,
    pub has_high_apr_debt: bool,
    pub high_apr_debt_apr: Option<Percent100>,
    pub employer_match_eligible: bool,
    pub employer_match_met: bool,
    pub employer_match_gap_monthly: f64,
    pub hsa_eligible: bool,
    pub hsa_contributing: bool,
    pub unimplemented_leaps: Vec<UnimplementedLeapEntry>,
    /// EF contribution of the currently applied savings plan
    pub applied_plan_ef_monthly: Option<f64>,
    pub savings_plan_applied_at: Option<DateTime<Utc>>,
    /// Take-home pay from the previous plan cycle, for drift detection
    pub previous_take_home_monthly: Option<f64>,
}

impl UserFinancialState {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Monthly essential expenses: take-home × needs%, or the fallback when
    /// either input is missing
    pub fn monthly_expense_baseline(&self, fallback: f64) -> f64 {
        let take_home = non_negative(self.take_home_pay_monthly);
        match self.needs_percent {
            Some(needs) if take_home > 0.0 && needs.is_positive() => {
                needs.to_fraction().of(take_home)
            }
            _ => fallback,
        }
    }

    pub fn has_applied_plan(&self) -> bool {
        self.savings_plan_applied_at.is_some()
    }
}

/// Point-in-time trigger flags from the signals provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSignals {
    #[serde(rename = "nowISO")]
    pub now: DateTime<Utc>,
    #[serde(default)]
    pub cash_risk: bool,
    #[serde(default)]
    pub surplus_cash: bool,
    #[serde(rename = "lastPaycheckISO", default)]
    pub last_paycheck: Option<DateTime<Utc>>,
    /// The previous month's books have been closed
    #[serde(default)]
    pub month_closed: bool,
}

impl TriggerSignals {
    /// Signals with no flags raised
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            cash_risk: false,
            surplus_cash: false,
            last_paycheck: None,
            month_closed: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_deserializes_camel_case_with_defaults() {
        let state = UserFinancialState::from_json(
            r#"{
                "takeHomePayMonthly": 5000,
                "needsPercent": 55,
                "emergencyFundMonths": 2,
                "emergencyFundTargetMonths": 6,
                "appliedPlanEfMonthly": 850
            }"#,
        )
        .unwrap();

        assert_eq!(state.take_home_pay_monthly, 5000.0);
        assert_eq!(state.needs_percent, Some(Percent100(55.0)));
        assert_eq!(state.applied_plan_ef_monthly, Some(850.0));
        assert!(!state.has_high_apr_debt);
        assert!(state.unimplemented_leaps.is_empty());
    }

    #[test]
    fn test_monthly_expense_baseline() {
        let state = UserFinancialState {
            take_home_pay_monthly: 5000.0,
            needs_percent: Some(Percent100(55.0)),
            ..Default::default()
        };
        assert!((state.monthly_expense_baseline(2000.0) - 2750.0).abs() < 1e-9);

        let missing = UserFinancialState {
            take_home_pay_monthly: 5000.0,
            ..Default::default()
        };
        assert_eq!(missing.monthly_expense_baseline(2000.0), 2000.0);

        let negative = UserFinancialState {
            take_home_pay_monthly: -10.0,
            needs_percent: Some(Percent100(50.0)),
            ..Default::default()
        };
        assert_eq!(negative.monthly_expense_baseline(2000.0), 2000.0);
    }

    #[test]
    fn test_signals_iso_field_names() {
        let signals = TriggerSignals::from_json(
            r#"{"nowISO": "2026-10-16T12:00:00Z", "cashRisk": true, "lastPaycheckISO": "2026-10-15T00:00:00Z"}"#,
        )
        .unwrap();

        assert!(signals.cash_risk);
        assert!(!signals.surplus_cash);
        assert!(signals.last_paycheck.is_some());
    }

    #[test]
    fn test_retirement_focus_parse() {
        assert_eq!("HIGH".parse::<RetirementFocus>().unwrap(), RetirementFocus::High);
        assert!("extreme".parse::<RetirementFocus>().is_err());
        assert!(RetirementFocus::Medium.is_focused());
        assert!(!RetirementFocus::Low.is_focused());
    }
}
