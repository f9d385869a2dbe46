//! Core types for the Leap engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::units::Percent100;

use super::suppression::EfTrajectoryDebug;

/// Closed set of recommendation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeapType {
    /// Employer match is available but not fully captured
    MissingEmployerMatch,
    /// Cash is at or below the safety buffer
    CashRisk,
    /// Emergency fund is below its target
    EmergencyFundGap,
    /// Carrying high-APR debt
    HighAprDebt,
    /// Eligible for an HSA but not contributing
    HsaOpportunity,
    /// Follow-up on a recommendation the user dismissed
    UnimplementedRecommendation,
    /// Income is flowing but no savings plan has been applied
    FirstIncomePlanNeeded,
    /// Previous month closed; time to review
    MonthClosedReview,
    /// Take-home pay moved materially since the last plan
    IncomeDrift,
    /// Cash above the buffer is sitting idle
    SurplusCash,
}

impl LeapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingEmployerMatch => "MISSING_EMPLOYER_MATCH",
            Self::CashRisk => "CASH_RISK",
            Self::EmergencyFundGap => "EMERGENCY_FUND_GAP",
            Self::HighAprDebt => "HIGH_APR_DEBT",
            Self::HsaOpportunity => "HSA_OPPORTUNITY",
            Self::UnimplementedRecommendation => "UNIMPLEMENTED_RECOMMENDATION",
            Self::FirstIncomePlanNeeded => "FIRST_INCOME_PLAN_NEEDED",
            Self::MonthClosedReview => "MONTH_CLOSED_REVIEW",
            Self::IncomeDrift => "INCOME_DRIFT",
            Self::SurplusCash => "SURPLUS_CASH",
        }
    }

    /// Fixed ranking score (higher = surfaced first)
    pub fn priority_score(&self) -> i32 {
        match self {
            Self::MissingEmployerMatch => 100,
            Self::CashRisk => 95,
            Self::EmergencyFundGap => 90,
            Self::HighAprDebt => 80,
            Self::HsaOpportunity => 70,
            Self::UnimplementedRecommendation => 65,
            Self::FirstIncomePlanNeeded => 60,
            Self::MonthClosedReview => 55,
            Self::IncomeDrift => 50,
            Self::SurplusCash => 40,
        }
    }

    /// Short user-facing title
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingEmployerMatch => "Capture your employer match",
            Self::CashRisk => "Cash is running low",
            Self::EmergencyFundGap => "Build your emergency fund",
            Self::HighAprDebt => "Pay down high-interest debt",
            Self::HsaOpportunity => "Start HSA contributions",
            Self::UnimplementedRecommendation => "Revisit a recommendation",
            Self::FirstIncomePlanNeeded => "Set up your first savings plan",
            Self::MonthClosedReview => "Review last month",
            Self::IncomeDrift => "Your income changed",
            Self::SurplusCash => "Put idle cash to work",
        }
    }

    /// All types, highest priority first
    pub fn all() -> &'static [LeapType] {
        &[
            Self::MissingEmployerMatch,
            Self::CashRisk,
            Self::EmergencyFundGap,
            Self::HighAprDebt,
            Self::HsaOpportunity,
            Self::UnimplementedRecommendation,
            Self::FirstIncomePlanNeeded,
            Self::MonthClosedReview,
            Self::IncomeDrift,
            Self::SurplusCash,
        ]
    }
}

impl fmt::Display for LeapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LeapType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| format!("Unknown leap type: {}", s))
    }
}

/// Severity level derived from a Leap's score; the fallback display label
/// when no preview metric is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational - no action needed
    Info,
    /// Worth attention but not urgent
    Attention,
    /// Should be addressed soon
    Warning,
    /// Requires immediate attention
    Alert,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Attention => "attention",
            Severity::Warning => "warning",
            Severity::Alert => "alert",
        }
    }

    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 90 => Severity::Alert,
            s if s >= 70 => Severity::Warning,
            s if s >= 50 => Severity::Attention,
            _ => Severity::Info,
        }
    }

    /// Generic label shown in place of a preview metric
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Worth a look",
            Severity::Attention => "Recommended",
            Severity::Warning => "Important",
            Severity::Alert => "Urgent",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which planning tool a Leap routes the user to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginatingTool {
    BenefitsOptimizer,
    CashFlowMonitor,
    EmergencyFundPlanner,
    DebtPlanner,
    SavingsAllocator,
    MonthlyReview,
    FollowUp,
}

impl OriginatingTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BenefitsOptimizer => "benefits_optimizer",
            Self::CashFlowMonitor => "cash_flow_monitor",
            Self::EmergencyFundPlanner => "emergency_fund_planner",
            Self::DebtPlanner => "debt_planner",
            Self::SavingsAllocator => "savings_allocator",
            Self::MonthlyReview => "monthly_review",
            Self::FollowUp => "follow_up",
        }
    }
}

impl fmt::Display for OriginatingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a Leap was withheld
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressedReason {
    TargetMet,
    OnTrack,
    GracePeriod,
}

impl SuppressedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TargetMet => "target_met",
            Self::OnTrack => "on_track",
            Self::GracePeriod => "grace_period",
        }
    }
}

impl fmt::Display for SuppressedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single benefit metric shown on a Leap card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewMetric {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub is_estimate: bool,
    /// Input field the value was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl PreviewMetric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            is_estimate: false,
            source: None,
        }
    }

    pub fn estimate(mut self) -> Self {
        self.is_estimate = true;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Type-specific facts carried by a Leap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum LeapPayload {
    MissingEmployerMatch {
        match_gap_monthly: f64,
    },
    CashRisk {
        cash_balance: f64,
        safety_buffer_target: f64,
        shortfall: f64,
        /// Raised by the signals provider rather than derived from balances
        from_signal: bool,
    },
    EmergencyFundGap {
        current_months: f64,
        target_months: f64,
        gap_dollars: f64,
        required_per_month: f64,
    },
    HighAprDebt {
        apr: Option<Percent100>,
    },
    HsaOpportunity {
        suggested_monthly: f64,
    },
    UnimplementedRecommendation {
        original_type: LeapType,
        times_ignored: u32,
        last_surfaced_at: DateTime<Utc>,
    },
    FirstIncomePlanNeeded {
        take_home_monthly: f64,
        last_paycheck: Option<DateTime<Utc>>,
    },
    MonthClosedReview {
        /// Closed month as `YYYY-MM`
        month: String,
    },
    IncomeDrift {
        previous_monthly: f64,
        current_monthly: f64,
        drift: Percent100,
    },
    SurplusCash {
        cash_balance: f64,
        safety_buffer_target: f64,
        surplus: f64,
    },
}

impl LeapPayload {
    pub fn leap_type(&self) -> LeapType {
        match self {
            Self::MissingEmployerMatch { .. } => LeapType::MissingEmployerMatch,
            Self::CashRisk { .. } => LeapType::CashRisk,
            Self::EmergencyFundGap { .. } => LeapType::EmergencyFundGap,
            Self::HighAprDebt { .. } => LeapType::HighAprDebt,
            Self::HsaOpportunity { .. } => LeapType::HsaOpportunity,
            Self::UnimplementedRecommendation { .. } => LeapType::UnimplementedRecommendation,
            Self::FirstIncomePlanNeeded { .. } => LeapType::FirstIncomePlanNeeded,
            Self::MonthClosedReview { .. } => LeapType::MonthClosedReview,
            Self::IncomeDrift { .. } => LeapType::IncomeDrift,
            Self::SurplusCash { .. } => LeapType::SurplusCash,
        }
    }
}

/// A candidate recommendation produced by one generation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leap {
    pub leap_id: String,
    /// Stable identity across passes (e.g. "emergency_fund", "cash_risk:2026-10")
    pub dedupe_key: String,
    pub leap_type: LeapType,
    pub priority_score: i32,
    pub originating_tool: OriginatingTool,
    pub payload: LeapPayload,
    pub suppressed: bool,
    pub suppressed_reason: Option<SuppressedReason>,
    pub preview_metric: Option<PreviewMetric>,
    /// Gate telemetry; for debug views only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppression_debug: Option<EfTrajectoryDebug>,
}

impl Leap {
    /// Create a Leap; type and score follow from the payload
    pub fn new(
        dedupe_key: impl Into<String>,
        originating_tool: OriginatingTool,
        payload: LeapPayload,
    ) -> Self {
        let dedupe_key = dedupe_key.into();
        let leap_type = payload.leap_type();
        Self {
            leap_id: format!("{}:{}", leap_type.as_str().to_lowercase(), dedupe_key),
            dedupe_key,
            leap_type,
            priority_score: leap_type.priority_score(),
            originating_tool,
            payload,
            suppressed: false,
            suppressed_reason: None,
            preview_metric: None,
            suppression_debug: None,
        }
    }

    /// Override the score (custom rules only; built-ins use the fixed table)
    pub fn with_score(mut self, score: i32) -> Self {
        self.priority_score = score;
        self
    }

    pub fn with_preview(mut self, metric: Option<PreviewMetric>) -> Self {
        self.preview_metric = metric;
        self
    }

    pub fn suppress(mut self, reason: SuppressedReason, debug: EfTrajectoryDebug) -> Self {
        self.suppressed = true;
        self.suppressed_reason = Some(reason);
        self.suppression_debug = Some(debug);
        self
    }

    /// The condition this Leap is about; follow-ups report their origin
    pub fn subject_type(&self) -> LeapType {
        match &self.payload {
            LeapPayload::UnimplementedRecommendation { original_type, .. } => *original_type,
            other => other.leap_type(),
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_score(self.priority_score)
    }

    /// Metric label/value to render, falling back to the severity label
    pub fn display_metric(&self) -> (String, String) {
        match &self.preview_metric {
            Some(m) => (m.label.clone(), m.value.clone()),
            None => (
                "Priority".to_string(),
                self.severity().label().to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_type_serialization() {
        assert_eq!(
            serde_json::to_value(LeapType::UnimplementedRecommendation).unwrap(),
            "UNIMPLEMENTED_RECOMMENDATION"
        );
        assert_eq!(
            LeapType::from_str("emergency_fund_gap").unwrap(),
            LeapType::EmergencyFundGap
        );
        assert!(LeapType::from_str("lottery").is_err());
    }

    #[test]
    fn test_priority_table_is_strictly_descending() {
        let scores: Vec<i32> = LeapType::all().iter().map(|t| t.priority_score()).collect();
        assert!(scores.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(LeapType::MissingEmployerMatch.priority_score(), 100);
        assert_eq!(LeapType::SurplusCash.priority_score(), 40);
    }

    #[test]
    fn test_severity_from_score() {
        assert_eq!(Severity::from_score(100), Severity::Alert);
        assert_eq!(Severity::from_score(80), Severity::Warning);
        assert_eq!(Severity::from_score(55), Severity::Attention);
        assert_eq!(Severity::from_score(40), Severity::Info);
    }

    #[test]
    fn test_leap_builder() {
        let leap = Leap::new(
            "high_apr_debt",
            OriginatingTool::DebtPlanner,
            LeapPayload::HighAprDebt {
                apr: Some(Percent100(24.0)),
            },
        );

        assert_eq!(leap.leap_type, LeapType::HighAprDebt);
        assert_eq!(leap.priority_score, 80);
        assert_eq!(leap.leap_id, "high_apr_debt:high_apr_debt");
        assert!(!leap.suppressed);
        assert_eq!(
            leap.display_metric(),
            ("Priority".to_string(), "Important".to_string())
        );
    }

    #[test]
    fn test_payload_is_tagged() {
        let payload = LeapPayload::MonthClosedReview {
            month: "2026-09".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "MONTH_CLOSED_REVIEW");
        assert_eq!(json["month"], "2026-09");

        let back: LeapPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back.leap_type(), LeapType::MonthClosedReview);
    }

    #[test]
    fn test_follow_up_subject_type() {
        let leap = Leap::new(
            "emergency_fund",
            OriginatingTool::FollowUp,
            LeapPayload::UnimplementedRecommendation {
                original_type: LeapType::EmergencyFundGap,
                times_ignored: 2,
                last_surfaced_at: Utc::now(),
            },
        );
        assert_eq!(leap.leap_type, LeapType::UnimplementedRecommendation);
        assert_eq!(leap.subject_type(), LeapType::EmergencyFundGap);
    }
}
