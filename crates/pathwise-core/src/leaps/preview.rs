//! Preview metrics
//!
//! One benefit metric per Leap type. Returns `None` when an input the metric
//! depends on is missing or non-positive; callers fall back to the severity
//! label rather than showing a made-up number.

use chrono::NaiveDate;

use crate::models::{TriggerSignals, UserFinancialState};
use crate::units::{format_dollars, non_negative, Percent100};

use super::types::{LeapPayload, PreviewMetric};

/// Positive, finite amount or nothing
fn positive(amount: f64) -> Option<f64> {
    let value = non_negative(amount);
    (value > 0.0).then_some(value)
}

/// Months with at most one decimal, trailing ".0" dropped
fn format_months(months: f64) -> String {
    let tenths = (non_negative(months) * 10.0).round() / 10.0;
    if tenths.fract() == 0.0 {
        format!("{:.0}", tenths)
    } else {
        format!("{:.1}", tenths)
    }
}

fn format_percent(pct: Percent100) -> String {
    format!("{:.0}%", pct.value().round())
}

/// "2026-09" -> "September 2026"
fn format_month(month: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()?;
    Some(date.format("%B %Y").to_string())
}

/// Compute the card metric for a Leap payload
pub fn compute_preview_metric(
    payload: &LeapPayload,
    state: &UserFinancialState,
    _signals: &TriggerSignals,
) -> Option<PreviewMetric> {
    match payload {
        LeapPayload::MissingEmployerMatch { match_gap_monthly } => {
            let gap = positive(*match_gap_monthly)
                .or_else(|| positive(state.employer_match_gap_monthly))?;
            Some(
                PreviewMetric::new("Free money", format!("~{}/mo", format_dollars(gap)))
                    .estimate()
                    .with_source("employerMatchGapMonthly"),
            )
        }

        LeapPayload::CashRisk { shortfall, .. } => {
            let short = positive(*shortfall)?;
            Some(
                PreviewMetric::new("Short by", format!("~{}", format_dollars(short)))
                    .estimate()
                    .with_source("safetyBufferTarget"),
            )
        }

        LeapPayload::EmergencyFundGap {
            current_months,
            target_months,
            ..
        } => {
            let target = positive(*target_months)?;
            Some(
                PreviewMetric::new(
                    "Runway",
                    format!(
                        "{} → {} months",
                        format_months(*current_months),
                        format_months(target)
                    ),
                )
                .with_source("emergencyFundMonths"),
            )
        }

        LeapPayload::HighAprDebt { apr } => {
            let apr = apr
                .filter(|a| a.is_positive())
                .or(state.high_apr_debt_apr.filter(|a| a.is_positive()))?;
            Some(PreviewMetric::new("APR", format_percent(apr)).with_source("highAprDebtApr"))
        }

        LeapPayload::HsaOpportunity { suggested_monthly } => {
            let suggested = positive(*suggested_monthly)?;
            Some(PreviewMetric::new(
                "Suggested",
                format!("{}/mo", format_dollars(suggested)),
            ))
        }

        LeapPayload::UnimplementedRecommendation { times_ignored, .. } => {
            if *times_ignored == 0 {
                return None;
            }
            let unit = if *times_ignored == 1 { "time" } else { "times" };
            Some(
                PreviewMetric::new("Skipped", format!("{} {}", times_ignored, unit))
                    .with_source("timesIgnored"),
            )
        }

        LeapPayload::FirstIncomePlanNeeded {
            take_home_monthly, ..
        } => {
            let take_home = positive(*take_home_monthly)?;
            Some(
                PreviewMetric::new("Take-home", format!("~{}/mo", format_dollars(take_home)))
                    .estimate()
                    .with_source("takeHomePayMonthly"),
            )
        }

        LeapPayload::MonthClosedReview { month } => {
            Some(PreviewMetric::new("Month", format_month(month)?))
        }

        LeapPayload::IncomeDrift { drift, .. } => {
            let pct = drift.value();
            if !pct.is_finite() || pct.round() == 0.0 {
                return None;
            }
            let sign = if pct > 0.0 { "+" } else { "-" };
            Some(
                PreviewMetric::new(
                    "Take-home change",
                    format!("{}{:.0}%", sign, pct.abs().round()),
                )
                .with_source("takeHomePayMonthly"),
            )
        }

        LeapPayload::SurplusCash { surplus, .. } => {
            let available = positive(*surplus)?;
            Some(
                PreviewMetric::new("Available", format!("~{}", format_dollars(available)))
                    .estimate()
                    .with_source("cashBalance"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaps::types::LeapType;
    use chrono::{TimeZone, Utc};

    fn signals() -> TriggerSignals {
        TriggerSignals::at(Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap())
    }

    fn preview(payload: LeapPayload) -> Option<PreviewMetric> {
        compute_preview_metric(&payload, &UserFinancialState::default(), &signals())
    }

    #[test]
    fn test_missing_match_metric() {
        let metric = preview(LeapPayload::MissingEmployerMatch {
            match_gap_monthly: 187.6,
        })
        .unwrap();
        assert_eq!(metric.label, "Free money");
        assert_eq!(metric.value, "~$188/mo");
        assert!(metric.is_estimate);
    }

    #[test]
    fn test_ef_runway_metric() {
        let metric = preview(LeapPayload::EmergencyFundGap {
            current_months: 2.0,
            target_months: 6.0,
            gap_dollars: 11_000.0,
            required_per_month: 916.67,
        })
        .unwrap();
        assert_eq!(metric.label, "Runway");
        assert_eq!(metric.value, "2 → 6 months");

        let partial = preview(LeapPayload::EmergencyFundGap {
            current_months: 0.54,
            target_months: 3.0,
            gap_dollars: 0.0,
            required_per_month: 0.0,
        })
        .unwrap();
        assert_eq!(partial.value, "0.5 → 3 months");
    }

    #[test]
    fn test_apr_metric_rounds_and_falls_back_to_state() {
        let metric = preview(LeapPayload::HighAprDebt {
            apr: Some(Percent100(24.49)),
        })
        .unwrap();
        assert_eq!(metric.value, "24%");

        let state = UserFinancialState {
            high_apr_debt_apr: Some(Percent100(29.9)),
            ..Default::default()
        };
        let metric = compute_preview_metric(
            &LeapPayload::HighAprDebt { apr: None },
            &state,
            &signals(),
        )
        .unwrap();
        assert_eq!(metric.value, "30%");
    }

    #[test]
    fn test_missing_inputs_yield_none() {
        assert!(preview(LeapPayload::HighAprDebt { apr: None }).is_none());
        assert!(preview(LeapPayload::SurplusCash {
            cash_balance: 1000.0,
            safety_buffer_target: 1000.0,
            surplus: 0.0,
        })
        .is_none());
        assert!(preview(LeapPayload::MissingEmployerMatch {
            match_gap_monthly: -5.0
        })
        .is_none());
        assert!(preview(LeapPayload::MonthClosedReview {
            month: "not-a-month".to_string()
        })
        .is_none());
        assert!(preview(LeapPayload::UnimplementedRecommendation {
            original_type: LeapType::HsaOpportunity,
            times_ignored: 0,
            last_surfaced_at: Utc::now(),
        })
        .is_none());
    }

    #[test]
    fn test_month_review_metric() {
        let metric = preview(LeapPayload::MonthClosedReview {
            month: "2026-09".to_string(),
        })
        .unwrap();
        assert_eq!(metric.value, "September 2026");
    }

    #[test]
    fn test_income_drift_metric_is_signed() {
        let up = preview(LeapPayload::IncomeDrift {
            previous_monthly: 4000.0,
            current_monthly: 4600.0,
            drift: Percent100(15.0),
        })
        .unwrap();
        assert_eq!(up.value, "+15%");

        let down = preview(LeapPayload::IncomeDrift {
            previous_monthly: 5000.0,
            current_monthly: 4400.0,
            drift: Percent100(-12.0),
        })
        .unwrap();
        assert_eq!(down.value, "-12%");
    }

    #[test]
    fn test_surplus_metric_groups_thousands() {
        let metric = preview(LeapPayload::SurplusCash {
            cash_balance: 9_500.0,
            safety_buffer_target: 3_000.0,
            surplus: 6_500.4,
        })
        .unwrap();
        assert_eq!(metric.value, "~$6,500");
    }
}
