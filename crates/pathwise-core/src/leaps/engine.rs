//! Leap Engine - runs rules, gates, annotates, dedupes and ranks

use std::collections::HashMap;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::models::{TriggerSignals, UserFinancialState};

use super::preview::compute_preview_metric;
use super::rules::{
    CashRiskRule, EmergencyFundRule, EmployerMatchRule, FirstIncomePlanRule, FollowUpRule,
    HighAprDebtRule, HsaOpportunityRule, IncomeDriftRule, MonthClosedReviewRule, SurplusCashRule,
};
use super::suppression::{should_show_emergency_fund_leap, EfGateDecision};
use super::types::{Leap, LeapType};

/// Inputs shared by every rule in one generation pass
pub struct RuleContext<'a> {
    pub state: &'a UserFinancialState,
    pub signals: &'a TriggerSignals,
    pub config: &'a PlannerConfig,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        state: &'a UserFinancialState,
        signals: &'a TriggerSignals,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            state,
            signals,
            config,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.signals.now
    }

    /// Month of `now` as `YYYY-MM`, used to key transient conditions
    pub fn period_key(&self) -> String {
        self.now().format("%Y-%m").to_string()
    }

    /// Calendar month before `now` as `YYYY-MM`
    pub fn previous_period_key(&self) -> String {
        self.now()
            .date_naive()
            .checked_sub_months(Months::new(1))
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_else(|| self.period_key())
    }
}

/// A rule that inspects the state and proposes Leaps
pub trait LeapRule: Send + Sync {
    /// Leap type this rule produces
    fn id(&self) -> LeapType;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Evaluate against the context; at most one Leap per dedupe key
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Leap>;
}

/// Ranked output of one generation pass
///
/// Suppressed Leaps stay in the ranking so debug views can show what was
/// withheld and why.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeapFeed {
    pub leaps: Vec<Leap>,
}

impl LeapFeed {
    /// Leaps to show the user, highest priority first
    pub fn visible(&self) -> impl Iterator<Item = &Leap> {
        self.leaps.iter().filter(|l| !l.suppressed)
    }

    pub fn suppressed(&self) -> impl Iterator<Item = &Leap> {
        self.leaps.iter().filter(|l| l.suppressed)
    }

    pub fn top(&self) -> Option<&Leap> {
        self.visible().next()
    }

    pub fn into_leaps(self) -> Vec<Leap> {
        self.leaps
    }
}

/// The main Leap engine
pub struct LeapEngine {
    rules: Vec<Box<dyn LeapRule>>,
}

impl Default for LeapEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LeapEngine {
    /// Create an engine with the built-in rules
    pub fn new() -> Self {
        let mut engine = Self::empty();

        engine.register(Box::new(EmployerMatchRule));
        engine.register(Box::new(CashRiskRule));
        engine.register(Box::new(EmergencyFundRule));
        engine.register(Box::new(HighAprDebtRule));
        engine.register(Box::new(HsaOpportunityRule));
        engine.register(Box::new(FollowUpRule));
        engine.register(Box::new(FirstIncomePlanRule));
        engine.register(Box::new(MonthClosedReviewRule));
        engine.register(Box::new(IncomeDriftRule));
        engine.register(Box::new(SurplusCashRule));

        engine
    }

    /// Create an engine with no rules registered
    pub fn empty() -> Self {
        Self { rules: vec![] }
    }

    /// Register a rule; rules run in registration order
    pub fn register(&mut self, rule: Box<dyn LeapRule>) {
        self.rules.push(rule);
    }

    /// Types of the registered rules
    pub fn rule_types(&self) -> Vec<LeapType> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Run every rule and produce the ranked feed
    pub fn generate(
        &self,
        state: &UserFinancialState,
        signals: &TriggerSignals,
        config: &PlannerConfig,
    ) -> LeapFeed {
        let ctx = RuleContext::new(state, signals, config);

        let mut candidates = vec![];
        for rule in &self.rules {
            let leaps = rule.evaluate(&ctx);
            tracing::debug!(
                rule = rule.name(),
                count = leaps.len(),
                "Rule evaluated"
            );
            candidates.extend(leaps);
        }

        // The gate is evaluated at most once per pass
        let mut gate: Option<EfGateDecision> = None;
        let candidates: Vec<Leap> = candidates
            .into_iter()
            .map(|leap| {
                let leap = if leap.subject_type() == LeapType::EmergencyFundGap {
                    let decision = gate.get_or_insert_with(|| {
                        should_show_emergency_fund_leap(state, signals.now, &config.suppression)
                    });
                    match decision.suppressed_reason {
                        Some(reason) if !decision.show => {
                            leap.suppress(reason, decision.debug.clone())
                        }
                        _ => leap,
                    }
                } else {
                    leap
                };
                let preview = compute_preview_metric(&leap.payload, state, signals);
                leap.with_preview(preview)
            })
            .collect();

        let raw = candidates.len();
        let mut leaps = dedupe_candidates(candidates);
        // sort_by is stable: ties keep insertion order
        leaps.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));

        let feed = LeapFeed { leaps };
        tracing::debug!(
            raw,
            visible = feed.visible().count(),
            suppressed = feed.suppressed().count(),
            "Leap generation complete"
        );
        feed
    }
}

/// Keep one Leap per dedupe key, preferring the higher score
///
/// On equal scores the earlier candidate wins. Survivors keep the position of
/// the first candidate seen for their key.
pub fn dedupe_candidates(candidates: Vec<Leap>) -> Vec<Leap> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Leap> = Vec::with_capacity(candidates.len());

    for leap in candidates {
        match slots.get(&leap.dedupe_key) {
            Some(&slot) => {
                if leap.priority_score > kept[slot].priority_score {
                    tracing::debug!(
                        key = %leap.dedupe_key,
                        winner = leap.leap_type.as_str(),
                        loser = kept[slot].leap_type.as_str(),
                        "Duplicate leap replaced"
                    );
                    kept[slot] = leap;
                }
            }
            None => {
                slots.insert(leap.dedupe_key.clone(), kept.len());
                kept.push(leap);
            }
        }
    }

    kept
}

/// Run the built-in rules and return every ranked Leap, suppressed included
pub fn generate_candidate_leaps(
    state: &UserFinancialState,
    signals: &TriggerSignals,
    config: &PlannerConfig,
) -> Vec<Leap> {
    LeapEngine::new()
        .generate(state, signals, config)
        .into_leaps()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaps::types::{LeapPayload, OriginatingTool, SuppressedReason};
    use crate::models::UnimplementedLeapEntry;
    use crate::units::Percent100;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    /// Emits two candidates under one key with different scores
    struct CompetingRule {
        scores: Vec<i32>,
    }

    impl LeapRule for CompetingRule {
        fn id(&self) -> LeapType {
            LeapType::HighAprDebt
        }

        fn name(&self) -> &'static str {
            "Competing"
        }

        fn evaluate(&self, _ctx: &RuleContext<'_>) -> Vec<Leap> {
            self.scores
                .iter()
                .map(|&score| {
                    Leap::new(
                        "shared",
                        OriginatingTool::DebtPlanner,
                        LeapPayload::HighAprDebt {
                            apr: Some(Percent100(score as f64 / 4.0)),
                        },
                    )
                    .with_score(score)
                })
                .collect()
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = LeapEngine::new();
        let types = engine.rule_types();

        assert_eq!(types.len(), LeapType::all().len());
        for t in LeapType::all() {
            assert!(types.contains(t), "missing rule for {}", t);
        }
    }

    #[test]
    fn test_dedupe_keeps_higher_score() {
        let mut engine = LeapEngine::empty();
        engine.register(Box::new(CompetingRule {
            scores: vec![80, 100],
        }));

        let feed = engine.generate(
            &UserFinancialState::default(),
            &TriggerSignals::at(now()),
            &PlannerConfig::default(),
        );

        assert_eq!(feed.leaps.len(), 1);
        assert_eq!(feed.leaps[0].priority_score, 100);
    }

    #[test]
    fn test_dedupe_tie_keeps_first() {
        let a = Leap::new(
            "k",
            OriginatingTool::DebtPlanner,
            LeapPayload::HighAprDebt {
                apr: Some(Percent100(20.0)),
            },
        );
        let b = Leap::new(
            "k",
            OriginatingTool::DebtPlanner,
            LeapPayload::HighAprDebt {
                apr: Some(Percent100(30.0)),
            },
        );
        let kept = dedupe_candidates(vec![a.clone(), b]);
        assert_eq!(kept, vec![a]);
    }

    #[test]
    fn test_equal_scores_keep_insertion_order() {
        let entry = |key: &str, leap_type| UnimplementedLeapEntry {
            dedupe_key: key.to_string(),
            leap_type,
            last_surfaced_at: now() - Duration::days(10),
            times_ignored: 1,
        };
        let state = UserFinancialState {
            has_high_apr_debt: true,
            unimplemented_leaps: vec![
                entry("zeta_follow_up", LeapType::HsaOpportunity),
                entry("alpha_follow_up", LeapType::MonthClosedReview),
            ],
            ..Default::default()
        };

        // Follow-ups are produced before the debt Leap that outranks them
        let mut engine = LeapEngine::empty();
        engine.register(Box::new(FollowUpRule));
        engine.register(Box::new(HighAprDebtRule));

        let feed = engine.generate(&state, &TriggerSignals::at(now()), &PlannerConfig::default());

        let keys: Vec<&str> = feed.leaps.iter().map(|l| l.dedupe_key.as_str()).collect();
        assert_eq!(keys, vec!["high_apr_debt", "zeta_follow_up", "alpha_follow_up"]);
        assert_eq!(feed.leaps[1].priority_score, feed.leaps[2].priority_score);
    }

    #[test]
    fn test_empty_state_produces_nothing() {
        let feed = LeapEngine::new().generate(
            &UserFinancialState::default(),
            &TriggerSignals::at(now()),
            &PlannerConfig::default(),
        );
        assert!(feed.leaps.is_empty());
        assert!(feed.top().is_none());
    }

    #[test]
    fn test_suppressed_ef_leap_stays_in_feed() {
        let state = UserFinancialState {
            take_home_pay_monthly: 5000.0,
            needs_percent: Some(Percent100(55.0)),
            emergency_fund_months: 2.0,
            emergency_fund_target_months: 6.0,
            applied_plan_ef_monthly: Some(850.0),
            savings_plan_applied_at: Some(now() - Duration::days(40)),
            ..Default::default()
        };

        let feed = LeapEngine::new().generate(
            &state,
            &TriggerSignals::at(now()),
            &PlannerConfig::default(),
        );

        let ef: Vec<&Leap> = feed.suppressed().collect();
        assert_eq!(ef.len(), 1);
        assert_eq!(ef[0].leap_type, LeapType::EmergencyFundGap);
        assert_eq!(ef[0].suppressed_reason, Some(SuppressedReason::OnTrack));
        assert!(ef[0].suppression_debug.is_some());
        assert!(feed
            .visible()
            .all(|l| l.leap_type != LeapType::EmergencyFundGap));
    }

    #[test]
    fn test_period_keys() {
        let state = UserFinancialState::default();
        let signals = TriggerSignals::at(Utc.with_ymd_and_hms(2026, 1, 31, 8, 0, 0).unwrap());
        let config = PlannerConfig::default();
        let ctx = RuleContext::new(&state, &signals, &config);

        assert_eq!(ctx.period_key(), "2026-01");
        assert_eq!(ctx.previous_period_key(), "2025-12");
    }
}
