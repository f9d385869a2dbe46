//! Savings Priority Allocation
//!
//! Distributes one month's savings budget across competing goals in a fixed
//! priority order:
//!
//! 1. Employer match (pre-tax, fixed need, outside the budget)
//! 2. Emergency-fund gap, capped at a share of the budget
//! 3. High-APR debt paydown, capped at a share of the budget
//! 4. HSA, bounded by the remaining annual room
//! 5. Tax-advantaged retirement
//! 6. Taxable brokerage takes whatever is left
//!
//! Each bucket is filled to its cap before the next one sees any money, and
//! capacity a bucket leaves unused flows forward only.

use serde::{Deserialize, Serialize};

use crate::config::AllocationConfig;
use crate::models::{AllocationPreferences, HighAprDebt, HsaCoverage, HsaState};
use crate::units::{non_negative, to_cents, Fraction};

use super::snapshot::SavingsPlanSnapshot;

/// Inputs to one allocation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllocationRequest {
    /// Money available to distribute this month
    pub budget: f64,
    /// Emergency fund target balance in dollars
    pub ef_target: f64,
    pub ef_balance: f64,
    pub high_apr_debts: Vec<HighAprDebt>,
    /// Employee contribution needed this period to capture the full match
    pub match_need_this_period: f64,
    pub income_annual: f64,
    pub hsa: HsaState,
    pub preferences: AllocationPreferences,
}

/// Cap on a bucket as a share of the budget, in whole cents (rounded down)
fn share_of(budget_cents: i64, fraction: Fraction) -> i64 {
    let share = fraction.of(budget_cents as f64);
    if share.is_finite() && share > 0.0 {
        share.floor() as i64
    } else {
        0
    }
}

/// Monthly HSA contribution cap in cents
fn hsa_cap_cents(hsa: &HsaState, prefs: &AllocationPreferences, config: &AllocationConfig) -> i64 {
    if !hsa.eligible {
        return 0;
    }

    let annual_limit = match hsa.coverage {
        HsaCoverage::SelfOnly => config.hsa_annual_limit_self,
        HsaCoverage::Family => config.hsa_annual_limit_family,
    };
    let room = non_negative(annual_limit - non_negative(hsa.contributed_ytd));
    let months = hsa.months_remaining.clamp(1, 12) as f64;
    let monthly_room = to_cents(room / months);

    let baseline = if prefs.retirement_focus.is_focused() {
        config.hsa_focused_monthly
    } else {
        config.hsa_baseline_monthly
    };

    to_cents(baseline).min(monthly_room)
}

/// Monthly tax-advantaged retirement cap in cents
fn retirement_cap_cents(req: &AllocationRequest, config: &AllocationConfig) -> i64 {
    let limit_monthly = non_negative(config.retirement_annual_limit) / 12.0;
    let income = non_negative(req.income_annual);
    if income <= 0.0 {
        return to_cents(limit_monthly);
    }

    let rate = config.retirement_rate(req.preferences.retirement_focus);
    let target_monthly = rate.of(income) / 12.0;
    to_cents(limit_monthly.min(target_monthly))
}

/// Compute the priority-ordered allocation for one month
pub fn allocate(req: &AllocationRequest, config: &AllocationConfig) -> SavingsPlanSnapshot {
    let budget = to_cents(non_negative(req.budget));
    if budget <= 0 {
        tracing::debug!("Allocation skipped: no budget");
        return SavingsPlanSnapshot::zero();
    }

    let match_401k = to_cents(non_negative(req.match_need_this_period));
    let mut remaining = budget;

    // Emergency fund gap
    let ef_gap = to_cents(non_negative(
        non_negative(req.ef_target) - non_negative(req.ef_balance),
    ));
    let ef = share_of(budget, config.ef_cap_fraction)
        .min(ef_gap)
        .min(remaining);
    remaining -= ef;

    // High-APR debt; never more than what is owed
    let owed: i64 = req
        .high_apr_debts
        .iter()
        .map(|d| to_cents(non_negative(d.balance)))
        .sum();
    let debt = share_of(budget, config.debt_cap_fraction)
        .min(owed)
        .min(remaining);
    remaining -= debt;

    let hsa = hsa_cap_cents(&req.hsa, &req.preferences, config).min(remaining);
    remaining -= hsa;

    let retirement = retirement_cap_cents(req, config).min(remaining);
    remaining -= retirement;

    let brokerage = remaining;

    tracing::trace!(
        budget,
        ef,
        debt,
        hsa,
        retirement,
        brokerage,
        "Allocation computed (cents)"
    );

    let snapshot =
        SavingsPlanSnapshot::from_cents([ef, debt, retirement, brokerage], match_401k, hsa);
    debug_assert_eq!(
        to_cents(snapshot.monthly_savings),
        budget,
        "allocation must distribute the whole budget"
    );
    snapshot
}

/// Post-tax pool implied by a snapshot: the budget less pre-tax HSA
pub fn post_tax_pool(budget: f64, snapshot: &SavingsPlanSnapshot) -> f64 {
    non_negative(non_negative(budget) - snapshot.hsa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RetirementFocus;
    use crate::units::Percent100;

    fn card_debt(balance: f64) -> HighAprDebt {
        HighAprDebt {
            name: "Card".to_string(),
            balance,
            apr: Percent100(24.0),
        }
    }

    fn base_request() -> AllocationRequest {
        AllocationRequest {
            budget: 1000.0,
            ef_target: 10_000.0,
            ef_balance: 2_000.0,
            high_apr_debts: vec![card_debt(5_000.0)],
            match_need_this_period: 250.0,
            income_annual: 90_000.0,
            hsa: HsaState {
                eligible: true,
                ..Default::default()
            },
            preferences: AllocationPreferences::default(),
        }
    }

    #[test]
    fn test_priority_fill_order() {
        let snap = allocate(&base_request(), &AllocationConfig::default());

        assert_eq!(snap.ef, 400.0);
        assert_eq!(snap.debt, 400.0);
        assert_eq!(snap.hsa, 100.0);
        // 7000 / 12 = 583.33 cap, 5% of 90k / 12 = 375, only 100 left
        assert_eq!(snap.retirement_tax_adv, 100.0);
        assert_eq!(snap.brokerage, 0.0);
        assert_eq!(snap.match_401k, 250.0);
        assert_eq!(snap.monthly_savings, 1000.0);
    }

    #[test]
    fn test_ef_capped_by_remaining_gap() {
        let req = AllocationRequest {
            ef_balance: 9_900.0,
            ..base_request()
        };
        let snap = allocate(&req, &AllocationConfig::default());
        assert_eq!(snap.ef, 100.0);
        // Unused EF capacity flows forward, not back
        assert_eq!(snap.debt, 400.0);
    }

    #[test]
    fn test_debt_capped_by_balance() {
        let req = AllocationRequest {
            high_apr_debts: vec![card_debt(120.0), card_debt(-50.0)],
            ..base_request()
        };
        let snap = allocate(&req, &AllocationConfig::default());
        assert_eq!(snap.debt, 120.0);
    }

    #[test]
    fn test_focused_hsa_baseline() {
        let req = AllocationRequest {
            preferences: AllocationPreferences {
                retirement_focus: RetirementFocus::High,
            },
            budget: 2000.0,
            ..base_request()
        };
        let snap = allocate(&req, &AllocationConfig::default());
        assert_eq!(snap.hsa, 200.0);
    }

    #[test]
    fn test_hsa_bounded_by_annual_room() {
        let req = AllocationRequest {
            hsa: HsaState {
                eligible: true,
                coverage: HsaCoverage::SelfOnly,
                contributed_ytd: 4_200.0,
                months_remaining: 2,
            },
            ..base_request()
        };
        let snap = allocate(&req, &AllocationConfig::default());
        assert_eq!(snap.hsa, 50.0);
    }

    #[test]
    fn test_ineligible_hsa_gets_nothing() {
        let req = AllocationRequest {
            hsa: HsaState::default(),
            ..base_request()
        };
        let snap = allocate(&req, &AllocationConfig::default());
        assert_eq!(snap.hsa, 0.0);
        assert_eq!(snap.retirement_tax_adv, 200.0);
    }

    #[test]
    fn test_brokerage_absorbs_remainder() {
        let req = AllocationRequest {
            budget: 3000.0,
            ef_balance: 10_000.0,
            high_apr_debts: vec![],
            ..base_request()
        };
        let snap = allocate(&req, &AllocationConfig::default());
        assert_eq!(snap.ef, 0.0);
        assert_eq!(snap.debt, 0.0);
        assert_eq!(snap.hsa, 100.0);
        assert_eq!(snap.retirement_tax_adv, 375.0);
        assert_eq!(snap.brokerage, 2525.0);
        assert_eq!(snap.monthly_savings, 3000.0);
    }

    #[test]
    fn test_unknown_income_uses_annual_limit() {
        let req = AllocationRequest {
            budget: 3000.0,
            ef_balance: 10_000.0,
            high_apr_debts: vec![],
            income_annual: 0.0,
            ..base_request()
        };
        let snap = allocate(&req, &AllocationConfig::default());
        assert_eq!(snap.retirement_tax_adv, 583.33);
    }

    #[test]
    fn test_non_positive_budget_is_all_zero() {
        for budget in [0.0, -500.0, f64::NAN] {
            let req = AllocationRequest {
                budget,
                ..base_request()
            };
            let snap = allocate(&req, &AllocationConfig::default());
            assert_eq!(snap, SavingsPlanSnapshot::zero());
        }
    }

    #[test]
    fn test_odd_cent_budget_is_fully_distributed() {
        let req = AllocationRequest {
            budget: 333.33,
            ..base_request()
        };
        let snap = allocate(&req, &AllocationConfig::default());
        assert_eq!(snap.ef, 133.33);
        assert_eq!(snap.debt, 133.33);
        assert_eq!(snap.hsa, 66.67);
        assert_eq!(snap.monthly_savings, 333.33);
    }

    #[test]
    fn test_post_tax_pool() {
        let snap = allocate(&base_request(), &AllocationConfig::default());
        assert_eq!(post_tax_pool(1000.0, &snap), 900.0);
        assert_eq!(post_tax_pool(50.0, &snap), 0.0);
    }
}
