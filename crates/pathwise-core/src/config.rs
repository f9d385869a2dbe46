//! Planner configuration
//!
//! Tuning constants for the allocation, rebalance, suppression and leap
//! engines. The engines take these as explicit arguments; nothing reads them
//! from ambient state.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for an override (explicit path, or
//!    ~/.local/share/pathwise/config/planner.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::RetirementFocus;
use crate::units::{Fraction, Percent100};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/planner.toml");

/// Caps and baselines for the allocation engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationConfig {
    pub ef_cap_fraction: Fraction,
    pub debt_cap_fraction: Fraction,
    pub hsa_baseline_monthly: f64,
    pub hsa_focused_monthly: f64,
    pub hsa_annual_limit_self: f64,
    pub hsa_annual_limit_family: f64,
    pub retirement_annual_limit: f64,
    pub retirement_rate_low: Fraction,
    pub retirement_rate_medium: Fraction,
    pub retirement_rate_high: Fraction,
}

impl AllocationConfig {
    /// Share of gross income targeted for retirement at a given focus
    pub fn retirement_rate(&self, focus: RetirementFocus) -> Fraction {
        match focus {
            RetirementFocus::Low => self.retirement_rate_low,
            RetirementFocus::Medium => self.retirement_rate_medium,
            RetirementFocus::High => self.retirement_rate_high,
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            ef_cap_fraction: Fraction(0.4),
            debt_cap_fraction: Fraction(0.4),
            hsa_baseline_monthly: 100.0,
            hsa_focused_monthly: 200.0,
            hsa_annual_limit_self: 4300.0,
            hsa_annual_limit_family: 8550.0,
            retirement_annual_limit: 7000.0,
            retirement_rate_low: Fraction(0.05),
            retirement_rate_medium: Fraction(0.10),
            retirement_rate_high: Fraction(0.15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalanceConfig {
    /// Dollar amount of one stepper nudge
    pub stepper_increment: f64,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            stepper_increment: 25.0,
        }
    }
}

/// Thresholds for the emergency-fund on-track gate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuppressionConfig {
    pub on_track_ratio: Fraction,
    pub grace_period_days: i64,
    pub critically_low_months: f64,
    pub horizon_months: u32,
    pub default_expense_baseline: f64,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            on_track_ratio: Fraction(0.9),
            grace_period_days: 14,
            critically_low_months: 1.0,
            horizon_months: 12,
            default_expense_baseline: 2000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeapConfig {
    pub income_drift_threshold: Percent100,
}

impl Default for LeapConfig {
    fn default() -> Self {
        Self {
            income_drift_threshold: Percent100(10.0),
        }
    }
}

/// Full planner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlannerConfig {
    pub allocation: AllocationConfig,
    pub rebalance: RebalanceConfig,
    pub suppression: SuppressionConfig,
    pub leaps: LeapConfig,
}

impl PlannerConfig {
    /// Load using the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit override path (embedded defaults if it doesn't exist)
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse config from TOML content, layered over the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// The embedded default TOML
    pub fn embedded_toml() -> &'static str {
        DEFAULT_CONFIG
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("pathwise").join("config").join("planner.toml"))
}

/// Resolve which config file would be used, if any
pub fn resolve_config_path(override_path: Option<&Path>) -> Option<PathBuf> {
    match override_path {
        Some(path) if path.exists() => Some(path.to_path_buf()),
        Some(_) => None,
        None => default_config_path().filter(|p| p.exists()),
    }
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<PlannerConfig> {
    let content = match resolve_config_path(override_path) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading planner config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    allocation: Option<RawAllocation>,
    rebalance: Option<RawRebalance>,
    suppression: Option<RawSuppression>,
    leaps: Option<RawLeaps>,
}

#[derive(Debug, Deserialize)]
struct RawAllocation {
    ef_cap_fraction: Option<f64>,
    debt_cap_fraction: Option<f64>,
    hsa_baseline_monthly: Option<f64>,
    hsa_focused_monthly: Option<f64>,
    hsa_annual_limit_self: Option<f64>,
    hsa_annual_limit_family: Option<f64>,
    retirement_annual_limit: Option<f64>,
    retirement_focus_rates: Option<RawFocusRates>,
}

#[derive(Debug, Deserialize)]
struct RawFocusRates {
    low: Option<f64>,
    medium: Option<f64>,
    high: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawRebalance {
    stepper_increment: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSuppression {
    on_track_ratio: Option<f64>,
    grace_period_days: Option<i64>,
    critically_low_months: Option<f64>,
    horizon_months: Option<u32>,
    default_expense_baseline: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawLeaps {
    income_drift_threshold_percent: Option<f64>,
}

/// Longest grace period a config file may request
const MAX_GRACE_PERIOD_DAYS: i64 = 3650;

fn fraction_in_range(name: &str, value: f64) -> Result<Fraction> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::Config(format!(
            "{} must be a fraction between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(Fraction(value))
}

fn non_negative_amount(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Config(format!(
            "{} must be a non-negative amount, got {}",
            name, value
        )));
    }
    Ok(value)
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<PlannerConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = PlannerConfig::default();

    if let Some(alloc) = raw.allocation {
        let target = &mut config.allocation;
        if let Some(v) = alloc.ef_cap_fraction {
            target.ef_cap_fraction = fraction_in_range("ef_cap_fraction", v)?;
        }
        if let Some(v) = alloc.debt_cap_fraction {
            target.debt_cap_fraction = fraction_in_range("debt_cap_fraction", v)?;
        }
        if let Some(v) = alloc.hsa_baseline_monthly {
            target.hsa_baseline_monthly = non_negative_amount("hsa_baseline_monthly", v)?;
        }
        if let Some(v) = alloc.hsa_focused_monthly {
            target.hsa_focused_monthly = non_negative_amount("hsa_focused_monthly", v)?;
        }
        if let Some(v) = alloc.hsa_annual_limit_self {
            target.hsa_annual_limit_self = non_negative_amount("hsa_annual_limit_self", v)?;
        }
        if let Some(v) = alloc.hsa_annual_limit_family {
            target.hsa_annual_limit_family = non_negative_amount("hsa_annual_limit_family", v)?;
        }
        if let Some(v) = alloc.retirement_annual_limit {
            target.retirement_annual_limit = non_negative_amount("retirement_annual_limit", v)?;
        }
        if let Some(rates) = alloc.retirement_focus_rates {
            if let Some(v) = rates.low {
                target.retirement_rate_low = fraction_in_range("retirement_focus_rates.low", v)?;
            }
            if let Some(v) = rates.medium {
                target.retirement_rate_medium =
                    fraction_in_range("retirement_focus_rates.medium", v)?;
            }
            if let Some(v) = rates.high {
                target.retirement_rate_high = fraction_in_range("retirement_focus_rates.high", v)?;
            }
        }
    }

    if let Some(rebalance) = raw.rebalance {
        if let Some(v) = rebalance.stepper_increment {
            if v <= 0.0 || !v.is_finite() {
                return Err(Error::Config(format!(
                    "stepper_increment must be positive, got {}",
                    v
                )));
            }
            config.rebalance.stepper_increment = v;
        }
    }

    if let Some(sup) = raw.suppression {
        let target = &mut config.suppression;
        if let Some(v) = sup.on_track_ratio {
            target.on_track_ratio = fraction_in_range("on_track_ratio", v)?;
        }
        if let Some(v) = sup.grace_period_days {
            if v > MAX_GRACE_PERIOD_DAYS {
                return Err(Error::Config(format!(
                    "grace_period_days must be at most {}, got {}",
                    MAX_GRACE_PERIOD_DAYS, v
                )));
            }
            target.grace_period_days = v.max(0);
        }
        if let Some(v) = sup.critically_low_months {
            target.critically_low_months = non_negative_amount("critically_low_months", v)?;
        }
        if let Some(v) = sup.horizon_months {
            if v == 0 {
                return Err(Error::Config("horizon_months must be at least 1".into()));
            }
            target.horizon_months = v;
        }
        if let Some(v) = sup.default_expense_baseline {
            target.default_expense_baseline =
                non_negative_amount("default_expense_baseline", v)?;
        }
    }

    if let Some(leaps) = raw.leaps {
        if let Some(v) = leaps.income_drift_threshold_percent {
            config.leaps.income_drift_threshold =
                Percent100(non_negative_amount("income_drift_threshold_percent", v)?);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config(
            r#"
            [suppression]
            grace_period_days = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.suppression.grace_period_days, 30);
        assert_eq!(config.suppression.on_track_ratio, Fraction(0.9));
        assert_eq!(config.allocation, AllocationConfig::default());
    }

    #[test]
    fn test_rejects_percent_where_fraction_expected() {
        let err = parse_config(
            r#"
            [allocation]
            ef_cap_fraction = 40
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("ef_cap_fraction"));
    }

    #[test]
    fn test_rejects_unbounded_grace_period() {
        let err = PlannerConfig::from_toml("[suppression]\ngrace_period_days = 9223372036854775807")
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("grace_period_days"));

        let config = PlannerConfig::from_toml("[suppression]\ngrace_period_days = 3650").unwrap();
        assert_eq!(config.suppression.grace_period_days, 3650);
    }

    #[test]
    fn test_rejects_invalid_toml() {
        assert!(matches!(
            parse_config("[allocation\nbroken"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_retirement_rate_by_focus() {
        let config = AllocationConfig::default();
        assert_eq!(config.retirement_rate(RetirementFocus::Low), Fraction(0.05));
        assert_eq!(config.retirement_rate(RetirementFocus::High), Fraction(0.15));
    }

    #[test]
    fn test_load_from_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rebalance]\nstepper_increment = 50.0").unwrap();

        let config = PlannerConfig::load_from(file.path()).unwrap();
        assert_eq!(config.rebalance.stepper_increment, 50.0);
    }

    #[test]
    fn test_load_from_missing_path_uses_embedded() {
        let config = PlannerConfig::load_from(Path::new("/nonexistent/planner.toml")).unwrap();
        assert_eq!(config, PlannerConfig::default());
    }
}
