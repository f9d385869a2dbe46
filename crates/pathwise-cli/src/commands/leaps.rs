//! Recommendation feed command implementations (leaps, ef-gate)

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use pathwise_core::{
    should_show_emergency_fund_leap, EfTrajectoryDebug, Leap, LeapEngine, LeapFeed,
    PlannerConfig, TriggerSignals, UserFinancialState,
};

use super::{print_json, read_json, truncate};

/// Parse `--now` as RFC 3339 or a bare date (midnight UTC); defaults to the clock
pub fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(raw) = now else {
        return Ok(Utc::now());
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .with_context(|| format!("Invalid timestamp '{}': use RFC 3339 or YYYY-MM-DD", raw))
}

/// Run the Leap engine over input files
pub fn build_feed(
    config: &PlannerConfig,
    state: &Path,
    signals: Option<&Path>,
) -> Result<LeapFeed> {
    let state: UserFinancialState = read_json(state)?;
    let signals = match signals {
        Some(path) => read_json(path)?,
        None => TriggerSignals::at(Utc::now()),
    };

    Ok(LeapEngine::new().generate(&state, &signals, config))
}

pub fn cmd_leaps(
    config: &PlannerConfig,
    state: &Path,
    signals: Option<&Path>,
    debug: bool,
    json: bool,
) -> Result<()> {
    let feed = build_feed(config, state, signals)?;

    if json {
        if debug {
            return print_json(&feed);
        }
        let visible: Vec<&Leap> = feed.visible().collect();
        return print_json(&visible);
    }

    if feed.top().is_none() {
        println!("✅ Nothing needs attention right now.");
    } else {
        println!();
        println!("🧭 Next Leaps");
        println!("   ─────────────────────────────────────────────────────────────");
        for leap in feed.visible() {
            print_leap(leap);
        }
    }

    if debug {
        let suppressed: Vec<&Leap> = feed.suppressed().collect();
        if !suppressed.is_empty() {
            println!();
            println!("🔇 Suppressed (debug)");
            println!("   ─────────────────────────────────────────────────────────────");
            for leap in suppressed {
                print_leap(leap);
                if let Some(debug) = &leap.suppression_debug {
                    print_trajectory(debug);
                }
            }
        }
    }

    println!();
    Ok(())
}

pub fn cmd_ef_gate(
    config: &PlannerConfig,
    state: &Path,
    now: Option<&str>,
    json: bool,
) -> Result<()> {
    let state: UserFinancialState = read_json(state)?;
    let now = parse_now(now)?;
    let decision = should_show_emergency_fund_leap(&state, now, &config.suppression);

    if json {
        return print_json(&decision);
    }

    println!();
    match decision.suppressed_reason {
        Some(reason) => println!("🔇 Emergency fund advice suppressed ({})", reason),
        None => println!("📣 Emergency fund advice shown"),
    }
    print_trajectory(&decision.debug);
    println!();
    Ok(())
}

fn print_leap(leap: &Leap) {
    let (label, value) = leap.display_metric();
    println!(
        "   [{:>3}] {:<32} {}: {}",
        leap.priority_score,
        truncate(leap.leap_type.title(), 32),
        label,
        value
    );
    if let Some(reason) = leap.suppressed_reason {
        println!("         reason: {}", reason);
    }
}

fn print_trajectory(debug: &EfTrajectoryDebug) {
    println!("         expense baseline:  {:.2}/mo", debug.monthly_expense_baseline);
    println!("         gap:               {:.2}", debug.ef_gap_dollars);
    println!("         required pace:     {:.2}/mo", debug.ef_required_per_month);
    println!("         on-track at:       {:.2}/mo", debug.on_track_threshold);
    match debug.actual_per_month {
        Some(actual) => println!("         applied pace:      {:.2}/mo", actual),
        None => println!("         applied pace:      (no plan)"),
    }
    if let Some(days) = debug.days_since_applied {
        println!("         days since applied: {}", days);
    }
    if debug.critically_low {
        println!("         ⚠️  coverage critically low");
    }
}
