//! Savings plan engines
//!
//! - **Allocation** - distributes the monthly budget in priority order
//! - **Rebalance** - applies user overrides and waterfalls any overflow
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pathwise_core::savings::{allocate, apply_overrides_and_rebalance, post_tax_pool};
//!
//! let baseline = allocate(&request, &config.allocation);
//! let pool = post_tax_pool(request.budget, &baseline);
//! let edited = apply_overrides_and_rebalance(&baseline, &overrides, pool, true);
//! ```

pub mod allocate;
pub mod rebalance;
pub mod snapshot;

pub use allocate::{allocate, post_tax_pool, AllocationRequest};
pub use rebalance::{
    apply_all_overrides, apply_overrides_and_rebalance, apply_post_tax_stepper_change,
    apply_pre_tax_overrides, trim_to_pool, PlanEditOutcome, PreTaxOutcome, Reduction,
    ReductionKind, StepDirection, StepperOutcome,
};
pub use snapshot::{Bucket, SavingsOverrides, SavingsPlanSnapshot};
