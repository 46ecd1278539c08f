//! Read-side views over a user's sparse daily entries.
//!
//! Every function here is pure: it takes the rows returned by a single range
//! read plus an explicit reference date and never touches storage or a clock.

mod correlation;
mod projection;
mod rollup;
mod streak;
mod trend;

pub use correlation::alcohol_correlation;
pub use projection::{DayIndex, EntryValues};
pub use rollup::{build_monthly_summary, build_weekly_summary, month_bounds, week_bounds};
pub use streak::{calculate_streak, streak_window_start};
pub use trend::{build_trends, window_start};
