//! Relative progress metric across the plans of a row.
//!
//! A row's magnitudes are min-max scaled to `[0, 100]`. When every plan shares
//! the same magnitude, each one is reported full.

use serde::{Deserialize, Serialize};

use crate::constants::PROGRESS_FULL;
use crate::numbers::{clamp_percent, magnitude_to_f64};

/// Which end of the scale fills the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressDirection {
    /// Larger magnitudes fill more of the bar.
    #[default]
    HigherIsFuller,
    /// Smaller magnitudes fill more of the bar (costs, lead times).
    LowerIsFuller,
}

/// Magnitude extremes of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressScale {
    pub min: f64,
    pub max: f64,
    pub direction: ProgressDirection,
}

impl ProgressScale {
    /// Build a scale from the magnitudes present in a row.
    ///
    /// Returns `None` when no plan carries a magnitude.
    pub fn from_magnitudes<I>(magnitudes: I, direction: ProgressDirection) -> Option<Self>
    where
        I: IntoIterator<Item = Option<u32>>,
    {
        let mut extremes: Option<(u32, u32)> = None;
        for magnitude in magnitudes.into_iter().flatten() {
            extremes = Some(match extremes {
                Some((lo, hi)) => (lo.min(magnitude), hi.max(magnitude)),
                None => (magnitude, magnitude),
            });
        }
        extremes.map(|(lo, hi)| Self {
            min: magnitude_to_f64(lo),
            max: magnitude_to_f64(hi),
            direction,
        })
    }

    /// Percentage for a single magnitude on this scale.
    #[must_use]
    pub fn percent(&self, magnitude: u32) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return PROGRESS_FULL;
        }
        let value = magnitude_to_f64(magnitude);
        let ratio = match self.direction {
            ProgressDirection::HigherIsFuller => (value - self.min) / span,
            ProgressDirection::LowerIsFuller => (self.max - value) / span,
        };
        clamp_percent(ratio * PROGRESS_FULL)
    }
}

/// Progress for `plan` given every plan's magnitude in the row.
///
/// `None` when the row has no magnitudes at all, or when `plan` itself has
/// none (or is absent).
#[must_use]
pub fn compute_progress(
    magnitudes_by_plan: &[(String, Option<u32>)],
    plan: &str,
    direction: ProgressDirection,
) -> Option<f64> {
    let scale =
        ProgressScale::from_magnitudes(magnitudes_by_plan.iter().map(|(_, m)| *m), direction)?;
    let own = magnitudes_by_plan
        .iter()
        .find(|(name, _)| name == plan)
        .and_then(|(_, m)| *m)?;
    Some(scale.percent(own))
}

/// Progress for every plan of a row, in input order.
#[must_use]
pub fn compute_row_progress(
    magnitudes_by_plan: &[(String, Option<u32>)],
    direction: ProgressDirection,
) -> Vec<Option<f64>> {
    let scale =
        ProgressScale::from_magnitudes(magnitudes_by_plan.iter().map(|(_, m)| *m), direction);
    magnitudes_by_plan
        .iter()
        .map(|(_, magnitude)| match (scale, magnitude) {
            (Some(scale), Some(m)) => Some(scale.percent(*m)),
            _ => None,
        })
        .collect()
}

/// Rendered bar width: progress clamped to `[min_width, 100]` so that a zero
/// still shows a sliver.
#[must_use]
pub fn bar_width(percent: f64, min_width: f64) -> f64 {
    clamp_percent(percent).max(clamp_percent(min_width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MIN_BAR_WIDTH;

    fn row(values: &[(&str, Option<u32>)]) -> Vec<(String, Option<u32>)> {
        values
            .iter()
            .map(|(name, m)| ((*name).to_string(), *m))
            .collect()
    }

    fn approx(left: Option<f64>, right: f64) -> bool {
        left.is_some_and(|l| (l - right).abs() < 1e-9)
    }

    #[test]
    fn linear_scaling_between_extremes() {
        let magnitudes = row(&[("Basic", Some(10)), ("Plus", Some(20)), ("Max", Some(30))]);
        let dir = ProgressDirection::HigherIsFuller;
        assert!(approx(compute_progress(&magnitudes, "Basic", dir), 0.0));
        assert!(approx(compute_progress(&magnitudes, "Plus", dir), 50.0));
        assert!(approx(compute_progress(&magnitudes, "Max", dir), 100.0));
    }

    #[test]
    fn equal_magnitudes_fill_completely() {
        let magnitudes = row(&[("Basic", Some(7)), ("Plus", None), ("Max", Some(7))]);
        let all = compute_row_progress(&magnitudes, ProgressDirection::HigherIsFuller);
        assert!(approx(all[0], 100.0));
        assert_eq!(all[1], None);
        assert!(approx(all[2], 100.0));
    }

    #[test]
    fn rows_without_magnitudes_have_no_progress() {
        let magnitudes = row(&[("Basic", None), ("Plus", None)]);
        assert_eq!(
            compute_progress(&magnitudes, "Basic", ProgressDirection::HigherIsFuller),
            None
        );
        assert_eq!(
            compute_progress(&magnitudes, "Missing", ProgressDirection::HigherIsFuller),
            None
        );
    }

    #[test]
    fn lower_is_fuller_inverts_scale() {
        let magnitudes = row(&[("Basic", Some(100)), ("Max", Some(300))]);
        let dir = ProgressDirection::LowerIsFuller;
        assert!(approx(compute_progress(&magnitudes, "Basic", dir), 100.0));
        assert!(approx(compute_progress(&magnitudes, "Max", dir), 0.0));
    }

    #[test]
    fn bar_width_keeps_a_sliver() {
        assert!((bar_width(0.0, MIN_BAR_WIDTH) - MIN_BAR_WIDTH).abs() < f64::EPSILON);
        assert!((bar_width(62.5, MIN_BAR_WIDTH) - 62.5).abs() < f64::EPSILON);
        assert!((bar_width(250.0, MIN_BAR_WIDTH) - 100.0).abs() < f64::EPSILON);
        assert!((bar_width(f64::NAN, 0.0)).abs() < f64::EPSILON);
    }
}
