//! Per-plan cell views for a row: decoded display plus progress.
use serde::{Deserialize, Serialize};

use crate::config::MatrixConfig;
use crate::matrix::{Row, is_sticky};
use crate::numbers::{clamp_percent, magnitude_to_f64};
use crate::progress::{bar_width, compute_row_progress};
use crate::value::{self, ValueKind};

/// What a cell shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum CellDisplay {
    Empty,
    Check,
    Text(String),
}

impl CellDisplay {
    /// Text for plain-text reports, with glyphs for the sentinels.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Empty => crate::constants::EMPTY_GLYPH,
            Self::Check => crate::constants::CHECK_GLYPH,
            Self::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub plan: String,
    pub display: CellDisplay,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

impl CellView {
    /// Bar width for this cell, `None` when the cell has no progress.
    #[must_use]
    pub fn bar_width(&self, config: &MatrixConfig) -> Option<f64> {
        self.progress
            .map(|percent| bar_width(percent, config.min_bar_width))
    }
}

/// Build one cell per plan, in the row's plan order.
///
/// Progress is scaled across the row from each plan's raw value. Pinned
/// header rows may carry their progress in the value itself as a `| n` or
/// `(n%)` marker, which is used as-is; bare numbers are still scaled.
#[must_use]
pub fn row_cells(row: &Row, config: &MatrixConfig) -> Vec<CellView> {
    let magnitudes: Vec<(String, Option<u32>)> = row
        .values
        .iter()
        .map(|v| (v.plan.clone(), value::progress_magnitude(&v.raw_value)))
        .collect();
    let computed = compute_row_progress(&magnitudes, config.direction_for(&row.characteristic));
    let sticky = is_sticky(row, &config.sticky);

    row.values
        .iter()
        .zip(computed)
        .map(|(plan_value, computed)| {
            let decoded = value::decode(&plan_value.value);
            let display = match decoded.kind {
                ValueKind::Empty => CellDisplay::Empty,
                ValueKind::Check => CellDisplay::Check,
                ValueKind::Text => CellDisplay::Text(decoded.display_text),
            };
            let explicit = if sticky {
                value::marked_magnitude(&plan_value.value)
                    .map(|m| clamp_percent(magnitude_to_f64(m)))
            } else {
                None
            };
            CellView {
                plan: plan_value.plan.clone(),
                display,
                magnitude: decoded.magnitude,
                progress: explicit.or(computed),
            }
        })
        .collect()
}
