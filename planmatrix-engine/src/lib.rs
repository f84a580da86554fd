//! Plan Matrix Engine
//!
//! Platform-agnostic core of the plan comparison matrix: aggregation of
//! per-plan characteristics into rows, pain-category normalization, the cell
//! value codec, relative progress, filtering and ordering.
//! Storage and preferences are reached through the [`PlanStore`] and
//! [`PreferenceStore`] traits; this crate has no UI or I/O of its own.

pub mod cells;
pub mod config;
pub mod constants;
pub mod data;
pub mod edit;
pub mod filter;
pub mod matrix;
pub mod numbers;
pub mod ordering;
pub mod pain;
pub mod prefs;
pub mod progress;
pub mod session;
pub mod store;
pub mod value;

// Re-export commonly used types
pub use cells::{CellDisplay, CellView, row_cells};
pub use config::{ConfigError, MatrixConfig, StickyNames};
pub use data::{CharacteristicRecord, Plan, PlanSnapshot};
pub use edit::{
    DraftValue, EditDraft, EditOutcome, FieldType, UpdateRequest, UpdateResult, diff_edit,
};
pub use filter::{FilterState, filter_rows};
pub use matrix::{PlanValue, Row, RowKey, StickySplit, aggregate, extract_sticky, is_sticky};
pub use ordering::{
    apply_characteristic_order, known_sections, move_section, reorder_section_records,
    resolve_section_order, sort_rows,
};
pub use pain::{PainCategory, PainParse, PainSet};
pub use prefs::{MemoryPreferences, PreferenceError, PreferenceStore};
pub use progress::{ProgressDirection, ProgressScale, bar_width, compute_progress};
pub use session::{CommandOutcome, ComparisonSession, MatrixView, RowView, build_view};
pub use store::{MemoryStore, NewCharacteristic, PlanStore, SectionSummary, StoreError};
pub use value::{DecodedValue, ValueKind};
