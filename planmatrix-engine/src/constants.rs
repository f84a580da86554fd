//! Centralized vocabulary and tuning constants for the comparison matrix.
//!
//! Reserved names, sentinels and storage keys live here so that the matrix
//! semantics can only be adjusted through reviewed code changes.

// Cell sentinels -----------------------------------------------------------
pub const EMPTY_VALUE: &str = "-";
pub const CHECK_VALUE: &str = "+";
pub const EMPTY_GLYPH: &str = "—";
pub const CHECK_GLYPH: &str = "✓";

// Sticky rows --------------------------------------------------------------
pub const STICKY_PRIMARY: &str = "Cost";
pub const STICKY_SECONDARY: &str = "Timeline";

// Pain serialization -------------------------------------------------------
pub const PAIN_SEPARATOR: char = ',';
pub const PAIN_JOINER: &str = ", ";

// Progress ----------------------------------------------------------------
pub const PROGRESS_FULL: f64 = 100.0;
pub const MIN_BAR_WIDTH: f64 = 5.0;
/// Magnitude pre-filled into the editor when a header value carries none.
pub const DEFAULT_EDIT_MAGNITUDE: u32 = 50;

// Client-local preferences ---------------------------------------------------
pub const SECTION_ORDER_KEY: &str = "sectionOrder";

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_PAIN_DROPPED: &str = "pain.token-dropped";
pub(crate) const LOG_PIPELINE_BUILT: &str = "matrix.pipeline-built";
pub(crate) const LOG_PERSIST_FAILED: &str = "store.persist-failed";
pub(crate) const LOG_EDIT_PARTIAL: &str = "edit.partial-failure";
