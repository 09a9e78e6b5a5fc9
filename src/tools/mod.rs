//! Text Tools
//!
//! Pure text transforms and measurements used by the editing surface:
//! - Case changes over a selection
//! - Sorting and de-duplicating selected lines
//! - Document statistics and caret status

pub mod case;
pub mod lines;
pub mod stats;

pub use case::CaseTransform;
pub use lines::{LineTool, SortOrder};
pub use stats::{DocumentStats, StatusInfo};
