//! Validation and rendering of parsed records.

pub mod format;
pub mod validate;

pub use format::format;
pub use validate::{is_valid_ndc, parse_fill_date, validate, DATE_FORMATS};
