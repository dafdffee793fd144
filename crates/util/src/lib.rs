pub mod date_handling;
pub mod path_processing;
pub mod text_processing;

pub use date_handling::{due_date_after, format_date_mmddyyyy, format_observed_at, iso_timestamp_from_epoch};
pub use path_processing::expand_tilde;
pub use text_processing::{redact_json, redact_sensitive};
