pub mod error;
pub mod import;
pub mod model;
pub mod repair;
pub mod replace;
pub mod store;

// Convenient re-exports
pub use import::{apply_import, parse_categories, ImportReport};
pub use model::{Category, Database, Question, Topic};
pub use repair::{repair, RepairOutcome, RepairPass};
pub use replace::{apply_replacements, load_mapping, validate, ReplacementMap};
