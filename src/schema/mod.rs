pub mod builtin;
pub mod types;

pub use types::{ColumnGroup, ColumnMatcher, IndexOverride, RenameRule, RuleScope};
