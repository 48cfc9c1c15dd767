//! Rename table and column groups for the field-survey export.
//!
//! The export tool derives headers from question labels, then a
//! name-mangling pass turns spaces into dots and prefixes names that start
//! with `_` with `X`. The rules below map those headers back to the short
//! names the downstream sheets use. Order matters: later rules see the output
//! of earlier ones.

use super::types::{ColumnGroup, ColumnMatcher, RenameRule};

pub const PROJECT_COLUMN: &str = "Project";
pub const STATUS_COLUMN: &str = "X_validation_status";
pub const DEFAULT_PROJECT: &str = "funaction";

pub fn excluded_statuses() -> Vec<String> {
    vec!["not approved".into(), "on hold".into()]
}

pub fn rename_rules() -> Vec<RenameRule> {
    vec![
        // submission metadata
        RenameRule::named("X_id", "submission_id"),
        RenameRule::named("X_uuid", "uuid"),
        RenameRule::named("X_submission_time", "submitted_at"),
        // geopoint question: lat, long, altitude, precision
        RenameRule::literal("X_Capture.your.location_", ""),
        RenameRule::literal("Capture.your.location", "location"),
        // multi-select of samples, one boolean column per option
        RenameRule::literal("Sample.types.taken", "sample"),
        RenameRule::regex(r"^Take\.an?\.photo\.of\.(?:the\.)?", "Photo_"),
        RenameRule::regex(r"^Date\.and\.time\.of\.(?:the\.)?observation$", "observed_at"),
        RenameRule::literal("Name.of.the.observer", "observer"),
        RenameRule::regex(r"(?i)\.?comments?$", "_comment"),
    ]
}

pub fn photo_group() -> ColumnGroup {
    ColumnGroup {
        name: "photo".into(),
        matchers: vec![ColumnMatcher::Contains {
            needle: "photo".into(),
        }],
    }
}

/// Boolean data-check columns: per-sample flags and anything still carrying
/// the tool's `X_` tag after renaming.
pub fn check_group() -> ColumnGroup {
    ColumnGroup {
        name: "data-check".into(),
        matchers: vec![
            ColumnMatcher::Contains {
                needle: "sample".into(),
            },
            ColumnMatcher::Regex {
                pattern: "X_".into(),
            },
        ],
    }
}
