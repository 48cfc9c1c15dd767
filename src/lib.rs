//! Clean semicolon-delimited survey exports: keep approved records of the
//! selected projects, shorten the tool-generated column names, drop photo
//! and data-check columns, and write the result back out.

pub mod config;
pub mod error;
pub mod process;
pub mod schema;
pub mod table;

pub use config::{CollisionPolicy, PrepareConfig};
pub use error::PrepareError;
pub use process::{prepare_data, PrepareOptions, PrepareOutcome, ProjectFilter};
pub use table::{Column, Table};
