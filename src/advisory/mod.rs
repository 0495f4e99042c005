//! Advisory fields, the reply parser and dataset reconciliation.

pub mod fields;
pub mod parser;
pub mod reconcile;

pub use fields::{AdvisoryFields, FieldKey, ADVISORY_FORMAT_VERSION};
pub use parser::{parse, ParsedAdvisory};
pub use reconcile::complete;
