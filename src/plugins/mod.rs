//! Outputs derived from validated records, plus the interactive loading probe.

pub mod cursor;
pub mod guide;
pub mod probe;
pub mod report;
