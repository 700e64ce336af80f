//! Output writing and run reports

pub mod formatter;
pub mod report;
pub mod writer;
