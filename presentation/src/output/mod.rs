//! Output formatting for console results

pub mod console;
pub mod formatter;
pub mod json;
