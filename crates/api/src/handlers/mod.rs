pub mod report_bug;
pub mod support;
