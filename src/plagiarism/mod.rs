mod consolidate;
mod filter;
mod parser;

pub use consolidate::{
    consolidate_buckets, expand_all, ConsolidationOptions, DEFAULT_MIN_SIMILARITY,
};
pub use filter::FilteredReport;
pub use parser::{MossReportParser, ReportContext, ReportParser};
