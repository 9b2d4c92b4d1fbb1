mod grouper;
mod heuristics;

pub use grouper::group_runs;
pub use heuristics::analyze;
