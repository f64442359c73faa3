// Analyzer module: band evaluation and report assembly.

pub mod evaluator;
pub mod report;

pub use report::Report;
