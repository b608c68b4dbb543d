pub mod context;
pub mod engine;
pub mod outcome;
pub mod report;
