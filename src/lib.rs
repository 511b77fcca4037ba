pub mod batch;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod outcome;
pub mod payload;
pub mod report;
