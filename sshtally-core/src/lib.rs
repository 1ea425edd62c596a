pub mod aggregate;
pub mod cli;
pub mod constants;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod pipeline;
pub mod report;
pub mod snapshot;
pub mod source;
