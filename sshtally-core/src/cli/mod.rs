mod args;
mod tally;

pub use args::*;
pub use tally::*;
