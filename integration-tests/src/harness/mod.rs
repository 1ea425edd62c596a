mod fixture;
pub mod tracing;

pub use fixture::{Workspace, fixture_lines, fixture_path};
pub use tracing::{CapturedEvent, init_test_tracing};
