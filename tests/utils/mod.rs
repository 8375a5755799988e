pub mod actions;
pub mod assertions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::{assert_distinct_draws, assert_unchanged};
#[allow(unused_imports)]
pub use mocks::MockMessageSink;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
