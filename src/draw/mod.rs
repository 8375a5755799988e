// Timed number drawing
//
// A scheduler owns the pool and the log, and runs one background task that
// publishes draws on a single-slot channel.

// Public API - what other modules can use
pub use log::DrawLog;
pub use pool::NumberPool;
pub use scheduler::{Draw, DrawScheduler, DrawStatus, DrawStream};

// Internal modules
mod log;
mod pool;
mod scheduler;
mod worker;
