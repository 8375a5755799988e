// Public API - what other modules can use
pub use generator::BoardGenerator;
pub use models::{Board, Cell, ColumnRange};

// Internal modules
mod generator;
mod models;
