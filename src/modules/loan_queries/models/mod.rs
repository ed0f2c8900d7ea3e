pub mod projections;

pub use projections::*;
