pub mod public;
mod router;
pub mod schedule;

pub use router::router;
