pub mod export;
pub mod report;

pub use export::*;
pub use report::*;
