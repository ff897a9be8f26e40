pub mod ons;
pub mod record;

pub use ons::*;
pub use record::*;
