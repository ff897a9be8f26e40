pub mod cache;
pub mod client;
pub mod scrape;

pub use cache::*;
pub use client::*;
pub use scrape::*;
