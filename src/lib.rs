pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod logging;
pub mod parser;
pub mod ranking;
pub mod reconcile;
pub mod reference;
pub mod series;
pub mod table;
pub mod writer;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::{Error, Result};
pub use reconcile::{reconcile, AliasMap};
pub use reference::{MembershipSet, ReferenceLoader, ReferenceSource, ReferenceTable};
pub use table::WideTable;
