use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::ranking::DEFAULT_TOP_N;

#[derive(Parser, Debug)]
#[command(name = "oecd-life-expectancy")]
#[command(version, about = "Rank and chart OECD life expectancy data")]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Custom cache directory for scraped reference data
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Directory for output tables
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Top countries by total life expectancy for one year
    Rank {
        year: i32,

        /// Number of countries to keep
        #[arg(short, long, default_value_t = DEFAULT_TOP_N)]
        top: usize,

        /// Rank every country, not just OECD members
        #[arg(long)]
        all_countries: bool,

        /// OECD life expectancy CSV
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Re-scrape reference data even if cached
        #[arg(short, long)]
        refresh: bool,
    },

    /// Life expectancy by year for one or more countries
    Series {
        #[arg(required = true)]
        countries: Vec<String>,

        /// First year
        #[arg(long, default_value_t = 1960)]
        from: i32,

        /// Last year (inclusive)
        #[arg(long, default_value_t = 2017)]
        to: i32,

        /// Years between samples
        #[arg(long, default_value_t = 5)]
        step: usize,

        /// OECD life expectancy CSV
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Re-scrape reference data even if cached
        #[arg(short, long)]
        refresh: bool,
    },

    /// Re-scrape both reference tables
    Refresh,

    /// List OECD members
    Members {
        #[arg(short, long)]
        refresh: bool,
    },

    /// List country codes with reconciled names
    Codes {
        #[arg(short, long)]
        refresh: bool,
    },

    /// Clean the ONS suicide statistics table and report peak ages
    AgeProfile {
        /// ONS age-by-year CSV
        input: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
