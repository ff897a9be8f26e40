use anyhow::{Context, Result};
use oecd_life_expectancy::{
    cli::{Cli, Commands},
    config::Config,
    download::{CacheManager, HttpSource},
    error::Error,
    logging::{init_logging, LogConfig},
    parser::{load_age_profile, load_observations},
    ranking::{top_entities, RankQuery},
    reference::ReferenceLoader,
    series::{entity_series, year_range},
    writer::{
        ranking_file_name, render_age_peaks, render_table, series_file_name, write_age_profile,
        write_table, year_span,
    },
};
use std::time::Instant;
use tracing::{info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(&LogConfig::from_verbosity(cli.verbose));

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.cache_dir.is_some() {
        config.cache_dir = cli.cache_dir;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let start = Instant::now();

    match cli.command {
        Commands::Rank {
            year,
            top,
            all_countries,
            data,
            refresh,
        } => {
            let data_file = config.data_file(data)?;
            let observations = load_observations(&data_file)?;
            let loader = reference_loader(&config)?;
            let names = loader.get_entity_names(refresh)?;
            let members = if all_countries {
                None
            } else {
                Some(loader.get_membership_set(refresh)?)
            };

            let table = top_entities(
                &observations,
                &names,
                &config.aliases,
                members.as_ref(),
                RankQuery::new(year).top(top),
            )
            .with_context(|| format!("Failed to rank countries for {year}"))?;

            let scope = if all_countries { "Countries" } else { "OECD Countries" };
            println!("Life Expectancy at Birth\nTop {top} {scope}, {year}");
            println!("{}", render_table(&table));

            let path = write_table(&config.output_dir, &ranking_file_name(year), &table)?;
            println!("Saved {}", path.display());
        }

        Commands::Series {
            countries,
            from,
            to,
            step,
            data,
            refresh,
        } => {
            let data_file = config.data_file(data)?;
            let observations = load_observations(&data_file)?;
            let names = reference_loader(&config)?.get_entity_names(refresh)?;
            let years = year_range(from, to, step);

            for country in &countries {
                let table =
                    match entity_series(&observations, &names, &config.aliases, country, &years) {
                        Ok(table) => table,
                        Err(err @ Error::NotFound { .. }) => {
                            warn!("{err}");
                            continue;
                        }
                        Err(err) => {
                            return Err(anyhow::Error::new(err)
                                .context(format!("Failed to extract series for {country}")))
                        }
                    };

                let Some((first, last)) = year_span(&table) else {
                    warn!("No data for {country} between {from} and {to}");
                    continue;
                };
                println!("Life Expectancy at Birth\nBy year from {first} to {last}, {country}");
                println!("{}", render_table(&table));

                let path = write_table(
                    &config.output_dir,
                    &series_file_name(country, &table),
                    &table,
                )?;
                println!("Saved {}", path.display());
            }
        }

        Commands::Refresh => {
            let loader = reference_loader(&config)?;
            let names = loader.get_entity_names(true)?;
            let members = loader.get_membership_set(true)?;
            println!(
                "Refreshed {} country codes and {} OECD members in {:?}",
                names.len(),
                members.len(),
                loader.cache().cache_dir()
            );
        }

        Commands::Members { refresh } => {
            let members = reference_loader(&config)?.get_membership_set(refresh)?;
            println!("OECD members ({}):\n", members.len());
            for name in members.iter() {
                println!("  {}", name);
            }
        }

        Commands::Codes { refresh } => {
            let names = reference_loader(&config)?.get_entity_names(refresh)?;
            println!("Country codes ({}):\n", names.len());
            for (code, _) in names.iter() {
                println!("  {}  {}", code, names.canonical_name(code, &config.aliases));
            }
        }

        Commands::AgeProfile { input } => {
            let profile = load_age_profile(&input)?;
            println!("{}", render_age_peaks(&profile));

            let path = write_age_profile(&config.output_dir, &profile)?;
            println!("Saved {}", path.display());
        }
    }

    info!(elapsed_secs = start.elapsed().as_secs_f64(), "done");
    Ok(())
}

fn reference_loader(config: &Config) -> Result<ReferenceLoader<HttpSource>> {
    let cache = CacheManager::new(config.cache_dir.clone())?;
    let source = HttpSource::new(&config.sources)?;
    Ok(ReferenceLoader::new(cache, source))
}
