use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::admin::AdminGrid;
use crate::cli::config::open_store;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::page::{save_filter_seed, LocalStore};

#[derive(Subcommand)]
pub enum FilterCommands {
    #[command(about = "Set the persisted filter seed for a grid")]
    Set {
        #[arg(help = "Grid name, e.g. states")]
        grid: AdminGrid,
        #[arg(help = "Filter text (quotes and \"null\" are normalized)")]
        value: Option<String>,
    },

    #[command(about = "Show persisted filter seeds")]
    Show {
        #[arg(help = "Grid name (all grids if omitted)")]
        grid: Option<AdminGrid>,
    },

    #[command(about = "Clear the persisted filter seed for a grid")]
    Clear {
        #[arg(help = "Grid name")]
        grid: AdminGrid,
    },
}

pub async fn handle(cmd: FilterCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store()?;

    match cmd {
        FilterCommands::Set { grid, value } => {
            let filter = save_filter_seed(&store, grid, value.as_deref()).await?;
            output_success(
                &output_format,
                &format!("Filter for {} set to {:?}", grid, filter),
                Some(json!({ "grid": grid, "filter": filter })),
            )
        }
        FilterCommands::Show { grid } => {
            let grids: Vec<AdminGrid> = match grid {
                Some(grid) => vec![grid],
                None => AdminGrid::ALL.to_vec(),
            };

            let mut seeds = Map::new();
            for grid in grids {
                let seed = store.get(&grid.storage_key()).await?;
                seeds.insert(grid.slug().to_string(), seed.map(Value::String).unwrap_or(Value::Null));
            }

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "filters": seeds }))?),
                OutputFormat::Text => {
                    for (slug, seed) in &seeds {
                        match seed.as_str() {
                            Some(text) => println!("{:<16} {}", slug, text),
                            None => println!("{:<16} -", slug),
                        }
                    }
                }
            }
            Ok(())
        }
        FilterCommands::Clear { grid } => {
            save_filter_seed(&store, grid, None).await?;
            output_success(&output_format, &format!("Filter for {} cleared", grid), None)
        }
    }
}
