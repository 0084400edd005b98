use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::adaptor::ReadRequest;
use crate::admin::AdminGrid;
use crate::api::{RemoteFetch, RestClient};
use crate::cli::config::open_store;
use crate::cli::utils::output_read;
use crate::cli::OutputFormat;
use crate::page::{AccessPolicy, AdminPage};

#[derive(Subcommand)]
pub enum GridCommands {
    #[command(about = "List admin grids and their endpoints")]
    List,

    #[command(about = "Read one page of an admin grid")]
    Read {
        #[arg(help = "Grid name, e.g. states")]
        grid: AdminGrid,
        #[arg(long, help = "Filter text; persisted as the grid's seed")]
        filter: Option<String>,
        #[arg(long, default_value_t = 0, help = "Rows to skip")]
        skip: usize,
        #[arg(long, help = "Rows to take")]
        take: Option<usize>,
        #[arg(long, help = "Return the server-side total with the rows")]
        counts: bool,
        #[arg(long, help = "Opaque datasource key")]
        key: Option<String>,
    },

    #[command(about = "Autocomplete suggestions for a grid's search box")]
    Suggest {
        #[arg(help = "Grid name")]
        grid: AdminGrid,
        #[arg(help = "Typed text")]
        text: String,
    },
}

pub async fn handle(cmd: GridCommands, host: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        GridCommands::List => {
            match output_format {
                OutputFormat::Json => {
                    let grids: Vec<_> = AdminGrid::ALL
                        .iter()
                        .map(|grid| {
                            json!({
                                "grid": grid,
                                "endpoint": grid.list_endpoint().path,
                                "search_endpoint": grid.search_endpoint().path,
                                "storage_key": grid.storage_key(),
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&json!({ "grids": grids }))?);
                }
                OutputFormat::Text => {
                    for grid in AdminGrid::ALL {
                        println!("{:<16} {:<28} {}", grid.slug(), grid.list_endpoint().path, grid.storage_key());
                    }
                }
            }
            Ok(())
        }
        GridCommands::Read { grid, filter, skip, take, counts, key } => {
            let page = open_page(grid, host.as_deref()).await?;
            if let Some(filter) = filter {
                page.persist_filter(&open_store()?, Some(&filter)).await?;
            }

            let request = ReadRequest {
                skip,
                take,
                requires_counts: counts,
                ..ReadRequest::default()
            };

            let outcome = page.read(&request, key.as_deref()).await;
            output_read(&output_format, grid.title(), outcome)
        }
        GridCommands::Suggest { grid, text } => {
            let page = open_page(grid, host.as_deref()).await?;
            let request = ReadRequest::default().with_predicate(grid.title(), text);
            let outcome = page.suggest(&request).await;
            output_read(&output_format, grid.title(), outcome)
        }
    }
}

/// Build and initialize the page the same way the hosting screen does
async fn open_page(grid: AdminGrid, host: Option<&str>) -> anyhow::Result<AdminPage> {
    let client: Arc<dyn RemoteFetch> = match host {
        Some(host) => Arc::new(RestClient::new(host)?),
        None => Arc::new(RestClient::from_config()?),
    };

    let page = AdminPage::new(grid, client, crate::config::config().grid.failure_policy);
    let store = open_store()?;
    page.initialize(&store, &AccessPolicy::from_config()).await?;
    Ok(page)
}
