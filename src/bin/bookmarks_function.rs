use anyhow::{Context, Result};
use bookmarks::config::FetchConfig;
use bookmarks::fetch::TitleFetcher;
use bookmarks::function::{self, DEFAULT_DATA_FILE, FunctionResponse};
use bookmarks::store::Store;
use clap::Parser;
use std::io::Read;

#[derive(Parser)]
#[command(name = "bookmarks_function")]
#[command(about = "Handle one serverless-style bookmark request")]
struct Cli {
    /// Event JSON file. Reads stdin when omitted.
    #[arg(short, long)]
    event: Option<String>,
    #[arg(short, long)]
    pretty: bool,
}

fn read_event(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading event {}", path)),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading event from stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    bookmarks::init_tracing();

    let cli = Cli::parse();

    let response = match read_event(cli.event.as_deref()) {
        Ok(raw) => {
            let data_file = std::env::var("BOOKMARKS_DATA_FILE").unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string());
            let fetcher = match TitleFetcher::new(&FetchConfig::default()) {
                Ok(fetcher) => Some(fetcher),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to build http client, title fetching disabled");
                    None
                }
            };
            let store = Store::open(data_file, fetcher).await;
            function::handle_raw(&store, &raw).await
        }
        Err(e) => {
            tracing::error!(error = format!("{:#}", e), "failed to read function event");
            FunctionResponse::internal_error()
        }
    };

    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", serde_json::to_string(&response)?);
    }

    Ok(())
}
