use std::sync::Arc;

use bookmarks::config::{Cli, Config, default_config_dir, default_config_path};
use bookmarks::fetch::TitleFetcher;
use bookmarks::handler::AppState;
use bookmarks::routes::routes;
use bookmarks::store::Store;
use clap::Parser;
use tokio::signal;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    dotenvy::dotenv().ok();
    bookmarks::init_tracing();

    // The data file sits next to the config file unless configured otherwise.
    let (config_path, config_dir, explicit) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir, true)
        }
        None => (default_config_path(), default_config_dir(), false),
    };

    let loaded = if explicit {
        Config::new(&config_path.to_string_lossy())
    } else {
        Config::new_or_default(&config_path)
    };
    let cfg = loaded.unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });

    let data_path = cfg.app.data_path(&config_dir);
    if let Some(dir) = data_path.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::error!(error = %e, dir = ?dir, "failed to create data directory");
            std::process::exit(1);
        }
    }

    tracing::info!("bookmarks.svc starting");

    let fetcher = if cfg.fetch.enabled {
        match TitleFetcher::new(&cfg.fetch) {
            Ok(fetcher) => Some(fetcher),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build http client, title fetching disabled");
                None
            }
        }
    } else {
        None
    };

    let store = Arc::new(Store::open(data_path, fetcher).await);
    let app = routes(AppState { store });

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("bookmarks.svc running on {}", &address);
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server stopped unexpectedly");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl+c signal received, shutting down");
        }
    }

    tracing::info!("bookmarks.svc going off");
}
