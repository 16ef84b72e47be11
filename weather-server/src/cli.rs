use anyhow::Context;
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use weather_core::{Catalog, Config, ServiceError, SqliteRecordStore, progress};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather collection service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to listen on; overrides config and WEATHER_BIND_ADDR.
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// SQLite database file; overrides config and WEATHER_DATABASE_PATH.
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Store OpenWeather credentials in the config file.
    Configure {
        /// API key; prompted for when omitted.
        #[arg(long)]
        api_key: Option<String>,

        /// Current-weather endpoint URL.
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Show collection progress for a request id straight from the database.
    Status {
        request_id: String,

        #[arg(long)]
        database: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind, database } => {
                let mut config = Config::load()?;
                if let Some(bind) = bind {
                    config.bind = bind;
                }
                if let Some(database) = database {
                    config.database_path = database;
                }
                serve(config).await
            }
            Command::Configure { api_key, api_url } => {
                // Environment overrides must not end up in the file.
                let path = Config::config_file_path()?;
                let mut config = Config::load_file(&path)?;

                let api_key = match api_key {
                    Some(key) => key,
                    None => inquire::Text::new("OpenWeather API key:")
                        .prompt()
                        .context("Failed to read API key")?,
                };
                if api_key.trim().is_empty() {
                    anyhow::bail!("API key cannot be empty");
                }

                config.provider.api_key = Some(api_key);
                if let Some(url) = api_url {
                    config.provider.api_url = url;
                }
                config.save_to(&path)?;

                println!("Saved configuration to {}", path.display());
                Ok(())
            }
            Command::Status { request_id, database } => {
                let path = match database {
                    Some(path) => path,
                    None => Config::load()?.database_path,
                };
                let store = SqliteRecordStore::open(&path)
                    .with_context(|| format!("Failed to open database: {}", path.display()))?;
                let request_id = weather_core::RequestId::parse(request_id)?;

                match progress::report(&store, &Catalog::default(), &request_id) {
                    Ok(view) => {
                        println!("Request:   {}", view.request_id);
                        println!("Started:   {}", view.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
                        println!("Progress:  {}", view.upload_progress);
                        Ok(())
                    }
                    Err(ServiceError::NotFound(id)) => {
                        anyhow::bail!("No collection record for request id '{id}'")
                    }
                    Err(err) => Err(err.into()),
                }
            }
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let service = Arc::new(weather_core::WeatherService::from_config(&config)?);

    tracing::info!(
        bind = %config.bind,
        database = %config.database_path.display(),
        cities = service.catalog().len(),
        "starting weather server"
    );

    warp::serve(crate::routes::routes(service)).run(config.bind).await;
    Ok(())
}
