use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cityweather_core::{ApiKey, CityResolver, Config, CredentialStore, Lookup, WeatherService};
use console::{Style, Term};

use crate::prompt;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "City weather lookups with a local cache")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for cached weather tables.
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Defaults to `show` with interactive prompts.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show weather for a city, from the cache when fresh.
    Show {
        /// City name; prompted for when absent.
        city: Option<String>,

        /// Fetch even if the cached table is still fresh.
        #[arg(long)]
        refresh: bool,
    },

    /// Print the config, credential and cache locations.
    Paths,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = self.config_path()?;
        let config = self.load_config()?;

        let command = self.command.unwrap_or(Command::Show {
            city: None,
            refresh: false,
        });

        match command {
            Command::Configure => {
                let store = CredentialStore::new(config.credentials_path()?);
                store.save(&prompt::api_key()?)?;
                println!("API key saved to {}", store.path().display());
            }
            Command::Show { city, refresh } => show(&config, city, refresh).await?,
            Command::Paths => {
                println!("config:      {}", config_path.display());
                println!("credentials: {}", config.credentials_path()?.display());
                println!("cache:       {}", config.cache_dir()?.display());
            }
        }

        Ok(())
    }

    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::config_file_path(),
        }
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load_from(&self.config_path()?)?;
        if let Some(dir) = &self.cache_dir {
            config.cache.dir = Some(dir.clone());
        }
        Ok(config)
    }
}

async fn show(config: &Config, city: Option<String>, refresh: bool) -> anyhow::Result<()> {
    let api_key = load_or_prompt_key(config)?;
    let service = WeatherService::from_config(config, api_key)?;

    let mut from_args = city;
    let city = CityResolver::new(service.provider(), config.prompt.max_city_attempts)
        .resolve(|rejection| {
            if let Some(rejection) = rejection {
                eprintln!("{}", Style::new().yellow().apply_to(rejection));
            }
            match from_args.take() {
                Some(name) => Ok(name),
                None => prompt::city_name(),
            }
        })
        .await?;

    let lookup = service.lookup(&city, refresh).await?;
    display(&lookup)
}

/// First run asks for the key and stores it; later runs read it back.
fn load_or_prompt_key(config: &Config) -> anyhow::Result<ApiKey> {
    let store = CredentialStore::new(config.credentials_path()?);

    if !store.exists() {
        store.save(&prompt::api_key()?)?;
    }

    Ok(store.load()?)
}

fn display(lookup: &Lookup) -> anyhow::Result<()> {
    let term = Term::stdout();
    if term.is_term() {
        term.clear_screen().context("Failed to clear terminal")?;
    }

    print!("{}", lookup.text);

    tracing::debug!(
        city = %lookup.city,
        path = %lookup.path.display(),
        source = ?lookup.source,
        "displayed weather"
    );
    Ok(())
}
