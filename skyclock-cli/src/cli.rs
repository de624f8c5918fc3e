use std::{fmt, sync::Arc};

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, Select, Text};
use skyclock_core::{
    CandidateLocation, Config, Coordinates, FixedGeolocator, Location, Resolver, SkyError,
    SkyRenderer, StateHandle, Viewport,
};

use crate::{render, watch};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "skyclock",
    version,
    about = "Day/night sky clock driven by live weather"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Explicit coordinates instead of IP geolocation or the saved location.
#[derive(Debug, Clone, Copy, Args)]
pub struct PositionArgs {
    /// Latitude (decimal). Example: 47.61
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude (decimal). Example: -122.33
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,
}

impl PositionArgs {
    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

/// Size of the area the sun and moon travel across.
#[derive(Debug, Clone, Copy, Args)]
pub struct ViewportArgs {
    #[arg(long, default_value_t = 1280.0)]
    pub width: f64,

    #[arg(long, default_value_t = 800.0)]
    pub height: f64,
}

impl From<ViewportArgs> for Viewport {
    fn from(args: ViewportArgs) -> Self {
        Viewport::new(args.width, args.height)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Choose a default location interactively.
    Configure,

    /// Resolve the location once and describe the sky right now.
    Now {
        #[command(flatten)]
        position: PositionArgs,

        #[command(flatten)]
        viewport: ViewportArgs,

        /// Print the frame as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search for a place and describe its sky.
    Search {
        /// Place name, optionally qualified: "Seattle, Washington, United States".
        query: String,

        #[command(flatten)]
        viewport: ViewportArgs,
    },

    /// List location suggestions for a partial name.
    Suggest {
        query: String,
    },

    /// Keep the sky updating every second.
    Watch {
        #[command(flatten)]
        position: PositionArgs,

        #[command(flatten)]
        viewport: ViewportArgs,
    },
}

/// Menu entry for a suggestion.
struct Choice(CandidateLocation);

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.display_name())
    }
}

fn resolver_for(config: &Config, position: Option<&PositionArgs>) -> anyhow::Result<Resolver> {
    let resolver = Resolver::from_config(config, StateHandle::new())
        .context("Failed to set up weather services")?;

    Ok(match position.and_then(PositionArgs::coordinates) {
        Some(at) => resolver.with_geolocator(Arc::new(FixedGeolocator(at))),
        None => resolver,
    })
}

fn user_error(err: SkyError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

async fn print_sky(resolver: &Resolver, viewport: Viewport) {
    let state = resolver.state().snapshot().await;
    let frame = SkyRenderer::new(viewport).frame(Utc::now(), &state);
    println!("{}", render::frame_report(&frame, &state));
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config).await,
            Command::Now {
                position,
                viewport,
                json,
            } => {
                let resolver = resolver_for(&config, Some(&position))?;
                if let Err(e) = startup(&resolver, &config, &position).await {
                    eprintln!("error: {}", e.user_message());
                    tracing::debug!(error = %e, "Startup resolution failed");
                }

                if json {
                    let state = resolver.state().snapshot().await;
                    let frame = SkyRenderer::new(viewport.into()).frame(Utc::now(), &state);
                    println!("{}", serde_json::to_string_pretty(&frame)?);
                } else {
                    print_sky(&resolver, viewport.into()).await;
                }
                Ok(())
            }
            Command::Search { query, viewport } => {
                let resolver = resolver_for(&config, None)?;
                resolver.search(&query).await.map_err(user_error)?;
                print_sky(&resolver, viewport.into()).await;
                Ok(())
            }
            Command::Suggest { query } => {
                let resolver = resolver_for(&config, None)?;
                let suggestions = resolver.suggestions(&query).await.map_err(user_error)?;
                if suggestions.is_empty() {
                    println!("No suggestions for '{query}'.");
                } else {
                    println!("{}", render::suggestion_list(&suggestions));
                }
                Ok(())
            }
            Command::Watch { position, viewport } => {
                let resolver = resolver_for(&config, Some(&position))?;
                let renderer = SkyRenderer::new(viewport.into());
                let use_device_position = position.coordinates().is_some();
                let saved = config.default_location.clone();
                watch::run(resolver, &config, renderer, saved, use_device_position).await
            }
        }
    }
}

/// Explicit coordinates win over the saved location, which wins over IP geolocation.
async fn startup(
    resolver: &Resolver,
    config: &Config,
    position: &PositionArgs,
) -> Result<Location, SkyError> {
    if position.coordinates().is_some() {
        resolver.resolve_current_position().await
    } else {
        resolver
            .resolve_startup(config.default_location.as_ref())
            .await
    }
}

async fn configure(mut config: Config) -> anyhow::Result<()> {
    if let Some(saved) = &config.default_location {
        let replace = Confirm::new(&format!(
            "Default location is {}. Replace it?",
            saved.display_name()
        ))
        .with_default(true)
        .prompt()?;

        if !replace {
            let clear = Confirm::new("Clear it and use IP geolocation instead?")
                .with_default(false)
                .prompt()?;
            if clear {
                config.clear_default_location();
                config.save()?;
                println!("Default location cleared.");
            }
            return Ok(());
        }
    }

    let query = Text::new("Location:")
        .with_help_message("City name, e.g. Seattle or Seattle, Washington")
        .prompt()?;

    let resolver = resolver_for(&config, None)?;
    let primary = query.split(',').next().unwrap_or(&query);
    let suggestions = resolver.suggestions(primary).await.map_err(user_error)?;
    if suggestions.is_empty() {
        bail!(SkyError::NotFound(query).user_message());
    }

    let Choice(candidate) = Select::new(
        "Pick a location:",
        suggestions.into_iter().map(Choice).collect(),
    )
    .prompt()?;

    resolver.select(&candidate).await.map_err(user_error)?;
    config.set_default_location(candidate.clone())?;
    config.save()?;

    println!(
        "Saved {} to {}",
        candidate.display_name(),
        Config::config_file_path()?.display()
    );
    Ok(())
}
