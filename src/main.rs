use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use placestamp::{config, geocode, locations, pipeline, watermark};

#[derive(Parser, Debug)]
#[command(
    name = "placestamp",
    version,
    about = "Stamp photos with where and when they were taken — from EXIF capture data, reverse geocoding, and a year/place table"
)]
struct Cli {
    /// Folder of photos to process
    #[arg(value_name = "FOLDER")]
    input_folder: Option<String>,

    /// Output folder for the stamped copies
    #[arg(short, long, value_name = "FOLDER", default_value = "watermarked_photos")]
    output: String,

    /// Path to the "year,place" override table
    #[arg(short, long, value_name = "FILE", default_value = "locations.txt")]
    locations: String,

    /// Path to config file (default: per-user config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a default config file and exit
    #[arg(long)]
    init: bool,

    /// Font file (.ttf) for the caption text
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    let Some(ref input_folder) = cli.input_folder else {
        anyhow::bail!("No input folder specified. Use --help for usage.");
    };

    let input_dir = pipeline::expand_tilde(input_folder);
    let output_dir = pipeline::expand_tilde(&cli.output);
    let locations_path = pipeline::expand_tilde(&cli.locations);

    if !input_dir.is_dir() {
        anyhow::bail!("Input folder does not exist: {}", input_dir.display());
    }
    if !locations_path.is_file() {
        anyhow::bail!(
            "Locations file does not exist: {} (create it, or point elsewhere with --locations)",
            locations_path.display()
        );
    }

    // Load config
    let config = config::Config::load(cli.config.as_deref())?;

    let font_path =
        watermark::resolve_font_path(cli.font.as_deref(), &config.rendering.font_search_paths)?;
    log::info!("Caption font: {}", font_path.display());

    let table = locations::LocationTable::load(&locations_path);
    log::info!(
        "Loaded {} location override(s) from {}",
        table.len(),
        locations_path.display()
    );

    let gazetteer = geocode::NominatimGazetteer::new(&config.geocoding)?;

    pipeline::run_batch(
        &input_dir,
        &output_dir,
        &table,
        &gazetteer,
        &font_path,
        &config,
    )
    .await?;

    Ok(())
}
