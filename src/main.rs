use anyhow::{Context, Result};
use clap::Parser;
use owlet_uploader::app::OwletUploader;
use owlet_uploader::config::Config;
use owlet_uploader::template;
use owlet_uploader::upload::Session;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "owlet-uploader")]
#[command(about = "Bulk content uploader for Guardian Owlet")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, default_value = "owlet.toml", env = "OWLET_CONFIG")]
    config: PathBuf,

    /// Supabase project URL, overrides the config file
    #[arg(long, env = "OWLET_SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Signed-in session as `user_id:access_token`
    #[arg(long, env = "OWLET_SESSION", hide_env_values = true)]
    session: Option<Session>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(url) = args.supabase_url {
        config.supabase.url = url;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("owlet_uploader={}", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &config.source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => info!("No config at {}, using defaults", args.config.display()),
    }

    template::validate_registry().context("Template registry is inconsistent")?;

    let session = args.session.or_else(|| config.session());
    info!(
        "Starting uploader against {} ({})",
        config.supabase.url,
        if session.is_some() {
            "signed in"
        } else {
            "signed out"
        }
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 720.0])
            .with_min_inner_size([420.0, 520.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Guardian Owlet Bulk Upload",
        options,
        Box::new(move |_cc| Box::new(OwletUploader::new(config, session))),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {}", e))?;

    Ok(())
}
