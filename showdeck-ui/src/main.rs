//! Showdeck UI - headless page runner
//!
//! Loads an archive document (local file or URL), builds the page, and
//! reports what the orchestration layer did: year groups, mounted embeds,
//! observer registrations. Useful for validating a freshly fetched
//! `archives.json` before publishing it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use showdeck_common::config::SiteConfig;
use showdeck_common::MediaKind;
use showdeck_ui::share::ShareChannels;
use showdeck_ui::widget::SdkUnavailable;
use showdeck_ui::{ArchiveLoader, ArchiveSource, UiEngine};

/// Command-line arguments for showdeck-ui
#[derive(Parser, Debug)]
#[command(name = "showdeck-ui")]
#[command(about = "Headless runner for the Showdeck page orchestration")]
#[command(version)]
struct Args {
    /// Archive document: a path to archives.json or an http(s) URL
    #[arg(env = "SHOWDECK_ARCHIVES", default_value = "data/archives.json")]
    archive: String,

    /// Site configuration TOML file
    #[arg(short, long, env = "SHOWDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Initial page URL (fragment selects the starting section)
    #[arg(long, default_value = "/")]
    url: String,

    /// Print the rendered element tree outline
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "showdeck_ui=debug,showdeck_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = SiteConfig::load(args.config.as_deref()).context("Failed to load site config")?;
    info!(sections = config.sections.len(), "Site configuration loaded");

    let initial_url = showdeck_ui::url::PageUrl::parse(&args.url);
    let mut engine = UiEngine::with_url(
        config,
        Box::new(SdkUnavailable),
        ShareChannels::default(),
        initial_url,
    );

    let mut loader = ArchiveLoader::new(ArchiveSource::from_arg(&args.archive));
    match loader.load().await {
        Ok(document) => {
            engine.attach_archives(&document);
            info!(
                audio = document.audio.len(),
                video = document.video.len(),
                "Archives attached"
            );
        }
        Err(e) => {
            warn!(error = %e, "Archive load failed, rendering inline error");
            engine.render_archive_error(&e.to_string());
        }
    }

    // Let deferred work (fades, deep-link scrolls, source assigns) settle
    engine.flush_timers();

    for kind in [MediaKind::Audio, MediaKind::Video] {
        let labels = engine.renderer.materialized_labels(kind);
        info!(%kind, materialized = ?labels, "Year groups materialized");
    }
    let stats = engine.embeds.stats();
    info!(
        mounts = stats.mounts,
        unloads = stats.unloads,
        reloads = stats.reloads,
        observers = engine.observers.len(),
        section = engine.active_section(),
        stream = engine.active_stream(),
        "Page ready"
    );

    if args.dump {
        println!("{}", engine.doc.outline());
    }

    Ok(())
}
