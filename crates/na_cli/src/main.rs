use std::io::Read;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use na_dashboard::{create_dashboard, DashboardConfig, DashboardState};
use na_feeds::{FeedConfig, FeedFetcher};
use na_inference::{InferenceConfig, InferenceContext};
use na_web::AppState;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, Commands};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// The positional argument, or all of stdin when it is absent.
fn input_text(text: Option<String>) -> Result<String> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer
        }
    };
    if text.trim().is_empty() {
        bail!("No text given");
    }
    Ok(text)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_inference(config: &InferenceConfig) -> Result<InferenceContext> {
    let context = InferenceContext::from_config(config).context("Failed to set up models")?;
    info!("🧠 Models ready ({})", context.describe());
    Ok(context)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let inference_config = InferenceConfig::from(cli.inference);

    match cli.command {
        Commands::Serve { bind, feeds } => {
            let inference = build_inference(&inference_config)?;
            inference
                .warm_up()
                .await
                .context("Classifier did not answer the startup warm-up")?;

            let feeds = FeedFetcher::new(FeedConfig::from(feeds))?;
            info!(
                "📡 Sampling {} feed sources",
                feeds.config().sources.len()
            );

            let app = na_web::create_app(AppState::new(Arc::new(inference), Arc::new(feeds)));
            na_web::serve(app, bind).await?;
        }
        Commands::Dashboard { bind, api_url } => {
            let config = DashboardConfig { bind, api_url };
            let state = DashboardState::from_config(&config)
                .with_context(|| format!("Invalid API url {}", config.api_url))?;
            info!("🔗 Dashboard talks to {}", state.api.base_url());
            na_dashboard::serve(create_dashboard(state), config.bind).await?;
        }
        Commands::Predict { text } => {
            let text = input_text(text)?;
            let inference = build_inference(&inference_config)?;
            print_json(&inference.predict(&text).await?)?;
        }
        Commands::Analyze { text } => {
            let text = input_text(text)?;
            let inference = build_inference(&inference_config)?;
            print_json(&inference.analyze(&text).await?)?;
        }
        Commands::Feeds { feeds, full_text } => {
            let fetcher = FeedFetcher::new(FeedConfig::from(feeds))?;
            let mut articles = fetcher.fetch_sample().await;
            if full_text {
                fetcher.expand_full_text(&mut articles).await;
            }
            info!("📥 Fetched {} articles", articles.len());
            print_json(&articles)?;
        }
    }

    Ok(())
}
