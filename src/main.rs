use std::path::{Path, PathBuf};
use std::sync::Arc;

use animal_matcher::{
    build_app,
    client::{self, AnalyzeClient, ClientSession},
    run_server, AppConfig, AppState, UserInfo,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "animal-matcher", version, about = "Which animal do you look like?")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the analysis service
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send a selfie to a running service and print the result
    Match {
        image: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_target(false)
        .init();

    // After the subscriber, so config warnings are not lost.
    let config = AppConfig::from_env();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let config = AppConfig {
                port: port.unwrap_or(config.port),
                ..config
            };
            serve(config).await
        }
        Commands::Match {
            image,
            name,
            age,
            country,
            server,
        } => {
            let user_info = UserInfo { name, age, country };
            run_match(&server, &image, user_info).await
        }
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    if config.model_api_key.trim().is_empty() {
        warn!("no model API key configured; every analysis will fail until MODEL_API_KEY is set");
    }
    info!(
        model = %config.model_name,
        policy = %config.match_policy,
        timeout = ?config.model_timeout,
        "starting animal matcher"
    );

    let app = build_app(Arc::new(AppState::from_config(&config)));
    run_server(app, &config.bind_address, config.port)
        .await
        .context("server failed")
}

async fn run_match(server: &str, image: &Path, user_info: UserInfo) -> Result<()> {
    let mut session = ClientSession::new(user_info);
    session.select_image(client::encode_data_url(image)?);

    let request = session
        .begin_analysis()
        .context("no image selected")?;

    match AnalyzeClient::new(server).analyze(&request).await {
        Ok(found) => session.finish_analysis(Some(found)),
        Err(err) => {
            session.finish_analysis(None);
            error!(error = %err, "error analyzing image");
            return Err(err.into());
        }
    }

    if let Some(found) = session.result() {
        println!("{}", client::render_result_card(session.user_info(), found));
    }
    Ok(())
}
