use fftt_licensees::config::{CliArgs, Config, USAGE};
use fftt_licensees::pipeline;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Entry point: `fftt-licensees [CLUB_ID] [SMARTPING_API_KEY]`.
///
/// Diagnostics are written to stderr through `tracing`; stdout receives
/// exactly one JSON line for the consuming application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fftt_licensees=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse(std::env::args().skip(1));
    if args.help {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    let config = Config::from_env();
    let api_key = args
        .api_key
        .clone()
        .or_else(|| config.smartping_api_key.clone());

    let result = pipeline::fetch_club_licensees(&config, &args.club_id, api_key.as_deref()).await;

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
