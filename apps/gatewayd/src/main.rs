use {
    anyhow::{Context, Result},
    clap::Parser,
    haru_config::GatewayConfig,
};

/// Typed BFF gateway for the haru app.
///
/// Exposes one operation endpoint in front of the upstream timeline, label,
/// social-feed, community, and billing services. Caller identity arrives in
/// trusted headers set by the fronting auth layer; upstream base URLs come
/// from the environment with local-stack defaults.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on. Overrides GATEWAY_PORT.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    haru_gateway::start_gateway(&args.bind, config).await
}
