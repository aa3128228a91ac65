use a2p_onboard::a2p::{A2pRouteState, a2p_routes, twilio_factory};
use a2p_onboard::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let Settings {
        a2p: config,
        monitor,
        server,
        endpoints,
    } = Settings::from_env()?;

    eprintln!("📨 A2P Onboard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Policy: {}", config.policy_sid);
    eprintln!("   Trust Hub: {}", endpoints.trusthub);
    eprintln!("   Messaging: {}", endpoints.messaging);
    eprintln!(
        "   Monitor: every {:?}, deadline {:?}, fetch timeout {:?}",
        monitor.tick_interval, monitor.deadline, monitor.fetch_timeout
    );
    eprintln!("   API: http://0.0.0.0:{}/api/a2p/onboard\n", server.port);

    let app = a2p_routes(A2pRouteState {
        config,
        monitor,
        providers: twilio_factory(endpoints),
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", server.port)).await?;
    tracing::info!(port = server.port, "A2P onboarding server started");
    axum::serve(listener, app).await?;

    Ok(())
}
