use clap::Parser;
use player::{AppState, config::Args, create_router, load_into};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "player=debug,route_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let state = AppState::loading();
    tracing::info!("loading route from {}", args.route);
    tokio::spawn(load_into(state.clone(), args.route.clone(), args.speed));

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!("serving route player on http://{}", args.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
