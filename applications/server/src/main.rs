/// Encore Server - ordered playlists, albums and play queues over HTTP
use clap::{Parser, Subcommand};
use encore_server::{config::ServerConfig, create_router, services::AuthService, state::AppState};
use encore_storage::MembershipContext;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "encore-server")]
#[command(about = "Encore ordered-membership server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Apply database migrations and exit
    Migrate,
    /// Print a bearer token for a user (development helper)
    IssueToken {
        /// User id to put in the token subject
        #[arg(short, long)]
        user_id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "encore_server=info,encore_storage=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Migrate => migrate(&config).await?,
        Commands::IssueToken { user_id } => issue_token(&config, user_id)?,
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Encore Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let pool =
        encore_storage::create_pool_with(&config.storage.database_url, &config.pool_config())
            .await?;
    encore_storage::run_migrations(&pool).await?;
    tracing::info!("Database connected");

    let membership = Arc::new(MembershipContext::new(pool, config.ordering_config()));
    tracing::info!(
        lock_timeout_ms = config.ordering.lock_timeout_ms,
        "Membership engine ready"
    );

    let auth_service = Arc::new(AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    ));

    let app = create_router(AppState::new(membership, auth_service));

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn migrate(config: &ServerConfig) -> anyhow::Result<()> {
    let pool =
        encore_storage::create_pool_with(&config.storage.database_url, &config.pool_config())
            .await?;
    encore_storage::run_migrations(&pool).await?;
    tracing::info!(database_url = %config.storage.database_url, "Migrations applied");
    Ok(())
}

fn issue_token(config: &ServerConfig, user_id: i64) -> anyhow::Result<()> {
    config.validate()?;
    let auth_service = AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    );
    println!("{}", auth_service.create_access_token(user_id)?);
    Ok(())
}
