use std::fs::OpenOptions;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::Context;
use auth::Authenticator;
use clap::Parser;
use identity_service::cli::Cli;
use identity_service::cli::Command;
use identity_service::config::Config;
use identity_service::domain::user::ports::UserServicePort;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryUserRepository;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const MAX_DB_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    match cli.resolved_command() {
        Command::Version => {
            println!("{}", identity_service::cli::version_line());
            Ok(())
        }
        Command::Serve => serve(startup(&cli)?).await,
        Command::Migrate => migrate(startup(&cli)?).await,
    }
}

/// Load configuration and install the tracing subscriber.
fn startup(cli: &Cli) -> Result<Config, anyhow::Error> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config)?;

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        command = ?cli.resolved_command(),
        "Service starting"
    );

    Ok(config)
}

fn init_tracing(config: &Config) -> Result<(), anyhow::Error> {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(config.log_filter())?,
    };

    let file_layer = match &config.logger.log_path {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

async fn connect(url: &str) -> Result<PgPool, anyhow::Error> {
    let pg_pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(url)
        .await?;
    tracing::info!(
        max_connections = MAX_DB_CONNECTIONS,
        database = "postgresql",
        "Database connection pool created"
    );
    Ok(pg_pool)
}

async fn migrate(config: Config) -> Result<(), anyhow::Error> {
    let url = config
        .database
        .url
        .as_deref()
        .context("database.url must be set to run migrations")?;

    let pg_pool = connect(url).await?;
    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    Ok(())
}

async fn serve(config: Config) -> Result<(), anyhow::Error> {
    tracing::info!(
        http_port = config.server.http_port,
        mode = ?config.server.mode,
        postgres = config.database.url.is_some(),
        token_validity_hours = config.jwt.expiration_hours,
        max_page_size = config.pagination.max_limit,
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new(
        config.jwt.secret.as_bytes(),
        config.jwt.token_validity()?,
    ));

    let user_service: Arc<dyn UserServicePort> = match &config.database.url {
        Some(url) => {
            let user_repository = Arc::new(PostgresUserRepository::new(connect(url).await?));
            Arc::new(UserService::new(user_repository, Arc::clone(&authenticator)))
        }
        None => {
            tracing::warn!("No database configured, users are kept in memory");
            let user_repository = Arc::new(InMemoryUserRepository::new());
            Arc::new(UserService::new(user_repository, Arc::clone(&authenticator)))
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator, config.pagination);

    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
