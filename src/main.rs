use bistro::{
    auth::{
        jwt::{JwtConfig, JwtService},
        user::Backend,
    },
    config::Config,
    database::setup_database,
    entities::sea_orm_active_enums::UserType,
    error::AppError,
    router::{AppState, create_router, shutdown_signal},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = setup_database(&config.database_url).await?;

    if let Some(registration) = config.bootstrap_manager.clone() {
        let username = registration.username.clone();
        match Backend::new(db.clone())
            .create_with_role(registration, UserType::Manager)
            .await
        {
            Ok(user) => info!("Provisioned manager account {}", user.username),
            Err(AppError::Conflict(_)) => info!("Manager account {username} already exists"),
            Err(e) => warn!("Could not provision manager account {username}: {e}"),
        }
    }

    let state = AppState {
        db,
        jwt: JwtService::with_config(JwtConfig::from(&config)),
        policy: config.booking_policy(),
    };
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
