use std::sync::Arc;

use dotenvy::dotenv;
use retail_order_service::auth::JwtSettings;
use retail_order_service::config::AppConfig;
use retail_order_service::domain::ports::Mailer;
use retail_order_service::infrastructure::mailer::{HttpMailer, LogMailer};
use retail_order_service::{build_server, create_pool, run_migrations, AppState};

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{context}: {e}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let pool = create_pool(&config.database_url, config.db_pool_size)
        .map_err(|e| startup_error("Failed to create database connection pool", e))?;
    run_migrations(&pool).map_err(|e| startup_error("Failed to run database migrations", e))?;

    let mailer: Arc<dyn Mailer> = match &config.mail_api_url {
        Some(url) => {
            log::info!("Sending notification mails through {}", url);
            Arc::new(
                HttpMailer::new(url.clone(), config.mail_api_key.clone(), config.mail_from.clone())
                    .map_err(|e| startup_error("Failed to build mail client", e))?,
            )
        }
        None => {
            log::warn!("MAIL_API_URL is not set; notification mails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let jwt = JwtSettings::new(
        &config.jwt_secret,
        config.jwt_issuer.as_deref(),
        config.jwt_audience.as_deref(),
    );

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(AppState::new(pool, mailer), jwt, &config.host, config.port)?.await
}
