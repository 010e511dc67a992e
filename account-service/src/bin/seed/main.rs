use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::user::models::CreateUserCommand;
use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::Password;
use account_service::domain::user::ports::UserServicePort;
use account_service::domain::user::service::UserService;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::Authenticator;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Development accounts, all sharing the password below.
const SEED_EMAILS: [&str; 3] = ["alice@example.com", "bob@example.com", "charlie@example.com"];
const SEED_PASSWORD: &str = "password";

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=info,seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pg_pool).await?;

    let authenticator = Arc::new(Authenticator::new(
        config.jwt.secret.as_bytes(),
        config.jwt.token_ttl(),
    ));
    let user_service = UserService::new(
        Arc::new(PostgresUserRepository::new(pg_pool)),
        authenticator,
    );

    for email in SEED_EMAILS {
        let command = CreateUserCommand::new(
            EmailAddress::new(email.to_string())?,
            None,
            Password::new(SEED_PASSWORD.to_string())?,
        );
        let user = user_service.upsert_user(command).await?;
        tracing::info!(user_id = %user.id, email = %user.email, "Seeded user");
    }

    tracing::info!(count = SEED_EMAILS.len(), "Seeding completed");
    Ok(())
}
