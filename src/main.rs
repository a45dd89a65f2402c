use anyhow::Context;
use clap::{Parser, Subcommand};
use jwt_simple::prelude::HS256Key;
use tracing_subscriber::EnvFilter;

use storefront::config::Config;
use storefront::db::{self, AppState};
use storefront::handlers;
use storefront::models::CreateUser;

#[derive(Parser)]
#[command(name = "storefront", about = "E-commerce backend with a coupon engine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Insert demo products, roles, and coupons
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront=debug,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let state = build_state(&config).context("failed to initialize database")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, state).await,
        Command::Seed => seed(config, state),
    }
}

fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let pool = db::open_pool(&config.database_path)?;
    {
        let conn = pool.get()?;
        db::init_schema(&conn)?;
    }
    Ok(AppState {
        db: pool,
        jwt_key: HS256Key::from_bytes(config.jwt_secret.as_bytes()),
        token_ttl_hours: config.token_ttl_hours,
        dev_mode: config.dev_mode,
    })
}

/// Create the bootstrap admin user when configured and absent.
fn bootstrap_admin(config: &Config, state: &AppState) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (
        config.bootstrap_admin_email.as_ref(),
        config.bootstrap_admin_password.as_ref(),
    ) else {
        return Ok(());
    };

    let conn = state.db.get()?;
    if storefront::db::queries::get_user_by_email(&conn, email)?.is_some() {
        return Ok(());
    }

    let user = storefront::db::queries::create_user(
        &conn,
        &CreateUser {
            name: "Administrator".to_string(),
            email: email.clone(),
            password: password.clone(),
            roles: vec!["admin".to_string()],
        },
    )?;
    tracing::info!(email = %user.email, "bootstrapped admin user");
    Ok(())
}

async fn serve(config: Config, state: AppState) -> anyhow::Result<()> {
    bootstrap_admin(&config, &state)?;

    if config.dev_mode {
        tracing::warn!("running in dev mode; /dev endpoints are enabled");
    }

    let app = handlers::app(state);
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn seed(config: Config, state: AppState) -> anyhow::Result<()> {
    bootstrap_admin(&config, &state)?;

    let conn = state.db.get()?;
    let created = handlers::seed_demo_data(&conn)?;
    if created.is_empty() {
        println!("nothing to seed; demo data already present");
    } else {
        for item in &created {
            println!("created {}", item);
        }
    }
    Ok(())
}
