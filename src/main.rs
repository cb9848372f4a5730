use invitebot::telegram::{BotApi, TelegramApi};
use invitebot::{AppState, Config, Dispatcher};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configurazione: valori numerici invalidi fermano l'avvio
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    config.print_info();

    // Pool di connessioni verso il database locale
    let pool = SqlitePoolOptions::new()
        .connect(&config.database_url)
        .await?;

    // Identità del bot, serve per i deep link
    let api = Arc::new(TelegramApi::new(&config.bot_token));
    let me = api.get_me().await?;
    info!(bot = %me.full_name(), "authenticated with the platform");

    let state = Arc::new(AppState::new(pool, api, me, &config));

    // Idempotente, sicuro ad ogni avvio
    state.invites.init_schema().await?;

    Dispatcher::new(state).run().await;
    Ok(())
}
