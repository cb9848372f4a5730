//! Configuration - Configurazione da variabili d'ambiente

use dotenv::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    /// User id exempt from quota enforcement.
    pub owner_id: i64,
    pub max_invites_per_user: i64,
    pub expiry_hours: i64,
    pub database_url: String,
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente.
    /// Chiama dotenv() automaticamente.
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let bot_token =
            env::var("BOT_TOKEN").map_err(|_| "BOT_TOKEN must be set in .env file".to_string())?;

        let owner_id = env::var("OWNER_ID")
            .map_err(|_| "OWNER_ID must be set in .env file".to_string())?
            .parse::<i64>()
            .map_err(|_| "Invalid OWNER_ID: must be a valid integer".to_string())?;

        let max_invites_per_user = env::var("MAX_INVITES_PER_USER")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<i64>()
            .map_err(|_| "Invalid MAX_INVITES_PER_USER: must be a positive number".to_string())?;

        let expiry_hours = env::var("EXPIRY_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()
            .map_err(|_| "Invalid EXPIRY_HOURS: must be a positive number".to_string())?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://invitebot.sqlite3?mode=rwc".to_string());

        Ok(Config {
            bot_token,
            owner_id,
            max_invites_per_user,
            expiry_hours,
            database_url,
        })
    }

    /// Stampa la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        println!("   Bot Configuration:");
        println!("   Bot Token: {}", Self::mask_token(&self.bot_token));
        println!("   Owner ID: {}", self.owner_id);
        println!("   Max Invites Per User: {}", self.max_invites_per_user);
        println!("   Invite Expiry: {}h", self.expiry_hours);
        println!("   Database: {}", self.database_url);
    }

    /// Maschera il token del bot per il logging
    fn mask_token(token: &str) -> String {
        match token.split_once(':') {
            Some((bot_id, _)) => format!("{bot_id}:***"),
            None => "***".to_string(),
        }
    }
}
