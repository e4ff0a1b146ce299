use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;

pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub password_min_length: usize,
    pub password_require_lowercase: bool,
    pub password_require_uppercase: bool,
    pub password_require_number: bool,
    pub password_require_symbol: bool,
}

impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("jwt_secret", &"<redacted>")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"<redacted>")
            .field("password_min_length", &self.password_min_length)
            .field("password_require_lowercase", &self.password_require_lowercase)
            .field("password_require_uppercase", &self.password_require_uppercase)
            .field("password_require_number", &self.password_require_number)
            .field("password_require_symbol", &self.password_require_symbol)
            .finish()
    }
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()), // Use a secure secret in production
            supabase_url: env_first(&["SUPABASE_URL", "SUPABASE__URL"]),
            supabase_anon_key: env_first(&["SUPABASE_ANON_KEY", "SUPABASE_ANONKEY", "SUPABASE__ANONKEY"]),
            password_min_length: env::var("PASSWORD_MIN_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8),
            password_require_lowercase: env_flag("PASSWORD_REQUIRE_LOWERCASE", true),
            password_require_uppercase: env_flag("PASSWORD_REQUIRE_UPPERCASE", true),
            password_require_number: env_flag("PASSWORD_REQUIRE_NUMBER", true),
            password_require_symbol: env_flag("PASSWORD_REQUIRE_SYMBOL", true),
        }
    }
}

// Deployments name the Supabase variables inconsistently; take the first match.
fn env_first(keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_default()
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// Global static accessible everywhere
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
