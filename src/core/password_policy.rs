use crate::config::Config;

/// Password complexity rules. Each character-class requirement can be turned
/// off independently through configuration.
#[derive(Clone, Debug)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_number: bool,
    pub require_symbol: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        PasswordPolicy {
            min_length: 8,
            require_lowercase: true,
            require_uppercase: true,
            require_number: true,
            require_symbol: true,
        }
    }
}

impl PasswordPolicy {
    pub fn from_config(config: &Config) -> Self {
        PasswordPolicy {
            min_length: config.password_min_length,
            require_lowercase: config.password_require_lowercase,
            require_uppercase: config.password_require_uppercase,
            require_number: config.password_require_number,
            require_symbol: config.password_require_symbol,
        }
    }

    pub fn validate(&self, password: &str) -> Result<(), String> {
        if password.trim().is_empty() {
            return Err("Password is required.".to_string());
        }
        if password.chars().count() < self.min_length {
            return Err(format!("Password must be at least {} characters.", self.min_length));
        }
        if self.require_lowercase && !password.chars().any(|ch| ch.is_lowercase()) {
            return Err("Password must include a lowercase letter.".to_string());
        }
        if self.require_uppercase && !password.chars().any(|ch| ch.is_uppercase()) {
            return Err("Password must include an uppercase letter.".to_string());
        }
        if self.require_number && !password.chars().any(|ch| ch.is_ascii_digit()) {
            return Err("Password must include a number.".to_string());
        }
        if self.require_symbol && !password.chars().any(|ch| !ch.is_alphanumeric()) {
            return Err("Password must include a symbol.".to_string());
        }
        Ok(())
    }
}
