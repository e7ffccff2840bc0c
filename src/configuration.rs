use crate::error::ConfigError;

const MIN_SECRET_LENGTH: usize = 32;
/// One year; also keeps `access_token_ttl` inside chrono's range
const MAX_ACCESS_TOKEN_EXPIRY: i64 = 60 * 60 * 24 * 365;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub password: PasswordSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// JWT signing settings
#[derive(serde::Deserialize, Clone, Debug)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub access_token_expiry: i64, // seconds (691200 = 8 days)
}

impl JwtSettings {
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_expiry)
    }
}

/// Password hashing settings
#[derive(serde::Deserialize, Clone, Copy, Debug)]
pub struct PasswordSettings {
    pub bcrypt_cost: u32,
}

impl Settings {
    /// Reject settings the auth core cannot run with
    ///
    /// # Errors
    /// - Secret shorter than 32 bytes
    /// - Access token expiry outside 1 second..=1 year
    /// - Bcrypt cost outside 4..=31
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }

        if !(1..=MAX_ACCESS_TOKEN_EXPIRY).contains(&self.jwt.access_token_expiry) {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.access_token_expiry must be between 1 and {} seconds",
                MAX_ACCESS_TOKEN_EXPIRY
            )));
        }

        if !(4..=31).contains(&self.password.bcrypt_cost) {
            return Err(ConfigError::InvalidValue(
                "password.bcrypt_cost must be between 4 and 31".to_string(),
            ));
        }

        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000)?
        .set_default("database.max_connections", 5)?
        .set_default("jwt.issuer", "mindgarden")?
        .set_default("jwt.access_token_expiry", 60_i64 * 60 * 24 * 8)?
        .set_default("password.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
