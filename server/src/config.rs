use std::path::PathBuf;

/// Which identity strategy the server runs with.
///
/// Both modes serve the same routes; only the way a caller proves who it
/// is differs. Sessions keep identity server-side, tokens carry it in a
/// signed claim set.
#[derive(Debug, Clone)]
pub enum AuthMode {
    Session,
    Token {
        private_key_pem: Vec<u8>,
        public_key_pem: Vec<u8>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CORBEL_PORT is not a valid port: {0}")]
    InvalidPort(String),
    #[error("unknown CORBEL_AUTH_MODE: {0} (expected \"session\" or \"token\")")]
    UnknownAuthMode(String),
    #[error("{0} must be set when CORBEL_AUTH_MODE=token")]
    MissingVar(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_path: PathBuf,
    pub port: u16,
    pub auth_mode: AuthMode,
}

impl ServerConfig {
    /// Load the configuration from the environment
    ///
    /// A `.env` file in the working directory is read first if present.
    /// Everything has a default except the key material, which token mode
    /// refuses to start without.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let data_path = std::env::var("CORBEL_DATA_PATH").unwrap_or_else(|_| "./data".to_string());

        let port = match std::env::var("CORBEL_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => 3030,
        };

        let auth_mode = match std::env::var("CORBEL_AUTH_MODE").as_deref() {
            Err(_) | Ok("session") => AuthMode::Session,
            Ok("token") => {
                let private_key_path = std::env::var("CORBEL_JWT_PRIVATE_KEY")
                    .map_err(|_| ConfigError::MissingVar("CORBEL_JWT_PRIVATE_KEY"))?;
                let public_key_path = std::env::var("CORBEL_JWT_PUBLIC_KEY")
                    .map_err(|_| ConfigError::MissingVar("CORBEL_JWT_PUBLIC_KEY"))?;

                AuthMode::Token {
                    private_key_pem: std::fs::read(private_key_path)?,
                    public_key_pem: std::fs::read(public_key_path)?,
                }
            }
            Ok(other) => return Err(ConfigError::UnknownAuthMode(other.to_string())),
        };

        Ok(Self {
            data_path: PathBuf::from(data_path),
            port,
            auth_mode,
        })
    }
}
