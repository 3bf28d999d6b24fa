use timekeep_events::bus::DEFAULT_CAPACITY;

/// Minimum password length when `PASSWORD_MIN_LENGTH` is not set.
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

/// Raised when an environment variable holds an unparseable value.
#[derive(Debug, thiserror::Error)]
#[error("{name} must be a valid {expected}, got '{value}'")]
pub struct ConfigError {
    pub name: &'static str,
    pub expected: &'static str,
    pub value: String,
}

/// Service configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Minimum accepted password length in characters (default: `8`).
    pub password_min_length: usize,
    /// Buffer size of the domain event channel (default: `1024`).
    pub event_bus_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
            event_bus_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables with defaults, reading
    /// `.env` first if present.
    ///
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `PASSWORD_MIN_LENGTH` | `8`     |
    /// | `EVENT_BUS_CAPACITY`  | `1024`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            password_min_length: parse_usize(
                &lookup,
                "PASSWORD_MIN_LENGTH",
                defaults.password_min_length,
            )?,
            event_bus_capacity: parse_usize(
                &lookup,
                "EVENT_BUS_CAPACITY",
                defaults.event_bus_capacity,
            )?,
        })
    }
}

/// Read `.env` into the process environment if the file exists.
pub fn load_env() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }
}

fn parse_usize<F>(lookup: &F, name: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => match value.trim().parse::<usize>() {
            // Zero would make the broadcast channel panic and disable the
            // password check.
            Ok(0) | Err(_) => Err(ConfigError {
                name,
                expected: "positive integer",
                value,
            }),
            Ok(n) => Ok(n),
        },
    }
}
