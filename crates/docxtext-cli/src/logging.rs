use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a full `tracing` filter directive.
pub const LOG_ENV: &str = "DOCXTEXT_LOG";

/// Logging levels accepted by `--logging_level` and the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
    #[value(name = "CRITICAL")]
    Critical,
}

impl LogLevel {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_str(name, true).ok()
    }

    /// `tracing` has no level above error, so CRITICAL maps to it.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

/// Pick the filter: CLI flag > `DOCXTEXT_LOG` > config file > WARNING.
pub fn resolve_filter(flag: Option<LogLevel>, config_level: Option<&str>) -> EnvFilter {
    if let Some(level) = flag {
        return EnvFilter::new(level.directive());
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = config_level
            .and_then(LogLevel::from_name)
            .unwrap_or(LogLevel::Warning);
        EnvFilter::new(level.directive())
    })
}

/// Install the global subscriber. Logs go to stderr; stdout carries records.
pub fn init(filter: EnvFilter, ansi: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(LogLevel::from_name("WARNING"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_name("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_name("verbose"), None);
    }

    #[test]
    fn critical_maps_to_error() {
        assert_eq!(LogLevel::Critical.directive(), "error");
        assert_eq!(LogLevel::Warning.directive(), "warn");
    }

    #[test]
    fn flag_wins_over_config() {
        let filter = resolve_filter(Some(LogLevel::Debug), Some("ERROR"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
