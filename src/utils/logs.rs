use std::str::FromStr;
use tracing::Level;
use crate::core::domain::Configuration;

pub fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::INFO)
}

// setup_tracing installs the process-wide subscriber; call once at startup.
pub fn setup_tracing(config: &Configuration) {
    let level = parse_level(config.log_level.as_str());
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        // module paths are noise outside debug builds of the service
        .with_target(level >= Level::DEBUG);
    if config.log_json {
        // ANSI codes would end up inside the JSON lines
        builder.with_ansi(false).json().init();
    } else {
        builder.init();
    }
}
