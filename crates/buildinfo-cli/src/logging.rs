//! Log output on stderr
//!
//! Stdout carries the report, so every log line goes to stderr.

use tracing::level_filters::LevelFilter;

/// Pick the log level: `-v` and `-q` win over the configured level
pub fn level_for(verbose: bool, quiet: bool, configured: &str) -> LevelFilter {
    if verbose {
        return LevelFilter::DEBUG;
    }
    if quiet {
        return LevelFilter::ERROR;
    }
    parse_level(configured)
}

/// Parse a level name, falling back to `warn` for unknown names
pub fn parse_level(name: &str) -> LevelFilter {
    match name.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => LevelFilter::WARN,
    }
}

/// Install the global subscriber
pub fn init(level: LevelFilter) {
    let detailed = level >= LevelFilter::DEBUG;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(detailed)
        .with_thread_ids(detailed)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_configured_level() {
        assert_eq!(level_for(true, false, "error"), LevelFilter::DEBUG);
        assert_eq!(level_for(false, true, "trace"), LevelFilter::ERROR);
        assert_eq!(level_for(false, false, "info"), LevelFilter::INFO);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("TRACE"), LevelFilter::TRACE);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("chatty"), LevelFilter::WARN);
    }
}
