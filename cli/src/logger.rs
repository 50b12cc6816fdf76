use crate::config::LoggingConfig;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::fs::OpenOptions;

/// Level from config, raised by each `-v` on the command line.
pub fn level_filter(configured: &str, verbose: u8) -> LevelFilter {
    let base = match configured.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    };
    match verbose {
        0 => base,
        1 => base.max(LevelFilter::Debug),
        _ => LevelFilter::Trace,
    }
}

/// Logs go to stderr so stdout stays valid JSON, and additionally to the
/// configured file when it can be opened.
pub fn setup_logger(config: &LoggingConfig, verbose: u8) -> Result<(), log::SetLoggerError> {
    let level = level_filter(config.level(), verbose);

    let colors = ColoredLevelConfig::new()
        .trace(Color::BrightBlack)
        .debug(Color::BrightBlue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(path) = config.file() {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => dispatch = dispatch.chain(file),
            Err(e) => eprintln!("Warning: failed to open log file '{path}': {e}"),
        }
    }

    dispatch.apply()?;
    log::debug!("Logger initialized with level {level}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_the_configured_level() {
        assert_eq!(level_filter("warn", 0), LevelFilter::Warn);
        assert_eq!(level_filter("warn", 1), LevelFilter::Debug);
        assert_eq!(level_filter("trace", 1), LevelFilter::Trace);
        assert_eq!(level_filter("info", 2), LevelFilter::Trace);
    }

    #[test]
    fn unknown_level_is_info() {
        assert_eq!(level_filter("chatty", 0), LevelFilter::Info);
        assert_eq!(level_filter("ERROR", 0), LevelFilter::Error);
    }
}
