use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};

/// Logs to stdout, filtered by `RUST_LOG` or else `default_spec`
/// (e.g. `"debug"`, `"rss_channel=debug"`). Keep the handle alive.
pub fn init_log(default_spec: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(default_spec)?
        .log_to_stdout()
        .start()
}

#[cfg(test)]
pub(crate) fn init_test_log() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = init_log("debug");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_logger_is_rejected() {
        init_test_log();
        assert!(init_log("info").is_err());
    }
}
