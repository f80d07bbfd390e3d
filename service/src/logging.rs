use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::ConfigBuilder;

/// Target prefixes of the HTTP stack behind every provider call. They log each
/// connection and TLS handshake, which buries the login steps below TRACE.
const HTTP_STACK_TARGETS: &[&str] = &["reqwest", "hyper", "h2", "rustls", "mio"];

pub struct Logger {}

impl Logger {
    /// Installs a terminal logger writing to stderr, so stdout only carries the
    /// authorize URL, tokens and profiles the CLI prints.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        simplelog::TermLogger::init(
            config.log_level_filter,
            Self::log_config(config.log_level_filter),
            simplelog::TerminalMode::Stderr,
            simplelog::ColorChoice::Auto,
        )
    }

    fn log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if level != LevelFilter::Trace {
            for target in HTTP_STACK_TARGETS {
                builder.add_filter_ignore_str(target);
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log, Record};
    use simplelog::WriteLogger;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    /// Emits one record per `(target, level)` through a logger built from
    /// `log_config(threshold)` and returns what reached the output.
    fn emit(threshold: LevelFilter, records: &[(&str, Level)]) -> String {
        let output = Captured::default();
        let logger = WriteLogger::new(threshold, Logger::log_config(threshold), output.clone());

        for (target, level) in records {
            logger.log(
                &Record::builder()
                    .target(target)
                    .level(*level)
                    .args(format_args!("record from {}", target))
                    .build(),
            );
        }
        logger.flush();

        output.text()
    }

    #[test]
    fn test_login_steps_are_logged_at_info() {
        let output = emit(
            LevelFilter::Info,
            &[
                ("oauth_connect::oauth::oauth1", Level::Info),
                ("past_connect", Level::Error),
            ],
        );

        assert!(output.contains("record from oauth_connect::oauth::oauth1"));
        assert!(output.contains("record from past_connect"));
    }

    #[test]
    fn test_http_stack_is_hidden_below_trace() {
        let output = emit(
            LevelFilter::Debug,
            &[
                ("reqwest::connect", Level::Debug),
                ("hyper_util::client::legacy::pool", Level::Debug),
                ("rustls::client::hs", Level::Debug),
                ("oauth_connect::oauth::oauth2", Level::Debug),
            ],
        );

        assert!(!output.contains("record from reqwest"));
        assert!(!output.contains("record from hyper_util"));
        assert!(!output.contains("record from rustls"));
        assert!(output.contains("record from oauth_connect::oauth::oauth2"));
    }

    #[test]
    fn test_trace_shows_http_stack() {
        let output = emit(LevelFilter::Trace, &[("reqwest::connect", Level::Trace)]);
        assert!(output.contains("record from reqwest::connect"));
    }

    #[test]
    fn test_threshold_drops_debug_at_info() {
        let output = emit(
            LevelFilter::Info,
            &[("oauth_connect::oauth::oauth2", Level::Debug)],
        );
        assert!(output.is_empty());
    }
}
