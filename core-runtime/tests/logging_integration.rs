//! Integration tests for the logging helpers

use bridge_traits::time::LogLevel;
use core_runtime::logging::{redact_if_sensitive, strip_url, LogFormat, LoggingConfig};

#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, LogLevel::Info);
    assert!(config.redact_pii);
    assert!(config.enable_spans);
    assert!(config.filter.is_none());
    assert!(config.logger_sink.is_none());

    #[cfg(debug_assertions)]
    assert_eq!(config.format, LogFormat::Pretty);
    #[cfg(not(debug_assertions))]
    assert_eq!(config.format, LogFormat::Json);
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_pii_redaction(false)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.redact_pii);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}

#[test]
fn test_credentials_are_redacted() {
    assert_eq!(redact_if_sensitive("access_token", "abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("Authorization", "Bearer x"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("api_key", "k"), "[REDACTED]");
}

#[test]
fn test_emails_are_partially_redacted() {
    let redacted = redact_if_sensitive("contact", "reader@example.com");
    assert!(redacted.starts_with('r'));
    assert!(!redacted.contains("example.com"));
}

#[test]
fn test_playback_fields_pass_through() {
    assert_eq!(redact_if_sensitive("verse", "36:1"), "36:1");
    assert_eq!(redact_if_sensitive("reciter", "Alafasy_128kbps"), "Alafasy_128kbps");
    assert_eq!(redact_if_sensitive("index", "0"), "0");
}

#[test]
fn test_audio_urls_lose_query_strings() {
    assert_eq!(
        strip_url("https://everyayah.com/data/Alafasy_128kbps/036001.mp3?expires=1&sig=abc"),
        "https://everyayah.com/data/Alafasy_128kbps/036001.mp3"
    );
    assert_eq!(strip_url("036001.mp3"), "036001.mp3");
}
