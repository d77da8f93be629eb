//! Logging and event bus walkthrough for a short recitation session.
//!
//! Run with:
//! ```bash
//! cargo run -p core-runtime --example logging_demo
//! cargo run -p core-runtime --example logging_demo -- json
//! cargo run -p core-runtime --example logging_demo -- compact "core_runtime=trace"
//! ```

use bridge_traits::time::LogLevel;
use core_runtime::events::{CoreEvent, EventBus, EventStream, RecitationEvent};
use core_runtime::logging::{init_logging, strip_url, LogFormat, LoggingConfig};
use core_async::time::{sleep, Duration};
use std::env;
use tracing::{debug, info, instrument, warn};

#[core_async::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Trace);
    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }

    if let Err(err) = init_logging(config) {
        eprintln!("{err}");
        return;
    }

    let bus = EventBus::default();
    let mut stream = EventStream::new(bus.subscribe());

    simulate_session(&bus, 36, 3).await;

    while let Some(Ok(event)) = stream.try_recv() {
        info!(severity = ?event.severity(), "{}", event.description());
    }
}

#[instrument(skip(bus))]
async fn simulate_session(bus: &EventBus, surah_id: u32, verse_count: u32) {
    bus.emit(CoreEvent::Recitation(RecitationEvent::SessionStarted {
        surah_id,
        verse_count: verse_count as usize,
    }))
    .ok();

    for number in 1..=verse_count {
        let url = format!(
            "https://everyayah.com/data/Alafasy_128kbps/{:03}{:03}.mp3?cache=1",
            surah_id, number
        );
        debug!(url = %strip_url(&url), attempt = 1, "Loading verse audio");

        if number == 2 {
            warn!(
                verse = %format!("{surah_id}:{number}"),
                "Primary source failed, trying alternative"
            );
        }

        bus.emit(CoreEvent::Recitation(RecitationEvent::VerseChanged {
            index: (number - 1) as usize,
            surah_id,
            verse_number: number,
        }))
        .ok();

        sleep(Duration::from_millis(10)).await;
    }

    info!("Session finished");
}
