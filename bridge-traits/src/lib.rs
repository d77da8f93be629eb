//! # Host Bridge Traits
//!
//! Capabilities the recitation core needs but cannot provide itself.
//!
//! ## Overview
//!
//! Each trait is a contract between the platform-independent core and a host
//! shell (browser, desktop, mobile). The host implements them; the core only
//! ever talks to the platform through them.
//!
//! ## Traits
//!
//! ### Media
//! - [`MediaElement`](media::MediaElement) - The single playable audio handle
//!
//! ### Content
//! - [`VerseCatalog`](catalog::VerseCatalog) - Ordered verses of a surah range
//! - [`TranslationProvider`](catalog::TranslationProvider) - Best-effort translation lookup
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Wall-clock source for session timing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should map platform failures onto the closest variant:
//!
//! - fetch/decode failures while loading media → `Decode`
//! - autoplay or device refusals when starting playback → `Rejected`
//! - unknown surah or verse → `NotFound`
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single implementation can be
//! shared between the playback controller task and the helper tasks it spawns.
//!
//! ## Examples
//!
//! ### Implementing TranslationProvider
//!
//! ```ignore
//! use bridge_traits::catalog::TranslationProvider;
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct BundledTranslations;
//!
//! #[async_trait]
//! impl TranslationProvider for BundledTranslations {
//!     async fn translation(&self, surah_id: u32, verse_number: u32) -> Result<String> {
//!         todo!()
//!     }
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod media;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use catalog::{TranslationProvider, Verse, VerseCatalog};
pub use media::{MediaElement, MediaEvent, MediaReady};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
