//! Verse catalog and translation bridges.
//!
//! Verse text and translations come from host-side services (a bundled
//! dataset, a REST backend, a remote Quran API). The core only needs two
//! narrow capabilities: fetch the ordered verses of a surah range, and look
//! up a translation for a single verse. Both are implemented by the host.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single numbered verse (ayah) of a surah, the atomic unit of playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    /// Surah (chapter) number, 1-based.
    pub surah_id: u32,
    /// Verse number within the surah, 1-based and unique within the surah.
    pub number: u32,
    /// Arabic text.
    pub text: String,
    /// Translation text held locally; may be empty.
    pub translation: String,
}

impl Verse {
    pub fn new(
        surah_id: u32,
        number: u32,
        text: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            surah_id,
            number,
            text: text.into(),
            translation: translation.into(),
        }
    }
}

/// Source of verse sequences.
#[async_trait]
pub trait VerseCatalog: Send + Sync {
    /// Ordered verses of `surah_id` from `start` to `end` inclusive.
    ///
    /// Implementations clamp the range to the verses the surah actually has
    /// and fail with [`BridgeError::NotFound`](crate::BridgeError::NotFound)
    /// for an unknown surah.
    async fn verses(&self, surah_id: u32, start: u32, end: u32) -> Result<Vec<Verse>>;
}

/// Remote translation lookup used for best-effort enrichment.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translation text for a single verse.
    async fn translation(&self, surah_id: u32, verse_number: u32) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_serializes_camel_case() {
        let verse = Verse::new(1, 2, "الحمد لله", "All praise is for Allah");
        let json = serde_json::to_value(&verse).unwrap();
        assert_eq!(json["surahId"], 1);
        assert_eq!(json["number"], 2);
        assert_eq!(json["translation"], "All praise is for Allah");
    }
}
