//! Verse audio URL resolution.
//!
//! Candidates are built deterministically from the verse identity; nothing
//! is verified over the network here. A broken URL is discovered by the load
//! attempt itself, which then falls through to the next candidate.

use crate::config::ResolverConfig;

/// One place a verse recitation can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCandidate {
    /// Reciter directory the URL points into.
    pub reciter: String,
    /// Fully qualified audio URL.
    pub url: String,
}

/// Maps a verse to its audio candidates, most preferred first.
pub trait AudioResolver: Send + Sync {
    /// Candidate sources for `verse_number` of `surah_id`.
    ///
    /// Implementations return at least two candidates.
    fn resolve(&self, surah_id: u32, verse_number: u32) -> Vec<AudioCandidate>;

    /// Identifier of the preferred reciter, reported in session summaries.
    fn preferred_reciter(&self) -> &str;
}

/// Resolver for hosts laid out as `{base}/{reciter}/{SSS}{VVV}.mp3`.
#[derive(Debug, Clone)]
pub struct AudioResourceResolver {
    config: ResolverConfig,
}

impl AudioResourceResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    fn candidate(&self, reciter: &str, surah_id: u32, verse_number: u32) -> AudioCandidate {
        AudioCandidate {
            reciter: reciter.to_string(),
            url: format!(
                "{}/{}/{}",
                self.config.base_url.trim_end_matches('/'),
                reciter,
                audio_file_name(surah_id, verse_number)
            ),
        }
    }
}

impl Default for AudioResourceResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl AudioResolver for AudioResourceResolver {
    fn resolve(&self, surah_id: u32, verse_number: u32) -> Vec<AudioCandidate> {
        vec![
            self.candidate(&self.config.primary_reciter, surah_id, verse_number),
            self.candidate(&self.config.alternative_reciter, surah_id, verse_number),
        ]
    }

    fn preferred_reciter(&self) -> &str {
        &self.config.primary_reciter
    }
}

/// `SSSVVV.mp3` with both identifiers zero-padded to three digits.
pub fn audio_file_name(surah_id: u32, verse_number: u32) -> String {
    format!("{:03}{:03}.mp3", surah_id, verse_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_verse_of_first_surah() {
        let resolver = AudioResourceResolver::default();
        let candidates = resolver.resolve(1, 1);

        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0].url,
            "https://everyayah.com/data/Alafasy_128kbps/001001.mp3"
        );
        assert_eq!(
            candidates[1].url,
            "https://everyayah.com/data/AbdurRahmaanAs-Sudais_128kbps/001001.mp3"
        );
        assert_eq!(candidates[0].reciter, "Alafasy_128kbps");
    }

    #[test]
    fn pads_and_keeps_wide_identifiers() {
        assert_eq!(audio_file_name(2, 255), "002255.mp3");
        assert_eq!(audio_file_name(114, 6), "114006.mp3");
        assert_eq!(audio_file_name(1, 1000), "0011000.mp3");
    }

    #[test]
    fn tolerates_trailing_slash_in_base_url() {
        let resolver = AudioResourceResolver::new(ResolverConfig {
            base_url: "https://cdn.example.org/audio/".to_string(),
            primary_reciter: "A".to_string(),
            alternative_reciter: "B".to_string(),
        });
        assert_eq!(
            resolver.resolve(36, 1)[0].url,
            "https://cdn.example.org/audio/A/036001.mp3"
        );
        assert_eq!(resolver.preferred_reciter(), "A");
    }
}
