//! Best-effort translation enrichment.

use bridge_traits::{TranslationProvider, Verse};
use futures::future::join_all;
use tracing::debug;

/// Replace each verse's translation with the provider's, when it has one.
///
/// Lookups run concurrently. A failed lookup or an empty result keeps the
/// translation the verse already carries; this never fails and never
/// reorders or drops verses.
pub async fn enrich_translations(
    verses: Vec<Verse>,
    provider: &dyn TranslationProvider,
) -> Vec<Verse> {
    let lookups = verses
        .iter()
        .map(|verse| provider.translation(verse.surah_id, verse.number));
    let results = join_all(lookups).await;

    verses
        .into_iter()
        .zip(results)
        .map(|(mut verse, result)| {
            match result {
                Ok(text) if !text.trim().is_empty() => verse.translation = text,
                Ok(_) => {
                    debug!(
                        surah_id = verse.surah_id,
                        verse = verse.number,
                        "Empty remote translation, keeping local text"
                    );
                }
                Err(err) => {
                    debug!(
                        surah_id = verse.surah_id,
                        verse = verse.number,
                        error = %err,
                        "Translation lookup failed, keeping local text"
                    );
                }
            }
            verse
        })
        .collect()
}
