use super::{Extractor, ExtractorKey};
use crate::config::Settings;
use std::sync::{Arc, PoisonError, RwLock};

/// Holds the most recently compiled extractor
///
/// Readers share the compiled extractor through an `Arc`. When the settings
/// that shape extraction change, the next caller recompiles and swaps it in;
/// invocations already holding the old `Arc` finish with it.
#[derive(Debug, Default)]
pub struct ExtractorSlot {
    current: RwLock<Option<(ExtractorKey, Arc<Extractor>)>>,
}

impl ExtractorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor for `settings`, compiling only when they changed
    pub fn get(&self, settings: &Settings) -> Arc<Extractor> {
        let key = ExtractorKey::from(settings);

        {
            let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
            if let Some((cached_key, extractor)) = guard.as_ref() {
                if *cached_key == key {
                    return Arc::clone(extractor);
                }
            }
        }

        self.reconfigure(settings)
    }

    /// Recompile for `settings` and make it current
    pub fn reconfigure(&self, settings: &Settings) -> Arc<Extractor> {
        let compiled = Arc::new(Extractor::compile(settings));
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some((ExtractorKey::from(settings), Arc::clone(&compiled)));
        tracing::debug!("extractor recompiled for {:?} mode", settings.mode);
        compiled
    }
}
