//! Registry of transient playback sources

use std::collections::HashMap;

use tracing::debug;

use crate::application::ports::{PlaybackSource, SourceId};
use crate::domain::recording::RecordedAudio;

/// Issues playback sources for recorded artifacts and tracks which are live.
///
/// Every source must be revoked once superseded; `live_count` never grows
/// past the number of sources still bound somewhere.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    next_id: u64,
    live: HashMap<SourceId, RecordedAudio>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new source referencing `audio`
    pub fn create(&mut self, audio: &RecordedAudio) -> PlaybackSource {
        self.next_id += 1;
        let id = SourceId::new(self.next_id);
        self.live.insert(id, audio.clone());
        debug!(source = %id, bytes = audio.size_bytes(), "Playback source created");
        PlaybackSource::new(id, audio.clone())
    }

    /// Revoke a source. Returns false if it was not live.
    pub fn revoke(&mut self, id: SourceId) -> bool {
        let revoked = self.live.remove(&id).is_some();
        if revoked {
            debug!(source = %id, "Playback source revoked");
        }
        revoked
    }

    pub fn is_live(&self, id: SourceId) -> bool {
        self.live.contains_key(&id)
    }

    /// Number of sources not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::AudioMimeType;

    #[test]
    fn ids_are_unique_and_increasing() {
        let audio = RecordedAudio::new(vec![1], AudioMimeType::Wav);
        let mut registry = SourceRegistry::new();

        let a = registry.create(&audio);
        let b = registry.create(&audio);
        assert!(a.id() < b.id());
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn revoke_only_once() {
        let audio = RecordedAudio::new(vec![1], AudioMimeType::Wav);
        let mut registry = SourceRegistry::new();
        let source = registry.create(&audio);

        assert!(registry.revoke(source.id()));
        assert!(!registry.revoke(source.id()));
        assert!(!registry.is_live(source.id()));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn sources_reference_the_same_artifact() {
        let audio = RecordedAudio::new(vec![9, 9], AudioMimeType::Wav);
        let mut registry = SourceRegistry::new();
        let source = registry.create(&audio);
        assert!(source.audio().same_artifact(&audio));
    }
}
