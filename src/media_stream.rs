//! MediaStream: an ordered collection of capture tracks.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::track::{Track, TrackKind};
use crate::utilities::math_rand_alpha;

const STREAM_ID_LEN: usize = 16;

/// MediaStream is an ordered set of tracks with unique ids.
///
/// ## Specifications
///
/// * [MDN]
/// * [W3C]
///
/// [MDN]: https://developer.mozilla.org/en-US/docs/Web/API/MediaStream
/// [W3C]: https://w3c.github.io/mediacapture-main/#mediastream
#[derive(Debug)]
pub struct MediaStream {
    id: String,
    tracks: Vec<Arc<dyn Track>>,
}

impl MediaStream {
    /// new builds a stream out of `tracks`, keeping their order. It fails if
    /// two tracks share an id.
    pub fn new(tracks: Vec<Arc<dyn Track>>) -> Result<Self> {
        let mut stream = MediaStream {
            id: math_rand_alpha(STREAM_ID_LEN),
            tracks: Vec::with_capacity(tracks.len()),
        };
        for track in tracks {
            stream.add_track(track)?;
        }
        Ok(stream)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get_tracks(&self) -> &[Arc<dyn Track>] {
        &self.tracks
    }

    pub fn get_video_tracks(&self) -> Vec<Arc<dyn Track>> {
        self.tracks_of(TrackKind::Video)
    }

    pub fn get_audio_tracks(&self) -> Vec<Arc<dyn Track>> {
        self.tracks_of(TrackKind::Audio)
    }

    pub fn get_track_by_id(&self, id: &str) -> Option<Arc<dyn Track>> {
        self.tracks.iter().find(|t| t.id() == id).cloned()
    }

    fn tracks_of(&self, kind: TrackKind) -> Vec<Arc<dyn Track>> {
        self.tracks
            .iter()
            .filter(|t| t.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn add_track(&mut self, track: Arc<dyn Track>) -> Result<()> {
        if self.tracks.iter().any(|t| t.id() == track.id()) {
            return Err(Error::ErrDuplicateTrack(track.id().to_owned()));
        }
        self.tracks.push(track);
        Ok(())
    }

    /// remove_track takes the track out of the stream without stopping it.
    pub fn remove_track(&mut self, id: &str) -> Option<Arc<dyn Track>> {
        let index = self.tracks.iter().position(|t| t.id() == id)?;
        Some(self.tracks.remove(index))
    }

    /// stop stops every track in the stream.
    pub fn stop(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constraints::MediaTrackConstraints;
    use crate::prop::Media;
    use crate::track::TrackState;
    use crate::Sample;

    #[derive(Debug)]
    struct FakeTrack {
        id: &'static str,
        kind: TrackKind,
        stopped: parking_lot::Mutex<bool>,
    }

    impl FakeTrack {
        fn new(id: &'static str, kind: TrackKind) -> Arc<dyn Track> {
            Arc::new(FakeTrack {
                id,
                kind,
                stopped: parking_lot::Mutex::new(false),
            })
        }
    }

    impl Track for FakeTrack {
        fn id(&self) -> &str {
            self.id
        }
        fn kind(&self) -> TrackKind {
            self.kind
        }
        fn label(&self) -> &str {
            "fake"
        }
        fn ready_state(&self) -> TrackState {
            if *self.stopped.lock() {
                TrackState::Ended
            } else {
                TrackState::Live
            }
        }
        fn settings(&self) -> Media {
            Media::default()
        }
        fn constraints(&self) -> MediaTrackConstraints {
            MediaTrackConstraints::default()
        }
        fn read(&self) -> Result<Sample> {
            Err(Error::ErrTrackStopped)
        }
        fn stop(&self) {
            *self.stopped.lock() = true;
        }
    }

    #[test]
    fn test_media_stream_tracks() -> Result<()> {
        let stream = MediaStream::new(vec![
            FakeTrack::new("v1", TrackKind::Video),
            FakeTrack::new("a1", TrackKind::Audio),
            FakeTrack::new("v2", TrackKind::Video),
        ])?;

        let ids: Vec<&str> = stream.get_tracks().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["v1", "a1", "v2"]);
        assert_eq!(stream.get_video_tracks().len(), 2);
        assert_eq!(stream.get_audio_tracks().len(), 1);
        assert!(stream.get_track_by_id("a1").is_some());
        assert!(stream.get_track_by_id("missing").is_none());

        Ok(())
    }

    #[test]
    fn test_media_stream_duplicate_track() {
        let track = FakeTrack::new("v1", TrackKind::Video);
        let result = MediaStream::new(vec![Arc::clone(&track), track]);
        assert!(matches!(result, Err(Error::ErrDuplicateTrack(id)) if id == "v1"));
    }

    #[test]
    fn test_media_stream_remove_and_stop() -> Result<()> {
        let mut stream = MediaStream::new(vec![
            FakeTrack::new("v1", TrackKind::Video),
            FakeTrack::new("a1", TrackKind::Audio),
        ])?;

        let removed = stream.remove_track("v1").expect("v1 should be present");
        assert_eq!(stream.get_tracks().len(), 1);
        assert!(stream.remove_track("v1").is_none());

        stream.stop();
        assert_eq!(removed.ready_state(), TrackState::Live);
        assert_eq!(
            stream.get_tracks()[0].ready_state(),
            TrackState::Ended
        );

        Ok(())
    }
}
