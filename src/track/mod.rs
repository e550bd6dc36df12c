#[cfg(test)]
mod track_test;

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::constraints::MediaTrackConstraints;
use crate::driver::{Driver, Reader, State};
use crate::error::{Error, Result};
use crate::prop::Media;
use crate::utilities::math_rand_alpha;
use crate::Sample;

const TRACK_ID_LEN: usize = 16;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

const TRACK_KIND_VIDEO_STR: &str = "video";
const TRACK_KIND_AUDIO_STR: &str = "audio";

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TrackKind::Video => write!(f, "{TRACK_KIND_VIDEO_STR}"),
            TrackKind::Audio => write!(f, "{TRACK_KIND_AUDIO_STR}"),
        }
    }
}

/// TrackState mirrors `MediaStreamTrack.readyState`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// Track is a capture handle bound to one driver running at one selected
/// configuration.
pub trait Track: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;
    fn kind(&self) -> TrackKind;

    /// label is the label of the driver backing this track.
    fn label(&self) -> &str;

    fn ready_state(&self) -> TrackState;

    /// settings returns the configuration the driver was started with.
    fn settings(&self) -> Media;

    fn constraints(&self) -> MediaTrackConstraints;

    /// read returns the next raw sample from the driver.
    fn read(&self) -> Result<Sample>;

    /// stop releases the driver. Calling it more than once has no effect.
    fn stop(&self);
}

/// LocalTrack is a track backed by a locally registered driver.
pub struct LocalTrack {
    id: String,
    kind: TrackKind,
    driver: Arc<Driver>,
    constraints: MediaTrackConstraints,
    reader: Mutex<Option<Box<dyn Reader>>>,
}

impl fmt::Debug for LocalTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("driver", &self.driver)
            .field("ready_state", &self.ready_state())
            .finish()
    }
}

impl LocalTrack {
    /// new_video starts `driver` recording video at the selected
    /// configuration in `constraints`.
    pub fn new_video(driver: Arc<Driver>, constraints: MediaTrackConstraints) -> Result<Self> {
        Self::new(TrackKind::Video, driver, constraints)
    }

    /// new_audio starts `driver` recording audio at the selected
    /// configuration in `constraints`.
    pub fn new_audio(driver: Arc<Driver>, constraints: MediaTrackConstraints) -> Result<Self> {
        Self::new(TrackKind::Audio, driver, constraints)
    }

    fn new(
        kind: TrackKind,
        driver: Arc<Driver>,
        constraints: MediaTrackConstraints,
    ) -> Result<Self> {
        let selected = constraints.selected_media.clone().unwrap_or_default();

        let opened_here = driver.status() == State::Closed;
        if opened_here {
            driver.open()?;
        }

        let reader = match kind {
            TrackKind::Video => driver.video_record(&selected),
            TrackKind::Audio => driver.audio_record(&selected),
        };

        let reader = match reader {
            Ok(reader) => reader,
            Err(err) => {
                // Leave the driver the way we found it.
                if opened_here {
                    if let Err(close_err) = driver.close() {
                        warn!("failed to close driver {}: {}", driver.id(), close_err);
                    }
                }
                return Err(err);
            }
        };

        let track = LocalTrack {
            id: math_rand_alpha(TRACK_ID_LEN),
            kind,
            driver,
            constraints,
            reader: Mutex::new(Some(reader)),
        };
        debug!(
            "started {} track {} on driver {}",
            track.kind,
            track.id,
            track.driver.id()
        );

        Ok(track)
    }

    pub fn driver(&self) -> &Arc<Driver> {
        &self.driver
    }
}

impl Track for LocalTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn label(&self) -> &str {
        &self.driver.info().label
    }

    fn ready_state(&self) -> TrackState {
        if self.reader.lock().is_some() {
            TrackState::Live
        } else {
            TrackState::Ended
        }
    }

    fn settings(&self) -> Media {
        self.constraints.selected_media.clone().unwrap_or_default()
    }

    fn constraints(&self) -> MediaTrackConstraints {
        self.constraints.clone()
    }

    fn read(&self) -> Result<Sample> {
        match self.reader.lock().as_mut() {
            Some(reader) => reader.read(),
            None => Err(Error::ErrTrackStopped),
        }
    }

    fn stop(&self) {
        let mut reader = match self.reader.lock().take() {
            Some(reader) => reader,
            None => return,
        };

        if let Err(err) = reader.close() {
            warn!("failed to close reader of track {}: {}", self.id, err);
        }
        if let Err(err) = self.driver.close() {
            warn!(
                "failed to close driver {} of track {}: {}",
                self.driver.id(),
                self.id,
                err
            );
        }
        debug!("stopped {} track {}", self.kind, self.id);
    }
}
