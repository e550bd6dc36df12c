
use std::fmt;
use std::sync::Arc;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::constraints::{MediaOption, MediaStreamConstraints, MediaTrackConstraints};
use crate::driver::{
    filter_all, filter_and, filter_audio_recorder, filter_device_type, filter_not,
    filter_video_recorder, DeviceType, Driver, Filter, Manager, State,
};
use crate::error::{NotFoundError, RejectedCandidate, Result};
use crate::media_stream::MediaStream;
use crate::prop::Media;
use crate::track::{LocalTrack, Track};

/// MediaDeviceKind is the kind of input a listed device provides.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaDeviceKind {
    #[serde(rename = "videoinput")]
    VideoInput,
    #[serde(rename = "audioinput")]
    AudioInput,
}

const MEDIA_DEVICE_KIND_VIDEO_INPUT_STR: &str = "videoinput";
const MEDIA_DEVICE_KIND_AUDIO_INPUT_STR: &str = "audioinput";

impl fmt::Display for MediaDeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MediaDeviceKind::VideoInput => write!(f, "{MEDIA_DEVICE_KIND_VIDEO_INPUT_STR}"),
            MediaDeviceKind::AudioInput => write!(f, "{MEDIA_DEVICE_KIND_AUDIO_INPUT_STR}"),
        }
    }
}

/// MediaDeviceInfo describes a single capture device.
///
/// ## Specifications
///
/// * [MDN]
/// * [W3C]
///
/// [MDN]: https://developer.mozilla.org/en-US/docs/Web/API/MediaDeviceInfo
/// [W3C]: https://w3c.github.io/mediacapture-main/#device-info
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub kind: MediaDeviceKind,
    pub label: String,
    pub device_type: DeviceType,
}

/// The source a single requested track is resolved against.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Source {
    Camera,
    Microphone,
    Screen,
}

impl Source {
    fn filter(self) -> Filter {
        match self {
            Source::Camera => filter_and(vec![
                filter_video_recorder(),
                filter_not(filter_device_type(DeviceType::Screen)),
            ]),
            Source::Microphone => filter_audio_recorder(),
            Source::Screen => filter_and(vec![
                filter_video_recorder(),
                filter_device_type(DeviceType::Screen),
            ]),
        }
    }
}

/// Closes, on drop, every driver pushed into it.
#[derive(Default)]
struct OpenedDrivers(Vec<Arc<Driver>>);

impl Drop for OpenedDrivers {
    fn drop(&mut self) {
        for d in self.0.drain(..) {
            if let Err(err) = d.close() {
                warn!("failed to close driver {} after reading properties: {}", d.id(), err);
            }
        }
    }
}

/// Stops, on drop, every track it holds unless it was committed.
#[derive(Default)]
struct PendingTracks {
    tracks: Vec<Arc<dyn Track>>,
    committed: bool,
}

impl PendingTracks {
    fn commit(mut self) -> Result<MediaStream> {
        let stream = MediaStream::new(self.tracks.clone())?;
        self.committed = true;
        Ok(stream)
    }
}

impl Drop for PendingTracks {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for track in &self.tracks {
            debug!("rolling back {} track {}", track.kind(), track.id());
            track.stop();
        }
    }
}

/// MediaDevicesBuilder configures a [`MediaDevices`].
#[derive(Default)]
pub struct MediaDevicesBuilder {
    manager: Option<Arc<Manager>>,
}

impl MediaDevicesBuilder {
    pub fn new() -> Self {
        MediaDevicesBuilder::default()
    }

    /// with_manager resolves requests against `manager` instead of the
    /// global one.
    pub fn with_manager(mut self, manager: Arc<Manager>) -> Self {
        self.manager = Some(manager);
        self
    }

    pub fn build(self) -> MediaDevices {
        MediaDevices {
            manager: self.manager.unwrap_or_else(Manager::global),
        }
    }
}

/// MediaDevices resolves capture requests against the drivers of a
/// [`Manager`].
///
/// ## Specifications
///
/// * [MDN]
/// * [W3C]
///
/// [MDN]: https://developer.mozilla.org/en-US/docs/Web/API/MediaDevices
/// [W3C]: https://w3c.github.io/mediacapture-main/#mediadevices
pub struct MediaDevices {
    manager: Arc<Manager>,
}

impl Default for MediaDevices {
    fn default() -> Self {
        MediaDevicesBuilder::new().build()
    }
}

impl MediaDevices {
    pub fn manager(&self) -> &Arc<Manager> {
        &self.manager
    }

    /// get_user_media builds a stream with one track per requested kind,
    /// using cameras for video and microphones for audio. Video is resolved
    /// first. If any track cannot be built, every track already built is
    /// stopped and the error is returned.
    ///
    /// Reference: <https://developer.mozilla.org/en-US/docs/Web/API/MediaDevices/getUserMedia>
    pub fn get_user_media(&self, constraints: MediaStreamConstraints) -> Result<MediaStream> {
        let mut pending = PendingTracks::default();

        if let Some(video) = &constraints.video {
            pending.tracks.push(self.select_track(Source::Camera, video)?);
        }
        if let Some(audio) = &constraints.audio {
            pending
                .tracks
                .push(self.select_track(Source::Microphone, audio)?);
        }

        pending.commit()
    }

    /// get_display_media builds a stream holding one screen capture track.
    /// Screen audio is not supported, so an audio request is ignored.
    ///
    /// Reference: <https://developer.mozilla.org/en-US/docs/Web/API/MediaDevices/getDisplayMedia>
    pub fn get_display_media(&self, constraints: MediaStreamConstraints) -> Result<MediaStream> {
        let mut pending = PendingTracks::default();

        if let Some(video) = &constraints.video {
            pending.tracks.push(self.select_track(Source::Screen, video)?);
        }
        if constraints.audio.is_some() {
            debug!("ignoring audio request: display media has no audio support");
        }

        pending.commit()
    }

    /// enumerate_devices lists every device that records video or audio,
    /// in registration order. No driver is opened.
    pub fn enumerate_devices(&self) -> Vec<MediaDeviceInfo> {
        let video = filter_video_recorder();
        let audio = filter_audio_recorder();

        self.manager
            .query(&filter_all())
            .iter()
            .filter_map(|d| {
                let kind = if video(d) {
                    MediaDeviceKind::VideoInput
                } else if audio(d) {
                    MediaDeviceKind::AudioInput
                } else {
                    return None;
                };

                let info = d.info();
                Some(MediaDeviceInfo {
                    device_id: d.id().to_owned(),
                    kind,
                    label: info.label.clone(),
                    device_type: info.device_type,
                })
            })
            .collect()
    }

    fn select_track(&self, source: Source, option: &MediaOption) -> Result<Arc<dyn Track>> {
        let constraints = MediaTrackConstraints::from_option(option);
        let (driver, constraints) = self.select_best_driver(&source.filter(), constraints)?;

        let track = match source {
            Source::Camera | Source::Screen => LocalTrack::new_video(driver, constraints)?,
            Source::Microphone => LocalTrack::new_audio(driver, constraints)?,
        };
        Ok(Arc::new(track))
    }

    /// query_driver_properties returns the properties of every driver the
    /// filter matches, in registration order. Closed drivers are opened for
    /// the duration of the call and closed again before it returns. Drivers
    /// that cannot be opened or read are left out.
    pub(crate) fn query_driver_properties(
        &self,
        filter: &Filter,
    ) -> Vec<(Arc<Driver>, Vec<Media>)> {
        let drivers = self.manager.query(filter);
        let mut opened = OpenedDrivers::default();
        let mut candidates = Vec::with_capacity(drivers.len());

        for d in drivers {
            if d.status() == State::Closed {
                if let Err(err) = d.open() {
                    debug!("skipping driver {}: failed to open: {}", d.id(), err);
                    continue;
                }
                opened.0.push(Arc::clone(&d));
            }

            match d.properties() {
                Ok(properties) => candidates.push((d, properties)),
                Err(err) => debug!(
                    "skipping driver {}: failed to read properties: {}",
                    d.id(),
                    err
                ),
            }
        }

        candidates
    }

    /// select_best_driver implements the SelectSettings algorithm across all
    /// matching drivers. Every (driver, properties) pair is scored by its
    /// fitness distance minus the driver priority, and the first pair with
    /// the lowest score wins.
    ///
    /// Reference: <https://w3c.github.io/mediacapture-main/#dfn-selectsettings>
    pub(crate) fn select_best_driver(
        &self,
        filter: &Filter,
        mut constraints: MediaTrackConstraints,
    ) -> Result<(Arc<Driver>, MediaTrackConstraints)> {
        let candidates = self.query_driver_properties(filter);

        let mut best: Option<(&Arc<Driver>, &Media)> = None;
        let mut min_fitness_dist = f64::INFINITY;
        let mut rejected = vec![];

        for (d, properties) in &candidates {
            let priority = f64::from(d.info().priority);
            for p in properties {
                let fitness_dist = match constraints.media.fitness_distance(p) {
                    Ok(dist) => dist - priority,
                    Err(violations) => {
                        trace!("driver {} rejected: {:?}", d.id(), violations);
                        rejected.push(RejectedCandidate {
                            driver_id: d.id().to_owned(),
                            label: d.info().label.clone(),
                            properties: p.clone(),
                            violations,
                        });
                        continue;
                    }
                };
                trace!("driver {} scored {}", d.id(), fitness_dist);

                if fitness_dist < min_fitness_dist {
                    min_fitness_dist = fitness_dist;
                    best = Some((d, p));
                }
            }
        }

        let (best_driver, best_prop) = match best {
            Some(best) => best,
            None => {
                return Err(NotFoundError {
                    candidates: rejected,
                    constraints: constraints.to_string(),
                }
                .into())
            }
        };
        debug!(
            "selected driver {} ({}) with fitness distance {}",
            best_driver.id(),
            best_driver.info().label,
            min_fitness_dist
        );

        let mut selected = Media::default();
        selected.merge_constraints(&constraints.media);
        selected.merge(best_prop);
        constraints.selected_media = Some(selected);

        Ok((Arc::clone(best_driver), constraints))
    }
}
