#![warn(rust_2018_idioms)]

//! Capture audio, video and screens by describing what you want instead of
//! naming a device, following the browser [MediaDevices] API.
//!
//! [MediaDevices]: https://w3c.github.io/mediacapture-main/#mediadevices

pub mod constraints;
pub mod driver;
pub mod error;
pub mod media_devices;
pub mod media_stream;
pub mod prop;
pub mod track;

mod utilities;

pub use constraints::{MediaOption, MediaStreamConstraints, MediaTrackConstraints};
pub use error::{Error, Result};
pub use media_devices::{MediaDeviceInfo, MediaDeviceKind, MediaDevices, MediaDevicesBuilder};
pub use media_stream::MediaStream;

#[macro_use]
extern crate lazy_static;

use bytes::Bytes;
use std::time::{Duration, SystemTime};

/// A Sample is one chunk of raw media read from a driver.
#[derive(Debug, Clone)]
pub struct Sample {
    pub data: Bytes,
    pub timestamp: SystemTime,
    pub duration: Duration,
}

impl Default for Sample {
    fn default() -> Self {
        Sample {
            data: Bytes::new(),
            timestamp: SystemTime::now(),
            duration: Duration::from_secs(0),
        }
    }
}

/// get_user_media resolves `constraints` against the drivers registered with
/// the global [`driver::Manager`]. See [`MediaDevices::get_user_media`].
pub fn get_user_media(constraints: MediaStreamConstraints) -> Result<MediaStream> {
    MediaDevices::default().get_user_media(constraints)
}

/// get_display_media resolves `constraints` against the screen drivers
/// registered with the global [`driver::Manager`]. See
/// [`MediaDevices::get_display_media`].
pub fn get_display_media(constraints: MediaStreamConstraints) -> Result<MediaStream> {
    MediaDevices::default().get_display_media(constraints)
}

/// enumerate_devices lists the capture devices registered with the global
/// [`driver::Manager`].
pub fn enumerate_devices() -> Vec<MediaDeviceInfo> {
    MediaDevices::default().enumerate_devices()
}
