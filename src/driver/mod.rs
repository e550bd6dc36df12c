
pub mod filter;
pub mod manager;
pub mod mock;

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::prop::Media;
use crate::utilities::math_rand_alpha;
use crate::Sample;

pub use filter::*;
pub use manager::Manager;

const DRIVER_ID_LEN: usize = 16;

/// DeviceType describes what kind of hardware a driver talks to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Camera,
    Microphone,
    Screen,
    Speaker,
}

const DEVICE_TYPE_CAMERA_STR: &str = "camera";
const DEVICE_TYPE_MICROPHONE_STR: &str = "microphone";
const DEVICE_TYPE_SCREEN_STR: &str = "screen";
const DEVICE_TYPE_SPEAKER_STR: &str = "speaker";

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            DeviceType::Camera => DEVICE_TYPE_CAMERA_STR,
            DeviceType::Microphone => DEVICE_TYPE_MICROPHONE_STR,
            DeviceType::Screen => DEVICE_TYPE_SCREEN_STR,
            DeviceType::Speaker => DEVICE_TYPE_SPEAKER_STR,
        };
        write!(f, "{s}")
    }
}

/// Priority biases driver selection: at equal fitness, the driver with the
/// higher priority wins.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub f32);

impl Priority {
    pub const HIGH: Priority = Priority(100.0);
    pub const NORMAL: Priority = Priority(0.0);
    pub const LOW: Priority = Priority(-100.0);
}

/// A non-finite priority cannot be compared with a fitness distance, so it
/// weighs the same as [`Priority::NORMAL`].
impl From<Priority> for f64 {
    fn from(p: Priority) -> Self {
        if p.0.is_finite() {
            p.0 as f64
        } else {
            Priority::NORMAL.0 as f64
        }
    }
}

/// Info is the static description a backend registers its driver with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub label: String,
    pub device_type: DeviceType,
    #[serde(default)]
    pub priority: Priority,
}

/// State is the lifecycle state of a driver.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    #[default]
    Closed,
    Opened,
    Running,
}

const STATE_CLOSED_STR: &str = "closed";
const STATE_OPENED_STR: &str = "opened";
const STATE_RUNNING_STR: &str = "running";

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            State::Closed => STATE_CLOSED_STR,
            State::Opened => STATE_OPENED_STR,
            State::Running => STATE_RUNNING_STR,
        };
        write!(f, "{s}")
    }
}

/// Reader pulls raw samples out of a running driver.
pub trait Reader: Send {
    fn read(&mut self) -> Result<Sample>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait VideoRecorder: Send + Sync {
    /// video_record starts capturing at exactly the `selected` configuration.
    fn video_record(&self, selected: &Media) -> Result<Box<dyn Reader>>;
}

pub trait AudioRecorder: Send + Sync {
    /// audio_record starts capturing at exactly the `selected` configuration.
    fn audio_record(&self, selected: &Media) -> Result<Box<dyn Reader>>;
}

/// Adapter is implemented by capture backends. It is wrapped in a [`Driver`]
/// that enforces the open/close state machine, so adapters never see an
/// illegal transition.
pub trait Adapter: Send + Sync {
    fn open(&self) -> Result<()>;
    fn close(&self) -> Result<()>;

    /// properties lists every configuration the device supports. It is only
    /// called while the device is open.
    fn properties(&self) -> Result<Vec<Media>>;

    fn video_recorder(&self) -> Option<&dyn VideoRecorder> {
        None
    }

    fn audio_recorder(&self) -> Option<&dyn AudioRecorder> {
        None
    }
}

/// Driver is a registered capture device.
pub struct Driver {
    id: String,
    info: Info,
    state: Mutex<State>,
    adapter: Box<dyn Adapter>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("id", &self.id)
            .field("info", &self.info)
            .field("state", &self.status())
            .finish()
    }
}

impl Driver {
    pub(crate) fn new(adapter: Box<dyn Adapter>, info: Info) -> Self {
        Driver {
            id: math_rand_alpha(DRIVER_ID_LEN),
            info,
            state: Mutex::new(State::Closed),
            adapter,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    pub fn status(&self) -> State {
        *self.state.lock()
    }

    pub fn is_video_recorder(&self) -> bool {
        self.adapter.video_recorder().is_some()
    }

    pub fn is_audio_recorder(&self) -> bool {
        self.adapter.audio_recorder().is_some()
    }

    /// open is only allowed on a closed driver.
    pub fn open(&self) -> Result<()> {
        let mut state = self.state.lock();
        if *state != State::Closed {
            return Err(Error::ErrDriverAlreadyOpened);
        }

        self.adapter.open()?;
        *state = State::Opened;
        Ok(())
    }

    /// close is allowed from both the opened and the running state. When the
    /// adapter fails to close, the driver keeps its current state.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        if *state == State::Closed {
            return Err(Error::ErrDriverAlreadyClosed);
        }

        self.adapter.close()?;
        *state = State::Closed;
        Ok(())
    }

    pub fn properties(&self) -> Result<Vec<Media>> {
        let state = self.state.lock();
        if *state == State::Closed {
            return Err(Error::ErrDriverNotOpened);
        }

        self.adapter.properties()
    }

    pub fn video_record(&self, selected: &Media) -> Result<Box<dyn Reader>> {
        let recorder = self
            .adapter
            .video_recorder()
            .ok_or(Error::ErrDriverNotVideoRecorder)?;

        let mut state = self.state.lock();
        if *state != State::Opened {
            return Err(Error::ErrDriverNotOpened);
        }

        let reader = recorder.video_record(selected)?;
        *state = State::Running;
        Ok(reader)
    }

    pub fn audio_record(&self, selected: &Media) -> Result<Box<dyn Reader>> {
        let recorder = self
            .adapter
            .audio_recorder()
            .ok_or(Error::ErrDriverNotAudioRecorder)?;

        let mut state = self.state.lock();
        if *state != State::Opened {
            return Err(Error::ErrDriverNotOpened);
        }

        let reader = recorder.audio_record(selected)?;
        *state = State::Running;
        Ok(reader)
    }
}
