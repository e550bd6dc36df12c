
pub mod constraint;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use webrtc_constraints::property::all::name::{
    CHANNEL_COUNT, DEVICE_ID, FRAME_RATE, HEIGHT, LATENCY, SAMPLE_RATE, SAMPLE_SIZE, WIDTH,
};
use webrtc_constraints::{MediaTrackSetting, MediaTrackSettings};

pub use constraint::{AudioConstraints, ConstraintViolation, MediaConstraints, VideoConstraints};
pub use webrtc_constraints::algorithms::{
    SettingFitnessDistanceError, SettingFitnessDistanceErrorKind,
};
pub use webrtc_constraints::{ResolvedValueRangeConstraint, ResolvedValueSequenceConstraint};

use constraint::{latency_value, ConstraintValue};

/// FrameFormat is the pixel layout a video driver produces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameFormat {
    #[serde(rename = "I420")]
    I420,
    #[serde(rename = "I444")]
    I444,
    #[serde(rename = "NV12")]
    Nv12,
    #[serde(rename = "NV21")]
    Nv21,
    #[serde(rename = "YUY2")]
    Yuy2,
    #[serde(rename = "UYVY")]
    Uyvy,
    #[serde(rename = "RGBA")]
    Rgba,
    #[serde(rename = "MJPEG")]
    Mjpeg,
    #[serde(rename = "Z16")]
    Z16,
}

const FRAME_FORMAT_I420_STR: &str = "I420";
const FRAME_FORMAT_I444_STR: &str = "I444";
const FRAME_FORMAT_NV12_STR: &str = "NV12";
const FRAME_FORMAT_NV21_STR: &str = "NV21";
const FRAME_FORMAT_YUY2_STR: &str = "YUY2";
const FRAME_FORMAT_UYVY_STR: &str = "UYVY";
const FRAME_FORMAT_RGBA_STR: &str = "RGBA";
const FRAME_FORMAT_MJPEG_STR: &str = "MJPEG";
const FRAME_FORMAT_Z16_STR: &str = "Z16";

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            FrameFormat::I420 => FRAME_FORMAT_I420_STR,
            FrameFormat::I444 => FRAME_FORMAT_I444_STR,
            FrameFormat::Nv12 => FRAME_FORMAT_NV12_STR,
            FrameFormat::Nv21 => FRAME_FORMAT_NV21_STR,
            FrameFormat::Yuy2 => FRAME_FORMAT_YUY2_STR,
            FrameFormat::Uyvy => FRAME_FORMAT_UYVY_STR,
            FrameFormat::Rgba => FRAME_FORMAT_RGBA_STR,
            FrameFormat::Mjpeg => FRAME_FORMAT_MJPEG_STR,
            FrameFormat::Z16 => FRAME_FORMAT_Z16_STR,
        };
        write!(f, "{s}")
    }
}

/// Video holds the video half of a concrete driver configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_format: Option<FrameFormat>,
}

impl Video {
    pub fn is_empty(&self) -> bool {
        self.width.is_none()
            && self.height.is_none()
            && self.frame_rate.is_none()
            && self.frame_format.is_none()
    }
}

/// Audio holds the audio half of a concrete driver configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audio {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_count: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_big_endian: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_float: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_interleaved: Option<bool>,
}

impl Audio {
    pub fn is_empty(&self) -> bool {
        self.channel_count.is_none()
            && self.latency.is_none()
            && self.sample_rate.is_none()
            && self.sample_size.is_none()
            && self.is_big_endian.is_none()
            && self.is_float.is_none()
            && self.is_interleaved.is_none()
    }
}

/// Media is one concrete configuration a driver can run at. Every field is
/// optional: a driver only reports what it knows about itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default)]
    pub video: Video,
    #[serde(default)]
    pub audio: Audio,
}

fn merge_field<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if src.is_some() {
        dst.clone_from(src);
    }
}

fn assign_field<T>(dst: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *dst = value;
    }
}

impl Media {
    /// merge copies every field set on `other` into `self`, overwriting what
    /// was there before.
    pub fn merge(&mut self, other: &Media) {
        merge_field(&mut self.device_id, &other.device_id);

        merge_field(&mut self.video.width, &other.video.width);
        merge_field(&mut self.video.height, &other.video.height);
        merge_field(&mut self.video.frame_rate, &other.video.frame_rate);
        merge_field(&mut self.video.frame_format, &other.video.frame_format);

        merge_field(&mut self.audio.channel_count, &other.audio.channel_count);
        merge_field(&mut self.audio.latency, &other.audio.latency);
        merge_field(&mut self.audio.sample_rate, &other.audio.sample_rate);
        merge_field(&mut self.audio.sample_size, &other.audio.sample_size);
        merge_field(&mut self.audio.is_big_endian, &other.audio.is_big_endian);
        merge_field(&mut self.audio.is_float, &other.audio.is_float);
        merge_field(&mut self.audio.is_interleaved, &other.audio.is_interleaved);
    }

    /// merge_constraints writes the representative value of every constraint
    /// (exact if given, otherwise ideal) into `self`. Pure ranges and values
    /// that do not fit the setting's type leave the field untouched.
    pub fn merge_constraints(&mut self, c: &MediaConstraints) {
        assign_field(&mut self.device_id, c.device_id.value());

        let v = &c.video;
        assign_field(&mut self.video.width, v.width.value().and_then(|w| u32::try_from(w).ok()));
        assign_field(&mut self.video.height, v.height.value().and_then(|h| u32::try_from(h).ok()));
        assign_field(&mut self.video.frame_rate, v.frame_rate.value());
        assign_field(&mut self.video.frame_format, v.frame_format.value());

        let a = &c.audio;
        assign_field(
            &mut self.audio.channel_count,
            a.channel_count.value().and_then(|n| u16::try_from(n).ok()),
        );
        assign_field(&mut self.audio.latency, a.latency.value().and_then(latency_value));
        assign_field(
            &mut self.audio.sample_rate,
            a.sample_rate.value().and_then(|r| u32::try_from(r).ok()),
        );
        assign_field(
            &mut self.audio.sample_size,
            a.sample_size.value().and_then(|n| u16::try_from(n).ok()),
        );
        assign_field(&mut self.audio.is_big_endian, a.is_big_endian.value());
        assign_field(&mut self.audio.is_float, a.is_float.value());
        assign_field(&mut self.audio.is_interleaved, a.is_interleaved.value());
    }

    /// to_track_settings lists every set field as a W3C track setting, keyed
    /// by its property name. Latency is given in seconds.
    pub fn to_track_settings(&self) -> MediaTrackSettings {
        let mut settings: Vec<(&'static str, MediaTrackSetting)> = vec![];
        let mut push = |name: &'static str, setting: Option<MediaTrackSetting>| {
            if let Some(setting) = setting {
                settings.push((name, setting));
            }
        };

        push(DEVICE_ID.name(), self.device_id.clone().map(MediaTrackSetting::from));

        let v = &self.video;
        push(WIDTH.name(), v.width.map(|w| i64::from(w).into()));
        push(HEIGHT.name(), v.height.map(|h| i64::from(h).into()));
        push(FRAME_RATE.name(), v.frame_rate.map(MediaTrackSetting::from));
        push(
            constraint::FRAME_FORMAT,
            v.frame_format.map(|f| f.to_string().into()),
        );

        let a = &self.audio;
        push(CHANNEL_COUNT.name(), a.channel_count.map(|n| i64::from(n).into()));
        push(LATENCY.name(), a.latency.map(|l| l.as_secs_f64().into()));
        push(SAMPLE_RATE.name(), a.sample_rate.map(|r| i64::from(r).into()));
        push(SAMPLE_SIZE.name(), a.sample_size.map(|n| i64::from(n).into()));
        push(constraint::IS_BIG_ENDIAN, a.is_big_endian.map(MediaTrackSetting::from));
        push(constraint::IS_FLOAT, a.is_float.map(MediaTrackSetting::from));
        push(constraint::IS_INTERLEAVED, a.is_interleaved.map(MediaTrackSetting::from));

        MediaTrackSettings::from_iter(settings)
    }
}

fn write_field<T: fmt::Debug>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    value: &Option<T>,
) -> fmt::Result {
    match value {
        Some(v) => writeln!(f, "  {name}: {v:?}"),
        None => Ok(()),
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(device_id) = &self.device_id {
            writeln!(f, "DeviceID: {device_id}")?;
        }
        if !self.video.is_empty() {
            writeln!(f, "Video:")?;
            write_field(f, "Width", &self.video.width)?;
            write_field(f, "Height", &self.video.height)?;
            write_field(f, "FrameRate", &self.video.frame_rate)?;
            write_field(f, "FrameFormat", &self.video.frame_format)?;
        }
        if !self.audio.is_empty() {
            writeln!(f, "Audio:")?;
            write_field(f, "ChannelCount", &self.audio.channel_count)?;
            write_field(f, "Latency", &self.audio.latency)?;
            write_field(f, "SampleRate", &self.audio.sample_rate)?;
            write_field(f, "SampleSize", &self.audio.sample_size)?;
            write_field(f, "IsBigEndian", &self.audio.is_big_endian)?;
            write_field(f, "IsFloat", &self.audio.is_float)?;
            write_field(f, "IsInterleaved", &self.audio.is_interleaved)?;
        }
        Ok(())
    }
}
