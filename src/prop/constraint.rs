
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use webrtc_constraints::algorithms::{
    FitnessDistance, SettingFitnessDistanceError, SettingFitnessDistanceErrorKind,
};
use webrtc_constraints::property::all::name::{
    CHANNEL_COUNT, DEVICE_ID, FRAME_RATE, HEIGHT, LATENCY, SAMPLE_RATE, SAMPLE_SIZE, WIDTH,
};
use webrtc_constraints::{ResolvedValueRangeConstraint, ResolvedValueSequenceConstraint};

use super::{FrameFormat, Media};

pub const FRAME_FORMAT: &str = "frameFormat";
pub const IS_BIG_ENDIAN: &str = "isBigEndian";
pub const IS_FLOAT: &str = "isFloat";
pub const IS_INTERLEAVED: &str = "isInterleaved";

/// ConstraintViolation records why a single property made a configuration
/// infeasible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstraintViolation {
    pub property: &'static str,
    pub error: SettingFitnessDistanceError,
}

impl ConstraintViolation {
    pub fn kind(&self) -> SettingFitnessDistanceErrorKind {
        self.error.kind
    }
}

fn describe_kind(kind: SettingFitnessDistanceErrorKind) -> &'static str {
    match kind {
        SettingFitnessDistanceErrorKind::Missing => "missing",
        SettingFitnessDistanceErrorKind::Mismatch => "a mismatch",
        SettingFitnessDistanceErrorKind::TooSmall => "too small",
        SettingFitnessDistanceErrorKind::TooLarge => "too large",
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = describe_kind(self.error.kind);
        match &self.error.setting {
            Some(setting) => write!(
                f,
                "{}: setting was {} ({} does not satisfy {})",
                self.property, kind, setting, self.error.constraint
            ),
            None => write!(
                f,
                "{}: setting was {} (does not satisfy {})",
                self.property, kind, self.error.constraint
            ),
        }
    }
}

/// Helpers shared by the range and sequence constraints.
pub(crate) trait ConstraintValue {
    type Value;

    /// An empty value list is treated as if the constraint were not given.
    fn is_unset(&self) -> bool;

    /// value returns the single value this constraint asks for, if any:
    /// the exact value, otherwise the ideal one.
    fn value(&self) -> Option<Self::Value>;
}

impl<T: Copy> ConstraintValue for ResolvedValueRangeConstraint<T> {
    type Value = T;

    fn is_unset(&self) -> bool {
        self.is_empty()
    }

    fn value(&self) -> Option<T> {
        self.exact.or(self.ideal)
    }
}

impl<T: Clone> ConstraintValue for ResolvedValueSequenceConstraint<T> {
    type Value = T;

    fn is_unset(&self) -> bool {
        self.is_empty()
    }

    fn value(&self) -> Option<T> {
        match self.exact.as_deref() {
            Some([only]) => Some(only.clone()),
            _ => self.ideal.as_ref().and_then(|v| v.first().cloned()),
        }
    }
}

/// setting_distance scores one setting against one constraint. A setting
/// that produces a non-finite distance, such as a NaN frame rate, can never
/// be compared and is reported as a mismatch.
fn setting_distance<C, S>(
    property: &'static str,
    constraint: &C,
    setting: Option<&S>,
) -> Result<f64, ConstraintViolation>
where
    C: ConstraintValue + fmt::Display,
    C: for<'a> FitnessDistance<Option<&'a S>, Error = SettingFitnessDistanceError>,
    S: fmt::Debug,
{
    if constraint.is_unset() {
        return Ok(0.0);
    }

    match constraint.fitness_distance(setting) {
        Ok(distance) if distance.is_finite() => Ok(distance),
        Ok(_) => Err(ConstraintViolation {
            property,
            error: SettingFitnessDistanceError {
                kind: SettingFitnessDistanceErrorKind::Mismatch,
                constraint: constraint.to_string(),
                setting: setting.map(|s| format!("{s:?}")),
            },
        }),
        Err(error) => Err(ConstraintViolation { property, error }),
    }
}

/// float_setting_distance rejects non-finite settings before scoring them,
/// since they satisfy no bound.
fn float_setting_distance(
    property: &'static str,
    constraint: &ResolvedValueRangeConstraint<f64>,
    setting: Option<f64>,
) -> Result<f64, ConstraintViolation> {
    match setting {
        Some(actual) if !actual.is_finite() && !constraint.is_empty() => {
            Err(ConstraintViolation {
                property,
                error: SettingFitnessDistanceError {
                    kind: SettingFitnessDistanceErrorKind::Mismatch,
                    constraint: constraint.to_string(),
                    setting: Some(format!("{actual:?}")),
                },
            })
        }
        _ => setting_distance(property, constraint, setting.as_ref()),
    }
}

fn frame_format_names(
    c: &ResolvedValueSequenceConstraint<FrameFormat>,
) -> ResolvedValueSequenceConstraint<String> {
    let names = |formats: &Vec<FrameFormat>| formats.iter().map(|f| f.to_string()).collect();
    ResolvedValueSequenceConstraint {
        exact: c.exact.as_ref().map(names),
        ideal: c.ideal.as_ref().map(names),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoConstraints {
    pub width: ResolvedValueRangeConstraint<u64>,
    pub height: ResolvedValueRangeConstraint<u64>,
    pub frame_rate: ResolvedValueRangeConstraint<f64>,
    pub frame_format: ResolvedValueSequenceConstraint<FrameFormat>,
}

/// AudioConstraints constrains the audio half of a configuration. Latency
/// is expressed in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioConstraints {
    pub channel_count: ResolvedValueRangeConstraint<u64>,
    pub latency: ResolvedValueRangeConstraint<f64>,
    pub sample_rate: ResolvedValueRangeConstraint<u64>,
    pub sample_size: ResolvedValueRangeConstraint<u64>,
    pub is_big_endian: ResolvedValueSequenceConstraint<bool>,
    pub is_float: ResolvedValueSequenceConstraint<bool>,
    pub is_interleaved: ResolvedValueSequenceConstraint<bool>,
}

/// MediaConstraints is the set of requested ranges and ideal values for a
/// single track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaConstraints {
    pub device_id: ResolvedValueSequenceConstraint<String>,
    pub video: VideoConstraints,
    pub audio: AudioConstraints,
}

impl MediaConstraints {
    /// fitness_distance sums the distance of every property of `media` to
    /// its constraint. It fails with every violated property when at least
    /// one required constraint is not met.
    pub fn fitness_distance(&self, media: &Media) -> Result<f64, Vec<ConstraintViolation>> {
        let mut total = 0.0;
        let mut violations = vec![];

        let mut accumulate = |result: Result<f64, ConstraintViolation>| match result {
            Ok(distance) => total += distance,
            Err(violation) => violations.push(violation),
        };

        accumulate(setting_distance(
            DEVICE_ID.name(),
            &self.device_id,
            media.device_id.as_ref(),
        ));

        let (c, v) = (&self.video, &media.video);
        let frame_format = v.frame_format.map(|f| f.to_string());
        accumulate(setting_distance(
            WIDTH.name(),
            &c.width,
            v.width.map(i64::from).as_ref(),
        ));
        accumulate(setting_distance(
            HEIGHT.name(),
            &c.height,
            v.height.map(i64::from).as_ref(),
        ));
        accumulate(float_setting_distance(FRAME_RATE.name(), &c.frame_rate, v.frame_rate));
        accumulate(setting_distance(
            FRAME_FORMAT,
            &frame_format_names(&c.frame_format),
            frame_format.as_ref(),
        ));

        let (c, a) = (&self.audio, &media.audio);
        accumulate(setting_distance(
            CHANNEL_COUNT.name(),
            &c.channel_count,
            a.channel_count.map(i64::from).as_ref(),
        ));
        accumulate(setting_distance(
            LATENCY.name(),
            &c.latency,
            a.latency.map(|l| l.as_secs_f64()).as_ref(),
        ));
        accumulate(setting_distance(
            SAMPLE_RATE.name(),
            &c.sample_rate,
            a.sample_rate.map(i64::from).as_ref(),
        ));
        accumulate(setting_distance(
            SAMPLE_SIZE.name(),
            &c.sample_size,
            a.sample_size.map(i64::from).as_ref(),
        ));
        accumulate(setting_distance(
            IS_BIG_ENDIAN,
            &c.is_big_endian,
            a.is_big_endian.as_ref(),
        ));
        accumulate(setting_distance(IS_FLOAT, &c.is_float, a.is_float.as_ref()));
        accumulate(setting_distance(
            IS_INTERLEAVED,
            &c.is_interleaved,
            a.is_interleaved.as_ref(),
        ));

        if violations.is_empty() {
            Ok(total)
        } else {
            Err(violations)
        }
    }
}

/// latency_value converts a latency constraint value, in seconds, into a
/// duration. Negative or non-finite values have no duration.
pub(crate) fn latency_value(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}

fn write_constraint<C: fmt::Display + ConstraintValue>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    constraint: &C,
) -> fmt::Result {
    if constraint.is_unset() {
        Ok(())
    } else {
        writeln!(f, "  {name}: {constraint}")
    }
}

impl fmt::Display for MediaConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.device_id.is_empty() {
            writeln!(f, "DeviceID: {}", self.device_id)?;
        }

        let v = &self.video;
        writeln!(f, "Video:")?;
        write_constraint(f, "Width", &v.width)?;
        write_constraint(f, "Height", &v.height)?;
        write_constraint(f, "FrameRate", &v.frame_rate)?;
        write_constraint(f, "FrameFormat", &v.frame_format)?;

        let a = &self.audio;
        writeln!(f, "Audio:")?;
        write_constraint(f, "ChannelCount", &a.channel_count)?;
        write_constraint(f, "Latency", &a.latency)?;
        write_constraint(f, "SampleRate", &a.sample_rate)?;
        write_constraint(f, "SampleSize", &a.sample_size)?;
        write_constraint(f, "IsBigEndian", &a.is_big_endian)?;
        write_constraint(f, "IsFloat", &a.is_float)?;
        write_constraint(f, "IsInterleaved", &a.is_interleaved)
    }
}
