//! An in-memory driver backend for tests and demos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use bytes::Bytes;

use super::{Adapter, AudioRecorder, Reader, VideoRecorder};
use crate::error::{Error, Result};
use crate::prop::Media;
use crate::Sample;

const DEFAULT_AUDIO_FRAME: Duration = Duration::from_millis(20);
const DEFAULT_VIDEO_FRAME: Duration = Duration::from_millis(33);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum MockKind {
    Video,
    Audio,
    Plain,
}

/// MockStats counts the calls a [`MockAdapter`] received. It stays readable
/// after the adapter has been moved into a manager.
#[derive(Debug, Default)]
pub struct MockStats {
    opens: AtomicUsize,
    closes: AtomicUsize,
    records: AtomicUsize,
    reads: AtomicUsize,
    last_selected: parking_lot::Mutex<Option<Media>>,
}

impl MockStats {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> usize {
        self.records.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// last_selected is the configuration the last record call asked for.
    pub fn last_selected(&self) -> Option<Media> {
        self.last_selected.lock().clone()
    }
}

/// MockAdapter serves a fixed list of properties and can be told to fail at
/// every stage of the driver lifecycle.
pub struct MockAdapter {
    kind: MockKind,
    properties: Vec<Media>,
    fail_open: bool,
    fail_close: bool,
    fail_properties: bool,
    fail_record: bool,
    stats: Arc<MockStats>,
}

impl MockAdapter {
    fn new(kind: MockKind, properties: Vec<Media>) -> Self {
        MockAdapter {
            kind,
            properties,
            fail_open: false,
            fail_close: false,
            fail_properties: false,
            fail_record: false,
            stats: Arc::new(MockStats::default()),
        }
    }

    /// video creates an adapter that records video.
    pub fn video(properties: Vec<Media>) -> Self {
        Self::new(MockKind::Video, properties)
    }

    /// audio creates an adapter that records audio.
    pub fn audio(properties: Vec<Media>) -> Self {
        Self::new(MockKind::Audio, properties)
    }

    /// plain creates an adapter that records nothing.
    pub fn plain(properties: Vec<Media>) -> Self {
        Self::new(MockKind::Plain, properties)
    }

    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn fail_properties(mut self) -> Self {
        self.fail_properties = true;
        self
    }

    pub fn fail_record(mut self) -> Self {
        self.fail_record = true;
        self
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }

    fn record(&self, selected: &Media, frame: Duration) -> Result<Box<dyn Reader>> {
        self.stats.records.fetch_add(1, Ordering::SeqCst);
        if self.fail_record {
            return Err(Error::new("mock: record failed".to_owned()));
        }
        *self.stats.last_selected.lock() = Some(selected.clone());

        Ok(Box::new(MockReader {
            duration: frame,
            stats: Arc::clone(&self.stats),
        }))
    }
}

impl Adapter for MockAdapter {
    fn open(&self) -> Result<()> {
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(Error::new("mock: open failed".to_owned()));
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(Error::new("mock: close failed".to_owned()));
        }
        Ok(())
    }

    fn properties(&self) -> Result<Vec<Media>> {
        if self.fail_properties {
            return Err(Error::new("mock: properties unavailable".to_owned()));
        }
        Ok(self.properties.clone())
    }

    fn video_recorder(&self) -> Option<&dyn VideoRecorder> {
        match self.kind {
            MockKind::Video => Some(self),
            _ => None,
        }
    }

    fn audio_recorder(&self) -> Option<&dyn AudioRecorder> {
        match self.kind {
            MockKind::Audio => Some(self),
            _ => None,
        }
    }
}

impl VideoRecorder for MockAdapter {
    fn video_record(&self, selected: &Media) -> Result<Box<dyn Reader>> {
        let frame = match selected.video.frame_rate {
            Some(rate) if rate > 0.0 && rate.is_finite() => {
                Duration::from_nanos((1e9 / rate).round() as u64)
            }
            _ => DEFAULT_VIDEO_FRAME,
        };
        self.record(selected, frame)
    }
}

impl AudioRecorder for MockAdapter {
    fn audio_record(&self, selected: &Media) -> Result<Box<dyn Reader>> {
        let frame = selected.audio.latency.unwrap_or(DEFAULT_AUDIO_FRAME);
        self.record(selected, frame)
    }
}

struct MockReader {
    duration: Duration,
    stats: Arc<MockStats>,
}

impl Reader for MockReader {
    fn read(&mut self) -> Result<Sample> {
        self.stats.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Sample {
            data: Bytes::from_static(b"mock"),
            timestamp: SystemTime::now(),
            duration: self.duration,
        })
    }
}
