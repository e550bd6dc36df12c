use std::fmt;

use crate::prop::{Media, MediaConstraints};

/// MediaOption fills in the constraints of a single requested track.
pub type MediaOption = Box<dyn Fn(&mut MediaTrackConstraints) + Send + Sync>;

/// MediaStreamConstraints describes which kinds of media a caller wants and
/// how each one should be constrained. A kind without an option is not
/// requested at all.
#[derive(Default)]
pub struct MediaStreamConstraints {
    pub video: Option<MediaOption>,
    pub audio: Option<MediaOption>,
}

impl MediaStreamConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut MediaTrackConstraints) + Send + Sync + 'static,
    {
        self.video = Some(Box::new(f));
        self
    }

    pub fn with_audio<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut MediaTrackConstraints) + Send + Sync + 'static,
    {
        self.audio = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for MediaStreamConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStreamConstraints")
            .field("video", &self.video.is_some())
            .field("audio", &self.audio.is_some())
            .finish()
    }
}

/// MediaTrackConstraints is the request for a single track. Once a driver
/// has been selected, `selected_media` holds the exact configuration the
/// driver runs at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaTrackConstraints {
    pub media: MediaConstraints,
    pub(crate) selected_media: Option<Media>,
}

impl MediaTrackConstraints {
    pub(crate) fn from_option(option: &MediaOption) -> Self {
        let mut constraints = MediaTrackConstraints::default();
        option(&mut constraints);
        constraints
    }

    pub fn selected_media(&self) -> Option<&Media> {
        self.selected_media.as_ref()
    }
}

impl fmt::Display for MediaTrackConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.media)
    }
}
