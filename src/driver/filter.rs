use std::sync::Arc;

use super::{DeviceType, Driver};

/// Filter is a predicate over drivers. Filters are plain values and compose
/// through [`filter_and`], [`filter_or`] and [`filter_not`].
pub type Filter = Arc<dyn Fn(&Driver) -> bool + Send + Sync>;

/// filter_all matches every driver.
pub fn filter_all() -> Filter {
    Arc::new(|_: &Driver| true)
}

/// filter_video_recorder matches drivers that can capture video.
pub fn filter_video_recorder() -> Filter {
    Arc::new(|d: &Driver| d.is_video_recorder())
}

/// filter_audio_recorder matches drivers that can capture audio.
pub fn filter_audio_recorder() -> Filter {
    Arc::new(|d: &Driver| d.is_audio_recorder())
}

pub fn filter_device_type(device_type: DeviceType) -> Filter {
    Arc::new(move |d: &Driver| d.info().device_type == device_type)
}

pub fn filter_id(id: impl Into<String>) -> Filter {
    let id = id.into();
    Arc::new(move |d: &Driver| d.id() == id)
}

/// filter_and matches when every filter matches. An empty list matches
/// everything.
pub fn filter_and(filters: Vec<Filter>) -> Filter {
    Arc::new(move |d: &Driver| filters.iter().all(|f| f(d)))
}

/// filter_or matches when any filter matches. An empty list matches nothing.
pub fn filter_or(filters: Vec<Filter>) -> Filter {
    Arc::new(move |d: &Driver| filters.iter().any(|f| f(d)))
}

pub fn filter_not(filter: Filter) -> Filter {
    Arc::new(move |d: &Driver| !filter(d))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::driver::mock::MockAdapter;
    use crate::driver::{Info, Priority};

    fn driver(adapter: MockAdapter, device_type: DeviceType) -> Driver {
        Driver::new(
            Box::new(adapter),
            Info {
                label: device_type.to_string(),
                device_type,
                priority: Priority::NORMAL,
            },
        )
    }

    #[test]
    fn test_filter_capabilities() {
        let camera = driver(MockAdapter::video(vec![]), DeviceType::Camera);
        let microphone = driver(MockAdapter::audio(vec![]), DeviceType::Microphone);
        let speaker = driver(MockAdapter::plain(vec![]), DeviceType::Speaker);

        let video = filter_video_recorder();
        let audio = filter_audio_recorder();

        assert!(video(&camera));
        assert!(!video(&microphone));
        assert!(!video(&speaker));

        assert!(!audio(&camera));
        assert!(audio(&microphone));
        assert!(!audio(&speaker));

        assert!(filter_all()(&speaker));
    }

    #[test]
    fn test_filter_composition() {
        let camera = driver(MockAdapter::video(vec![]), DeviceType::Camera);
        let screen = driver(MockAdapter::video(vec![]), DeviceType::Screen);

        let camera_only = filter_and(vec![
            filter_video_recorder(),
            filter_not(filter_device_type(DeviceType::Screen)),
        ]);
        let screen_only = filter_and(vec![
            filter_video_recorder(),
            filter_device_type(DeviceType::Screen),
        ]);

        assert!(camera_only(&camera));
        assert!(!camera_only(&screen));
        assert!(!screen_only(&camera));
        assert!(screen_only(&screen));

        let either = filter_or(vec![filter_id(camera.id()), filter_id(screen.id())]);
        assert!(either(&camera));
        assert!(either(&screen));

        assert!(filter_and(vec![])(&camera));
        assert!(!filter_or(vec![])(&camera));
    }
}
