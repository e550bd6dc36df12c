use super::*;
use crate::driver::mock::MockAdapter;
use crate::driver::{DeviceType, Info, Manager, Priority};

fn constraints_with(selected: Media) -> MediaTrackConstraints {
    MediaTrackConstraints {
        selected_media: Some(selected),
        ..Default::default()
    }
}

fn info(device_type: DeviceType) -> Info {
    Info {
        label: device_type.to_string(),
        device_type,
        priority: Priority::NORMAL,
    }
}

#[test]
fn test_video_track_lifecycle() -> Result<()> {
    let manager = Manager::new();
    let adapter = MockAdapter::video(vec![]);
    let stats = adapter.stats();
    let driver = manager.register(Box::new(adapter), info(DeviceType::Camera));

    let mut selected = Media::default();
    selected.video.width = Some(640);
    selected.video.frame_rate = Some(25.0);

    let track = LocalTrack::new_video(Arc::clone(&driver), constraints_with(selected.clone()))?;
    assert_eq!(track.kind(), TrackKind::Video);
    assert_eq!(track.label(), "camera");
    assert_eq!(track.ready_state(), TrackState::Live);
    assert_eq!(track.settings(), selected);
    assert_eq!(driver.status(), State::Running);
    assert_eq!(stats.last_selected(), Some(selected));

    let sample = track.read()?;
    assert_eq!(sample.duration, std::time::Duration::from_millis(40));

    track.stop();
    assert_eq!(track.ready_state(), TrackState::Ended);
    assert_eq!(driver.status(), State::Closed);
    assert!(matches!(track.read(), Err(Error::ErrTrackStopped)));

    // stop is idempotent
    track.stop();
    assert_eq!(stats.closes(), 1);

    Ok(())
}

#[test]
fn test_audio_track_on_video_driver_fails_and_closes() {
    let manager = Manager::new();
    let adapter = MockAdapter::video(vec![]);
    let stats = adapter.stats();
    let driver = manager.register(Box::new(adapter), info(DeviceType::Camera));

    let result = LocalTrack::new_audio(Arc::clone(&driver), MediaTrackConstraints::default());
    assert!(matches!(result, Err(Error::ErrDriverNotAudioRecorder)));
    assert_eq!(driver.status(), State::Closed);
    assert_eq!(stats.opens(), 1);
    assert_eq!(stats.closes(), 1);
}

#[test]
fn test_record_failure_closes_driver() {
    let manager = Manager::new();
    let adapter = MockAdapter::audio(vec![]).fail_record();
    let stats = adapter.stats();
    let driver = manager.register(Box::new(adapter), info(DeviceType::Microphone));

    assert!(LocalTrack::new_audio(Arc::clone(&driver), MediaTrackConstraints::default()).is_err());
    assert_eq!(driver.status(), State::Closed);
    assert_eq!(stats.closes(), 1);
}

#[test]
fn test_open_failure_is_propagated() {
    let manager = Manager::new();
    let adapter = MockAdapter::video(vec![]).fail_open();
    let stats = adapter.stats();
    let driver = manager.register(Box::new(adapter), info(DeviceType::Camera));

    assert!(LocalTrack::new_video(driver, MediaTrackConstraints::default()).is_err());
    assert_eq!(stats.records(), 0);
    assert_eq!(stats.closes(), 0);
}

#[test]
fn test_track_kind_string() {
    assert_eq!(TrackKind::Video.to_string(), "video");
    assert_eq!(TrackKind::Audio.to_string(), "audio");
}
