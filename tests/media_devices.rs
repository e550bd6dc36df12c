//! Integration tests for constraint resolution through the public API

use std::sync::Arc;
use std::time::Duration;

use mediadevices::driver::mock::MockAdapter;
use mediadevices::driver::{DeviceType, Info, Manager, Priority, State};
use mediadevices::prop::{
    FrameFormat, Media, ResolvedValueRangeConstraint, ResolvedValueSequenceConstraint,
};
use mediadevices::track::{TrackKind, TrackState};
use mediadevices::{Error, MediaDeviceKind, MediaDevicesBuilder, MediaStreamConstraints};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init()
        .ok();
}

fn camera_mode(width: u32, height: u32, frame_rate: f64, format: FrameFormat) -> Media {
    let mut media = Media::default();
    media.video.width = Some(width);
    media.video.height = Some(height);
    media.video.frame_rate = Some(frame_rate);
    media.video.frame_format = Some(format);
    media
}

fn info(label: &str, device_type: DeviceType) -> Info {
    Info {
        label: label.to_owned(),
        device_type,
        priority: Priority::NORMAL,
    }
}

#[test]
fn test_capture_session() -> mediadevices::Result<()> {
    init_logger();

    let manager = Arc::new(Manager::new());
    let webcam = manager.register(
        Box::new(MockAdapter::video(vec![
            camera_mode(640, 480, 30.0, FrameFormat::Yuy2),
            camera_mode(1280, 720, 30.0, FrameFormat::Mjpeg),
            camera_mode(1920, 1080, 15.0, FrameFormat::Mjpeg),
        ])),
        info("webcam", DeviceType::Camera),
    );

    let mut mic_mode = Media::default();
    mic_mode.audio.channel_count = Some(2);
    mic_mode.audio.sample_rate = Some(48000);
    mic_mode.audio.latency = Some(Duration::from_millis(10));
    let mic = manager.register(
        Box::new(MockAdapter::audio(vec![mic_mode])),
        info("headset", DeviceType::Microphone),
    );

    let devices = MediaDevicesBuilder::new()
        .with_manager(Arc::clone(&manager))
        .build();

    let infos = devices.enumerate_devices();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].kind, MediaDeviceKind::VideoInput);
    assert_eq!(infos[1].kind, MediaDeviceKind::AudioInput);
    assert_eq!(webcam.status(), State::Closed);

    let stream = devices.get_user_media(
        MediaStreamConstraints::new()
            .with_video(|c| {
                c.media.video.width = ResolvedValueRangeConstraint::default().ideal(1280);
                c.media.video.height = ResolvedValueRangeConstraint::default().ideal(720);
                c.media.video.frame_format = ResolvedValueSequenceConstraint::default()
                    .exact(vec![FrameFormat::Mjpeg, FrameFormat::I420]);
            })
            .with_audio(|c| {
                c.media.audio.sample_rate = ResolvedValueRangeConstraint::default().exact(48000);
            }),
    )?;

    let video = &stream.get_video_tracks()[0];
    assert_eq!(video.kind(), TrackKind::Video);
    assert_eq!(
        video.settings(),
        camera_mode(1280, 720, 30.0, FrameFormat::Mjpeg)
    );
    let sample = video.read()?;
    assert_eq!(sample.duration, Duration::from_nanos(33_333_333));

    let audio = &stream.get_audio_tracks()[0];
    assert_eq!(audio.settings().audio.channel_count, Some(2));
    assert_eq!(audio.read()?.duration, Duration::from_millis(10));

    assert_eq!(webcam.status(), State::Running);
    assert_eq!(mic.status(), State::Running);

    stream.stop();
    assert_eq!(video.ready_state(), TrackState::Ended);
    assert_eq!(audio.ready_state(), TrackState::Ended);
    assert_eq!(webcam.status(), State::Closed);
    assert_eq!(mic.status(), State::Closed);

    Ok(())
}

#[test]
fn test_unsatisfiable_request_reports_candidates() {
    init_logger();

    let manager = Arc::new(Manager::new());
    manager.register(
        Box::new(MockAdapter::video(vec![camera_mode(
            640,
            480,
            30.0,
            FrameFormat::Yuy2,
        )])),
        info("webcam", DeviceType::Camera),
    );
    let devices = MediaDevicesBuilder::new().with_manager(manager).build();

    let err = devices
        .get_user_media(MediaStreamConstraints::new().with_video(|c| {
            c.media.video.width = ResolvedValueRangeConstraint::default().min(1280).max(3840);
        }))
        .unwrap_err();

    match &err {
        Error::NotFound(not_found) => {
            assert_eq!(not_found.candidates.len(), 1);
            assert_eq!(not_found.candidates[0].label, "webcam");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }

    let text = err.to_string();
    assert!(text.contains("Found Properties"));
    assert!(text.contains("Width: 640"));
    assert!(text.contains("(1280 <= x <= 3840)"));
}

#[test]
fn test_screen_capture() -> mediadevices::Result<()> {
    init_logger();

    let manager = Arc::new(Manager::new());
    manager.register(
        Box::new(MockAdapter::video(vec![camera_mode(
            640,
            480,
            30.0,
            FrameFormat::Yuy2,
        )])),
        info("webcam", DeviceType::Camera),
    );
    let screen = manager.register(
        Box::new(MockAdapter::video(vec![camera_mode(
            2560,
            1440,
            60.0,
            FrameFormat::Rgba,
        )])),
        info("display", DeviceType::Screen),
    );
    let devices = MediaDevicesBuilder::new().with_manager(manager).build();

    let stream = devices.get_display_media(
        MediaStreamConstraints::new()
            .with_video(|_| {})
            .with_audio(|_| {}),
    )?;
    assert_eq!(stream.get_tracks().len(), 1);
    assert_eq!(stream.get_tracks()[0].label(), "display");
    assert_eq!(screen.status(), State::Running);

    stream.stop();
    assert_eq!(screen.status(), State::Closed);

    Ok(())
}
