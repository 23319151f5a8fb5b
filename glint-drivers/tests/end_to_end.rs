//! Calibrate through the gimbal link, then draw a rectangle and check the
//! frames that went out on the wire.

use embedded_hal::delay::DelayNs;
use glint_core::calibration::{CalibrationSession, CaptureOutcome, Corner, SOURCE_CORNERS};
use glint_core::playback::{PlaybackConfig, PlaybackEngine, PlaybackOutcome};
use glint_core::state::SharedState;
use glint_core::trajectory::Shape;
use glint_core::traits::GimbalDriver;
use glint_core::Point;
use glint_drivers::gimbal::STARTUP_SENDS;
use glint_drivers::GimbalLink;
use glint_hal::UartTx;
use glint_protocol::{GimbalFrame, GimbalFrameParser};

#[derive(Default)]
struct WireCapture {
    bytes: Vec<u8>,
}

impl UartTx for WireCapture {
    type Error = core::convert::Infallible;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl WireCapture {
    fn frames(&self) -> Vec<GimbalFrame> {
        let mut parser = GimbalFrameParser::new();
        self.bytes
            .iter()
            .filter_map(|&b| parser.feed(b).expect("valid frame on the wire"))
            .collect()
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

const TARGETS: [(i32, i32); 4] = [(4000, 4000), (6000, 4000), (6000, 6000), (4000, 6000)];

#[test]
fn calibrate_then_draw_rectangle() {
    let shared = SharedState::new();
    let mut delay = NoDelay;
    let mut link: GimbalLink<'_, _> = GimbalLink::new(WireCapture::default(), &shared);
    link.startup(&mut delay, true).unwrap();

    // Operator jogs onto each reference point and captures it
    let mut session = CalibrationSession::new();
    let mut outcome = None;
    for (corner, (yaw, pitch)) in Corner::ALL.into_iter().zip(TARGETS) {
        link.set(yaw, pitch);
        link.send().unwrap();
        session.begin(corner);
        outcome = Some(session.capture(&link).unwrap());
    }
    assert_eq!(outcome, Some(CaptureOutcome::Calibrated));

    for (src, (yaw, pitch)) in SOURCE_CORNERS.iter().zip(TARGETS) {
        let mapped = session.transform(*src).unwrap();
        assert!((mapped.x - yaw as f32).abs() < 0.5, "{:?}", mapped);
        assert!((mapped.y - pitch as f32).abs() < 0.5, "{:?}", mapped);
    }

    // Startup burst plus one frame per captured corner
    let frames_before = STARTUP_SENDS + TARGETS.len();

    let shape = Shape::Rectangle {
        min: Point::new(0.2, 0.2),
        max: Point::new(0.8, 0.8),
    };
    let config = PlaybackConfig::default();
    let outcome = PlaybackEngine::new(&mut link, &mut delay, &shared, config)
        .play(&session, shape.points().unwrap())
        .unwrap();
    assert_eq!(outcome, PlaybackOutcome::Completed { points: 120 });

    let uart = link.shutdown(&mut delay).unwrap();
    let frames = uart.frames();
    let drawing = &frames[frames_before..frames.len() - 1];

    // 3 seed frames, 120 points, 1 laser-off frame
    assert_eq!(drawing.len(), 3 + 120 + 1);
    for f in drawing {
        assert!((4000..=6000).contains(&f.yaw), "yaw {}", f.yaw);
        assert!((4000..=6000).contains(&f.pitch), "pitch {}", f.pitch);
    }

    // First rectangle corner (0.2, 0.2): yaw 4000 + 2000 * 0.2 / 1.43, pitch 4400
    let first_point = drawing[3];
    assert!(first_point.laser);
    assert!((first_point.yaw as i32 - 4280).abs() <= 1);
    assert_eq!(first_point.pitch, 4400);

    let last = frames[frames.len() - 1];
    assert_eq!(last, GimbalFrame::new(5000, 5500, false, false));
}
