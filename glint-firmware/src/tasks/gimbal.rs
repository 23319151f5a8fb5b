//! Gimbal owner task
//!
//! Sole owner of the gimbal link and the calibration session. Runs on
//! core 1 with its own executor: sends, pacing delays and whole playbacks
//! block this core while the console keeps running on core 0.

use defmt::*;
use embassy_rp::uart::{Blocking, UartTx};
use embassy_time::Delay;
use embedded_hal::delay::DelayNs;

use glint_core::calibration::{CalibrationError, CalibrationSession, CaptureOutcome, Corner};
use glint_core::config::GlintConfig;
use glint_core::playback::{PlaybackEngine, PlaybackError, PlaybackOutcome};
use glint_core::state::WorkMode;
use glint_core::traits::{AngleSource, GimbalDriver};
use glint_drivers::{GimbalLink, LinkError};
use glint_hal_rp2040::uart::SerialTx;
use glint_protocol::{ConsoleCommand, ControllerReport, ShapeId, StatusCode};

use super::send_report;
use crate::channels::{ANGLES, CALIBRATION_SAVE, COMMAND_CHANNEL, SHARED};
use crate::scripts;

/// Gimbal link over the blocking UART0 transmitter
pub type GimbalUartLink = GimbalLink<'static, SerialTx<UartTx<'static, Blocking>>>;

type GimbalResult = Result<(), LinkError<embassy_rp::uart::Error>>;

/// Length of a console-requested beep
const BEEP_MS: u32 = 100;

/// Gimbal task - executes operator commands one at a time
#[embassy_executor::task]
pub async fn gimbal_task(
    mut link: GimbalUartLink,
    mut calibration: CalibrationSession,
    config: &'static GlintConfig,
) {
    info!("Gimbal task started");

    let mut delay = Delay;

    SHARED.set_mode(WorkMode::Init);
    if let Err(e) = link.startup(&mut delay, config.link.startup_beep) {
        error!("Gimbal startup burst failed: {:?}", e);
    }
    SHARED.set_mode(WorkMode::Setpoint);
    publish_angles(&link);
    info!("Gimbal ready");

    loop {
        let cmd = COMMAND_CHANNEL.receive().await;
        info!("Command: {:?}", cmd);

        if cmd == ConsoleCommand::Shutdown {
            break;
        }

        if let Some(status) = handle_command(&mut link, &mut calibration, config, &mut delay, cmd) {
            send_report(ControllerReport::Status(status));
        }
        publish_angles(&link);
    }

    info!("Shutting down: parking gimbal");
    match link.shutdown(&mut delay) {
        Ok(_) => {
            info!("Gimbal parked, link closed");
            send_report(ControllerReport::Status(StatusCode::Ok));
        }
        Err(e) => {
            error!("Shutdown frame failed: {:?}", e);
            send_report(ControllerReport::Status(StatusCode::TransportError));
        }
    }
    SHARED.set_mode(WorkMode::Init);
}

/// Execute one command; `None` when another task reports the result
fn handle_command(
    link: &mut GimbalUartLink,
    calibration: &mut CalibrationSession,
    config: &GlintConfig,
    delay: &mut Delay,
    cmd: ConsoleCommand,
) -> Option<StatusCode> {
    let status = match cmd {
        ConsoleCommand::Jog { axis, delta } => link_status(link.jog(axis, i32::from(delta))),
        ConsoleCommand::Goto { yaw, pitch } => {
            link.set(i32::from(yaw), i32::from(pitch));
            link_status(link.send())
        }
        ConsoleCommand::GotoCorner { corner } => match Corner::from_number(corner) {
            Some(corner) => link_status(link.go_to_corner(calibration, corner)),
            None => StatusCode::Invalid,
        },
        ConsoleCommand::BeginCalibration { corner } => match Corner::from_number(corner) {
            Some(corner) => {
                calibration.begin(corner);
                SHARED.set_mode(WorkMode::Calibrate);
                debug!("Capturing corner {}", corner.number());
                StatusCode::Ok
            }
            None => StatusCode::Invalid,
        },
        ConsoleCommand::Capture => capture(link, calibration),
        ConsoleCommand::SaveCalibration => {
            if !calibration.is_calibrated() {
                warn!("Nothing to save: not calibrated");
                return Some(StatusCode::Uncalibrated);
            }
            CALIBRATION_SAVE.signal(*calibration.destinations());
            return None;
        }
        ConsoleCommand::Draw(shape) => draw(link, calibration, config, delay, shape),
        ConsoleCommand::RunScript { index } => run_script(link, calibration, config, delay, index),
        ConsoleCommand::SetLaser(on) => {
            link.set_laser(on);
            link_status(link.send())
        }
        ConsoleCommand::Beep => link_status(beep(link, delay)),
        ConsoleCommand::Center => link_status(link.center(delay)),
        // Answered by the console RX task
        ConsoleCommand::Ping | ConsoleCommand::Stop => return None,
        ConsoleCommand::Shutdown => StatusCode::Ok,
    };
    Some(status)
}

fn capture(link: &GimbalUartLink, calibration: &mut CalibrationSession) -> StatusCode {
    match calibration.capture(link) {
        Ok(CaptureOutcome::Stored(corner)) => {
            info!(
                "Corner {} captured at yaw {}, pitch {}",
                corner.number(),
                link.yaw(),
                link.pitch()
            );
            StatusCode::CornerStored
        }
        Ok(CaptureOutcome::Calibrated) => {
            info!("Corner 4 captured, calibration solved");
            SHARED.set_mode(WorkMode::Setpoint);
            StatusCode::Calibrated
        }
        Err(CalibrationError::Degenerate) => {
            warn!("Captured corners are degenerate, keeping previous calibration");
            SHARED.set_mode(WorkMode::Setpoint);
            StatusCode::Invalid
        }
        Err(e) => {
            warn!("Capture rejected: {:?}", e);
            StatusCode::Invalid
        }
    }
}

fn draw(
    link: &mut GimbalUartLink,
    calibration: &CalibrationSession,
    config: &GlintConfig,
    delay: &mut Delay,
    id: ShapeId,
) -> StatusCode {
    let points = match config.shapes.shape(id).points() {
        Ok(points) => points,
        Err(e) => {
            warn!("Shape {:?} not drawable: {:?}", id, e);
            return StatusCode::Invalid;
        }
    };

    info!("Drawing {:?}: {} points", id, points.len());
    let result = PlaybackEngine::new(link, delay, &SHARED, config.playback).play(calibration, points);
    playback_status(result)
}

fn run_script(
    link: &mut GimbalUartLink,
    calibration: &CalibrationSession,
    config: &GlintConfig,
    delay: &mut Delay,
    index: u8,
) -> StatusCode {
    let Some(drawing) = scripts::drawing(index) else {
        warn!("No script drawing {}", index);
        return StatusCode::Invalid;
    };

    info!("Running script '{}'", drawing.name);
    let result = PlaybackEngine::new(link, delay, &SHARED, config.playback).run_script(
        calibration,
        drawing.text,
        |e| warn!("Script line {} skipped: {:?}", e.line, e.error),
    );
    playback_status(result)
}

fn beep(link: &mut GimbalUartLink, delay: &mut Delay) -> GimbalResult {
    link.set_beeper(true);
    let on = link.send();
    delay.delay_ms(BEEP_MS);
    link.set_beeper(false);
    on.and(link.send())
}

fn link_status(result: GimbalResult) -> StatusCode {
    match result {
        Ok(()) => StatusCode::Ok,
        Err(e) => {
            error!("Gimbal transport error: {:?}", e);
            StatusCode::TransportError
        }
    }
}

fn playback_status(
    result: Result<PlaybackOutcome, PlaybackError<LinkError<embassy_rp::uart::Error>>>,
) -> StatusCode {
    match result {
        Ok(PlaybackOutcome::Completed { points }) => {
            info!("Playback finished: {} points", points);
            StatusCode::Ok
        }
        Ok(PlaybackOutcome::Cancelled { points }) => {
            info!("Playback cancelled after {} points", points);
            StatusCode::Cancelled
        }
        Err(PlaybackError::Calibration(CalibrationError::Uncalibrated)) => {
            warn!("Playback refused: not calibrated");
            StatusCode::Uncalibrated
        }
        Err(PlaybackError::Link(e)) => {
            error!("Playback aborted, gimbal transport error: {:?}", e);
            StatusCode::TransportError
        }
        Err(e) => {
            warn!("Playback aborted: {:?}", e);
            StatusCode::Invalid
        }
    }
}

fn publish_angles(link: &GimbalUartLink) {
    let frame = link.frame();
    trace!(
        "Angles yaw {} pitch {}, history average {:?}, mode {:?}",
        frame.yaw,
        frame.pitch,
        link.angles().history_average(),
        SHARED.mode()
    );
    ANGLES.signal((frame.yaw, frame.pitch, frame.laser));
}
