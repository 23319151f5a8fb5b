//! Calibration persistence text
//!
//! One line of 8 comma-separated numbers: the four destination
//! (yaw, pitch) pairs in corner order, e.g.
//!
//! ```text
//! 4500,4500,5500,4500,5500,5500,4500,5500
//! ```

use core::fmt::Write;

use heapless::String;

use super::{CalibrationError, CalibrationSession, DEFAULT_DESTINATIONS};
use crate::geometry::Point;

/// Longest line [`format_points`] can produce
pub const CALIBRATION_TEXT_LEN: usize = 96;

/// Formatted calibration line
pub type CalibrationText = String<CALIBRATION_TEXT_LEN>;

/// Format destination points as a persistence line
///
/// Values are rounded to whole angle units.
pub fn format_points(points: &[Point; 4]) -> Result<CalibrationText, CalibrationError> {
    let mut out = CalibrationText::new();
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(',').map_err(|_| CalibrationError::Malformed)?;
        }
        let yaw = libm::roundf(p.x) as i32;
        let pitch = libm::roundf(p.y) as i32;
        write!(out, "{},{}", yaw, pitch).map_err(|_| CalibrationError::Malformed)?;
    }
    Ok(out)
}

/// Parse a persistence line into destination points
///
/// Surrounding whitespace and a trailing newline are accepted. Anything
/// other than exactly 8 finite numbers is `Malformed`.
pub fn parse_points(text: &str) -> Result<[Point; 4], CalibrationError> {
    let mut values = [0.0f32; 8];
    let mut count = 0;
    for field in text.trim().split(',') {
        if count == values.len() {
            return Err(CalibrationError::Malformed);
        }
        let value: f32 = field
            .trim()
            .parse()
            .map_err(|_| CalibrationError::Malformed)?;
        if !value.is_finite() {
            return Err(CalibrationError::Malformed);
        }
        values[count] = value;
        count += 1;
    }
    if count != values.len() {
        return Err(CalibrationError::Malformed);
    }

    Ok([
        Point::new(values[0], values[1]),
        Point::new(values[2], values[3]),
        Point::new(values[4], values[5]),
        Point::new(values[6], values[7]),
    ])
}

/// Rebuild a session from stored text
///
/// Only a well-formed, non-degenerate line yields a calibrated session.
/// Nothing stored, malformed text and degenerate points all give the
/// default destinations left unsolved; the error is returned alongside so
/// the caller can log it.
pub fn restore_session(text: Option<&str>) -> (CalibrationSession, Option<CalibrationError>) {
    let points = match text.map(parse_points) {
        Some(Ok(points)) => points,
        Some(Err(e)) => return (CalibrationSession::new(), Some(e)),
        None => return (CalibrationSession::new(), None),
    };

    let mut session = CalibrationSession::new();
    match session.load(points) {
        Ok(()) => (session, None),
        Err(e) => (
            CalibrationSession::with_destinations(DEFAULT_DESTINATIONS),
            Some(e),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::SOURCE_CORNERS;

    #[test]
    fn test_format_default_square() {
        let text = format_points(&DEFAULT_DESTINATIONS).unwrap();
        assert_eq!(text.as_str(), "4500,4500,5500,4500,5500,5500,4500,5500");
    }

    #[test]
    fn test_parse_accepts_whitespace_and_decimals() {
        let points = parse_points(" 4000, 4000,6000,4000.5,6000,6000,4000,6000\n").unwrap();
        assert_eq!(points[0], Point::new(4000.0, 4000.0));
        assert_eq!(points[1], Point::new(6000.0, 4000.5));
        assert_eq!(points[3], Point::new(4000.0, 6000.0));
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        assert_eq!(
            parse_points("4500,4500,5500"),
            Err(CalibrationError::Malformed)
        );
        assert_eq!(
            parse_points("1,2,3,4,5,6,7,8,9"),
            Err(CalibrationError::Malformed)
        );
        assert_eq!(parse_points(""), Err(CalibrationError::Malformed));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            parse_points("4500,4500,abc,4500,5500,5500,4500,5500"),
            Err(CalibrationError::Malformed)
        );
        assert_eq!(
            parse_points("4500,4500,inf,4500,5500,5500,4500,5500"),
            Err(CalibrationError::Malformed)
        );
    }

    #[test]
    fn test_restore_nothing_stored() {
        let (session, err) = restore_session(None);
        assert_eq!(err, None);
        assert_eq!(session.destinations(), &DEFAULT_DESTINATIONS);
        assert!(!session.is_calibrated());
        assert_eq!(
            session.transform(Point::new(0.5, 0.5)),
            Err(CalibrationError::Uncalibrated)
        );
    }

    #[test]
    fn test_restore_malformed_stays_uncalibrated() {
        let (session, err) = restore_session(Some("nonsense"));
        assert_eq!(err, Some(CalibrationError::Malformed));
        assert_eq!(session.destinations(), &DEFAULT_DESTINATIONS);
        assert_eq!(
            session.transform(Point::new(0.5, 0.5)),
            Err(CalibrationError::Uncalibrated)
        );
    }

    #[test]
    fn test_restore_degenerate_stays_uncalibrated() {
        let (session, err) = restore_session(Some("5000,5000,5000,5000,5000,5000,5000,5000"));
        assert_eq!(err, Some(CalibrationError::Degenerate));
        assert_eq!(session.destinations(), &DEFAULT_DESTINATIONS);
        assert!(!session.is_calibrated());
        assert_eq!(
            session.transform(Point::new(0.5, 0.5)),
            Err(CalibrationError::Uncalibrated)
        );
    }

    #[test]
    fn test_restore_stored_line_calibrates() {
        let (session, err) = restore_session(Some("4000,4000,6000,4000,6000,6000,4000,6000"));
        assert_eq!(err, None);
        assert!(session.is_calibrated());
        assert_eq!(session.destinations()[2], Point::new(6000.0, 6000.0));
        let corner = session.transform(SOURCE_CORNERS[0]).unwrap();
        assert!((corner.x - 4000.0).abs() < 0.01);
        assert!((corner.y - 4000.0).abs() < 0.01);
    }

    #[test]
    fn test_format_then_parse() {
        let points = [
            Point::new(3999.6, 4000.0),
            Point::new(6000.0, 4000.0),
            Point::new(6000.0, 6000.0),
            Point::new(4000.0, 6000.2),
        ];
        let text = format_points(&points).unwrap();
        let parsed = parse_points(&text).unwrap();
        assert_eq!(parsed[0], Point::new(4000.0, 4000.0));
        assert_eq!(parsed[3], Point::new(4000.0, 6000.0));
    }
}
