//! Common validation utilities for GPS ping ingestion.

use chrono::{TimeZone, Utc};
use validator::ValidationError;

/// Maximum age of a ping timestamp in days.
const MAX_TIMESTAMP_AGE_DAYS: i64 = 7;

/// Maximum allowed future timestamp tolerance in seconds (clock skew on collar devices).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 300;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that accuracy is non-negative.
pub fn validate_accuracy(accuracy: f64) -> Result<(), ValidationError> {
    if accuracy >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("accuracy_range");
        err.message = Some("Accuracy must be non-negative".into());
        Err(err)
    }
}

/// Validates that heading is within valid range (0 to 360).
pub fn validate_heading(heading: f64) -> Result<(), ValidationError> {
    if (0.0..=360.0).contains(&heading) {
        Ok(())
    } else {
        let mut err = ValidationError::new("heading_range");
        err.message = Some("Heading must be between 0 and 360".into());
        Err(err)
    }
}

/// Validates that speed is non-negative.
pub fn validate_speed(speed: f64) -> Result<(), ValidationError> {
    if speed >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("speed_range");
        err.message = Some("Speed must be non-negative".into());
        Err(err)
    }
}

/// Validates that battery level is within valid range (0 to 100).
pub fn validate_battery_level(level: i32) -> Result<(), ValidationError> {
    if (0..=100).contains(&level) {
        Ok(())
    } else {
        let mut err = ValidationError::new("battery_range");
        err.message = Some("Battery level must be between 0 and 100".into());
        Err(err)
    }
}

/// Validates that signal strength is within valid range (0 to 100).
pub fn validate_signal_strength(signal: i32) -> Result<(), ValidationError> {
    if (0..=100).contains(&signal) {
        Ok(())
    } else {
        let mut err = ValidationError::new("signal_range");
        err.message = Some("Signal strength must be between 0 and 100".into());
        Err(err)
    }
}

/// Validates that a body temperature reading is physiologically plausible (in Celsius).
pub fn validate_temperature(temp: f64) -> Result<(), ValidationError> {
    if (-40.0..=60.0).contains(&temp) {
        Ok(())
    } else {
        let mut err = ValidationError::new("temperature_range");
        err.message = Some("Temperature must be between -40 and 60".into());
        Err(err)
    }
}

/// Validates that a timestamp (in milliseconds since epoch) is within acceptable range.
/// - Must not be more than 5 minutes in the future (allows for clock skew)
/// - Must not be older than 7 days
pub fn validate_timestamp(timestamp_millis: i64) -> Result<(), ValidationError> {
    let now = Utc::now();

    let timestamp = match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(ts) => ts,
        None => {
            let mut err = ValidationError::new("timestamp_invalid");
            err.message = Some("Invalid timestamp format".into());
            return Err(err);
        }
    };

    let future_limit = now + chrono::Duration::seconds(MAX_FUTURE_TOLERANCE_SECS);
    if timestamp > future_limit {
        let mut err = ValidationError::new("timestamp_future");
        err.message = Some("Timestamp cannot be in the future".into());
        return Err(err);
    }

    let past_limit = now - chrono::Duration::days(MAX_TIMESTAMP_AGE_DAYS);
    if timestamp < past_limit {
        let mut err = ValidationError::new("timestamp_old");
        err.message = Some("Timestamp cannot be older than 7 days".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-1.2921).is_ok());
        assert!(validate_latitude(90.1).is_err());
        assert!(validate_latitude(-90.1).is_err());
    }

    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(0.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(36.8219).is_ok());
        assert!(validate_longitude(180.1).is_err());
        assert!(validate_longitude(-180.1).is_err());
    }

    #[test]
    fn test_validate_accuracy() {
        assert!(validate_accuracy(0.0).is_ok());
        assert!(validate_accuracy(12.5).is_ok());
        assert!(validate_accuracy(-0.1).is_err());
    }

    #[test]
    fn test_validate_heading() {
        assert!(validate_heading(0.0).is_ok());
        assert!(validate_heading(360.0).is_ok());
        assert!(validate_heading(361.0).is_err());
        assert!(validate_heading(-1.0).is_err());
    }

    #[test]
    fn test_validate_speed() {
        assert!(validate_speed(0.0).is_ok());
        assert!(validate_speed(3.4).is_ok());
        assert!(validate_speed(-0.5).is_err());
    }

    #[test]
    fn test_validate_battery_level() {
        assert!(validate_battery_level(0).is_ok());
        assert!(validate_battery_level(100).is_ok());
        assert!(validate_battery_level(101).is_err());
        assert!(validate_battery_level(-1).is_err());
    }

    #[test]
    fn test_validate_signal_strength() {
        assert!(validate_signal_strength(0).is_ok());
        assert!(validate_signal_strength(100).is_ok());
        assert!(validate_signal_strength(101).is_err());
    }

    #[test]
    fn test_validate_temperature() {
        assert!(validate_temperature(38.5).is_ok());
        assert!(validate_temperature(-40.0).is_ok());
        assert!(validate_temperature(61.0).is_err());
    }

    #[test]
    fn test_validate_timestamp_current() {
        let now = Utc::now().timestamp_millis();
        assert!(validate_timestamp(now).is_ok());
    }

    #[test]
    fn test_validate_timestamp_too_old() {
        let old = (Utc::now() - chrono::Duration::days(8)).timestamp_millis();
        assert!(validate_timestamp(old).is_err());
    }

    #[test]
    fn test_validate_timestamp_future() {
        let future = (Utc::now() + chrono::Duration::minutes(10)).timestamp_millis();
        assert!(validate_timestamp(future).is_err());
    }

    #[test]
    fn test_validate_timestamp_slight_skew_allowed() {
        let skewed = (Utc::now() + chrono::Duration::minutes(4)).timestamp_millis();
        assert!(validate_timestamp(skewed).is_ok());
    }
}
