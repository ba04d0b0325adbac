use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// `mm:ss`, or `h:mm:ss` from one hour up.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Like [`format_clock`] for fractional media positions, truncating to whole seconds.
#[must_use]
pub fn format_position(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return format_clock(0);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = seconds.min(f64::from(u32::MAX)) as u32;
    format_clock(whole)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(50), "00:50");
        assert_eq!(format_clock(60), "01:00");
        assert_eq!(format_clock(3_725), "1:02:05");
    }

    #[test]
    fn position_truncates_and_guards_nan() {
        assert_eq!(format_position(59.9), "00:59");
        assert_eq!(format_position(f64::NAN), "00:00");
        assert_eq!(format_position(-3.0), "00:00");
    }
}
