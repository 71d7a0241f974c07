/// `m:ss`, used for tick labels and mark readouts
pub fn format_time_short(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}

/// `m:ss.cc`
pub fn format_time_centis(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let centis = ((seconds % 1.0) * 100.0).floor() as u64;
    format!("{}.{:02}", format_time_short(seconds), centis)
}

/// `mm:ss.mmm`, the player clock
pub fn format_timecode(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let millis = ((seconds % 1.0) * 1000.0).floor() as u64;
    format!("{:02}:{:02}.{:03}", mins, secs, millis)
}

pub fn format_time_range(start: f64, end: f64) -> String {
    format!("{} → {}", format_time_centis(start), format_time_centis(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_short() {
        assert_eq!(format_time_short(0.0), "0:00");
        assert_eq!(format_time_short(65.9), "1:05");
        assert_eq!(format_time_short(125.0), "2:05");
    }

    #[test]
    fn test_format_time_short_negative_clamped() {
        assert_eq!(format_time_short(-3.0), "0:00");
    }

    #[test]
    fn test_format_timecode() {
        assert_eq!(format_timecode(12.5), "00:12.500");
        assert_eq!(format_timecode(61.25), "01:01.250");
    }

    #[test]
    fn test_format_time_range() {
        assert_eq!(format_time_range(5.25, 65.5), "0:05.25 → 1:05.50");
    }
}
