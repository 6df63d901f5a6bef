use chrono::{DateTime, Local};

pub fn format_ratio(part: usize, total: usize) -> String {
    if total == 0 {
        return format!("{part}");
    }
    #[allow(clippy::cast_precision_loss)]
    let share = part as f64 / total as f64 * 100.0;
    format!("{part} ({share:.1}%)")
}

pub fn format_elapsed(started_at: &DateTime<Local>, finished_at: &DateTime<Local>) -> String {
    let elapsed = finished_at.signed_duration_since(*started_at);
    let millis = elapsed.num_milliseconds().max(0);
    if millis < 1_000 {
        format!("{millis} ms")
    } else {
        format!("{}.{:02} s", millis / 1_000, (millis % 1_000) / 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn ratio_includes_share() {
        assert_eq!(format_ratio(1, 4), "1 (25.0%)");
        assert_eq!(format_ratio(3, 0), "3");
    }

    #[test]
    fn elapsed_switches_units() {
        let start = Local::now();
        assert_eq!(format_elapsed(&start, &(start + Duration::milliseconds(250))), "250 ms");
        assert_eq!(format_elapsed(&start, &(start + Duration::milliseconds(2_345))), "2.34 s");
        assert_eq!(format_elapsed(&start, &(start - Duration::seconds(1))), "0 ms");
    }
}
