use once_cell::sync::Lazy;
use regex::Regex;

/// 24-hour clock, zero-padded: hours 00-23, minutes 00-59.
static HHMM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("HH:MM regex must compile")
});

/// Parses an `HH:MM` string into minutes since midnight. Returns `None`
/// for anything that is not a strict 24-hour time.
pub fn parse_hhmm(value: &str) -> Option<u16> {
    let captures = HHMM_RE.captures(value)?;
    let hours: u16 = captures[1].parse().ok()?;
    let minutes: u16 = captures[2].parse().ok()?;

    Some(hours * 60 + minutes)
}

/// Whether `now` falls inside the `[from, to)` quiet-hours window, all in
/// minutes since midnight.
///
/// When `from >= to` the window spans midnight: inside iff `now >= from`
/// or `now < to`. The degenerate `from == to` case therefore means the
/// window is always on, and is intentionally not normalized away.
pub fn is_within_window(now: u16, from: u16, to: u16) -> bool {
    if from < to {
        from <= now && now < to
    } else {
        now >= from || now < to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(value: &str) -> u16 {
        parse_hhmm(value).unwrap()
    }

    #[test]
    fn parses_valid_times() {
        assert_eq!(parse_hhmm("00:00"), Some(0));
        assert_eq!(parse_hhmm("09:05"), Some(9 * 60 + 5));
        assert_eq!(parse_hhmm("23:59"), Some(23 * 60 + 59));
    }

    #[test]
    fn rejects_malformed_times() {
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("12:60"), None);
        assert_eq!(parse_hhmm("9:30"), None);
        assert_eq!(parse_hhmm("0930"), None);
        assert_eq!(parse_hhmm("twelve"), None);
        assert_eq!(parse_hhmm(""), None);
    }

    #[test]
    fn same_day_window_contains_interior_points_only() {
        let from = minutes("09:00");
        let to = minutes("17:00");

        assert!(is_within_window(minutes("10:00"), from, to));
        assert!(!is_within_window(minutes("20:00"), from, to));
        // half-open: the start is inside, the end is not
        assert!(is_within_window(from, from, to));
        assert!(!is_within_window(to, from, to));
    }

    #[test]
    fn midnight_spanning_window_wraps() {
        let from = minutes("22:00");
        let to = minutes("07:00");

        assert!(is_within_window(minutes("23:30"), from, to));
        assert!(is_within_window(minutes("03:00"), from, to));
        assert!(!is_within_window(minutes("12:00"), from, to));
    }

    #[test]
    fn equal_bounds_mean_always_on() {
        let at = minutes("08:00");
        assert!(is_within_window(minutes("08:00"), at, at));
        assert!(is_within_window(minutes("20:00"), at, at));
        assert!(is_within_window(minutes("00:00"), at, at));
    }
}
