//! "System info" panel helpers.

pub fn detect_os(user_agent: &str) -> &'static str {
    // Android and iOS agents also mention Linux / Mac, so they go first.
    if user_agent.contains("Android") {
        "Android"
    } else if user_agent.contains("iPhone") || user_agent.contains("iPad") {
        "iOS"
    } else if user_agent.contains("Windows") {
        "Windows"
    } else if user_agent.contains("Mac") {
        "macOS"
    } else if user_agent.contains("Linux") {
        "Linux"
    } else {
        "Unknown"
    }
}

pub fn detect_browser(user_agent: &str) -> &'static str {
    // Edge and Chrome both claim Safari; Edge also claims Chrome.
    if user_agent.contains("Edg") {
        "Edge"
    } else if user_agent.contains("Chrome") {
        "Chrome"
    } else if user_agent.contains("Firefox") {
        "Firefox"
    } else if user_agent.contains("Safari") {
        "Safari"
    } else {
        "Unknown"
    }
}

/// `HH:MM:SS` for the uptime readout.
pub fn format_uptime(elapsed_ms: f64) -> String {
    let total = (elapsed_ms.max(0.0) / 1000.0) as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

pub fn format_resolution(width: f64, height: f64) -> String {
    format!("{}x{}", width as i64, height as i64)
}

const MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// Header clock, e.g. `Oct 19, 2026 09:05:00`. `month` is zero based like
/// `Date.getMonth()`.
pub fn format_clock(year: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> String {
    let name = MONTHS.get(month as usize).copied().unwrap_or("???");
    format!("{name} {day}, {year} {hour:02}:{minute:02}:{second:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const EDGE_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36 Edg/120.0";
    const SAFARI_IOS: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36";

    #[test]
    fn detects_common_agents() {
        assert_eq!((detect_os(CHROME_WIN), detect_browser(CHROME_WIN)), ("Windows", "Chrome"));
        assert_eq!(detect_browser(EDGE_WIN), "Edge");
        assert_eq!((detect_os(SAFARI_IOS), detect_browser(SAFARI_IOS)), ("iOS", "Safari"));
        assert_eq!((detect_os(FIREFOX_LINUX), detect_browser(FIREFOX_LINUX)), ("Linux", "Firefox"));
        assert_eq!(detect_os(CHROME_ANDROID), "Android");
        assert_eq!(detect_os("curl/8.0"), "Unknown");
    }

    #[test]
    fn uptime_is_zero_padded() {
        assert_eq!(format_uptime(0.0), "00:00:00");
        assert_eq!(format_uptime(3_723_999.0), "01:02:03");
        assert_eq!(format_uptime(-5.0), "00:00:00");
    }

    #[test]
    fn clock_matches_header_format() {
        assert_eq!(format_clock(2026, 9, 19, 9, 5, 0), "Oct 19, 2026 09:05:00");
        assert_eq!(format_resolution(1920.0, 1080.0), "1920x1080");
    }
}
