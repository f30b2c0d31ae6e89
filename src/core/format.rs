use std::time::Duration;

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
const UNIT_SIZE: f64 = 1024.0;

/// Render a byte count with the largest unit that keeps the value under
/// 1024. The last unit absorbs any overflow.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= UNIT_SIZE && unit_index < UNITS.len() - 1 {
        size /= UNIT_SIZE;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

pub fn format_speed(bytes_per_second: f64) -> String {
    format!("{}/s", format_size(bytes_per_second as u64))
}

pub fn format_eta(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

const BAR_SEGMENTS: usize = 10;

/// Ten-segment progress bar, one segment per 10%.
pub fn render_bar(percentage: f64) -> String {
    let filled = ((percentage / 10.0).floor() as usize).min(BAR_SEGMENTS);
    format!(
        "⫷{}{}⫸",
        "●".repeat(filled),
        "○".repeat(BAR_SEGMENTS - filled)
    )
}
