/// Formats a byte count for display: `512 B`, `1.5 KB`, `2.0 GB`.
/// Absent counts render as `unknown`, never as a made-up number.
pub fn fmt_bytes(bytes: Option<u64>) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let Some(bytes) = bytes else {
        return "unknown".to_string();
    };
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
