/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Color for an attendance status code.
pub fn color_for_status(status: &str) -> &'static str {
    match status {
        "present" => GREEN,
        "late" => YELLOW,
        "absent" => RED,
        "excused" => CYAN,
        _ => RESET,
    }
}

/// Color for an enrollment status code.
pub fn color_for_enrollment(status: &str) -> &'static str {
    match status {
        "approved" | "completed" => GREEN,
        "pending" => YELLOW,
        "rejected" => RED,
        _ => GREY,
    }
}

/// Attendance rate:
/// ≥75 → green
/// ≥50 → yellow
/// below → red
pub fn color_for_rate(rate: f64) -> &'static str {
    if rate >= 75.0 {
        GREEN
    } else if rate >= 50.0 {
        YELLOW
    } else {
        RED
    }
}

pub fn paint(color: &str, value: &str) -> String {
    format!("{color}{value}{RESET}")
}
