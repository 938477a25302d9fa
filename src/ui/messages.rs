//! Icon-prefixed status lines for command output.
//!
//! Only `error` writes to stderr; the others share stdout with tables so a
//! warning stays next to the rows it refers to.

use std::fmt;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

#[derive(Clone, Copy)]
enum Kind {
    Info,
    Success,
    Warning,
    Error,
}

impl Kind {
    fn style(self) -> (&'static str, &'static str) {
        match self {
            Kind::Info => ("\x1b[34m", "ℹ️"),
            Kind::Success => ("\x1b[32m", "✅"),
            Kind::Warning => ("\x1b[33m", "⚠️"),
            Kind::Error => ("\x1b[31m", "❌"),
        }
    }
}

fn line(kind: Kind, msg: impl fmt::Display) -> String {
    let (color, icon) = kind.style();
    format!("{color}{BOLD}{icon}{RESET} {msg}")
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}", line(Kind::Info, msg));
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}", line(Kind::Success, msg));
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}", line(Kind::Warning, msg));
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}", line(Kind::Error, msg));
}

/// Title line of reports, dashboards and `session show`.
pub fn header<T: fmt::Display>(msg: T) {
    let (color, _) = Kind::Info.style();
    println!("{color}{BOLD}== {msg} =={RESET}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::formatting::strip_ansi;

    #[test]
    fn lines_carry_icon_and_message() {
        assert_eq!(strip_ansi(&line(Kind::Warning, "room conflict")), "⚠️ room conflict");
        assert_eq!(strip_ansi(&line(Kind::Success, 3)), "✅ 3");
    }
}
