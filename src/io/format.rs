//! Output formatting for group summaries.

use std::fmt;

use log;

/// Logs a main output line to the `abelaut-output` logger.
macro_rules! abelaut_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "abelaut-output", $fmt, $($($arg)*)?); }
}

pub(crate) use abelaut_output;

/// Writes a nicely formatted subtitle.
pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    writeln!(f, "{subtitle}")?;
    writeln!(f, "{bar}")?;
    Ok(())
}

/// Logs a nicely formatted subtitle to the `abelaut-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    abelaut_output!("{}", subtitle);
    abelaut_output!("{}", bar);
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// A trait for logging `abelaut` outputs nicely.
pub(crate) trait AbelautOutput: fmt::Display {
    /// Logs display output nicely.
    fn log_output_display(&self) {
        let lines = self.to_string();
        lines.lines().for_each(|line| {
            abelaut_output!("{line}");
        })
    }
}

// Blanket implementation
impl<T> AbelautOutput for T where T: fmt::Display {}
