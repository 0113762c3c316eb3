use std::io::Write;

use docxtext_core::RunStats;
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the end-of-run summary.
pub fn print_summary(
    w: &mut dyn Write,
    reader_name: &str,
    stats: &RunStats,
    color: ColorMode,
) -> std::io::Result<()> {
    let line = format!(
        "Read {} file(s), wrote {} record(s)",
        stats.files, stats.records
    );

    if color.enabled() {
        write!(w, "{} {}", format!("[{}]", reader_name).bold().cyan(), line)?;
        if stats.failed > 0 {
            writeln!(w, ", {}", format!("{} failed", stats.failed).red())?;
        } else {
            writeln!(w, ", {}", "0 failed".green())?;
        }
    } else {
        writeln!(w, "[{}] {}, {} failed", reader_name, line, stats.failed)?;
    }
    Ok(())
}
