//! Handles all user-facing output for the CLI.
//!
//! Phase headers, warnings, and the degraded-build notice go through here so
//! the release procedure sees a consistent, greppable surface.

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::errors::Phase;

/// Prints a phase header before the phase runs.
pub fn print_phase(phase: Phase) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    println!("==> {}", phase);
    let _ = stdout.reset();
}

/// Prints a completion line once the whole pipeline has run.
pub fn print_done(message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    println!("{}", message);
    let _ = stdout.reset();
}

/// Prints a phase-local warning; the pipeline continues after these.
pub fn print_warning(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    eprintln!("warning: {}", message);
    let _ = stderr.reset();
}

/// Marks the overall build as degraded: publishable, but incomplete.
pub fn print_degraded() {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    eprintln!("build degraded: builder synthesis failed; package assembled without the builder");
    let _ = stderr.reset();
}
