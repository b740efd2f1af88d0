//! Terminal output utilities

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Print a success message
pub fn print_success(message: &str) {
    println!("{}: {}", style("success").green().bold(), message);
}

/// Print a step banner
pub fn print_step(message: &str) {
    println!("{} {}", style("==>").cyan().bold(), style(message).bold());
}

/// Print a debug line when verbose output is on
pub fn debug(verbose: bool, message: &str) {
    if verbose {
        eprintln!("{} {}", style("debug:").dim(), message);
    }
}

/// Create a spinner progress bar
///
/// indicatif hides the bar when stderr is not a terminal.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
