//! Progress reporting and the final report
//!
//! Provides real-time progress display using indicatif progress bars and
//! the console-styled top-K table printed once the run is done.

use crate::tracker::WordCount;
use crate::walker::{WalkProgress, WordCountResult};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays run status
#[derive(Clone)]
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &WalkProgress) {
        let msg = format!(
            "Files: {}/{} | Words: {} | Rate: {:.0} files/s | Queue: {} | Workers: {}/{}",
            format_number(progress.files_processed + progress.files_skipped),
            format_number(progress.files_discovered),
            format_number(progress.words),
            progress.files_per_second(),
            progress.queue_size,
            progress.active_workers,
            progress.total_workers,
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Hide the spinner while `f` writes to the terminal
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Render the ranking as `rank. word: count` lines, highest first
pub fn format_top_words(words: &[WordCount]) -> Vec<String> {
    words
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {}: {}", i + 1, entry.word, entry.count))
        .collect()
}

/// Print the ranking
pub fn print_top_words(words: &[WordCount]) {
    println!();
    println!(
        "{}",
        style(format!("Top {} Most Frequent Words", words.len())).green().bold()
    );
    println!("{}", style("─".repeat(50)).dim());
    for line in format_top_words(words) {
        println!("  {}", line);
    }
    if words.is_empty() {
        println!("  {}", style("(no words found)").dim());
    }
}

/// Print a summary of the run
pub fn print_summary(result: &WordCountResult) {
    let duration_secs = result.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        result.files_processed as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    println!("{}", style("Run Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Files:").bold(),
        format_number(result.files_processed)
    );
    println!(
        "  {} {} ({} unique)",
        style("Words:").bold(),
        format_number(result.total_words),
        format_number(result.unique_words as u64)
    );
    println!(
        "  {} {}",
        style("Text read:").bold(),
        format_size(result.bytes_read, BINARY)
    );
    println!(
        "  {} {:.1}s ({:.0} files/sec, {} workers started)",
        style("Duration:").bold(),
        duration_secs,
        rate,
        result.workers_spawned
    );
    if result.files_skipped > 0 || result.discovery_errors > 0 {
        println!(
            "  {} {}",
            style("Skipped:").yellow().bold(),
            format_number(result.files_skipped + result.discovery_errors)
        );
    }
    if !result.completed {
        println!("  {}", style("Interrupted before completion").yellow().bold());
    }
    println!();
}

/// Print a header at the start of the run
pub fn print_header(root: &str, workers: usize, top: usize) {
    println!();
    println!(
        "{} {}",
        style("wordfreq-walker").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), root);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} {}", style("Top:").bold(), top);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_top_words() {
        let words = vec![
            WordCount::new("the", 3),
            WordCount::new("sat", 2),
            WordCount::new("cat", 1),
        ];
        assert_eq!(
            format_top_words(&words),
            vec!["1. the: 3", "2. sat: 2", "3. cat: 1"]
        );
        assert!(format_top_words(&[]).is_empty());
    }
}
