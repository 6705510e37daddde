use gleaner_core::{FetchOutcome, SearchResponse, SearchResult};
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Gleaner".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Search the web and extract article content\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print timing information with color coding
pub fn print_timing(label: &str, duration: std::time::Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);

    if ms < 1000.0 {
        eprintln!("  {} {:>10.2}ms ({})", label.dimmed(), ms, "fast".dimmed());
    } else if ms < 5000.0 {
        eprintln!("  {} {:>10.2}ms ({})", label.dimmed(), ms, "moderate".bright_yellow());
    } else {
        eprintln!("  {} {:>10.2}ms ({})", label.dimmed(), ms, "slow".bright_red());
    }
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Render a search response as numbered plain-text entries
pub fn render_response(response: &SearchResponse) -> String {
    let mut out = String::new();

    for (i, result) in response.results.iter().enumerate() {
        out.push_str(&render_result(i + 1, result));
        out.push('\n');
    }

    out.push_str(&format!(
        "{} result(s) for \"{}\" at {}\n",
        response.meta.total_results, response.query, response.meta.timestamp
    ));
    out
}

fn render_result(position: usize, result: &SearchResult) -> String {
    let mut out = format!("{}. {}\n   {}\n", position, result.title, result.url);

    let mut details = Vec::new();
    if let Some(source) = &result.source {
        details.push(source.clone());
    }
    if let Some(date) = &result.date {
        details.push(date.clone());
    }
    if result.is_news {
        details.push("news".to_string());
    }
    if result.full_content {
        details.push("full content".to_string());
    }
    if !details.is_empty() {
        out.push_str(&format!("   [{}]\n", details.join(" | ")));
    }

    for line in result.content.lines() {
        out.push_str(&format!("   {}\n", line));
    }
    out
}

/// Render an extraction outcome as a header block followed by the content
pub fn render_outcome(outcome: &FetchOutcome) -> String {
    let mut out = format!("Title: {}\nURL: {}\n", outcome.title, outcome.url);

    if let Some(date) = &outcome.publish_date {
        out.push_str(&format!("Published: {}\n", date));
    }
    if let Some(quality) = &outcome.quality {
        if quality.reason.is_empty() {
            out.push_str(&format!("Quality: {}\n", quality.score));
        } else {
            out.push_str(&format!("Quality: {} ({})\n", quality.score, quality.reason));
        }
    }

    out.push('\n');
    out.push_str(&outcome.content);
    out.push('\n');
    out
}
