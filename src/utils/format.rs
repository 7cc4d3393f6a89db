use crate::models::DayCompletion;

/// Create a simple ASCII progress bar from a [0,1] fraction.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let ratio = fraction.clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Format a [0,1] fraction as a whole percentage.
pub fn format_percent(fraction: f64) -> String {
    format!("{}%", (fraction.clamp(0.0, 1.0) * 100.0).round() as u32)
}

/// One-character icon for a day's completion tier.
pub fn completion_icon(completion: DayCompletion) -> &'static str {
    match completion {
        DayCompletion::Full => "●",
        DayCompletion::Partial => "◑",
        DayCompletion::Missed => "○",
    }
}
