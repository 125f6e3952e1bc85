use crate::analytics::AnalyticsSummary;
use colored::{Color, Colorize};
use std::fmt;

fn paint(text: String, color: Color, use_color: bool) -> String {
    if use_color {
        text.color(color).to_string()
    } else {
        text
    }
}

fn heading(text: &str, use_color: bool) -> String {
    let underline = "-".repeat(text.chars().count());
    if use_color {
        format!("{}\n{}", text.bold(), underline)
    } else {
        format!("{}\n{}", text, underline)
    }
}

fn rating_color(average: f64) -> Color {
    if average >= 4.0 {
        Color::Green
    } else if average >= 3.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Terminal rendering of an [`AnalyticsSummary`]
pub struct Report<'a> {
    summary: &'a AnalyticsSummary,
    use_color: bool,
}

impl<'a> Report<'a> {
    pub fn new(summary: &'a AnalyticsSummary, use_color: bool) -> Self {
        Report { summary, use_color }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary;
        let use_color = self.use_color;

        writeln!(f, "Event Feedback Analytics")?;
        writeln!(f, "========================")?;
        writeln!(f)?;
        writeln!(f, "Total events:        {}", summary.total_events)?;
        writeln!(f, "Total feedback:      {}", summary.total_feedback)?;
        writeln!(
            f,
            "Average rating:      {}",
            paint(
                format!("{:.1}/5", summary.average_rating),
                rating_color(summary.average_rating),
                use_color
            )
        )?;
        writeln!(f, "Feedback per event:  {:.2}", summary.feedback_per_event)?;

        if summary.total_feedback == 0 {
            writeln!(f)?;
            return writeln!(f, "No feedback has been submitted yet.");
        }

        writeln!(f)?;
        writeln!(f, "{}", heading("Event Ratings", use_color))?;
        for event in &summary.event_summaries {
            writeln!(
                f,
                "  {:<30} {}  ({} feedback)",
                event.title,
                paint(
                    format!("{:.1}", event.average_rating),
                    rating_color(event.average_rating),
                    use_color
                ),
                event.feedback_count
            )?;
        }

        writeln!(f)?;
        writeln!(f, "{}", heading("Rating Distribution", use_color))?;
        for bucket in &summary.rating_histogram {
            writeln!(
                f,
                "  {:<8} {:>4}  ({:.1}%)",
                bucket.label, bucket.count, bucket.percentage
            )?;
        }
        Ok(())
    }
}

/// Renders the analytics summary for the terminal
pub fn render(summary: &AnalyticsSummary, use_color: bool) -> String {
    Report::new(summary, use_color).to_string()
}
