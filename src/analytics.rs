use crate::feedback::FeedbackRating;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Label used for feedback whose event title could not be joined
pub const UNKNOWN_EVENT_TITLE: &str = "Unknown Event";

/// Aggregated feedback for one event title
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub title: String,
    pub total_rating: i64,
    pub feedback_count: i64,
    pub average_rating: f64,
}

/// Number of feedback rows that gave one particular star value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucket {
    pub rating: i32,
    pub label: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub event_summaries: Vec<EventSummary>,
    pub rating_histogram: Vec<RatingBucket>,
    pub total_events: i64,
    pub total_feedback: i64,
    pub average_rating: f64,
    pub feedback_per_event: f64,
}

/// Rounds half away from zero to the given number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn mean(total: i64, count: i64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Groups feedback by event title and counts ratings per star value.
///
/// Summaries keep the order in which each title first appears in `rows`,
/// histogram buckets are ascending by rating and only cover ratings that
/// occur. Ratings are taken as given; range checks happen on insert.
pub fn aggregate(rows: &[FeedbackRating]) -> AnalyticsSummary {
    let mut summaries: Vec<EventSummary> = Vec::new();
    let mut index_by_title: HashMap<&str, usize> = HashMap::new();
    let mut histogram: BTreeMap<i32, i64> = BTreeMap::new();
    let mut rating_sum: i64 = 0;

    for row in rows {
        let title = row.event_title.as_deref().unwrap_or(UNKNOWN_EVENT_TITLE);
        let idx = *index_by_title.entry(title).or_insert_with(|| {
            summaries.push(EventSummary {
                title: title.to_string(),
                total_rating: 0,
                feedback_count: 0,
                average_rating: 0.0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[idx];
        summary.total_rating += row.rating as i64;
        summary.feedback_count += 1;

        *histogram.entry(row.rating).or_insert(0) += 1;
        rating_sum += row.rating as i64;
    }

    for summary in &mut summaries {
        summary.average_rating = round_to(mean(summary.total_rating, summary.feedback_count), 1);
    }

    let total_feedback = rows.len() as i64;
    let rating_histogram = histogram
        .into_iter()
        .map(|(rating, count)| RatingBucket {
            rating,
            label: format!("{} Stars", rating),
            count,
            percentage: round_to(mean(count * 100, total_feedback), 1),
        })
        .collect();

    let total_events = summaries.len() as i64;

    AnalyticsSummary {
        event_summaries: summaries,
        rating_histogram,
        total_events,
        total_feedback,
        average_rating: round_to(mean(rating_sum, total_feedback), 1),
        feedback_per_event: round_to(mean(total_feedback, total_events), 2),
    }
}
