use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::dates::WeekWindow;
use crate::models::{DayBucket, Event, MetricSet, RegionSummary};

pub fn summarize_by_region(events: &[Event]) -> Vec<RegionSummary> {
    let mut map: HashMap<String, (usize, u32, usize)> = HashMap::new();

    for event in events {
        let entry = map.entry(event.region.clone()).or_insert((0, 0, 0));
        entry.0 += 1;
        if let Some(confidence) = event.confidence {
            entry.1 += u32::from(confidence);
            entry.2 += 1;
        }
    }

    let mut summaries: Vec<RegionSummary> = map
        .into_iter()
        .map(|(region, (count, total_confidence, scored))| RegionSummary {
            region,
            count,
            avg_confidence: if scored == 0 {
                0.0
            } else {
                total_confidence as f64 / scored as f64
            },
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.region.cmp(&b.region)));
    summaries
}

pub fn build_report(
    generated_on: NaiveDate,
    window: &WeekWindow,
    metrics: &MetricSet,
    trend: &[DayBucket],
    events: &[Event],
    hot_events: &[Event],
) -> String {
    let summaries = summarize_by_region(events);

    let mut output = String::new();

    let _ = writeln!(output, "# Pixana Market Dashboard");
    let _ = writeln!(
        output,
        "Generated on {} for {} events",
        generated_on.format("%d.%m.%Y"),
        events.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Metrics");

    for metric in &metrics.metrics {
        let _ = writeln!(
            output,
            "- {}: {} ({:+.1}% {:?})",
            metric.title, metric.value, metric.change, metric.trend
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Demand Trend, {}", window.title());

    let total: usize = trend.iter().map(|bucket| bucket.count).sum();
    if total == 0 {
        let _ = writeln!(output, "No events dated in this week.");
    } else {
        for bucket in trend {
            let _ = writeln!(
                output,
                "- {} {}: {}",
                bucket.label, bucket.date_key, bucket.count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Region Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No events collected yet.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} events (avg confidence {:.1})",
                summary.region, summary.count, summary.avg_confidence
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Hot Events");

    if hot_events.is_empty() {
        let _ = writeln!(output, "No events collected yet.");
    } else {
        for event in hot_events {
            let _ = writeln!(
                output,
                "- {} for {} ({}), {} on {} [{}, {}%]",
                event.product,
                event.company,
                event.region,
                event.volume,
                event.event_date,
                event.status.label(),
                event.confidence.unwrap_or(0)
            );
        }
    }

    output
}
