use ansi_term::Colour;
use chrono::{DateTime, Local, Utc};

use crate::{
    store::entities::{ActivityList, ActivityRecord, ActivityStats},
    utils::time::format_clock,
};

/// Prints all activities as a table, one row per record in creation order.
pub fn print_activities(list: &ActivityList) {
    if list.is_empty() {
        println!("No activities yet. Start your first one with `whatnext start`");
        return;
    }

    println!(
        "{:>4}  {:<9}  {:>7}  {:>8}  {:>8}  {:<20}  {}",
        "id", "status", "started", "finished", "duration", "location", "description"
    );
    for record in list.records() {
        println!(
            "{:>4}  {}  {:>7}  {:>8}  {:>8}  {:<20}  {}",
            record.id,
            status(record),
            local_clock(Some(record.started_at)),
            local_clock(record.finished_at),
            format_minutes(record),
            record.location,
            record.description
        );
    }
}

pub fn print_stats(stats: ActivityStats) {
    println!("Total activities: {}", stats.total);
    println!("Completed: {}", stats.completed);
    println!("In progress: {}", stats.in_progress);
}

fn status(record: &ActivityRecord) -> String {
    // Padded before painting, otherwise the escape codes throw off the column
    // widths.
    if record.is_finished() {
        Colour::Green.paint(format!("{:<9}", "completed")).to_string()
    } else {
        Colour::Yellow.paint(format!("{:<9}", "active")).to_string()
    }
}

/// The stored moments are utc, the table shows them as local wall clock time.
fn local_clock(moment: Option<DateTime<Utc>>) -> String {
    format_clock(moment.map(|v| v.with_timezone(&Local)).as_ref())
}

fn format_minutes(record: &ActivityRecord) -> String {
    match record.duration_minutes() {
        Some(v) => format!("{v} min"),
        None => "-".to_string(),
    }
}
