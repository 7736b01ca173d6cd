use std::fmt::Write;

use crate::models::{DashboardSummary, LogSnapshot};

const RECENT_NOTES: usize = 5;

struct LogNote<'a> {
    dept: &'static str,
    date: &'a str,
    time: &'a str,
    supervisor: &'a str,
    comment: &'a str,
    link: &'a str,
}

/// Renders one day's dashboard summary as a markdown shift report.
pub fn build_report(today: &str, snapshot: &LogSnapshot, summary: &DashboardSummary) -> String {
    let mut output = String::new();
    let kpis = &summary.kpis;

    let _ = writeln!(output, "# Daily Check-in Report");
    let _ = writeln!(output, "Generated for {} from the latest log snapshot.", today);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Headline KPIs");
    let _ = writeln!(
        output,
        "- Production: {} units across {} boxes (efficiency {}%)",
        kpis.total_production, kpis.total_boxes, kpis.efficiency
    );
    let _ = writeln!(
        output,
        "- Quality score: {} (rejection rate {}%)",
        kpis.quality_score, kpis.rejection_rate
    );
    let _ = writeln!(output, "- Staff present: {}", kpis.staff_present);

    let received: f64 = snapshot
        .quality
        .iter()
        .filter(|r| r.date == today)
        .map(|r| r.received.unwrap_or(0.0))
        .sum();
    let items_added: f64 = snapshot
        .stock
        .iter()
        .filter(|r| r.date == today)
        .map(|r| r.items_added.unwrap_or(0.0))
        .sum();
    let absent: f64 = snapshot
        .attendance
        .iter()
        .filter(|r| r.date == today)
        .map(|r| r.absent.unwrap_or(0.0))
        .sum();

    let _ = writeln!(output);
    let _ = writeln!(output, "## Today's Log Detail");
    let _ = writeln!(output, "- Quality intake: {} units received", received);
    let _ = writeln!(output, "- Stock: {} items added", items_added);
    let _ = writeln!(output, "- Attendance: {} absent", absent);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Supervisor Performance");

    if summary.supervisor_scores.is_empty() {
        let _ = writeln!(output, "No attributed production in the history.");
    } else {
        for score in summary.supervisor_scores.iter() {
            let _ = writeln!(
                output,
                "- {} score {:.2} ({}) with {} units total",
                score.name, score.score, score.trend, score.total_output
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Anomalies");

    if summary.anomalies.is_empty() {
        let _ = writeln!(output, "No anomalies detected for this window.");
    } else {
        for anomaly in summary.anomalies.iter() {
            let _ = writeln!(
                output,
                "- {} {}: {} against an average of {} ({} severity)",
                anomaly.dept, anomaly.metric, anomaly.value, anomaly.average, anomaly.severity
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Log Notes");

    let notes = recent_notes(snapshot);
    if notes.is_empty() {
        let _ = writeln!(output, "No comments logged.");
    } else {
        for note in notes {
            let _ = write!(
                output,
                "- {} {} {} ({}): {}",
                note.date, note.time, note.supervisor, note.dept, note.comment
            );
            if note.link.is_empty() {
                let _ = writeln!(output);
            } else {
                let _ = writeln!(output, " ([source]({}))", note.link);
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Production History");

    if summary.history.is_empty() {
        let _ = writeln!(output, "No logged days yet.");
    } else {
        for point in summary.history.iter() {
            let _ = writeln!(output, "- {}: {} units", point.date, point.production);
        }
    }

    output
}

/// Most recent commented rows across all department logs, newest first.
fn recent_notes(snapshot: &LogSnapshot) -> Vec<LogNote<'_>> {
    let mut notes: Vec<LogNote<'_>> = Vec::new();
    for r in &snapshot.floor {
        notes.push(LogNote {
            dept: "Floor",
            date: &r.date,
            time: &r.time,
            supervisor: &r.supervisor,
            comment: &r.comment,
            link: &r.link,
        });
    }
    for r in &snapshot.quality {
        notes.push(LogNote {
            dept: "Quality",
            date: &r.date,
            time: &r.time,
            supervisor: &r.supervisor,
            comment: &r.comment,
            link: &r.link,
        });
    }
    for r in &snapshot.stock {
        notes.push(LogNote {
            dept: "Stock",
            date: &r.date,
            time: &r.time,
            supervisor: &r.supervisor,
            comment: &r.comment,
            link: &r.link,
        });
    }
    for r in &snapshot.attendance {
        notes.push(LogNote {
            dept: "Attendance",
            date: &r.date,
            time: &r.time,
            supervisor: &r.supervisor,
            comment: &r.comment,
            link: &r.link,
        });
    }

    // Logs append chronologically, so the tail of each tab is the freshest.
    notes.retain(|note| !note.comment.is_empty());
    notes.reverse();
    notes.truncate(RECENT_NOTES);
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::build_dashboard;
    use crate::config::EngineConfig;
    use crate::models::{AttendanceRecord, FloorRecord, StockRecord};

    fn sample_snapshot() -> LogSnapshot {
        LogSnapshot {
            floor: vec![FloorRecord {
                date: "17/12/2025".to_string(),
                time: "6:55:00 PM".to_string(),
                supervisor: "Ravi Sharma".to_string(),
                comment: "all lines ran".to_string(),
                production: Some(11200.0),
                boxes: Some(12.0),
                ..Default::default()
            }],
            stock: vec![StockRecord {
                date: "17/12/2025".to_string(),
                items_added: Some(410.0),
                ..Default::default()
            }],
            attendance: vec![AttendanceRecord {
                date: "17/12/2025".to_string(),
                present: Some(43.0),
                absent: Some(2.0),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn report_covers_every_section() {
        let snapshot = sample_snapshot();
        let summary = build_dashboard(&snapshot, "17/12/2025", &EngineConfig::default());
        let report = build_report("17/12/2025", &snapshot, &summary);

        assert!(report.contains("# Daily Check-in Report"));
        assert!(report.contains("11200 units across 12 boxes"));
        assert!(report.contains("- Stock: 410 items added"));
        assert!(report.contains("- Attendance: 2 absent"));
        assert!(report.contains("Ravi Sharma score 1.00"));
        assert!(report.contains("No anomalies detected for this window."));
        assert!(report.contains("(Floor): all lines ran"));
        assert!(report.contains("- 17/12/2025: 11200 units"));
    }

    #[test]
    fn empty_summary_renders_placeholders() {
        let report = build_report("17/12/2025", &LogSnapshot::default(), &DashboardSummary::default());
        assert!(report.contains("No attributed production in the history."));
        assert!(report.contains("No comments logged."));
        assert!(report.contains("No logged days yet."));
        assert!(report.contains("Quality score: 100"));
    }
}
