use chrono::{Datelike, NaiveDate};

use crate::config::{EngineConfig, ResetPolicy};
use crate::ingest::cell;
use crate::models::LeaderboardEntry;

/// Sentinel for "no submission"; sorts after every real clock time.
const NO_SUBMISSION_MINUTES: u32 = 9999;
const LATE_MARKER: &str = "🔴 LATE";
const SUPERVISOR_OFFSET: usize = 1;
const TIMESTAMP_OFFSET: usize = 2;

const MAX_BASE_POINTS: i64 = 100;
const MIN_ON_TIME_POINTS: i64 = 10;

/// Format used by the master grid's date column when it parses at all.
const MASTER_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parses a submission timestamp like `7:15:00 PM` (optionally tagged with
/// the late marker) into minutes from midnight. Seconds are ignored.
pub fn parse_submission_minutes(timestamp: &str) -> Option<u32> {
    let cleaned = timestamp.replace(LATE_MARKER, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let mut parts = cleaned.split_whitespace();
    let clock = parts.next()?;
    let modifier = parts.next().unwrap_or("");

    let mut clock_parts = clock.split(':');
    let mut hours: u32 = clock_parts.next()?.trim().parse().ok()?;
    let minutes: u32 = clock_parts.next()?.trim().parse().ok()?;

    if modifier == "PM" && hours != 12 {
        hours += 12;
    }
    if modifier == "AM" && hours == 12 {
        hours = 0;
    }
    Some(hours * 60 + minutes)
}

/// Earlier is better: full marks before the decay window opens, then two
/// minutes per point down to the on-time floor, then nothing after the
/// deadline. Submissions before the decay start score above the base.
pub fn points_for_submission(minutes: u32, config: &EngineConfig) -> i64 {
    if minutes > config.deadline_minutes {
        return 0;
    }
    let decay = (i64::from(minutes) - i64::from(config.points_decay_start)).div_euclid(2);
    (MAX_BASE_POINTS - decay).max(MIN_ON_TIME_POINTS)
}

/// Rebuilds the leaderboard from scratch over the master day-grid rows. One
/// entry per competing department; verification-only departments are skipped.
pub fn build_leaderboard(
    rows: &[Vec<String>],
    today: NaiveDate,
    config: &EngineConfig,
) -> Vec<LeaderboardEntry> {
    let competing: Vec<_> = config
        .departments
        .iter()
        .filter(|d| !d.verification_only)
        .collect();

    let mut entries: Vec<LeaderboardEntry> = competing
        .iter()
        .map(|dept| LeaderboardEntry {
            id: dept.id.clone(),
            name: dept.name.clone(),
            supervisor: "Unknown".to_string(),
            today_time: None,
            points: 0,
            weekly_score: 0,
            monthly_score: 0,
        })
        .collect();

    let today_digits = today.day().to_string();

    for row in rows {
        let row_date = cell(row, 0).trim();
        let (counts_weekly, counts_monthly) = period_membership(row_date, today, config.score_reset);
        // Loose heuristic carried over from the sheet logic: a row is "today"
        // when its date cell contains today's day-of-month digits.
        let is_today = !row_date.is_empty() && row_date.contains(&today_digits);

        for (entry, dept) in entries.iter_mut().zip(competing.iter()) {
            let supervisor = cell(row, dept.start_col + SUPERVISOR_OFFSET).trim();
            let timestamp = cell(row, dept.start_col + TIMESTAMP_OFFSET).trim();
            if timestamp.is_empty() {
                continue;
            }

            let daily_points = match parse_submission_minutes(timestamp) {
                Some(minutes) => points_for_submission(minutes, config),
                None => 0,
            };

            if counts_weekly {
                entry.weekly_score += daily_points;
            }
            if counts_monthly {
                entry.monthly_score += daily_points;
            }
            if !supervisor.is_empty() {
                entry.supervisor = supervisor.to_string();
            }
            if is_today {
                entry.today_time = Some(timestamp.to_string());
                entry.points = daily_points;
            }
        }
    }

    entries.sort_by_key(|entry| {
        entry
            .today_time
            .as_deref()
            .and_then(parse_submission_minutes)
            .unwrap_or(NO_SUBMISSION_MINUTES)
    });
    entries
}

fn period_membership(row_date: &str, today: NaiveDate, policy: ResetPolicy) -> (bool, bool) {
    match policy {
        ResetPolicy::Running => (true, true),
        ResetPolicy::Calendar => match NaiveDate::parse_from_str(row_date, MASTER_DATE_FORMAT) {
            Ok(date) => (
                date.iso_week() == today.iso_week(),
                date.month() == today.month() && date.year() == today.year(),
            ),
            Err(_) => (false, false),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 17).unwrap()
    }

    /// Master row: date, then a 4-column block per department at the default
    /// start columns (floor@1, basement@5, quality@9, stock@13,
    /// attendance@17, it_check@21).
    fn master_row(date: &str, blocks: &[(usize, &str, &str)]) -> Vec<String> {
        let mut row = vec![String::new(); 25];
        row[0] = date.to_string();
        for (start_col, supervisor, timestamp) in blocks {
            row[*start_col] = "TRUE".to_string();
            row[start_col + 1] = supervisor.to_string();
            row[start_col + 2] = timestamp.to_string();
        }
        row
    }

    #[test]
    fn parses_twelve_hour_timestamps() {
        assert_eq!(parse_submission_minutes("7:15:00 PM"), Some(1155));
        assert_eq!(parse_submission_minutes("8:00:00 PM"), Some(1200));
        assert_eq!(parse_submission_minutes("12:05:00 AM"), Some(5));
        assert_eq!(parse_submission_minutes("12:30:00 PM"), Some(750));
        assert_eq!(parse_submission_minutes("🔴 LATE 8:05:00 PM"), Some(1205));
        assert_eq!(parse_submission_minutes(""), None);
        assert_eq!(parse_submission_minutes("pending"), None);
    }

    #[test]
    fn points_decay_toward_the_deadline() {
        let config = EngineConfig::default();
        // 7:15 PM: 100 - floor((1155-1080)/2) = 63.
        assert_eq!(points_for_submission(1155, &config), 63);
        // Past the 7:30 PM deadline scores nothing.
        assert_eq!(points_for_submission(1200, &config), 0);
        // On the deadline still counts.
        assert_eq!(points_for_submission(1170, &config), 55);
        // Early submissions are not capped at the base.
        assert_eq!(points_for_submission(600, &config), 340);
    }

    #[test]
    fn late_deadlines_hit_the_on_time_floor() {
        let config = EngineConfig {
            deadline_minutes: 1440,
            ..EngineConfig::default()
        };
        assert_eq!(points_for_submission(1300, &config), 10);
    }

    #[test]
    fn earlier_submission_ranks_first() {
        let rows = vec![master_row(
            "17/12/2025",
            &[(1, "Ravi", "7:15:00 PM"), (9, "Meena", "6:50:00 PM")],
        )];
        let board = build_leaderboard(&rows, test_date(), &EngineConfig::default());

        assert_eq!(board[0].id, "quality");
        assert_eq!(board[0].today_time.as_deref(), Some("6:50:00 PM"));
        assert_eq!(board[0].points, 75);
        assert_eq!(board[1].id, "floor");
        assert_eq!(board[1].points, 63);
    }

    #[test]
    fn departments_without_a_submission_sort_last() {
        let rows = vec![master_row("17/12/2025", &[(9, "Meena", "6:50:00 PM")])];
        let board = build_leaderboard(&rows, test_date(), &EngineConfig::default());

        assert_eq!(board[0].id, "quality");
        for entry in &board[1..] {
            assert!(entry.today_time.is_none());
            assert_eq!(entry.points, 0);
        }
    }

    #[test]
    fn verification_departments_never_compete() {
        let rows = vec![master_row("17/12/2025", &[(21, "IT", "1:00:00 PM")])];
        let board = build_leaderboard(&rows, test_date(), &EngineConfig::default());
        assert_eq!(board.len(), 5);
        assert!(!board.iter().any(|e| e.id == "it_check"));
    }

    #[test]
    fn running_totals_accumulate_across_every_row() {
        let rows = vec![
            master_row("15/12/2025", &[(1, "Ravi", "6:50:00 PM")]),
            master_row("16/12/2025", &[(1, "Ravi", "7:15:00 PM")]),
            master_row("17/12/2025", &[(1, "Ravi", "7:00:00 PM")]),
        ];
        let board = build_leaderboard(&rows, test_date(), &EngineConfig::default());
        let floor = board.iter().find(|e| e.id == "floor").unwrap();

        // 75 + 63 + 70, never reset.
        assert_eq!(floor.weekly_score, 208);
        assert_eq!(floor.monthly_score, 208);
        assert_eq!(floor.points, 70);
        assert_eq!(floor.today_time.as_deref(), Some("7:00:00 PM"));
    }

    #[test]
    fn calendar_policy_bounds_the_counters() {
        let config = EngineConfig {
            score_reset: crate::config::ResetPolicy::Calendar,
            ..EngineConfig::default()
        };
        let rows = vec![
            // Previous month: counts toward neither window.
            master_row("28/11/2025", &[(1, "Ravi", "6:50:00 PM")]),
            // Same month, previous ISO week: monthly only.
            master_row("8/12/2025", &[(1, "Ravi", "6:50:00 PM")]),
            // Same ISO week as the 17th: both.
            master_row("15/12/2025", &[(1, "Ravi", "7:00:00 PM")]),
        ];
        let board = build_leaderboard(&rows, test_date(), &config);
        let floor = board.iter().find(|e| e.id == "floor").unwrap();

        assert_eq!(floor.weekly_score, 70);
        assert_eq!(floor.monthly_score, 145);
    }

    #[test]
    fn latest_supervisor_name_wins() {
        let rows = vec![
            master_row("15/12/2025", &[(1, "Ravi", "6:50:00 PM")]),
            master_row("16/12/2025", &[(1, "Anil", "7:00:00 PM")]),
        ];
        let board = build_leaderboard(&rows, test_date(), &EngineConfig::default());
        let floor = board.iter().find(|e| e.id == "floor").unwrap();
        assert_eq!(floor.supervisor, "Anil");
        // Neither row matched today, so no today stats.
        assert!(floor.today_time.is_none());
    }

    #[test]
    fn unparseable_timestamp_earns_nothing_but_still_records_today() {
        let rows = vec![master_row("17/12/2025", &[(1, "Ravi", "pending")])];
        let board = build_leaderboard(&rows, test_date(), &EngineConfig::default());
        let floor = board.iter().find(|e| e.id == "floor").unwrap();
        assert_eq!(floor.points, 0);
        assert_eq!(floor.today_time.as_deref(), Some("pending"));
    }
}
