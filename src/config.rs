use clap::ValueEnum;

/// How the leaderboard's weekly/monthly counters treat period boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResetPolicy {
    /// Plain running sums over every row in the fetched range (matches the
    /// upstream sheet logic, which never resets).
    Running,
    /// Count a row toward the weekly score only in the query date's ISO week,
    /// and toward the monthly score only in its calendar month.
    Calendar,
}

#[derive(Debug, Clone)]
pub struct Department {
    pub id: String,
    pub name: String,
    /// First column of this department's 4-column block in the master day
    /// grid: completed, supervisor, timestamp, comment.
    pub start_col: usize,
    /// Verification-only departments log check-ins but never compete on the
    /// leaderboard.
    pub verification_only: bool,
}

/// Process-wide tuning for the analytics engine. Constructed once and passed
/// by reference into every engine function so tests can swap thresholds.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Expected units per packed box, the efficiency denominator.
    pub standard_units_per_box: f64,
    /// A daily total whose z-score falls below the negative of this flags a
    /// production-drop anomaly.
    pub anomaly_threshold: f64,
    /// Minimum distinct logged days before anomaly detection runs at all.
    pub min_anomaly_history_days: usize,
    /// Trailing entries kept in the charting history series.
    pub history_window: usize,
    /// Supervisors retained in the performance index.
    pub top_supervisor_count: usize,
    /// Submission deadline in minutes from midnight; later scores zero.
    pub deadline_minutes: u32,
    /// Minute mark where submission points start decaying toward the deadline.
    pub points_decay_start: u32,
    pub score_reset: ResetPolicy,
    pub departments: Vec<Department>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            standard_units_per_box: 1000.0,
            anomaly_threshold: 2.0,
            min_anomaly_history_days: 3,
            history_window: 14,
            top_supervisor_count: 5,
            deadline_minutes: 1170,
            points_decay_start: 1080,
            score_reset: ResetPolicy::Running,
            departments: default_departments(),
        }
    }
}

fn default_departments() -> Vec<Department> {
    [
        ("floor", "Production (First Floor)", 1, false),
        ("basement", "Production (Basement)", 5, false),
        ("quality", "Quality Check", 9, false),
        ("stock", "Stock Availability", 13, false),
        ("attendance", "Attendance", 17, false),
        ("it_check", "IT Verification", 21, true),
    ]
    .into_iter()
    .map(|(id, name, start_col, verification_only)| Department {
        id: id.to_string(),
        name: name.to_string(),
        start_col,
        verification_only,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_blocks_do_not_overlap() {
        let config = EngineConfig::default();
        let mut cols: Vec<usize> = config.departments.iter().map(|d| d.start_col).collect();
        cols.sort();
        for pair in cols.windows(2) {
            assert!(pair[1] - pair[0] >= 4, "blocks are 4 columns wide");
        }
    }

    #[test]
    fn only_it_check_is_verification_only() {
        let config = EngineConfig::default();
        let verification: Vec<&str> = config
            .departments
            .iter()
            .filter(|d| d.verification_only)
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(verification, vec!["it_check"]);
    }
}
