use std::fmt;

use serde::Serialize;

/// One normalized floor log row. Basement production logs share this shape
/// and are unioned into the floor list at fetch time.
#[derive(Debug, Clone, Default)]
pub struct FloorRecord {
    pub date: String,
    pub time: String,
    pub supervisor: String,
    pub link: String,
    pub comment: String,
    pub production: Option<f64>,
    pub boxes: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct QualityRecord {
    pub date: String,
    pub time: String,
    pub supervisor: String,
    pub link: String,
    pub comment: String,
    pub received: Option<f64>,
    pub ok: Option<f64>,
    pub rejected: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct StockRecord {
    pub date: String,
    pub time: String,
    pub supervisor: String,
    pub link: String,
    pub comment: String,
    pub items_added: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceRecord {
    pub date: String,
    pub time: String,
    pub supervisor: String,
    pub link: String,
    pub comment: String,
    pub present: Option<f64>,
    pub absent: Option<f64>,
}

/// One immutable fetch of the department logs; everything the dashboard
/// engine reads comes from here.
#[derive(Debug, Clone, Default)]
pub struct LogSnapshot {
    pub floor: Vec<FloorRecord>,
    pub quality: Vec<QualityRecord>,
    pub stock: Vec<StockRecord>,
    pub attendance: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSet {
    pub total_production: f64,
    pub efficiency: i64,
    pub rejection_rate: String,
    pub quality_score: i64,
    pub total_boxes: f64,
    pub staff_present: f64,
}

impl Default for KpiSet {
    fn default() -> Self {
        Self {
            total_production: 0.0,
            efficiency: 0,
            rejection_rate: "0.0".to_string(),
            // A day with no quality rows counts as perfect, by policy.
            quality_score: 100,
            total_boxes: 0.0,
            staff_present: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorScore {
    pub name: String,
    pub score: f64,
    pub total_output: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Anomaly {
    pub dept: String,
    pub metric: String,
    pub value: f64,
    pub average: i64,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    pub date: String,
    pub production: f64,
}

/// The assembled dashboard response. `Default` is the degraded output served
/// when the store fetch fails.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub kpis: KpiSet,
    pub history: Vec<HistoryPoint>,
    pub supervisor_scores: Vec<SupervisorScore>,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub supervisor: String,
    pub today_time: Option<String>,
    pub points: i64,
    pub weekly_score: i64,
    pub monthly_score: i64,
}
