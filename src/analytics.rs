use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::models::{
    Anomaly, DashboardSummary, FloorRecord, HistoryPoint, KpiSet, LogSnapshot, Severity,
    SupervisorScore, Trend,
};

const REJECT_PENALTY: f64 = 1.5;
const SEVERE_Z: f64 = 3.0;

/// Runs the four dashboard aggregations over one immutable snapshot. `today`
/// is a date string in the same textual form as the logged dates; the string
/// match is the join between "now" and history.
pub fn build_dashboard(snapshot: &LogSnapshot, today: &str, config: &EngineConfig) -> DashboardSummary {
    let kpis = compute_kpis(snapshot, today, config);
    let supervisor_scores = score_supervisors(&snapshot.floor, config);
    let anomalies = detect_anomalies(&snapshot.floor, kpis.total_production, config);
    let history = aggregate_history(&snapshot.floor, config);

    DashboardSummary {
        kpis,
        history,
        supervisor_scores,
        anomalies,
    }
}

pub fn compute_kpis(snapshot: &LogSnapshot, today: &str, config: &EngineConfig) -> KpiSet {
    let mut total_production = 0.0;
    let mut total_boxes = 0.0;
    for record in snapshot.floor.iter().filter(|r| r.date == today) {
        total_production += record.production.unwrap_or(0.0);
        total_boxes += record.boxes.unwrap_or(0.0);
    }

    let efficiency = if total_boxes > 0.0 {
        (total_production / (total_boxes * config.standard_units_per_box) * 100.0).round() as i64
    } else {
        0
    };

    let mut total_ok = 0.0;
    let mut total_rejected = 0.0;
    for record in snapshot.quality.iter().filter(|r| r.date == today) {
        total_ok += record.ok.unwrap_or(0.0);
        total_rejected += record.rejected.unwrap_or(0.0);
    }
    let q_total = total_ok + total_rejected;

    let rejection_rate = if q_total > 0.0 {
        format!("{:.1}", total_rejected / q_total * 100.0)
    } else {
        "0.0".to_string()
    };
    let quality_score = if q_total > 0.0 {
        (((total_ok - total_rejected * REJECT_PENALTY) / q_total * 100.0).round() as i64).max(0)
    } else {
        100
    };

    let staff_present = snapshot
        .attendance
        .iter()
        .filter(|r| r.date == today)
        .map(|r| r.present.unwrap_or(0.0))
        .sum();

    KpiSet {
        total_production,
        efficiency,
        rejection_rate,
        quality_score,
        total_boxes,
        staff_present,
    }
}

/// Scores every supervisor against the department-wide production mean over
/// the full floor history. Records with no supervisor or no production output
/// carry no attribution and are skipped; they still count (as zero) toward
/// the department mean.
pub fn score_supervisors(floor: &[FloorRecord], config: &EngineConfig) -> Vec<SupervisorScore> {
    let mut first_seen: Vec<&str> = Vec::new();
    let mut outputs_by_supervisor: HashMap<&str, Vec<f64>> = HashMap::new();
    for record in floor {
        let Some(production) = record.production else {
            continue;
        };
        if record.supervisor.is_empty() || production == 0.0 {
            continue;
        }
        outputs_by_supervisor
            .entry(record.supervisor.as_str())
            .or_insert_with(|| {
                first_seen.push(record.supervisor.as_str());
                Vec::new()
            })
            .push(production);
    }

    let dept_total: f64 = floor.iter().map(|r| r.production.unwrap_or(0.0)).sum();
    let dept_average = dept_total / floor.len().max(1) as f64;
    let divisor = if dept_average == 0.0 { 1.0 } else { dept_average };

    let mut scores: Vec<SupervisorScore> = Vec::with_capacity(first_seen.len());
    for name in first_seen {
        let Some(outputs) = outputs_by_supervisor.get(name) else {
            continue;
        };
        let Some(&last_output) = outputs.last() else {
            continue;
        };
        let total_output: f64 = outputs.iter().sum();
        let avg = total_output / outputs.len() as f64;

        let trend = if last_output > avg * 1.1 {
            Trend::Up
        } else if last_output < avg * 0.9 {
            Trend::Down
        } else {
            Trend::Stable
        };

        scores.push(SupervisorScore {
            name: name.to_string(),
            score: (avg / divisor * 100.0).round() / 100.0,
            total_output,
            trend,
        });
    }

    scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scores.truncate(config.top_supervisor_count);
    scores
}

/// Flags a statistically abnormal drop in today's production total against
/// the historical per-day series. When today is already logged in the history
/// it contributes to its own baseline.
pub fn detect_anomalies(
    floor: &[FloorRecord],
    today_production: f64,
    config: &EngineConfig,
) -> Vec<Anomaly> {
    let daily_totals = daily_production_totals(floor);
    if daily_totals.len() < config.min_anomaly_history_days {
        return Vec::new();
    }

    let values: Vec<f64> = daily_totals.into_iter().map(|(_, total)| total).collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let std_dev = variance.sqrt();
    let z_score = (today_production - mean) / if std_dev == 0.0 { 1.0 } else { std_dev };

    let mut anomalies = Vec::new();
    if z_score < -config.anomaly_threshold {
        anomalies.push(Anomaly {
            dept: "Floor".to_string(),
            metric: "Production Drop".to_string(),
            value: today_production,
            average: mean.round() as i64,
            severity: if z_score < -SEVERE_Z {
                Severity::High
            } else {
                Severity::Medium
            },
        });
    }
    anomalies
}

/// Rolling series of daily production totals for charting, trimmed to the
/// trailing window. The window is positional, not calendar-aware.
pub fn aggregate_history(floor: &[FloorRecord], config: &EngineConfig) -> Vec<HistoryPoint> {
    let totals = daily_production_totals(floor);
    let skip = totals.len().saturating_sub(config.history_window);
    totals
        .into_iter()
        .skip(skip)
        .map(|(date, production)| HistoryPoint { date, production })
        .collect()
}

/// Sums production per distinct date string, in first-seen date order. Two
/// spellings of the same calendar day stay distinct on purpose.
fn daily_production_totals(floor: &[FloorRecord]) -> Vec<(String, f64)> {
    let mut first_seen: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();
    for record in floor {
        let entry = totals.entry(record.date.clone()).or_insert_with(|| {
            first_seen.push(record.date.clone());
            0.0
        });
        *entry += record.production.unwrap_or(0.0);
    }

    first_seen
        .into_iter()
        .map(|date| {
            let total = totals.remove(&date).unwrap_or(0.0);
            (date, total)
        })
        .collect()
}
