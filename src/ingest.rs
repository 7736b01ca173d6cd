use crate::models::{AttendanceRecord, FloorRecord, QualityRecord, StockRecord};

/// Positional cell access; rows shorter than the schema read as empty cells.
pub(crate) fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn text(row: &[String], idx: usize) -> String {
    cell(row, idx).trim().to_string()
}

/// Coerces a raw cell into a number: grouping commas are stripped, the rest
/// must parse as a finite float, and anything containing a date separator is
/// refused so `17/12/2025` can never read as a number.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.contains('/') {
        return None;
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

/// A row only counts as a logged day when its date cell carries a separator;
/// header rows and half-filled rows fail this and are dropped silently.
fn logged_date(row: &[String]) -> Option<String> {
    let date = text(row, 0);
    if date.is_empty() || !date.contains('/') {
        return None;
    }
    Some(date)
}

pub fn normalize_floor(rows: &[Vec<String>]) -> Vec<FloorRecord> {
    rows.iter()
        .filter_map(|row| {
            let date = logged_date(row)?;
            Some(FloorRecord {
                date,
                time: text(row, 1),
                supervisor: text(row, 2),
                link: text(row, 3),
                comment: text(row, 4),
                production: coerce_number(cell(row, 5)),
                boxes: coerce_number(cell(row, 6)),
            })
        })
        .collect()
}

pub fn normalize_quality(rows: &[Vec<String>]) -> Vec<QualityRecord> {
    rows.iter()
        .filter_map(|row| {
            let date = logged_date(row)?;
            Some(QualityRecord {
                date,
                time: text(row, 1),
                supervisor: text(row, 2),
                link: text(row, 3),
                comment: text(row, 4),
                received: coerce_number(cell(row, 5)),
                ok: coerce_number(cell(row, 6)),
                rejected: coerce_number(cell(row, 7)),
            })
        })
        .collect()
}

pub fn normalize_stock(rows: &[Vec<String>]) -> Vec<StockRecord> {
    rows.iter()
        .filter_map(|row| {
            let date = logged_date(row)?;
            Some(StockRecord {
                date,
                time: text(row, 1),
                supervisor: text(row, 2),
                link: text(row, 3),
                comment: text(row, 4),
                items_added: coerce_number(cell(row, 5)),
            })
        })
        .collect()
}

pub fn normalize_attendance(rows: &[Vec<String>]) -> Vec<AttendanceRecord> {
    rows.iter()
        .filter_map(|row| {
            let date = logged_date(row)?;
            Some(AttendanceRecord {
                date,
                time: text(row, 1),
                supervisor: text(row, 2),
                link: text(row, 3),
                comment: text(row, 4),
                present: coerce_number(cell(row, 5)),
                absent: coerce_number(cell(row, 6)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn drops_rows_without_a_date_separator() {
        let rows = vec![
            row(&["Date", "Time", "Supervisor", "Link", "Comment", "Production", "Boxes"]),
            row(&["17/12/2025", "6:40 PM", "Ravi", "", "", "9000", "10"]),
            row(&["17 Dec", "6:40 PM", "Ravi", "", "", "9000", "10"]),
            row(&["", "", "", "", "", "", ""]),
        ];
        let records = normalize_floor(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "17/12/2025");
    }

    #[test]
    fn strips_grouping_separators_from_numbers() {
        let rows = vec![row(&["17/12/2025", "", "", "", "", "12,400", "1,2"])];
        let records = normalize_floor(&rows);
        assert_eq!(records[0].production, Some(12400.0));
        assert_eq!(records[0].boxes, Some(12.0));
    }

    #[test]
    fn date_like_cells_never_coerce_to_numbers() {
        assert_eq!(coerce_number("17/12/2025"), None);
        assert_eq!(coerce_number("1/2"), None);
        assert_eq!(coerce_number(" 9,000 "), Some(9000.0));
        assert_eq!(coerce_number("9e3"), Some(9000.0));
        assert_eq!(coerce_number("inf"), None);
        assert_eq!(coerce_number(""), None);
    }

    #[test]
    fn malformed_numeric_cells_degrade_to_none() {
        let rows = vec![row(&["17/12/2025", "", "Ravi", "", "", "n/a", "ten"])];
        let records = normalize_floor(&rows);
        assert_eq!(records[0].production, None);
        assert_eq!(records[0].boxes, None);
    }

    #[test]
    fn short_rows_read_missing_cells_as_empty() {
        let rows = vec![row(&["17/12/2025"])];
        let records = normalize_quality(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].supervisor, "");
        assert_eq!(records[0].ok, None);
        assert_eq!(records[0].rejected, None);
    }

    #[test]
    fn string_fields_are_trimmed() {
        let rows = vec![row(&["17/12/2025", " 8:05 AM ", "  Meena Iyer ", "", " ok ", "4", "1"])];
        let records = normalize_attendance(&rows);
        assert_eq!(records[0].time, "8:05 AM");
        assert_eq!(records[0].supervisor, "Meena Iyer");
        assert_eq!(records[0].comment, "ok");
        assert_eq!(records[0].present, Some(4.0));
    }
}
