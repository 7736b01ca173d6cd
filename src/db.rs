use std::path::Path;

use anyhow::Context;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::ingest;
use crate::models::LogSnapshot;

pub const FLOOR_TAB: &str = "DB_Floor";
pub const BASEMENT_TAB: &str = "DB_Basement";
pub const QUALITY_TAB: &str = "DB_Quality";
pub const STOCK_TAB: &str = "DB_Stock";
pub const ATTENDANCE_TAB: &str = "DB_Attendance";
pub const MASTER_TAB: &str = "Master";

const UPSERT_ROW: &str = r#"
    INSERT INTO checkin_analytics.sheet_rows (id, tab, cells, source_key)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (source_key) DO UPDATE
    SET cells = EXCLUDED.cells
"#;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Bulk fetch of one tab's raw cells in append order. This is the engine's
/// only read path against the store.
pub async fn fetch_tab_rows(pool: &PgPool, tab: &str) -> anyhow::Result<Vec<Vec<String>>> {
    let rows = sqlx::query(
        "SELECT cells FROM checkin_analytics.sheet_rows WHERE tab = $1 ORDER BY position",
    )
    .bind(tab)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| row.get::<Vec<String>, _>("cells"))
        .collect())
}

/// Fetches the five department log tabs and normalizes them into one typed
/// snapshot. Basement logs share the floor schema and are unioned into the
/// floor list.
pub async fn fetch_snapshot(pool: &PgPool) -> anyhow::Result<LogSnapshot> {
    let floor_raw = fetch_tab_rows(pool, FLOOR_TAB).await?;
    let basement_raw = fetch_tab_rows(pool, BASEMENT_TAB).await?;
    let quality_raw = fetch_tab_rows(pool, QUALITY_TAB).await?;
    let stock_raw = fetch_tab_rows(pool, STOCK_TAB).await?;
    let attendance_raw = fetch_tab_rows(pool, ATTENDANCE_TAB).await?;

    let mut floor = ingest::normalize_floor(&floor_raw);
    floor.extend(ingest::normalize_floor(&basement_raw));

    Ok(LogSnapshot {
        floor,
        quality: ingest::normalize_quality(&quality_raw),
        stock: ingest::normalize_stock(&stock_raw),
        attendance: ingest::normalize_attendance(&attendance_raw),
    })
}

/// Imports a headerless CSV export of one tab. Row `i` is keyed
/// `"{tab}-row-{i}"` so re-importing the same export refreshes cells in place
/// instead of appending duplicates.
pub async fn import_csv(pool: &PgPool, tab: &str, csv_path: &Path) -> anyhow::Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;

    let mut imported = 0usize;
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();

        let result = sqlx::query(UPSERT_ROW)
            .bind(Uuid::new_v4())
            .bind(tab)
            .bind(&cells)
            .bind(format!("{tab}-row-{index}"))
            .execute(pool)
            .await?;

        if result.rows_affected() > 0 {
            imported += 1;
        }
    }

    Ok(imported)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let tabs: Vec<(&str, Vec<Vec<&str>>)> = vec![
        (
            FLOOR_TAB,
            vec![
                vec!["Date", "Time", "Supervisor", "Sheet Link", "Comment", "Production", "Boxes"],
                vec!["14/12/2025", "6:35:00 PM", "Ravi Sharma", "", "full shift", "11,800", "12"],
                vec!["15/12/2025", "6:50:00 PM", "Ravi Sharma", "", "", "12,400", "13"],
                vec!["15/12/2025", "7:05:00 PM", "Asha Nair", "", "second line", "9,600", "10"],
                vec!["16/12/2025", "6:48:00 PM", "Asha Nair", "", "", "10,150", "11"],
                vec!["17/12/2025", "6:55:00 PM", "Ravi Sharma", "", "", "11,200", "12"],
            ],
        ),
        (
            BASEMENT_TAB,
            vec![
                vec!["Date", "Time", "Supervisor", "Sheet Link", "Comment", "Production", "Boxes"],
                vec!["15/12/2025", "7:10:00 PM", "Anil Kumar", "", "", "4,200", "5"],
                vec!["16/12/2025", "7:02:00 PM", "Anil Kumar", "", "", "3,900", "4"],
            ],
        ),
        (
            QUALITY_TAB,
            vec![
                vec!["Date", "Time", "Supervisor", "Sheet Link", "Comment", "Received", "OK", "Rejected"],
                vec!["15/12/2025", "7:20:00 PM", "Meena Iyer", "", "", "16,600", "16,100", "500"],
                vec!["16/12/2025", "7:12:00 PM", "Meena Iyer", "", "batch recheck", "14,050", "13,400", "650"],
                vec!["17/12/2025", "7:08:00 PM", "Meena Iyer", "", "", "11,200", "10,900", "300"],
            ],
        ),
        (
            STOCK_TAB,
            vec![
                vec!["Date", "Time", "Supervisor", "Sheet Link", "Comment", "Items Added"],
                vec!["15/12/2025", "5:40:00 PM", "Farhan Ali", "", "", "320"],
                vec!["17/12/2025", "5:55:00 PM", "Farhan Ali", "", "restock", "410"],
            ],
        ),
        (
            ATTENDANCE_TAB,
            vec![
                vec!["Date", "Time", "Supervisor", "Sheet Link", "Comment", "Present", "Absent"],
                vec!["15/12/2025", "9:20:00 AM", "Sunita Rao", "", "", "42", "3"],
                vec!["16/12/2025", "9:15:00 AM", "Sunita Rao", "", "", "44", "1"],
                vec!["17/12/2025", "9:25:00 AM", "Sunita Rao", "", "two on leave", "43", "2"],
            ],
        ),
        (MASTER_TAB, master_seed_rows()),
    ];

    for (tab, rows) in tabs {
        for (index, cells) in rows.into_iter().enumerate() {
            let cells: Vec<String> = cells.into_iter().map(str::to_string).collect();
            sqlx::query(UPSERT_ROW)
                .bind(Uuid::new_v4())
                .bind(tab)
                .bind(&cells)
                .bind(format!("seed-{tab}-{index}"))
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}

/// Master day grid: date, then 4 columns per department block in the default
/// layout (completed, supervisor, timestamp, comment).
fn master_seed_rows() -> Vec<Vec<&'static str>> {
    vec![
        vec![
            "15/12/2025",
            "TRUE", "Ravi Sharma", "6:50:00 PM", "",
            "TRUE", "Anil Kumar", "7:10:00 PM", "",
            "TRUE", "Meena Iyer", "7:20:00 PM", "",
            "TRUE", "Farhan Ali", "5:40:00 PM", "",
            "TRUE", "Sunita Rao", "9:20:00 AM", "",
            "TRUE", "Dev Patel", "8:00:00 PM", "",
        ],
        vec![
            "16/12/2025",
            "TRUE", "Asha Nair", "6:48:00 PM", "",
            "TRUE", "Anil Kumar", "7:02:00 PM", "",
            "TRUE", "Meena Iyer", "7:12:00 PM", "recheck",
            "", "", "", "",
            "TRUE", "Sunita Rao", "9:15:00 AM", "",
            "TRUE", "Dev Patel", "🔴 LATE 8:05:00 PM", "",
        ],
        vec![
            "17/12/2025",
            "TRUE", "Ravi Sharma", "6:55:00 PM", "",
            "", "", "", "",
            "TRUE", "Meena Iyer", "7:08:00 PM", "",
            "TRUE", "Farhan Ali", "5:55:00 PM", "",
            "TRUE", "Sunita Rao", "9:25:00 AM", "",
            "TRUE", "Dev Patel", "6:30:00 PM", "",
        ],
    ]
}
