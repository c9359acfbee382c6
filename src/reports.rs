//! Report read path and xlsx exporter, sharing the report filter with the
//! preview endpoint.

use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    db::{
        filter::ReportFilter,
        todos::{Priority, Status},
    },
    format,
};

const SHEET_NAME: &str = "TodoList Report";
const HEADERS: [&str; 6] = [
    "Title",
    "Assignee",
    "Due Date",
    "Time Tracked (Hours)",
    "Status",
    "Priority",
];
const MAX_COLUMN_WIDTH: usize = 50;
const HEADER_FILL: u32 = 0x00E2_E8F0;
const SUMMARY_FILL: u32 = 0x00FE_F3C7;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub title: Option<String>,
    pub assignee: String,
    pub due_date: Option<NaiveDate>,
    pub time_tracked: i64,
    pub status: Status,
    pub priority: Option<Priority>,
}

/// One rendered report line; also the preview endpoint's row shape.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedRow {
    pub title: String,
    pub assigne: String,
    pub due_date: String,
    pub time_tracked: i64,
    pub status: String,
    pub priority: String,
}

impl From<&ReportRow> for RenderedRow {
    fn from(row: &ReportRow) -> Self {
        Self {
            title: row.title.clone().unwrap_or_default(),
            assigne: if row.assignee.is_empty() {
                "-".to_string()
            } else {
                row.assignee.clone()
            },
            due_date: row
                .due_date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "-".to_string()),
            time_tracked: row.time_tracked,
            status: format::humanize(row.status.as_str()),
            priority: row
                .priority
                .map(|priority| format::humanize(priority.as_str()))
                .unwrap_or_default(),
        }
    }
}

pub fn total_time_tracked(rows: &[ReportRow]) -> i64 {
    rows.iter().map(|row| row.time_tracked).sum()
}

pub struct ReportRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReportRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Filtered read shared by export and preview, ordered by due date.
    pub async fn fetch_rows(&self, filter: &ReportFilter) -> Result<Vec<ReportRow>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT title, assignee, due_date, time_tracked, status, priority FROM todos",
        );
        filter.push_conditions(&mut query);
        query.push(" ORDER BY due_date ASC");

        query.build_query_as::<ReportRow>().fetch_all(self.pool).await
    }
}

/// Build the export workbook: header row, one row per record, two blank rows,
/// then the total-time summary row. Zero records still produce a complete
/// sheet with header and summary.
pub fn build_workbook(rows: &[ReportRow]) -> Result<Vec<u8>, XlsxError> {
    let rendered: Vec<RenderedRow> = rows.iter().map(RenderedRow::from).collect();
    let total = total_time_tracked(rows);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let border = Format::new().set_border(FormatBorder::Thin);
    let header = Format::new()
        .set_bold()
        .set_font_size(12)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);
    let summary = Format::new()
        .set_bold()
        .set_font_size(11)
        .set_background_color(Color::RGB(SUMMARY_FILL))
        .set_border(FormatBorder::Thin);

    for (col, name) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, row) in rendered.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string_with_format(r, 0, row.title.as_str(), &border)?;
        worksheet.write_string_with_format(r, 1, row.assigne.as_str(), &border)?;
        worksheet.write_string_with_format(r, 2, row.due_date.as_str(), &border)?;
        worksheet.write_number_with_format(r, 3, row.time_tracked as f64, &border)?;
        worksheet.write_string_with_format(r, 4, row.status.as_str(), &border)?;
        worksheet.write_string_with_format(r, 5, row.priority.as_str(), &border)?;
    }

    let summary_row = rendered.len() as u32 + 2;
    let summary_total = format!("{total} hours");
    worksheet.write_string_with_format(summary_row, 0, "SUMMARY", &summary)?;
    worksheet.write_string_with_format(summary_row, 2, "Total Time Tracked:", &summary)?;
    worksheet.write_string_with_format(summary_row, 3, summary_total.as_str(), &summary)?;

    // The blank spacer rows and the summary row's empty cells still carry the
    // grid border (and the summary fill on the summary row).
    for r in (rendered.len() as u32 + 1)..=summary_row {
        for c in 0..HEADERS.len() as u16 {
            if r == summary_row {
                if !matches!(c, 0 | 2 | 3) {
                    worksheet.write_blank(r, c, &summary)?;
                }
            } else {
                worksheet.write_blank(r, c, &border)?;
            }
        }
    }

    for (col, name) in HEADERS.iter().enumerate() {
        let mut longest = name.chars().count();
        for row in &rendered {
            let len = match col {
                0 => row.title.chars().count(),
                1 => row.assigne.chars().count(),
                2 => row.due_date.chars().count(),
                3 => row.time_tracked.to_string().chars().count(),
                4 => row.status.chars().count(),
                _ => row.priority.chars().count(),
            };
            longest = longest.max(len);
        }
        let summary_len = match col {
            0 => "SUMMARY".len(),
            2 => "Total Time Tracked:".len(),
            3 => summary_total.chars().count(),
            _ => 0,
        };
        longest = longest.max(summary_len);

        let width = (longest + 2).min(MAX_COLUMN_WIDTH);
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ReportRow {
        ReportRow {
            title: Some("Ship v1".to_string()),
            assignee: "Ana, Ben".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 9, 25),
            time_tracked: 90,
            status: Status::InProgress,
            priority: Some(Priority::High),
        }
    }

    #[test]
    fn rendered_row_substitutes_placeholders() {
        let row = ReportRow {
            title: None,
            assignee: String::new(),
            due_date: None,
            time_tracked: 0,
            status: Status::Pending,
            priority: None,
        };
        let rendered = RenderedRow::from(&row);
        assert_eq!(rendered.title, "");
        assert_eq!(rendered.assigne, "-");
        assert_eq!(rendered.due_date, "-");
        assert_eq!(rendered.status, "Pending");
        assert_eq!(rendered.priority, "");
    }

    #[test]
    fn rendered_row_humanizes_enums_and_keeps_iso_dates() {
        let rendered = RenderedRow::from(&sample_row());
        assert_eq!(rendered.due_date, "2026-09-25");
        assert_eq!(rendered.status, "In Progress");
        assert_eq!(rendered.priority, "High");
        assert_eq!(rendered.assigne, "Ana, Ben");
    }

    #[test]
    fn workbook_is_produced_even_for_zero_rows() {
        let buffer = build_workbook(&[]).unwrap();
        // xlsx files are zip archives; check the magic bytes.
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn workbook_with_rows_is_produced() {
        let rows = vec![sample_row(), sample_row()];
        let buffer = build_workbook(&rows).unwrap();
        assert!(!buffer.is_empty());
    }

    #[test]
    fn total_time_tracked_sums_all_rows() {
        let rows = vec![sample_row(), sample_row()];
        assert_eq!(total_time_tracked(&rows), 180);
        assert_eq!(total_time_tracked(&[]), 0);
    }
}
