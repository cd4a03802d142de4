//! Tabular export of an [`AttendanceView`]: CSV and xlsx.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Deserialize;
use strum_macros::{Display, EnumString};
use thiserror::Error;
use utoipa::ToSchema;

use super::aggregator::{AttendanceView, PeriodTotals};
use crate::model::employee::Employee;

const SHEET_NAME: &str = "Presence Sheet";
const TOTAL_LABEL: &str = "TOTAL";
const DEFAULT_DEPARTMENT: &str = "General";
/// Zero-based row the table header lands on in the spreadsheet.
const XLSX_TABLE_ROW: u32 = 3;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet export failed: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("export buffer failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn file_name(self, reference: NaiveDate) -> String {
        format!("presence-sheet-{}.{}", reference.format("%Y-%m-%d"), self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

/// Header plus one row per employee and a closing grand-total row.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

pub fn table(view: &AttendanceView) -> ExportTable {
    let mut header = vec!["Employee".to_string()];
    header.extend(view.working_days.iter().map(|d| d.format("%d/%m").to_string()));
    header.extend(
        ["Days Present", "Regular Hours", "Extra Hours", "Total Hours"]
            .iter()
            .map(|s| s.to_string()),
    );

    let mut rows: Vec<Vec<Cell>> = view
        .employees
        .iter()
        .map(|e| {
            let mut row = vec![Cell::Text(e.employee.full_name())];
            row.extend(view.working_days.iter().map(|day| {
                let present = e
                    .daily_records
                    .iter()
                    .any(|r| r.date == *day && r.present);
                Cell::Text(if present { "P" } else { "F" }.to_string())
            }));
            row.extend(totals_cells(&e.totals));
            row
        })
        .collect();

    let mut total_row = vec![Cell::Text(TOTAL_LABEL.to_string())];
    total_row.extend(
        view.working_days
            .iter()
            .map(|day| Cell::Number(view.present_on(*day) as f64)),
    );
    total_row.extend(totals_cells(&view.grand_totals));
    rows.push(total_row);

    ExportTable { header, rows }
}

fn totals_cells(totals: &PeriodTotals) -> [Cell; 4] {
    [
        Cell::Text(format!("{:.1}", totals.days_present)),
        Cell::Number(totals.regular_hours),
        Cell::Number(totals.extra_hours),
        Cell::Number(totals.total_hours),
    ]
}

pub fn export(view: &AttendanceView, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => to_csv(view),
        ExportFormat::Xlsx => to_xlsx(view),
    }
}

pub fn to_csv(view: &AttendanceView) -> Result<Vec<u8>, ExportError> {
    let table = table(view);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.header)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::render))?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

pub fn to_xlsx(view: &AttendanceView) -> Result<Vec<u8>, ExportError> {
    let table = table(view);
    let (department, team_lead) = preamble(view);
    let bold = Format::new().set_bold();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    sheet.write_string_with_format(0, 0, "Department:", &bold)?;
    sheet.write_string(0, 1, &department)?;
    sheet.write_string_with_format(1, 0, "Team Lead:", &bold)?;
    sheet.write_string(1, 1, &team_lead)?;

    for (col, title) in table.header.iter().enumerate() {
        sheet.write_string_with_format(XLSX_TABLE_ROW, col as u16, title, &bold)?;
    }
    for (offset, row) in table.rows.iter().enumerate() {
        let row_idx = XLSX_TABLE_ROW + 1 + offset as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(s) => sheet.write_string(row_idx, col as u16, s)?,
                Cell::Number(n) => sheet.write_number(row_idx, col as u16, *n)?,
            };
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Department and team lead shared by every listed employee, if any.
fn preamble(view: &AttendanceView) -> (String, String) {
    let shared = |pick: fn(&Employee) -> Option<&String>| {
        let mut values = view.employees.iter().map(|e| pick(&e.employee));
        let first = values.next().flatten()?;
        values
            .all(|v| v == Some(first))
            .then(|| first.clone())
    };

    (
        shared(|e| e.department.as_ref()).unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string()),
        shared(|e| e.team_lead.as_ref()).unwrap_or_default(),
    )
}
