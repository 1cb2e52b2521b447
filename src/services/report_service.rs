//! Trip report export
//!
//! Collects the trips of a date range into a tabular [`TripReport`] and
//! encodes it as an `.xlsx` workbook.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::sync::Arc;
use tracing::info;

use crate::models::trip::TripWithRelations;
use crate::repositories::TripRepository;
use crate::utils::errors::{validation_error, AppError, AppResult};
use crate::utils::time::{days_window, format_report_timestamp};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Trips";
const MISSING: &str = "-";
const HEADER: [&str; 8] = [
    "Trip ID",
    "Vehicle",
    "Driver",
    "Start Time",
    "End Time",
    "Distance (km)",
    "From",
    "To",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn text_or_missing(value: Option<String>) -> Self {
        Cell::Text(value.unwrap_or_else(|| MISSING.to_string()))
    }
}

/// One worksheet: a header row followed by data rows
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

pub trait SpreadsheetEncoder: Send + Sync {
    fn encode(&self, sheet: &Sheet) -> AppResult<Vec<u8>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxEncoder;

impl XlsxEncoder {
    fn write(sheet: &Sheet) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (col, title) in sheet.header.iter().enumerate() {
            let col = col as u16;
            worksheet.write_string_with_format(0, col, title.as_str(), &bold)?;
            worksheet.set_column_width(col, 20)?;
        }

        for (index, row) in sheet.rows.iter().enumerate() {
            let row_num = index as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(text) => {
                        worksheet.write_string(row_num, col as u16, text.as_str())?;
                    }
                    Cell::Number(number) => {
                        worksheet.write_number(row_num, col as u16, *number)?;
                    }
                }
            }
        }

        workbook.save_to_buffer()
    }
}

impl SpreadsheetEncoder for XlsxEncoder {
    fn encode(&self, sheet: &Sheet) -> AppResult<Vec<u8>> {
        Self::write(sheet).map_err(|e| AppError::Internal(format!("xlsx encoding failed: {e}")))
    }
}

/// Trip rows for an inclusive day range
#[derive(Debug, Clone, PartialEq)]
pub struct TripReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub sheet: Sheet,
}

impl TripReport {
    pub fn filename(&self) -> String {
        format!("trips_{}_{}.xlsx", self.from, self.to)
    }
}

pub struct ReportService {
    trips: Arc<dyn TripRepository>,
    encoder: Arc<dyn SpreadsheetEncoder>,
}

impl ReportService {
    pub fn new(trips: Arc<dyn TripRepository>, encoder: Arc<dyn SpreadsheetEncoder>) -> Self {
        Self { trips, encoder }
    }

    /// Trips that started within `[from 00:00, to+1 00:00)` UTC and have
    /// either not ended yet or ended before the range closes
    pub async fn trip_report(&self, from: NaiveDate, to: NaiveDate) -> AppResult<TripReport> {
        if from > to {
            return Err(validation_error("from", "'from' must not be after 'to'"));
        }

        let (start, end) = days_window(from, to);
        let trips = self
            .trips
            .find_started_between_with_relations(start, end)
            .await?;

        let rows = trips
            .into_iter()
            .filter(|trip| trip.end_time.map_or(true, |ended| ended <= end))
            .map(trip_row)
            .collect();

        Ok(TripReport {
            from,
            to,
            sheet: Sheet {
                name: SHEET_NAME.to_string(),
                header: HEADER.iter().map(|h| h.to_string()).collect(),
                rows,
            },
        })
    }

    /// Report plus its encoded workbook
    pub async fn build_trips_workbook(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<(TripReport, Vec<u8>)> {
        let report = self.trip_report(from, to).await?;
        let bytes = self.encoder.encode(&report.sheet)?;

        info!(
            %from,
            %to,
            trips = report.sheet.rows.len(),
            bytes = bytes.len(),
            "Trip report generated"
        );
        Ok((report, bytes))
    }
}

fn trip_row(trip: TripWithRelations) -> Vec<Cell> {
    vec![
        Cell::Text(trip.id.to_string()),
        Cell::Text(trip.plate_number),
        Cell::text_or_missing(trip.driver_email),
        Cell::Text(format_report_timestamp(trip.start_time)),
        Cell::text_or_missing(trip.end_time.map(format_report_timestamp)),
        match trip.distance_km {
            Some(km) => Cell::Number(km),
            None => Cell::Text(MISSING.to_string()),
        },
        Cell::text_or_missing(trip.start_place),
        Cell::text_or_missing(trip.end_place),
    ]
}
