//! Download formats. Everything is regenerated from full table reads per request.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use thiserror::Error;

use stockledger_inventory::{Movement, Product};

use crate::query_console::QueryResult;

pub const PRODUCT_SHEET: &str = "Product Registry";
pub const MOVEMENT_SHEET: &str = "Stock Movements";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv buffer failed: {0}")]
    CsvBuffer(String),

    #[error("spreadsheet export failed: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Flat CSV row for one ledger entry.
#[derive(Debug, Serialize)]
struct LedgerRow<'a> {
    id: i64,
    product_id: &'a str,
    product_name: &'a str,
    description: &'a str,
    stock_in: i64,
    stock_out: i64,
    price: f64,
    units: &'a str,
    batch_id: &'a str,
    date_in: String,
    time_in: String,
    date_out: String,
    time_out: String,
}

impl<'a> From<&'a Movement> for LedgerRow<'a> {
    fn from(m: &'a Movement) -> Self {
        Self {
            id: m.id.value(),
            product_id: m.product_id.as_str(),
            product_name: &m.product_name,
            description: &m.description,
            stock_in: m.stock_in,
            stock_out: m.stock_out,
            price: m.price,
            units: &m.units,
            batch_id: &m.batch_id,
            date_in: m.date_in.to_string(),
            time_in: m.time_in.format("%H:%M:%S").to_string(),
            date_out: m.date_out.map(|d| d.to_string()).unwrap_or_default(),
            time_out: m
                .time_out
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

const MOVEMENT_HEADERS: [&str; 13] = [
    "id",
    "product_id",
    "product_name",
    "description",
    "stock_in",
    "stock_out",
    "price",
    "units",
    "batch_id",
    "date_in",
    "time_in",
    "date_out",
    "time_out",
];

const PRODUCT_HEADERS: [&str; 8] = [
    "product_id",
    "name",
    "description",
    "unit_type",
    "batch_id",
    "registered_on",
    "total_units",
    "expires_on",
];

/// The ledger as CSV (header row always present).
pub fn ledger_csv(movements: &[Movement]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(MOVEMENT_HEADERS)?;
    for m in movements {
        writer.serialize(LedgerRow::from(m))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::CsvBuffer(e.to_string()))
}

/// A query result as CSV.
pub fn query_result_csv(result: &QueryResult) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(&result.columns)?;
    for row in &result.rows {
        writer.write_record(row.iter().map(|cell| cell.to_text()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::CsvBuffer(e.to_string()))
}

/// Two-sheet workbook: registry first, ledger second.
pub fn inventory_workbook(products: &[Product], movements: &[Movement]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(PRODUCT_SHEET)?;
        write_headers(sheet, &PRODUCT_HEADERS, &header)?;

        for (idx, p) in products.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_string(row, 0, p.id.as_str())?;
            sheet.write_string(row, 1, &p.name)?;
            sheet.write_string(row, 2, &p.description)?;
            sheet.write_string(row, 3, &p.unit_type)?;
            sheet.write_string(row, 4, &p.batch_id)?;
            sheet.write_string(row, 5, p.registered_on.to_string())?;
            if let Some(units) = p.total_units {
                sheet.write_number(row, 6, units as f64)?;
            }
            if let Some(expires_on) = p.expires_on {
                sheet.write_string(row, 7, expires_on.to_string())?;
            }
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(MOVEMENT_SHEET)?;
        write_headers(sheet, &MOVEMENT_HEADERS, &header)?;

        for (idx, m) in movements.iter().enumerate() {
            let row = idx as u32 + 1;
            let flat = LedgerRow::from(m);
            sheet.write_number(row, 0, flat.id as f64)?;
            sheet.write_string(row, 1, flat.product_id)?;
            sheet.write_string(row, 2, flat.product_name)?;
            sheet.write_string(row, 3, flat.description)?;
            sheet.write_number(row, 4, flat.stock_in as f64)?;
            sheet.write_number(row, 5, flat.stock_out as f64)?;
            sheet.write_number(row, 6, flat.price)?;
            sheet.write_string(row, 7, flat.units)?;
            sheet.write_string(row, 8, flat.batch_id)?;
            sheet.write_string(row, 9, flat.date_in)?;
            sheet.write_string(row, 10, flat.time_in)?;
            sheet.write_string(row, 11, flat.date_out)?;
            sheet.write_string(row, 12, flat.time_out)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<(), XlsxError> {
    for (col, name) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, format)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use stockledger_core::{MovementId, ProductId};

    use crate::query_console::Cell;

    fn movement(id: i64, stock_in: i64, stock_out: i64) -> Movement {
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        Movement {
            id: MovementId(id),
            product_id: ProductId::new("W-001").unwrap(),
            product_name: "Widget".to_string(),
            description: "Standard, blue".to_string(),
            stock_in,
            stock_out,
            price: 2.5,
            units: "pcs".to_string(),
            batch_id: "B1".to_string(),
            date_in: date,
            time_in: time,
            date_out: (stock_out > 0).then_some(date),
            time_out: (stock_out > 0).then_some(time),
        }
    }

    #[test]
    fn ledger_csv_has_header_and_one_line_per_movement() {
        let bytes = ledger_csv(&[movement(1, 100, 0), movement(2, 0, 85)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,product_id,product_name"));
        assert_eq!(
            lines[1],
            "1,W-001,Widget,\"Standard, blue\",100,0,2.5,pcs,B1,2024-03-02,09:30:00,,"
        );
        assert!(lines[2].ends_with("2024-03-02,09:30:00"));
    }

    #[test]
    fn empty_ledger_csv_still_has_header() {
        let text = String::from_utf8(ledger_csv(&[]).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn query_result_csv_renders_cells() {
        let result = QueryResult {
            columns: vec!["name".to_string(), "qty".to_string(), "note".to_string()],
            rows: vec![vec![
                Cell::Text("Widget".to_string()),
                Cell::Integer(15),
                Cell::Null,
            ]],
        };
        let text = String::from_utf8(query_result_csv(&result).unwrap()).unwrap();
        assert_eq!(text, "name,qty,note\nWidget,15,\n");
    }

    #[test]
    fn workbook_is_an_xlsx_archive() {
        let product = Product {
            id: ProductId::new("W-001").unwrap(),
            name: "Widget".to_string(),
            description: String::new(),
            unit_type: "pcs".to_string(),
            batch_id: "B1".to_string(),
            registered_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            total_units: Some(100),
            expires_on: None,
        };

        let bytes = inventory_workbook(&[product], &[movement(1, 100, 0)]).unwrap();
        // xlsx files are zip archives.
        assert!(bytes.starts_with(b"PK"));
    }
}
