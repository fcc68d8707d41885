//! Spreadsheet export of the user table for the operator.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;

use crate::{store::UserRecord, Result};

const SHEET_NAME: &str = "Выгрузка базы данных";
const HEADERS: [&str; 5] = ["ID", "USER_ID", "USERNAME", "NAME", "SUBSCRIBE"];
const WIDTHS: [f64; 5] = [3.0, 13.0, 20.0, 20.0, 12.0];

/// `Выгрузка YYYY.MM.DD.xlsx`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("Выгрузка {}.xlsx", date.format("%Y.%m.%d"))
}

pub fn subscription_glyph(subscribed: bool) -> &'static str {
    if subscribed {
        "✅"
    } else {
        "❌"
    }
}

/// Write `records` to a fresh workbook in `dir` and return its path.
///
/// The caller owns the file and is expected to delete it once sent.
pub fn write_users_xlsx(records: &[UserRecord], dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (header, width)) in HEADERS.iter().zip(WIDTHS).enumerate() {
        let col = col as u16;
        sheet.set_column_width(col, width)?;
        sheet.write_string(0, col, *header)?;
    }

    for (i, rec) in records.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_number(row, 0, rec.id as f64)?;
        sheet.write_number(row, 1, rec.user_id.0 as f64)?;
        // Blank cells read badly in the operator's spreadsheet app; keep a space.
        sheet.write_string(row, 2, rec.username.as_deref().unwrap_or(" "))?;
        sheet.write_string(row, 3, rec.first_name.as_deref().unwrap_or(" "))?;
        sheet.write_string(row, 4, subscription_glyph(rec.subscribed))?;
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(date));
    workbook.save(&path)?;
    Ok(path)
}
