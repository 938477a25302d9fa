use crate::errors::{AppError, AppResult};
use crate::export::excel_date::parse_to_excel_date;
use crate::export::model::{get_headers, record_to_row};
use crate::export::{AttendanceExport, notify_export_success};
use crate::ui::messages::info;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

const STATUS_COL: usize = 7;

/// Styled sheet: banded rows, frozen header, fitted column widths and a
/// coloured status column.
pub(crate) fn export_xlsx(records: &[AttendanceExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to XLSX: {}", path.display()));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Attendance").map_err(xlsx_error)?;

    let headers = get_headers();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_error)?;
    }
    worksheet.set_freeze_panes(1, 0).map_err(xlsx_error)?;

    let mut col_widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(*h)).collect();

    for (i, rec) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        let band = if i % 2 == 0 {
            Color::RGB(0xEAF3FB)
        } else {
            Color::RGB(0xFFFFFF)
        };

        for (col, value) in record_to_row(rec).iter().enumerate() {
            let bg = if col == STATUS_COL {
                status_color(&rec.status).unwrap_or(band)
            } else {
                band
            };
            write_cell(worksheet, row, col as u16, value, bg)?;
            col_widths[col] = col_widths[col].max(UnicodeWidthStr::width(value.as_str()));
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, *w as f64 + 2.0)
            .map_err(xlsx_error)?;
    }

    let target = path
        .to_str()
        .ok_or_else(|| AppError::Export(format!("invalid path: {}", path.display())))?;
    workbook.save(target).map_err(xlsx_error)?;

    notify_export_success("XLSX", path);
    Ok(())
}

fn status_color(status: &str) -> Option<Color> {
    match status {
        "present" => Some(Color::RGB(0xC6EFCE)),
        "late" => Some(Color::RGB(0xFFEB9C)),
        "absent" => Some(Color::RGB(0xFFC7CE)),
        _ => None,
    }
}

/// Dates, times and plain numbers are written as typed cells.
fn write_cell(ws: &mut Worksheet, row: u32, col: u16, s: &str, bg: Color) -> AppResult<()> {
    let base = Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    if let Some((num_format, serial)) = parse_to_excel_date(s) {
        ws.write_with_format(row, col, serial, &base.set_num_format(num_format))
            .map_err(xlsx_error)?;
    } else if let Ok(num) = s.parse::<i64>() {
        ws.write_with_format(row, col, num as f64, &base.set_align(FormatAlign::Right))
            .map_err(xlsx_error)?;
    } else if let Ok(b) = s.parse::<bool>() {
        ws.write_with_format(row, col, b, &base.set_align(FormatAlign::Center))
            .map_err(xlsx_error)?;
    } else {
        ws.write_with_format(row, col, s, &base).map_err(xlsx_error)?;
    }

    Ok(())
}

fn xlsx_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(format!("XLSX error: {e}"))
}
