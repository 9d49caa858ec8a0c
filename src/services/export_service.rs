use chrono::NaiveDate;

use crate::error::AppResult;
use crate::services::entry_service::ExportRow;

pub const EXPORT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn export_filename(today: NaiveDate) -> String {
    format!("records-{}.xlsx", today.format("%Y-%m-%d"))
}

/// Branded records sheet: merged title row, padding row, styled header,
/// then one row per active entry. Layout matches the web table.
#[cfg(feature = "xlsx")]
pub fn build_records_workbook(rows: &[ExportRow]) -> AppResult<Vec<u8>> {
    use crate::error::AppError;
    use rust_decimal::prelude::ToPrimitive;
    use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

    let into_app_err =
        |e: rust_xlsxwriter::XlsxError| AppError::InternalError(format!("Excel export failed: {e}"));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Records").map_err(into_app_err)?;

    let title_format = Format::new()
        .set_bold()
        .set_font_size(14)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0x999999));
    let header_amount_format = header_format.clone().set_align(FormatAlign::Right);
    let body_format = Format::new()
        .set_border_bottom(FormatBorder::Thin)
        .set_border_left(FormatBorder::Thin)
        .set_border_right(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xCCCCCC));
    let amount_format = body_format
        .clone()
        .set_num_format("#,##0.00")
        .set_align(FormatAlign::Right);

    worksheet
        .merge_range(0, 0, 0, 5, "Pure Herb — Records", &title_format)
        .map_err(into_app_err)?;
    worksheet.set_row_height(0, 32).map_err(into_app_err)?;
    worksheet.set_row_height(1, 12).map_err(into_app_err)?;

    let headers = [
        "Date",
        "Reference",
        "Type",
        "Description",
        "Total (AED)",
        "Created by",
    ];
    for (col, header) in headers.iter().enumerate() {
        let format = if col == 4 {
            &header_amount_format
        } else {
            &header_format
        };
        worksheet
            .write_with_format(2, col as u16, *header, format)
            .map_err(into_app_err)?;
    }

    for (col, width) in [(0, 12), (1, 14), (2, 10), (3, 35), (4, 14), (5, 14)] {
        worksheet
            .set_column_width(col, width as f64)
            .map_err(into_app_err)?;
    }

    for (i, entry) in rows.iter().enumerate() {
        let row = (i + 3) as u32;
        let date_str = entry.date.format("%b %-d, %Y").to_string();
        let reference = if entry.reference.is_empty() {
            "—"
        } else {
            entry.reference.as_str()
        };
        let created_by = entry.created_by.as_deref().unwrap_or("—");

        worksheet
            .write_with_format(row, 0, date_str, &body_format)
            .map_err(into_app_err)?;
        worksheet
            .write_with_format(row, 1, reference, &body_format)
            .map_err(into_app_err)?;
        worksheet
            .write_with_format(row, 2, entry.entry_type.display(), &body_format)
            .map_err(into_app_err)?;
        worksheet
            .write_with_format(row, 3, entry.description.as_str(), &body_format)
            .map_err(into_app_err)?;
        worksheet
            .write_with_format(row, 4, entry.total.to_f64().unwrap_or(0.0), &amount_format)
            .map_err(into_app_err)?;
        worksheet
            .write_with_format(row, 5, created_by, &body_format)
            .map_err(into_app_err)?;
    }

    workbook.save_to_buffer().map_err(into_app_err)
}

/// Built without the `xlsx` feature: export is refused with a hint,
/// the request handler stays up.
#[cfg(not(feature = "xlsx"))]
pub fn build_records_workbook(_rows: &[ExportRow]) -> AppResult<Vec<u8>> {
    Err(crate::error::AppError::ExportUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filename() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(export_filename(day), "records-2026-03-09.xlsx");
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_workbook_builds_for_sample_rows() {
        use crate::models::EntryType;
        use rust_decimal_macros::dec;

        let rows = vec![ExportRow {
            date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            reference: String::new(),
            entry_type: EntryType::Sale,
            description: "Morning sales".to_string(),
            total: dec!(150.00),
            created_by: Some("alice".to_string()),
        }];
        let bytes = build_records_workbook(&rows).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }
}
