use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

use crate::error::{ReportError, Result};
use crate::report::layout::{CellStyle, CellValue, PlacedCell, ReportSheet, COLUMN_WIDTHS};

const HEADER_BACKGROUND: u32 = 0x1D1D1B;
const TOTAL_BACKGROUND: u32 = 0xF2F2F2;

struct Formats {
    title: Format,
    subtitle: Format,
    header: Format,
    partner: Format,
    body: Format,
    total: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(12.0)
                .set_align(FormatAlign::Center),
            subtitle: Format::new()
                .set_bold()
                .set_font_size(10.0)
                .set_align(FormatAlign::Left),
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(HEADER_BACKGROUND))
                .set_font_color(Color::White)
                .set_align(FormatAlign::Center)
                .set_font_size(8.0),
            partner: Format::new().set_bold().set_font_size(8.0),
            body: Format::new().set_font_size(8.0),
            total: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(TOTAL_BACKGROUND))
                .set_align(FormatAlign::Right)
                .set_font_size(8.0),
        }
    }

    fn get(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Title => &self.title,
            CellStyle::Subtitle => &self.subtitle,
            CellStyle::Header => &self.header,
            CellStyle::Partner => &self.partner,
            CellStyle::Body => &self.body,
            CellStyle::Total => &self.total,
        }
    }
}

fn amount_to_f64(amount: Decimal) -> Result<f64> {
    f64::try_from(amount).map_err(|_| ReportError::InvalidAmount(amount.to_string()))
}

fn write_cell(worksheet: &mut Worksheet, cell: &PlacedCell, formats: &Formats) -> Result<()> {
    let format = formats.get(cell.style);
    match (&cell.value, cell.style) {
        (CellValue::Text(text), CellStyle::Title) => {
            let last_col = (COLUMN_WIDTHS.len() - 1) as u16;
            worksheet.merge_range(cell.row, cell.col, cell.row, last_col, text, format)?;
        }
        (CellValue::Text(text), _) => {
            worksheet.write_string_with_format(cell.row, cell.col, text, format)?;
        }
        (CellValue::Amount(amount), _) => {
            worksheet.write_number_with_format(cell.row, cell.col, amount_to_f64(*amount)?, format)?;
        }
    }
    Ok(())
}

/// Render the report into an in-memory XLSX workbook
pub fn render_xlsx(sheet: &ReportSheet) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let formats = Formats::new();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.sheet_name)?;
    worksheet.set_landscape();

    for cell in sheet.cells() {
        write_cell(worksheet, &cell, &formats)?;
    }

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    // one page wide, as many pages tall as needed
    worksheet.set_print_fit_to_pages(1, 0);

    Ok(workbook.save_to_buffer()?)
}
