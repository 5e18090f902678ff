use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::config::ReportSettings;
use crate::error::{ReportError, Result};
use crate::payment::{PartnerType, Payment};

pub const SUPPLIER_TITLE: &str = "Análisis de Órdenes de Pago - ANALISIS DE ORDENES DE PAGO IRR";
pub const CUSTOMER_TITLE: &str =
    "Análisis de Órdenes de Cobranza - ANALISIS DE ORDENES DE COBRANZA IRR";
pub const GENERAL_TITLE: &str = "Análisis de Pagos - REPORTE GENERAL";

pub const COLUMN_HEADERS: [&str; 4] = ["Orden de Pago N°", "Fecha", "Cuenta", "Importe"];
pub const COLUMN_WIDTHS: [f64; 4] = [25.0, 20.0, 40.0, 20.0];
pub const TOTAL_LABEL: &str = "Total";

const TITLE_ROW: u32 = 0;
const DATE_ROW: u32 = 2;
const ORGANIZATION_ROW: u32 = 3;
const HEADER_ROW: u32 = 6;
const FIRST_GROUP_ROW: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    /// Merged across all four columns
    Title,
    Subtitle,
    Header,
    Partner,
    Body,
    Total,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Amount(Decimal),
}

/// A value at a fixed (0-based) row and column of the sheet
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCell {
    pub row: u32,
    pub col: u16,
    pub value: CellValue,
    pub style: CellStyle,
}

impl PlacedCell {
    fn text(row: u32, col: u16, text: impl Into<String>, style: CellStyle) -> Self {
        Self {
            row,
            col,
            value: CellValue::Text(text.into()),
            style,
        }
    }

    fn amount(row: u32, col: u16, amount: Decimal, style: CellStyle) -> Self {
        Self {
            row,
            col,
            value: CellValue::Amount(amount),
            style,
        }
    }
}

/// A single payment row under a partner
#[derive(Debug, Clone)]
pub struct PaymentLine {
    pub name: String,
    pub date: String,
    pub journal: String,
    pub amount: Decimal,
}

/// All payments of one partner plus their subtotal
#[derive(Debug, Clone)]
pub struct PartnerSection {
    pub partner: String,
    pub lines: Vec<PaymentLine>,
    pub total: Decimal,
}

/// Complete data for rendering the payments spreadsheet
#[derive(Debug, Clone)]
pub struct ReportSheet {
    pub sheet_name: String,
    pub title: String,
    pub date_line: String,
    pub organization: String,
    pub sections: Vec<PartnerSection>,
}

/// Title for a batch, keyed off the partner type of its first payment.
/// Mixed batches are not inspected further.
pub fn report_title(first: Option<PartnerType>) -> &'static str {
    match first {
        Some(PartnerType::Supplier) => SUPPLIER_TITLE,
        Some(PartnerType::Customer) => CUSTOMER_TITLE,
        None => GENERAL_TITLE,
    }
}

/// Group payments by partner name, keeping first-seen order of partners
/// and input order within each partner
pub fn group_by_partner<'a>(payments: &[&'a Payment]) -> IndexMap<&'a str, Vec<&'a Payment>> {
    let mut groups: IndexMap<&'a str, Vec<&'a Payment>> = IndexMap::new();
    for payment in payments {
        groups
            .entry(payment.partner.as_str())
            .or_default()
            .push(*payment);
    }
    groups
}

impl ReportSheet {
    pub fn build(payments: &[&Payment], settings: &ReportSettings) -> Result<Self> {
        let first = payments.first().ok_or(ReportError::NoConfirmedPayments)?;

        let sections = group_by_partner(payments)
            .into_iter()
            .map(|(partner, group)| PartnerSection {
                partner: partner.to_string(),
                total: group.iter().map(|p| p.amount).sum(),
                lines: group
                    .iter()
                    .map(|p| PaymentLine {
                        name: p.name.clone(),
                        date: p.date.format("%Y-%m-%d").to_string(),
                        journal: p.journal.clone(),
                        amount: p.amount,
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            sheet_name: settings.sheet_name.clone(),
            title: report_title(first.partner_type).to_string(),
            date_line: format!("Fecha: {}", first.date.format("%Y-%m-%d")),
            organization: settings.organization.clone(),
            sections,
        })
    }

    /// Sum of all partner subtotals
    pub fn grand_total(&self) -> Decimal {
        self.sections.iter().map(|s| s.total).sum()
    }

    pub fn payment_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }

    /// Every non-empty cell of the sheet in row order
    pub fn cells(&self) -> Vec<PlacedCell> {
        let mut cells = vec![
            PlacedCell::text(TITLE_ROW, 0, &self.title, CellStyle::Title),
            PlacedCell::text(DATE_ROW, 0, &self.date_line, CellStyle::Subtitle),
            PlacedCell::text(ORGANIZATION_ROW, 0, &self.organization, CellStyle::Subtitle),
        ];

        for (col, header) in COLUMN_HEADERS.iter().enumerate() {
            cells.push(PlacedCell::text(HEADER_ROW, col as u16, *header, CellStyle::Header));
        }

        let mut row = FIRST_GROUP_ROW;
        for section in &self.sections {
            cells.push(PlacedCell::text(row, 0, &section.partner, CellStyle::Partner));
            row += 1;

            for line in &section.lines {
                cells.push(PlacedCell::text(row, 0, &line.name, CellStyle::Body));
                cells.push(PlacedCell::text(row, 1, &line.date, CellStyle::Body));
                cells.push(PlacedCell::text(row, 2, &line.journal, CellStyle::Body));
                cells.push(PlacedCell::amount(row, 3, line.amount, CellStyle::Body));
                row += 1;
            }

            cells.push(PlacedCell::text(row, 2, TOTAL_LABEL, CellStyle::Total));
            cells.push(PlacedCell::amount(row, 3, section.total, CellStyle::Total));
            // one blank row between partners
            row += 2;
        }

        cells
    }
}
