mod layout;
mod select;
mod xlsx;

pub use layout::{
    group_by_partner, report_title, CellStyle, CellValue, PartnerSection, PaymentLine,
    PlacedCell, ReportSheet, CUSTOMER_TITLE, GENERAL_TITLE, SUPPLIER_TITLE,
};
pub use select::{confirmed_payments, select_for_report};
pub use xlsx::render_xlsx;

#[cfg(test)]
pub(crate) fn test_payment(name: &str, partner: &str, amount: i64) -> crate::payment::Payment {
    use crate::payment::{Payment, PaymentState};

    Payment {
        name: name.to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        amount: rust_decimal::Decimal::from(amount),
        journal: "Banco".to_string(),
        partner: partner.to_string(),
        state: PaymentState::Posted,
        partner_type: None,
    }
}
