use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{ReportError, Result};

/// Lifecycle state of a payment in the host ledger. Hosts name their
/// non-draft states differently, so unrecognized names load as `Other`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Draft,
    #[serde(alias = "confirmed")]
    Posted,
    Sent,
    Reconciled,
    #[serde(alias = "cancel", alias = "canceled")]
    Cancelled,
    #[serde(other)]
    Other,
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentState::Draft => "draft",
            PaymentState::Posted => "posted",
            PaymentState::Sent => "sent",
            PaymentState::Reconciled => "reconciled",
            PaymentState::Cancelled => "cancelled",
            PaymentState::Other => "other",
        };
        f.write_str(label)
    }
}

/// Role of the counterparty of a payment
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PartnerType {
    Supplier,
    Customer,
}

/// A payment record as selected in the host application
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Payment {
    /// Payment order number, e.g. "PBNK1/2024/00012"
    pub name: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    /// Journal (settlement account) the payment was booked on
    pub journal: String,
    pub partner: String,
    pub state: PaymentState,
    #[serde(default)]
    pub partner_type: Option<PartnerType>,
}

impl Payment {
    pub fn is_draft(&self) -> bool {
        self.state == PaymentState::Draft
    }
}

#[derive(Deserialize)]
struct PaymentsFile {
    #[serde(default)]
    payments: Vec<Payment>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PaymentsJson {
    List(Vec<Payment>),
    Wrapped(PaymentsFile),
}

/// Load the selected payments from a TOML (`[[payments]]`) or JSON file
pub fn load_payments(path: &Path) -> Result<Vec<Payment>> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let parse_err = |reason: String| ReportError::PaymentsParse {
        path: path.to_path_buf(),
        reason,
    };

    if is_json {
        let parsed: PaymentsJson =
            serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?;
        Ok(match parsed {
            PaymentsJson::List(payments) => payments,
            PaymentsJson::Wrapped(file) => file.payments,
        })
    } else {
        let parsed: PaymentsFile = toml::from_str(&content).map_err(|e| parse_err(e.to_string()))?;
        Ok(parsed.payments)
    }
}
