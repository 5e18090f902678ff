use serde::{Deserialize, Serialize};
use tracing::info;

use crate::attachment::{AttachmentId, AttachmentStore, NewAttachment};
use crate::config::ReportSettings;
use crate::error::Result;
use crate::payment::Payment;
use crate::pdf::Converter;
use crate::report::{render_xlsx, select_for_report, ReportSheet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    OpenUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Replace the current window
    #[serde(rename = "self")]
    SameWindow,
    #[serde(rename = "new")]
    NewWindow,
}

/// Navigation directive returned to the caller once the report is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub url: String,
    pub target: Target,
}

impl UrlAction {
    /// Download link for an attachment served under `content_url`
    pub fn download(content_url: &str, id: AttachmentId) -> Self {
        Self {
            kind: ActionKind::OpenUrl,
            url: format!("{}/{}?download=true", content_url.trim_end_matches('/'), id),
            target: Target::SameWindow,
        }
    }
}

/// Outcome of a successful report run
#[derive(Debug, Clone)]
pub struct PrintedReport {
    pub attachment: AttachmentId,
    pub action: UrlAction,
    pub sheet: ReportSheet,
}

/// Print the non-draft payments as a grouped PDF report and store it.
///
/// Fails with [`crate::ReportError::NoConfirmedPayments`] before touching the
/// converter or the store when every payment is a draft.
pub fn print_payments_report<C, S>(
    payments: &[Payment],
    settings: &ReportSettings,
    converter: &C,
    store: &mut S,
) -> Result<PrintedReport>
where
    C: Converter + ?Sized,
    S: AttachmentStore + ?Sized,
{
    let confirmed = select_for_report(payments)?;
    info!(
        selected = payments.len(),
        confirmed = confirmed.len(),
        "printing payments report"
    );

    let sheet = ReportSheet::build(&confirmed, settings)?;
    let spreadsheet = render_xlsx(&sheet)?;
    info!(
        partners = sheet.sections.len(),
        bytes = spreadsheet.len(),
        "rendered spreadsheet"
    );

    let pdf = converter.convert(&spreadsheet)?;

    let attachment = store.create(NewAttachment::pdf(&settings.attachment_name, &pdf))?;
    info!(%attachment, bytes = pdf.len(), "stored report attachment");

    Ok(PrintedReport {
        attachment,
        action: UrlAction::download(&settings.content_url, attachment),
        sheet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::MemoryStore;
    use crate::error::ReportError;
    use crate::payment::PaymentState;
    use crate::report::test_payment;
    use rust_decimal::Decimal;
    use std::cell::Cell;

    /// Wraps the spreadsheet in a fake PDF header and counts calls
    #[derive(Default)]
    struct FakeConverter {
        calls: Cell<usize>,
    }

    impl Converter for FakeConverter {
        fn convert(&self, spreadsheet: &[u8]) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            let mut pdf = b"%PDF-1.4\n".to_vec();
            pdf.extend_from_slice(spreadsheet);
            Ok(pdf)
        }
    }

    struct FailingConverter;

    impl Converter for FailingConverter {
        fn convert(&self, _: &[u8]) -> Result<Vec<u8>> {
            Err(ReportError::ConversionFailed {
                program: "libreoffice".to_string(),
                status: "exit status: 1".to_string(),
                stderr: String::new(),
            })
        }
    }

    #[test]
    fn only_drafts_creates_nothing() {
        let mut payments = vec![test_payment("P1", "A", 10), test_payment("P2", "B", 20)];
        for p in &mut payments {
            p.state = PaymentState::Draft;
        }
        let converter = FakeConverter::default();
        let mut store = MemoryStore::new();

        let err = print_payments_report(
            &payments,
            &ReportSettings::default(),
            &converter,
            &mut store,
        )
        .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(converter.calls.get(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn stores_pdf_and_returns_download_action() {
        let mut payments = vec![
            test_payment("P1", "A", 100),
            test_payment("P2", "A", 200),
            test_payment("P3", "B", 50),
            test_payment("P4", "B", 999),
        ];
        payments[3].state = PaymentState::Draft;
        let converter = FakeConverter::default();
        let mut store = MemoryStore::new();

        let printed = print_payments_report(
            &payments,
            &ReportSettings::default(),
            &converter,
            &mut store,
        )
        .unwrap();

        assert_eq!(printed.sheet.grand_total(), Decimal::from(350));
        assert_eq!(printed.sheet.payment_count(), 3);
        assert_eq!(
            printed.action.url,
            format!("/web/content/{}?download=true", printed.attachment)
        );
        assert_eq!(printed.action.target, Target::SameWindow);

        let stored = store.get(printed.attachment).unwrap();
        assert_eq!(stored.name, "Reporte_Pagos.pdf");
        assert_eq!(stored.mimetype, "application/pdf");
        assert!(stored.decode().unwrap().starts_with(b"%PDF-1.4\nPK"));
    }

    #[test]
    fn repeated_runs_create_distinct_attachments() {
        let payments = vec![test_payment("P1", "A", 100)];
        let converter = FakeConverter::default();
        let mut store = MemoryStore::new();
        let settings = ReportSettings::default();

        let first = print_payments_report(&payments, &settings, &converter, &mut store).unwrap();
        let second = print_payments_report(&payments, &settings, &converter, &mut store).unwrap();

        assert_ne!(first.attachment, second.attachment);
        assert_ne!(first.action.url, second.action.url);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn converter_failure_creates_nothing() {
        let payments = vec![test_payment("P1", "A", 100)];
        let mut store = MemoryStore::new();

        let err = print_payments_report(
            &payments,
            &ReportSettings::default(),
            &FailingConverter,
            &mut store,
        )
        .unwrap_err();

        assert!(err.is_conversion());
        assert!(store.is_empty());
    }

    #[test]
    fn action_serializes_like_the_host_expects() {
        let action = UrlAction::download("/web/content/", AttachmentId(42));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "open_url",
                "url": "/web/content/42?download=true",
                "target": "self",
            })
        );
    }
}
