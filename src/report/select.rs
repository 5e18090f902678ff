use crate::error::{ReportError, Result};
use crate::payment::Payment;

/// Payments that are not drafts, in input order
pub fn confirmed_payments(payments: &[Payment]) -> Vec<&Payment> {
    payments.iter().filter(|p| !p.is_draft()).collect()
}

/// Like [`confirmed_payments`], but an empty selection is a validation error
pub fn select_for_report(payments: &[Payment]) -> Result<Vec<&Payment>> {
    let confirmed = confirmed_payments(payments);
    if confirmed.is_empty() {
        return Err(ReportError::NoConfirmedPayments);
    }
    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::PaymentState;
    use crate::report::test_payment;

    #[test]
    fn drops_only_drafts() {
        let mut payments = vec![
            test_payment("P1", "A", 10),
            test_payment("P2", "A", 20),
            test_payment("P3", "B", 30),
            test_payment("P4", "B", 40),
        ];
        payments[1].state = PaymentState::Draft;
        payments[3].state = PaymentState::Cancelled;

        let names: Vec<_> = confirmed_payments(&payments)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["P1", "P3", "P4"]);
    }

    #[test]
    fn all_drafts_is_a_validation_error() {
        let mut payments = vec![test_payment("P1", "A", 10), test_payment("P2", "B", 5)];
        for p in &mut payments {
            p.state = PaymentState::Draft;
        }

        let err = select_for_report(&payments).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "No confirmed payments to print.");
    }

    #[test]
    fn empty_input_is_a_validation_error() {
        assert!(matches!(
            select_for_report(&[]),
            Err(ReportError::NoConfirmedPayments)
        ));
    }
}
