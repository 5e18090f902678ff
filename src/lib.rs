pub mod action;
pub mod attachment;
pub mod config;
pub mod error;
pub mod payment;
pub mod pdf;
pub mod report;

pub use action::{print_payments_report, PrintedReport, UrlAction};
pub use attachment::{AttachmentId, AttachmentStore, DirectoryStore, MemoryStore, NewAttachment};
pub use config::{Config, ConverterSettings, ReportSettings};
pub use error::{ReportError, Result};
pub use payment::{load_payments, PartnerType, Payment, PaymentState};
pub use pdf::{Converter, OfficeConverter};
pub use report::ReportSheet;
