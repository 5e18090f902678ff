mod office;

pub use office::OfficeConverter;

use crate::error::Result;

/// Turns spreadsheet bytes into PDF bytes
pub trait Converter {
    fn convert(&self, spreadsheet: &[u8]) -> Result<Vec<u8>>;
}
