//! Offline extraction of rate tables from the published survey workbook.

pub mod csew_xlsx;

pub use csew_xlsx::{extract_csew_xlsx, ExtractedTable};
