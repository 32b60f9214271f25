//! Delimited and workbook codecs for bulk import and export.

pub mod csv;
pub mod xlsx;
