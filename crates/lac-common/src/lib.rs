//! Shared helpers for the looked-after children return validator.
//!
//! - [`polars`]: `AnyValue` to string and date conversion
//! - [`dates`]: strict `dd/mm/yyyy` parsing used by the return format
//! - [`column_reader`]: row iteration over submitted tables

pub mod column_reader;
pub mod dates;
pub mod polars;

pub use column_reader::{ColumnReader, OptionalValueIter};
pub use dates::{DATE_FORMAT, parse_date};
pub use polars::{any_to_date, any_to_string, any_to_string_non_empty, format_numeric};
