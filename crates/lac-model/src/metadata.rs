//! Out-of-table context supplied with a return.

use chrono::{Datelike, NaiveDate};
use polars::prelude::DataFrame;

use lac_common::parse_date;

use crate::error::StoreError;

/// Column holding the provider reference number in `provider_info`.
pub const PROVIDER_URN_COLUMN: &str = "URN";

/// Column holding the postcode in the postcode register.
pub const POSTCODE_COLUMN: &str = "pcd";

/// Collection window, reporting local authority and pre-loaded reference tables.
///
/// Reference tables are loaded by the caller before validation starts; checks
/// never perform I/O.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub collection_start: NaiveDate,
    pub collection_end: NaiveDate,
    /// Code of the local authority submitting the return.
    pub local_authority: Option<String>,
    /// Provider register keyed by [`PROVIDER_URN_COLUMN`].
    pub provider_info: Option<DataFrame>,
    /// Postcode register keyed by [`POSTCODE_COLUMN`].
    pub postcodes: Option<DataFrame>,
}

impl Metadata {
    /// Create metadata for a collection window.
    pub fn new(collection_start: NaiveDate, collection_end: NaiveDate) -> Result<Self, StoreError> {
        if collection_start > collection_end {
            return Err(StoreError::CollectionWindow {
                start: collection_start.to_string(),
                end: collection_end.to_string(),
            });
        }
        Ok(Self {
            collection_start,
            collection_end,
            local_authority: None,
            provider_info: None,
            postcodes: None,
        })
    }

    /// Create metadata from the `dd/mm/yyyy` strings carried by the return.
    pub fn from_collection_dates(start: &str, end: &str) -> Result<Self, StoreError> {
        let collection_start = parse_date(start).ok_or_else(|| StoreError::InvalidCollectionDate {
            field: "collection_start",
            value: start.to_string(),
        })?;
        let collection_end = parse_date(end).ok_or_else(|| StoreError::InvalidCollectionDate {
            field: "collection_end",
            value: end.to_string(),
        })?;
        Self::new(collection_start, collection_end)
    }

    #[must_use]
    pub fn with_local_authority(mut self, code: impl Into<String>) -> Self {
        self.local_authority = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_provider_info(mut self, providers: DataFrame) -> Self {
        self.provider_info = Some(providers);
        self
    }

    #[must_use]
    pub fn with_postcodes(mut self, postcodes: DataFrame) -> Self {
        self.postcodes = Some(postcodes);
        self
    }

    /// The collection year, named after the year the window closes in.
    pub fn collection_year(&self) -> String {
        self.collection_end.year().to_string()
    }

    /// Whether a date falls inside the collection window (inclusive).
    pub fn in_collection_window(&self, date: NaiveDate) -> bool {
        self.collection_start <= date && date <= self.collection_end
    }
}
