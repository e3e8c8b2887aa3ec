//! Value types shared by jobs, the runner and the HTTP boundary

use crate::extractor::{Field, Price, VehicleData};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier of one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Allocates a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Progress counters of a running job
///
/// Replaced as a whole under the job's lock, so readers never observe a
/// half-applied stage transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Label of the competitor being processed
    pub current_competitor: String,

    pub total_competitors: usize,

    pub completed_competitors: usize,

    /// 1-based index of the page being processed for the current competitor
    pub current_vdp: usize,

    /// Pages discovered for the current competitor
    pub total_vdps: usize,

    /// Pages that reached an outcome across the whole job
    pub processed_vdps: usize,
}

impl Progress {
    pub fn new(total_competitors: usize) -> Self {
        Self {
            total_competitors,
            ..Self::default()
        }
    }
}

/// One extracted vehicle listing, as exported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleRecord {
    pub competitor: String,
    pub url: String,
    pub vin: Field<String>,
    pub year: Field<u16>,
    pub make: Field<String>,
    pub model: Field<String>,
    pub trim: Field<String>,
    pub msrp: Field<Price>,
    pub sale_price: Field<Price>,
    /// Local time of extraction, `%Y-%m-%d %H:%M:%S`
    pub date_scraped: String,
}

impl VehicleRecord {
    /// Merges extracted data with its source and the extraction time
    pub fn new(competitor: &str, url: &str, data: VehicleData, date_scraped: String) -> Self {
        Self {
            competitor: competitor.to_string(),
            url: url.to_string(),
            vin: data.vin,
            year: data.year,
            make: data.make,
            model: data.model,
            trim: data.trim,
            msrp: data.msrp,
            sale_price: data.sale_price,
            date_scraped,
        }
    }
}
