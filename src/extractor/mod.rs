//! Vehicle data extraction
//!
//! Turns a fetched vehicle detail page into a [`VehicleData`] record. The
//! job runner only depends on the [`VehicleExtractor`] and
//! [`ExtractorProvider`] traits; [`OpenAiExtractor`] is the production
//! implementation backed by a chat-completions endpoint.
//!
//! Extraction never fails from the caller's point of view: anything that
//! cannot be determined is reported as [`Field::Unavailable`].

mod clean;
mod credential;
mod field;
mod openai;

pub use clean::{
    clean_price, clean_text, clean_vin, clean_year, fallback_extraction, normalize,
    strip_code_fences,
};
pub use credential::Credential;
pub use field::{Field, Price, UNAVAILABLE};
pub use openai::{ChatRequest, Message, OpenAiExtractor, OpenAiProvider};

use crate::crawler::FetchedPage;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Vehicle attributes recovered from one detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleData {
    pub vin: Field<String>,
    pub year: Field<u16>,
    pub make: Field<String>,
    pub model: Field<String>,
    pub trim: Field<String>,
    pub msrp: Field<Price>,
    pub sale_price: Field<Price>,
}

impl VehicleData {
    /// A record with nothing known except the default make
    pub fn unavailable(default_make: &str) -> Self {
        Self {
            vin: Field::Unavailable,
            year: Field::Unavailable,
            make: Field::Present(default_make.to_string()),
            model: Field::Unavailable,
            trim: Field::Unavailable,
            msrp: Field::Unavailable,
            sale_price: Field::Unavailable,
        }
    }
}

/// Errors raised inside an extractor before they are folded into
/// unavailable fields
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Extraction request failed: {0}")]
    Network(String),

    #[error("Extraction service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Extraction service returned no choices")]
    EmptyReply,

    #[error("Could not decode extraction service response: {0}")]
    Decode(String),
}

/// Extracts structured vehicle data from page content
#[async_trait]
pub trait VehicleExtractor: Send + Sync {
    /// Extracts vehicle data; unknown attributes come back unavailable
    async fn extract(&self, page: &FetchedPage) -> VehicleData;
}

/// Builds extractors bound to a per-job credential
pub trait ExtractorProvider: Send + Sync {
    fn extractor(&self, credential: &Credential) -> Arc<dyn VehicleExtractor>;
}
