use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

pub mod amazon;
pub mod web;

mod data;
mod document;
mod error;
mod fetcher;
mod utils;

pub use amazon::{ProductFields, ProductRecord};
pub use data::Table;
pub use document::{Document, Element, FieldSelector, Marker};
pub use error::ScraperError;
pub use fetcher::{FetcherConfig, PageFetcher, RandomDelay, Throttle};
pub use utils::product_id_from_url;

/// Field lookups for one retailer's product page layout.
pub trait ProductParser {
    /// Every lookup runs; a missing marker only leaves its own field `None`.
    fn parse_fields(&self, doc: &Document) -> ProductFields;
}

/// Identifier-keyed product storage.
#[async_trait::async_trait]
pub trait ProductStore {
    /// Stores `record` under its id, replacing any previous row.
    async fn create(&self, record: &ProductRecord) -> Result<(), ScraperError>;
    async fn list(&self) -> Result<Vec<ProductRecord>, ScraperError>;
    async fn get(&self, id: &str) -> Result<Option<ProductRecord>, ScraperError>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, ScraperError>;
    async fn count(&self) -> Result<u32, ScraperError>;
}

/// Fetches a product page and turns it into a [`ProductRecord`].
pub struct Extractor<P> {
    fetcher: PageFetcher,
    parser: P,
}

impl Extractor<amazon::AmazonParser> {
    pub fn amazon(config: &FetcherConfig) -> Result<Self, ScraperError> {
        Ok(Extractor::new(
            PageFetcher::new(config)?,
            amazon::AmazonParser,
        ))
    }
}

impl<P> Extractor<P>
where
    P: ProductParser + Send + Sync,
{
    pub fn new(fetcher: PageFetcher, parser: P) -> Self {
        Extractor { fetcher, parser }
    }

    /// Fetch and parse `url`.
    ///
    /// Fails only when the page cannot be fetched or extraction itself
    /// panics. Missing fields never fail; they hold their sentinel values.
    pub async fn extract(&self, url: &str) -> Result<ProductRecord, ScraperError> {
        let html = self.fetcher.fetch(url).await?;

        let parser = &self.parser;
        panic::catch_unwind(AssertUnwindSafe(|| {
            let doc = Document::parse(&html);
            let fields = parser.parse_fields(&doc);
            ProductRecord::assemble(product_id_from_url(url), url, fields)
        }))
        .map_err(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            ScraperError::Extraction(reason)
        })
    }

    /// Like [`Extractor::extract`], but logs the failure and returns `None`.
    pub async fn fetch_product(&self, url: &str) -> Option<ProductRecord> {
        match self.extract(url).await {
            Ok(record) => {
                debug!("Extracted {} from {}", record.id, url);
                Some(record)
            }
            Err(e) => {
                warn!("Error occurred: {}", e);
                None
            }
        }
    }
}
