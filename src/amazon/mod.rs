mod data;
mod parser;

pub use data::{Catalog, ProductTable};
pub use parser::AmazonParser;

use serde::{Deserialize, Serialize};
use std::fmt;

pub const NOT_FOUND: &str = "Not found";
pub const IMAGE_NOT_FOUND: &str = "Image not found";

/// Field lookups for one page, before sentinels are applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: Option<String>,
    pub price: Option<String>,
    pub rating: Option<String>,
    pub review_count: Option<String>,
    pub availability: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub price: String,
    pub rating: String,
    pub review_count: String,
    pub availability: String,
    pub description: String,
    pub image_url: String,
    pub source_url: String,
}

impl ProductRecord {
    /// Every absent field becomes its sentinel here and nowhere else.
    pub fn assemble(id: String, source_url: &str, fields: ProductFields) -> Self {
        let or_not_found = |v: Option<String>| v.unwrap_or_else(|| NOT_FOUND.to_string());
        ProductRecord {
            id,
            name: or_not_found(fields.name),
            price: or_not_found(fields.price),
            rating: or_not_found(fields.rating),
            review_count: or_not_found(fields.review_count),
            availability: or_not_found(fields.availability),
            description: or_not_found(fields.description),
            image_url: fields
                .image_url
                .unwrap_or_else(|| IMAGE_NOT_FOUND.to_string()),
            source_url: source_url.to_string(),
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_url != IMAGE_NOT_FOUND
    }
}

impl fmt::Display for ProductRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Id              : {}", self.id)?;
        writeln!(f, "Name            : {}", self.name)?;
        writeln!(f, "Price           : {}", self.price)?;
        writeln!(f, "Rating          : {}", self.rating)?;
        writeln!(f, "Reviews         : {}", self.review_count)?;
        writeln!(f, "Availability    : {}", self.availability)?;
        writeln!(f, "Image           : {}", self.image_url)?;
        writeln!(f, "Source          : {}", self.source_url)?;
        writeln!(f, "Description     : ")?;
        writeln!(f, "> {}", self.description.replace('\n', "\n  "))?;

        Ok(())
    }
}
