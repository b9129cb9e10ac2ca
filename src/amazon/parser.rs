use crate::{amazon::ProductFields, document::FieldSelector, Document, ProductParser};
use lazy_static::lazy_static;

lazy_static! {
    static ref TITLE: FieldSelector = FieldSelector::id("span", "productTitle");
    static ref PRICE: FieldSelector = FieldSelector::class("span", "a-price-whole");
    static ref RATING: FieldSelector = FieldSelector::class("span", "a-icon-alt");
    static ref REVIEW_COUNT: FieldSelector = FieldSelector::id("span", "acrCustomerReviewText");
    static ref AVAILABILITY: FieldSelector = FieldSelector::id("div", "availability");
    static ref DESCRIPTION: FieldSelector = FieldSelector::id("div", "productDescription");
    static ref IMAGE: FieldSelector = FieldSelector::id("img", "landingImage");
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AmazonParser;

impl ProductParser for AmazonParser {
    fn parse_fields(&self, doc: &Document) -> ProductFields {
        ProductFields {
            name: title(doc),
            price: price(doc),
            rating: rating(doc),
            review_count: review_count(doc),
            availability: availability(doc),
            description: description(doc),
            image_url: image(doc),
        }
    }
}

fn trimmed_text(doc: &Document, selector: &FieldSelector) -> Option<String> {
    doc.find_first(selector)
        .map(|el| el.text().trim().to_string())
}

fn first_token(doc: &Document, selector: &FieldSelector) -> Option<String> {
    doc.find_first(selector).and_then(|el| {
        el.text()
            .split_whitespace()
            .next()
            .map(ToString::to_string)
    })
}

fn title(doc: &Document) -> Option<String> {
    trimmed_text(doc, &TITLE)
}

// Whole-number part only; the fraction lives in a sibling element.
fn price(doc: &Document) -> Option<String> {
    trimmed_text(doc, &PRICE)
}

/// "4.5 out of 5 stars" -> "4.5"
fn rating(doc: &Document) -> Option<String> {
    first_token(doc, &RATING)
}

/// "1,234 ratings" -> "1,234"
fn review_count(doc: &Document) -> Option<String> {
    first_token(doc, &REVIEW_COUNT)
}

fn availability(doc: &Document) -> Option<String> {
    trimmed_text(doc, &AVAILABILITY)
}

fn description(doc: &Document) -> Option<String> {
    trimmed_text(doc, &DESCRIPTION)
}

fn image(doc: &Document) -> Option<String> {
    doc.find_first(&IMAGE)
        .and_then(|el| el.attr("src"))
        .map(ToString::to_string)
}
