use scraper::{ElementRef, Html, Selector};

const E: &str = "Invalid selector";

/// Attribute that identifies the element holding a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Exact match on the `id` attribute.
    Id(&'static str),
    /// Match on one whitespace-separated token of the `class` attribute.
    Class(&'static str),
}

/// A tag plus marker predicate, compiled once into a CSS selector.
#[derive(Debug)]
pub struct FieldSelector {
    tag: &'static str,
    marker: Marker,
    selector: Selector,
}

impl FieldSelector {
    pub fn id(tag: &'static str, id: &'static str) -> Self {
        Self::new(tag, Marker::Id(id))
    }

    pub fn class(tag: &'static str, class: &'static str) -> Self {
        Self::new(tag, Marker::Class(class))
    }

    fn new(tag: &'static str, marker: Marker) -> Self {
        let css = match marker {
            Marker::Id(id) => format!(r#"{}[id="{}"]"#, tag, id),
            Marker::Class(class) => format!(r#"{}[class~="{}"]"#, tag, class),
        };
        let selector = Selector::parse(&css).expect(E);
        FieldSelector {
            tag,
            marker,
            selector,
        }
    }

    pub fn tag(&self) -> &str {
        self.tag
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }
}

/// Parsed, queryable tree of a fetched page.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Document {
            html: Html::parse_document(markup),
        }
    }

    /// First element, in document order, matching `selector`.
    pub fn find_first(&self, selector: &FieldSelector) -> Option<Element<'_>> {
        self.html.select(&selector.selector).next().map(Element)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
    /// Concatenated text of every descendant text node.
    pub fn text(&self) -> String {
        self.0.text().collect()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <div id="productTitle">wrong tag</div>
            <span id="productTitle">  Kettle <b>2L</b> </span>
            <span class="a-price a-price-whole big">1,299</span>
            <span class="a-price-whole-extra">7</span>
            <img id="landingImage" src="https://img.example.com/k.jpg">
        </body></html>
    "#;

    #[test]
    fn find_by_id_respects_tag() {
        let doc = Document::parse(PAGE);
        let sel = FieldSelector::id("span", "productTitle");
        let el = doc.find_first(&sel).expect("title element");
        assert_eq!(el.text(), "  Kettle 2L ");
        assert_eq!(sel.tag(), "span");
        assert_eq!(sel.marker(), Marker::Id("productTitle"));
    }

    #[test]
    fn find_by_class_matches_whole_token() {
        let doc = Document::parse(PAGE);
        let el = doc
            .find_first(&FieldSelector::class("span", "a-price-whole"))
            .expect("price element");
        assert_eq!(el.text(), "1,299");
    }

    #[test]
    fn missing_marker_yields_none() {
        let doc = Document::parse(PAGE);
        assert!(doc
            .find_first(&FieldSelector::id("div", "availability"))
            .is_none());
        assert!(doc
            .find_first(&FieldSelector::class("span", "a-icon-alt"))
            .is_none());
    }

    #[test]
    fn attributes_are_returned_verbatim() {
        let doc = Document::parse(PAGE);
        let img = doc
            .find_first(&FieldSelector::id("img", "landingImage"))
            .expect("image element");
        assert_eq!(img.attr("src"), Some("https://img.example.com/k.jpg"));
        assert_eq!(img.attr("alt"), None);
    }
}
