//! Fetch-and-extract tests against a local `wiremock` server, so no real
//! retailer is contacted.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use product_scraper::amazon::{AmazonParser, IMAGE_NOT_FOUND, NOT_FOUND};
use product_scraper::{
    Document, Extractor, FetcherConfig, PageFetcher, ProductFields, ProductParser, ScraperError,
    Throttle,
};

/// Counts pauses and records how many requests the server had seen at each.
struct RecordingThrottle {
    server: Arc<MockServer>,
    pauses: AtomicUsize,
    requests_seen: Mutex<Vec<usize>>,
}

impl RecordingThrottle {
    fn new(server: Arc<MockServer>) -> Arc<Self> {
        Arc::new(RecordingThrottle {
            server,
            pauses: AtomicUsize::new(0),
            requests_seen: Mutex::new(vec![]),
        })
    }
}

#[async_trait::async_trait]
impl Throttle for RecordingThrottle {
    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        let seen = self
            .server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or_default();
        self.requests_seen.lock().unwrap().push(seen);
    }
}

/// Parser that fails mid-extraction.
struct PanickingParser;

impl ProductParser for PanickingParser {
    fn parse_fields(&self, _doc: &Document) -> ProductFields {
        panic!("boom")
    }
}

fn fetcher(throttle: Arc<RecordingThrottle>) -> PageFetcher {
    let config = FetcherConfig {
        timeout: Some(Duration::from_secs(5)),
        ..FetcherConfig::default()
    };
    PageFetcher::with_throttle(&config, throttle).expect("failed to build fetcher")
}

fn extractor(throttle: Arc<RecordingThrottle>) -> Extractor<AmazonParser> {
    Extractor::new(fetcher(throttle), AmazonParser)
}

#[tokio::test]
async fn extracts_every_field_from_product_page() {
    let server = Arc::new(MockServer::start().await);
    let html = std::fs::read_to_string("tests/htmls/product.html").expect("Invalid file url");

    Mock::given(method("GET"))
        .and(path("/Electric-Kettle/dp/B000ABCXYZ"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(1)
        .mount(&server)
        .await;

    let throttle = RecordingThrottle::new(Arc::clone(&server));
    let url = format!("{}/Electric-Kettle/dp/B000ABCXYZ", server.uri());
    let record = extractor(Arc::clone(&throttle))
        .extract(&url)
        .await
        .expect("extraction should succeed");

    assert_eq!(record.id, "B000ABCXYZ");
    assert_eq!(
        record.name,
        "Stainless Steel Electric Kettle, 1.7L, Auto Shut-Off"
    );
    assert_eq!(record.price, "39.");
    assert_eq!(record.rating, "4.5");
    assert_eq!(record.review_count, "1,234");
    assert_eq!(record.availability, "In Stock");
    assert!(record.description.starts_with("Boils water fast."));
    assert_eq!(
        record.image_url,
        "https://m.media-amazon.com/images/I/61kettle.jpg"
    );
    assert_eq!(record.source_url, url);

    assert_eq!(throttle.pauses.load(Ordering::SeqCst), 1);
    assert_eq!(*throttle.requests_seen.lock().unwrap(), vec![0]);

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let sent = |name: &str| {
        requests[0]
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };
    assert_eq!(sent("accept-language").as_deref(), Some("en-US,en;q=0.9"));
    assert_eq!(
        sent("user-agent"),
        Some(FetcherConfig::default().user_agent)
    );
}

#[tokio::test]
async fn page_without_markers_still_yields_complete_record() {
    let server = Arc::new(MockServer::start().await);
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Sorry</body></html>"),
        )
        .mount(&server)
        .await;

    let throttle = RecordingThrottle::new(Arc::clone(&server));
    let url = format!("{}/dp/B000ABCXYZ", server.uri());
    let record = extractor(throttle)
        .fetch_product(&url)
        .await
        .expect("missing markers never fail the extraction");

    for field in [
        &record.name,
        &record.price,
        &record.rating,
        &record.review_count,
        &record.availability,
        &record.description,
    ] {
        assert_eq!(field, NOT_FOUND);
    }
    assert_eq!(record.image_url, IMAGE_NOT_FOUND);
}

#[tokio::test]
async fn not_found_status_is_a_failure() {
    let server = Arc::new(MockServer::start().await);
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"<span id="productTitle">Should not be read</span>"#),
        )
        .mount(&server)
        .await;

    let throttle = RecordingThrottle::new(Arc::clone(&server));
    let extractor = extractor(Arc::clone(&throttle));
    let url = format!("{}/dp/B000ABCXYZ", server.uri());

    let result = extractor.extract(&url).await;
    assert!(
        matches!(result, Err(ScraperError::Status { status: 404, .. })),
        "expected 404 status error, got: {result:?}"
    );
    assert!(extractor.fetch_product(&url).await.is_none());

    assert_eq!(throttle.pauses.load(Ordering::SeqCst), 2);
    assert_eq!(*throttle.requests_seen.lock().unwrap(), vec![0, 1]);
}

#[tokio::test]
async fn redirect_target_status_decides_outcome() {
    let server = Arc::new(MockServer::start().await);
    Mock::given(method("GET"))
        .and(path("/dp/OLD"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/dp/NEW"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dp/NEW"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<span id="productTitle">Moved kettle</span>"#),
        )
        .mount(&server)
        .await;

    let throttle = RecordingThrottle::new(Arc::clone(&server));
    let url = format!("{}/dp/OLD", server.uri());
    let record = extractor(throttle).extract(&url).await.unwrap();

    assert_eq!(record.id, "OLD");
    assert_eq!(record.name, "Moved kettle");
    assert_eq!(record.source_url, url);
}

#[tokio::test]
async fn transport_fault_is_not_propagated() {
    // Bind then release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .expect("failed to reserve a port")
        .port();
    let url = format!("http://127.0.0.1:{port}/dp/B000ABCXYZ");
    let idle = Arc::new(MockServer::start().await);

    let throttle = RecordingThrottle::new(idle);
    let extractor = extractor(Arc::clone(&throttle));

    let result = extractor.extract(&url).await;
    assert!(
        matches!(result, Err(ScraperError::Network(_))),
        "expected network error, got: {result:?}"
    );
    assert!(extractor.fetch_product(&url).await.is_none());
    assert_eq!(throttle.pauses.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn parser_panic_is_an_extraction_failure() {
    let server = Arc::new(MockServer::start().await);
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<span id="productTitle">Kettle</span>"#),
        )
        .mount(&server)
        .await;

    let throttle = RecordingThrottle::new(Arc::clone(&server));
    let extractor = Extractor::new(fetcher(Arc::clone(&throttle)), PanickingParser);
    let url = format!("{}/dp/B000ABCXYZ", server.uri());

    let result = extractor.extract(&url).await;
    assert!(
        matches!(&result, Err(ScraperError::Extraction(reason)) if reason == "boom"),
        "expected extraction error, got: {result:?}"
    );
    assert!(extractor.fetch_product(&url).await.is_none());
    assert_eq!(throttle.pauses.load(Ordering::SeqCst), 2);
}
