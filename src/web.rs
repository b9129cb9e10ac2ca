//! Minimal HTML front end over the product catalog.

use crate::{
    amazon::{AmazonParser, Catalog},
    Extractor, ProductRecord, ProductStore, ScraperError,
};
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub extractor: Arc<Extractor<AmazonParser>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddProductForm {
    #[serde(default)]
    pub product_link: String,
}

/// Store failures, rendered as a bare 500.
pub struct WebError(ScraperError);

impl From<ScraperError> for WebError {
    fn from(e: ScraperError) -> Self {
        WebError(e)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "catalog request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/add_product", post(add_product))
        .route("/delete_product/{product_id}", post(delete_product))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let products = state.catalog.list().await?;
    Ok(Html(render_index(&products)))
}

async fn add_product(
    State(state): State<AppState>,
    Form(form): Form<AddProductForm>,
) -> Result<Redirect, WebError> {
    let url = form.product_link.trim();
    if url.is_empty() {
        return Ok(Redirect::to("/"));
    }
    if let Some(record) = state.extractor.fetch_product(url).await {
        state.catalog.create(&record).await?;
        info!("Stored product {}", record.id);
    }
    Ok(Redirect::to("/"))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Redirect, WebError> {
    if state.catalog.delete(&product_id).await? {
        info!("Deleted product {}", product_id);
    }
    Ok(Redirect::to("/"))
}

pub fn render_index(products: &[ProductRecord]) -> String {
    let mut rows = String::new();
    for p in products {
        let image = if p.has_image() {
            format!(
                r#"<img src="{}" alt="" width="80">"#,
                encode_double_quoted_attribute(&p.image_url)
            )
        } else {
            encode_text(&p.image_url).into_owned()
        };
        rows.push_str(&format!(
            r#"
      <tr>
        <td>{image}</td>
        <td><a href="{link}">{name}</a></td>
        <td>{price}</td>
        <td>{rating}</td>
        <td>{reviews}</td>
        <td>{availability}</td>
        <td>{description}</td>
        <td>
          <form method="post" action="/delete_product/{id}">
            <button type="submit">Delete</button>
          </form>
        </td>
      </tr>"#,
            image = image,
            link = encode_double_quoted_attribute(&p.source_url),
            name = encode_text(&p.name),
            price = encode_text(&p.price),
            rating = encode_text(&p.rating),
            reviews = encode_text(&p.review_count),
            availability = encode_text(&p.availability),
            description = encode_text(&p.description),
            id = encode_double_quoted_attribute(&p.id),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Products</title>
  </head>
  <body>
    <h1>Products</h1>
    <form method="post" action="/add_product">
      <input type="url" name="product_link" placeholder="Product URL" required>
      <button type="submit">Add</button>
    </form>
    <table>
      <tr>
        <th>Image</th><th>Name</th><th>Price</th><th>Rating</th>
        <th>Reviews</th><th>Availability</th><th>Description</th><th></th>
      </tr>{}
    </table>
  </body>
</html>
"#,
        rows
    )
}
