use super::ProductRecord;
use crate::{utils, ProductStore, ScraperError, Table};
use futures::TryStreamExt;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteRow},
    Row, SqlitePool,
};
use std::path::Path;

const COLUMNS: &str =
    "id, name, price, rating, review_count, availability, description, image_url, source_url";

pub struct ProductTable {
    name: String,
    pool: SqlitePool,
}

impl ProductTable {
    fn record_from_row(row: &SqliteRow) -> Result<ProductRecord, sqlx::Error> {
        Ok(ProductRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            rating: row.try_get("rating")?,
            review_count: row.try_get("review_count")?,
            availability: row.try_get("availability")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            source_url: row.try_get("source_url")?,
        })
    }

    pub async fn get_all(&self) -> Result<Vec<ProductRecord>, sqlx::Error> {
        let mut records = vec![];
        let query = format!(
            "SELECT {} FROM {} ORDER BY created_at, id",
            COLUMNS, self.name
        );
        let mut rows = sqlx::query(&query).fetch(&self.pool);
        while let Some(row) = rows.try_next().await? {
            records.push(Self::record_from_row(&row)?);
        }
        Ok(records)
    }

    pub async fn get<I: AsRef<str>>(&self, id: I) -> Result<Option<ProductRecord>, sqlx::Error> {
        let query = format!("SELECT {} FROM {} WHERE id = ?", COLUMNS, self.name);
        sqlx::query(&query)
            .bind(id.as_ref())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(Self::record_from_row)
            .transpose()
    }
}

#[async_trait::async_trait]
impl Table for ProductTable {
    type Record<'a> = &'a ProductRecord;

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        if !utils::is_table_exists(self.get_pool(), &self.name).await? {
            let query = format!(
                r#"
                        CREATE TABLE {} (
                            id TEXT PRIMARY KEY,
                            created_at DATETIME,
                            name TEXT NOT NULL,
                            price TEXT,
                            rating TEXT,
                            review_count TEXT,
                            availability TEXT,
                            description TEXT,
                            image_url TEXT,
                            source_url TEXT NOT NULL
                        )
                    "#,
                &self.name
            );
            sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        }
        Ok(())
    }

    // A repeated id replaces the stored row.
    async fn insert<'a>(&self, record: Self::Record<'a>) -> Result<(), sqlx::Error> {
        let mut tx = self.get_pool().begin().await?;
        let query = format!(
            r#"INSERT OR REPLACE INTO {} (
                {},
                created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            self.name, COLUMNS
        );
        sqlx::query(&query)
            .bind(&record.id)
            .bind(&record.name)
            .bind(&record.price)
            .bind(&record.rating)
            .bind(&record.review_count)
            .bind(&record.availability)
            .bind(&record.description)
            .bind(&record.image_url)
            .bind(&record.source_url)
            .bind(utils::get_now())
            .execute(&mut tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

/// The on-disk product catalog.
pub struct Catalog {
    pub products: ProductTable,
    pool: SqlitePool,
}

impl Catalog {
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Catalog, ScraperError> {
        let opt = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opt).await?;
        let c = Catalog {
            products: ProductTable {
                name: "products".to_string(),
                pool: pool.clone(),
            },
            pool,
        };

        if !utils::is_table_exists(&c.pool, &c.products.name).await? {
            tracing::debug!("Create table {}", c.products.name);
            c.products.create().await?;
        } else {
            tracing::debug!("Use table {}", c.products.name);
        }

        Ok(c)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl ProductStore for Catalog {
    async fn create(&self, record: &ProductRecord) -> Result<(), ScraperError> {
        if self.products.is_exist(&record.id).await? {
            tracing::debug!("Replace product {}", record.id);
        }
        Ok(self.products.insert(record).await?)
    }

    async fn list(&self) -> Result<Vec<ProductRecord>, ScraperError> {
        Ok(self.products.get_all().await?)
    }

    async fn get(&self, id: &str) -> Result<Option<ProductRecord>, ScraperError> {
        Ok(self.products.get(id).await?)
    }

    async fn delete(&self, id: &str) -> Result<bool, ScraperError> {
        Ok(self.products.delete(id).await?)
    }

    async fn count(&self) -> Result<u32, ScraperError> {
        Ok(self.products.count().await?)
    }
}
