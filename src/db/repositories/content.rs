use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use crate::entities::{articles, categories, resources};

/// Read-only access to the marketing content tables. Rows are seeded by
/// migration; nothing writes to them at the API surface.
pub struct ContentRepository {
    conn: DatabaseConnection,
}

impl ContentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_articles(&self) -> Result<Vec<articles::Model>> {
        articles::Entity::find()
            .order_by_desc(articles::Column::PublishedAt)
            .all(&self.conn)
            .await
            .context("Failed to list articles")
    }

    pub async fn list_categories(&self) -> Result<Vec<categories::Model>> {
        categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list categories")
    }

    pub async fn list_resources(&self) -> Result<Vec<resources::Model>> {
        resources::Entity::find()
            .order_by_desc(resources::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list resources")
    }
}
