//! Category service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::category::{Category, CreateCategory},
    repository::Repository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        self.repository.categories_list().await
    }

    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        data.validate()?;
        let category = self.repository.categories_create(data).await?;
        tracing::info!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.categories_delete(id).await?;
        tracing::info!("Deleted category {}", id);
        Ok(())
    }
}
