use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::categories::repo::Category;
use crate::error::ApiError;

/// Payload for both create and rename; `name` is required either way.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryRequest {
    pub name: Option<String>,
}

impl CategoryRequest {
    pub fn validated(self) -> Result<String, ApiError> {
        match self.name {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(ApiError::invalid_data()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub name: String,
    pub category_id: Uuid,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            category_id: category.category_id,
        }
    }
}

/// Envelope for the list endpoint.
#[derive(Debug, Serialize)]
pub struct CategoriesEnvelope {
    pub categories: Vec<CategoryResponse>,
}
