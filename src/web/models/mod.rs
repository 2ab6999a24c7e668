use sea_orm::prelude::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::entities::{ingredient, tag};
use crate::db::services::RecipeWithLabels;
use crate::web::error::AppError;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (email)
    pub user_id: i32,
    pub exp: usize, // Expiration time (timestamp)
}

/// Struct to hold authenticated user details, to be passed as a request extension.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
}

/// Wire shape shared by tags and ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelResponse {
    pub id: i32,
    pub name: String,
}

impl From<tag::Model> for LabelResponse {
    fn from(model: tag::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl From<ingredient::Model> for LabelResponse {
    fn from(model: ingredient::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateLabelRequest {
    pub name: String,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateLabelRequest {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LabelListQuery {
    pub assigned_only: Option<String>,
}

impl LabelListQuery {
    pub fn assigned_only(&self) -> Result<bool, AppError> {
        parse_flag(self.assigned_only.as_deref())
            .map_err(|value| AppError::InvalidInput(format!("assigned_only: invalid value '{value}'")))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

impl RecipeListQuery {
    pub fn tag_ids(&self) -> Result<Vec<i32>, AppError> {
        parse_id_list("tags", self.tags.as_deref())
    }

    pub fn ingredient_ids(&self) -> Result<Vec<i32>, AppError> {
        parse_id_list("ingredients", self.ingredients.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub tags: Vec<CreateLabelRequest>,
    #[serde(default)]
    pub ingredients: Vec<CreateLabelRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<LabelResponse>,
    pub ingredients: Vec<LabelResponse>,
}

impl From<RecipeWithLabels> for RecipeResponse {
    fn from(item: RecipeWithLabels) -> Self {
        Self {
            id: item.recipe.id,
            title: item.recipe.title,
            description: item.recipe.description,
            time_minutes: item.recipe.time_minutes,
            price: item.recipe.price,
            link: item.recipe.link,
            tags: item.tags.into_iter().map(LabelResponse::from).collect(),
            ingredients: item.ingredients.into_iter().map(LabelResponse::from).collect(),
        }
    }
}

/// Trims and bounds a tag or ingredient name.
pub fn validate_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("name: may not be blank".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "name: ensure this field has no more than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Reads a boolean-ish query value. Returns the offending value on failure.
fn parse_flag(raw: Option<&str>) -> Result<bool, String> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    let value = raw.trim();
    if value.is_empty() {
        return Ok(false);
    }
    if let Ok(number) = value.parse::<i64>() {
        return Ok(number != 0);
    }
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => Err(raw.to_string()),
    }
}

fn parse_id_list(field: &str, raw: Option<&str>) -> Result<Vec<i32>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .map_err(|_| AppError::InvalidInput(format!("{field}: '{part}' is not a valid id")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_truthy_values() {
        for value in ["1", "2", "-1", "true", "TRUE", "yes", "on", " 1 "] {
            assert_eq!(parse_flag(Some(value)), Ok(true), "value {value:?}");
        }
    }

    #[test]
    fn test_parse_flag_falsy_values() {
        assert_eq!(parse_flag(None), Ok(false));
        for value in ["0", "", "false", "No", "off"] {
            assert_eq!(parse_flag(Some(value)), Ok(false), "value {value:?}");
        }
    }

    #[test]
    fn test_parse_flag_rejects_garbage() {
        assert_eq!(parse_flag(Some("maybe")), Err("maybe".to_string()));
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("tags", Some("1, 2,3")).unwrap(), vec![1, 2, 3]);
        assert!(parse_id_list("tags", None).unwrap().is_empty());
        assert!(parse_id_list("tags", Some("1,x")).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Vegan ").unwrap(), "Vegan");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"a".repeat(256)).is_err());
        assert!(validate_name(&"a".repeat(255)).is_ok());
    }
}
