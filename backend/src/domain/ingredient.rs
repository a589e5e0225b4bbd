//! Ingredient catalogue entries.
//!
//! Ingredients are reference data: loaded in bulk, never edited through the
//! API, and searched by name prefix.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::IngredientId;

/// Maximum length of an ingredient name.
pub const INGREDIENT_NAME_MAX: usize = 128;
/// Maximum length of a measurement unit.
pub const MEASUREMENT_UNIT_MAX: usize = 64;

/// Catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Ingredient {
    #[schema(value_type = i64)]
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

/// Reasons a bulk-import record is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngredientValidationError {
    #[error("ingredient name is missing")]
    MissingName,
    #[error("measurement unit is missing")]
    MissingUnit,
    #[error("ingredient name exceeds {max} characters")]
    NameTooLong { max: usize },
    #[error("measurement unit exceeds {max} characters")]
    UnitTooLong { max: usize },
}

/// Validated ingredient awaiting insertion.
///
/// # Examples
/// ```
/// use foodgram_backend::domain::NewIngredient;
///
/// let salt = NewIngredient::try_new(Some(" соль "), Some("г")).unwrap();
/// assert_eq!(salt.name(), "соль");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    name: String,
    measurement_unit: String,
}

impl NewIngredient {
    /// Validate raw import values; both fields are trimmed.
    pub fn try_new(
        name: Option<&str>,
        measurement_unit: Option<&str>,
    ) -> Result<Self, IngredientValidationError> {
        let name = name
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(IngredientValidationError::MissingName)?;
        let unit = measurement_unit
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(IngredientValidationError::MissingUnit)?;
        if name.chars().count() > INGREDIENT_NAME_MAX {
            return Err(IngredientValidationError::NameTooLong {
                max: INGREDIENT_NAME_MAX,
            });
        }
        if unit.chars().count() > MEASUREMENT_UNIT_MAX {
            return Err(IngredientValidationError::UnitTooLong {
                max: MEASUREMENT_UNIT_MAX,
            });
        }
        Ok(Self {
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
        })
    }

    /// Ingredient name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Measurement unit.
    pub fn measurement_unit(&self) -> &str {
        &self.measurement_unit
    }
}

/// Counts reported by a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Rows inserted.
    pub loaded: usize,
    /// Records ignored as invalid or already present.
    pub skipped: usize,
}

/// Whether `name` starts with `prefix`, matching the catalogue search rule.
///
/// Matching is case-sensitive; an empty prefix matches everything.
pub fn matches_prefix(name: &str, prefix: Option<&str>) -> bool {
    prefix.is_none_or(|value| name.starts_with(value))
}
