//! Recipes and their ingredient lines.
//!
//! Raw request values are validated into the newtypes here before any
//! service touches storage, so a rejected payload never causes a write.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::domain::{
    Actor, Error, ImageRef, ImageUpload, Ingredient, IngredientId, RecipeId, User, UserId,
};

/// Smallest amount of an ingredient a line may hold.
pub const AMOUNT_MIN: i64 = 1;
/// Largest amount of an ingredient a line may hold (PostgreSQL `smallint`).
pub const AMOUNT_MAX: i64 = 32_767;
/// Shortest accepted cooking time in minutes.
pub const COOKING_TIME_MIN: i64 = 1;
/// Longest accepted cooking time in minutes.
pub const COOKING_TIME_MAX: i64 = 32_767;
/// Maximum length of a recipe name.
pub const RECIPE_NAME_MAX: usize = 256;

pub(crate) const INGREDIENTS_REQUIRED_ON_UPDATE: &str = "Это поле обязательно при обновлении.";
pub(crate) const INGREDIENTS_EMPTY: &str = "Нужен хотя бы один ингредиент.";
pub(crate) const INGREDIENTS_DUPLICATED: &str = "Ингредиенты не должны повторяться.";

/// Field-level validation failures for recipe payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeValidationError {
    #[error("recipe name must not be empty")]
    EmptyName,
    #[error("recipe name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("recipe description must not be empty")]
    EmptyText,
    #[error("cooking time must be between {min} and {max} minutes")]
    CookingTimeOutOfRange { min: i64, max: i64 },
    #[error("{}", INGREDIENTS_EMPTY)]
    NoIngredients,
    #[error("{}", INGREDIENTS_DUPLICATED)]
    DuplicateIngredient { ingredient: IngredientId },
    #[error("amount of ingredient {ingredient} must be between {min} and {max}")]
    AmountOutOfRange {
        ingredient: IngredientId,
        min: i64,
        max: i64,
    },
    #[error("{}", INGREDIENTS_REQUIRED_ON_UPDATE)]
    IngredientsRequired,
}

impl RecipeValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::EmptyText => "text",
            Self::CookingTimeOutOfRange { .. } => "cooking_time",
            Self::NoIngredients
            | Self::DuplicateIngredient { .. }
            | Self::AmountOutOfRange { .. }
            | Self::IngredientsRequired => "ingredients",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::EmptyText => "blank",
            Self::NameTooLong { .. } => "max_length",
            Self::CookingTimeOutOfRange { .. } | Self::AmountOutOfRange { .. } => "out_of_range",
            Self::NoIngredients => "empty",
            Self::DuplicateIngredient { .. } => "duplicate",
            Self::IngredientsRequired => "required",
        }
    }
}

impl From<RecipeValidationError> for Error {
    fn from(value: RecipeValidationError) -> Self {
        Error::invalid_field(value.field(), value.code(), value.to_string())
    }
}

/// Quantity of one ingredient in a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount(i32);

impl Amount {
    /// Validate an amount for `ingredient`.
    pub fn new(ingredient: IngredientId, raw: i64) -> Result<Self, RecipeValidationError> {
        in_range(raw, AMOUNT_MIN, AMOUNT_MAX)
            .map(Self)
            .ok_or(RecipeValidationError::AmountOutOfRange {
                ingredient,
                min: AMOUNT_MIN,
                max: AMOUNT_MAX,
            })
    }

    /// Raw amount.
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Cooking time in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookingTime(i32);

impl CookingTime {
    /// Validate a cooking time.
    pub fn new(raw: i64) -> Result<Self, RecipeValidationError> {
        in_range(raw, COOKING_TIME_MIN, COOKING_TIME_MAX)
            .map(Self)
            .ok_or(RecipeValidationError::CookingTimeOutOfRange {
                min: COOKING_TIME_MIN,
                max: COOKING_TIME_MAX,
            })
    }

    /// Minutes.
    pub const fn get(self) -> i32 {
        self.0
    }
}

fn in_range(raw: i64, min: i64, max: i64) -> Option<i32> {
    if (min..=max).contains(&raw) {
        i32::try_from(raw).ok()
    } else {
        None
    }
}

/// Recipe title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeName(String);

impl RecipeName {
    /// Validate a recipe title.
    pub fn new(raw: impl Into<String>) -> Result<Self, RecipeValidationError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(RecipeValidationError::EmptyName);
        }
        if value.chars().count() > RECIPE_NAME_MAX {
            return Err(RecipeValidationError::NameTooLong {
                max: RECIPE_NAME_MAX,
            });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for RecipeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Recipe description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeText(String);

impl RecipeText {
    /// Validate a recipe description.
    pub fn new(raw: impl Into<String>) -> Result<Self, RecipeValidationError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(RecipeValidationError::EmptyText);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for RecipeText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One `(ingredient, amount)` pair submitted for a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientLine {
    pub ingredient: IngredientId,
    pub amount: Amount,
}

/// Non-empty, duplicate-free ingredient lines in submission order.
///
/// # Examples
/// ```
/// use foodgram_backend::domain::{Amount, IngredientId, IngredientLine, IngredientLines};
///
/// let salt = IngredientId::new(1);
/// let line = IngredientLine { ingredient: salt, amount: Amount::new(salt, 10).unwrap() };
/// assert!(IngredientLines::new(vec![line, line]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLines(Vec<IngredientLine>);

impl IngredientLines {
    /// Validate the submitted lines.
    pub fn new(lines: Vec<IngredientLine>) -> Result<Self, RecipeValidationError> {
        if lines.is_empty() {
            return Err(RecipeValidationError::NoIngredients);
        }
        let mut seen = HashSet::with_capacity(lines.len());
        for line in &lines {
            if !seen.insert(line.ingredient) {
                return Err(RecipeValidationError::DuplicateIngredient {
                    ingredient: line.ingredient,
                });
            }
        }
        Ok(Self(lines))
    }

    /// Lines in submission order.
    pub fn as_slice(&self) -> &[IngredientLine] {
        &self.0
    }

    /// Ingredient ids referenced by the lines.
    pub fn ingredient_ids(&self) -> Vec<IngredientId> {
        self.0.iter().map(|line| line.ingredient).collect()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no lines; never true for a constructed value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validated payload for creating a recipe.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub name: RecipeName,
    pub text: RecipeText,
    pub cooking_time: CookingTime,
    pub image: ImageUpload,
    pub ingredients: IngredientLines,
}

/// Validated payload for a partial recipe update.
///
/// `ingredients` stays optional here so the service can reject its absence
/// with a field error instead of a parse failure.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub name: Option<RecipeName>,
    pub text: Option<RecipeText>,
    pub cooking_time: Option<CookingTime>,
    pub image: Option<ImageUpload>,
    pub ingredients: Option<IngredientLines>,
}

/// Recipe row ready for insertion together with its lines.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub author: UserId,
    pub name: RecipeName,
    pub text: RecipeText,
    pub cooking_time: CookingTime,
    pub image: ImageRef,
    pub ingredients: IngredientLines,
    pub created_at: DateTime<Utc>,
}

/// Update applied atomically: changed columns plus a full line replacement.
#[derive(Debug, Clone)]
pub struct RecipeUpdate {
    pub name: Option<RecipeName>,
    pub text: Option<RecipeText>,
    pub cooking_time: Option<CookingTime>,
    pub image: Option<ImageRef>,
    pub ingredients: IngredientLines,
}

/// Ingredient line as stored, joined with its catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub amount: i32,
}

/// Stored recipe with author and ingredient lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub author: User,
    pub name: String,
    pub image: ImageRef,
    pub text: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
    pub ingredients: Vec<RecipeIngredient>,
}

impl Recipe {
    /// Whether `actor` may edit or delete this recipe.
    pub fn can_be_modified_by(&self, actor: &Actor) -> bool {
        actor.is_admin || actor.id == self.author.id
    }

    /// Short form used in relation responses and author listings.
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
            cooking_time: self.cooking_time,
        }
    }
}

/// Short form of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub image: ImageRef,
    pub cooking_time: i32,
}

/// Listing predicates; all present predicates must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<UserId>,
    pub favorited_by: Option<UserId>,
    pub in_cart_of: Option<UserId>,
}

/// Recipes of one author, newest first, possibly truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorRecipes {
    pub recipes: Vec<RecipeSummary>,
    pub total: u64,
}

#[cfg(test)]
mod tests;
