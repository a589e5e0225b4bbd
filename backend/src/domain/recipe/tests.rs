//! Validation of recipe payload values.

use super::*;
use crate::domain::ErrorCode;
use rstest::rstest;

fn line(id: i64, amount: i64) -> IngredientLine {
    let ingredient = IngredientId::new(id);
    IngredientLine {
        ingredient,
        amount: Amount::new(ingredient, amount).expect("valid amount"),
    }
}

#[rstest]
#[case(0, false)]
#[case(1, true)]
#[case(32_767, true)]
#[case(32_768, false)]
#[case(-5, false)]
fn amount_bounds_are_inclusive(#[case] raw: i64, #[case] accepted: bool) {
    assert_eq!(Amount::new(IngredientId::new(1), raw).is_ok(), accepted);
}

#[rstest]
#[case(0, false)]
#[case(1, true)]
#[case(32_768, false)]
fn cooking_time_must_be_positive_minutes(#[case] raw: i64, #[case] accepted: bool) {
    assert_eq!(CookingTime::new(raw).is_ok(), accepted);
}

#[rstest]
fn lines_keep_submission_order() {
    let lines = IngredientLines::new(vec![line(3, 10), line(1, 5)]).expect("valid lines");
    assert_eq!(
        lines.ingredient_ids(),
        vec![IngredientId::new(3), IngredientId::new(1)]
    );
    assert_eq!(lines.len(), 2);
}

#[rstest]
fn empty_lines_are_rejected() {
    let error = IngredientLines::new(Vec::new()).expect_err("empty rejected");
    assert_eq!(error, RecipeValidationError::NoIngredients);
    assert_eq!(error.to_string(), "Нужен хотя бы один ингредиент.");
}

#[rstest]
fn duplicate_ingredients_are_rejected() {
    let error = IngredientLines::new(vec![line(1, 10), line(2, 1), line(1, 15)])
        .expect_err("duplicates rejected");
    assert_eq!(
        error,
        RecipeValidationError::DuplicateIngredient {
            ingredient: IngredientId::new(1)
        }
    );
}

#[rstest]
#[case(RecipeName::new("   ").expect_err("blank"), "name")]
#[case(RecipeName::new("x".repeat(RECIPE_NAME_MAX + 1)).expect_err("long"), "name")]
#[case(RecipeText::new("").expect_err("blank"), "text")]
#[case(CookingTime::new(0).expect_err("zero"), "cooking_time")]
#[case(RecipeValidationError::IngredientsRequired, "ingredients")]
fn errors_name_their_field(#[case] error: RecipeValidationError, #[case] field: &str) {
    let domain: Error = error.into();
    assert_eq!(domain.code(), ErrorCode::InvalidRequest);
    assert_eq!(domain.details().expect("details")["field"], field);
}
