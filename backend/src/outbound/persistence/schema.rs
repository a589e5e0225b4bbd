//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate with `diesel print-schema` or
//! update by hand.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Int8,
        /// Unique, at most 254 characters.
        email -> Varchar,
        /// Unique, at most 150 characters.
        username -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        /// Argon2id password hash in PHC string form.
        password -> Varchar,
        /// Media-relative avatar path.
        avatar -> Nullable<Varchar>,
        is_admin -> Bool,
    }
}

diesel::table! {
    /// Ingredient catalogue; `name` is unique.
    ingredients (id) {
        id -> Int8,
        name -> Varchar,
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    /// Published recipes.
    recipes (id) {
        id -> Int8,
        author_id -> Int8,
        name -> Varchar,
        /// Media-relative image path.
        image -> Varchar,
        text -> Text,
        cooking_time -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ingredient lines; one row per `(recipe_id, ingredient_id)`.
    recipe_ingredients (id) {
        id -> Int8,
        recipe_id -> Int8,
        ingredient_id -> Int8,
        amount -> Int4,
    }
}

diesel::table! {
    /// Favorite edges; unique per `(user_id, recipe_id)`.
    favorites (id) {
        id -> Int8,
        user_id -> Int8,
        recipe_id -> Int8,
        added_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shopping-cart edges; unique per `(user_id, recipe_id)`.
    shopping_cart (id) {
        id -> Int8,
        user_id -> Int8,
        recipe_id -> Int8,
        added_at -> Timestamptz,
    }
}

diesel::table! {
    /// Subscription edges; unique per pair and never self-referencing.
    subscriptions (id) {
        id -> Int8,
        follower_id -> Int8,
        author_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(favorites -> recipes (recipe_id));
diesel::joinable!(shopping_cart -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    ingredients,
    recipes,
    recipe_ingredients,
    favorites,
    shopping_cart,
    subscriptions,
);
