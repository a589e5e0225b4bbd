//! Shopping list aggregation and plain-text rendering.

#![deny(missing_docs)]

use std::collections::BTreeMap;

/// Header written before the aggregated lines.
pub const SHOPPING_LIST_HEADER: &str = "Список покупок для Foodgram:";
/// Download file name.
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";
/// Message reported when the cart holds no recipes.
pub const EMPTY_SHOPPING_LIST: &str = "Список покупок пуст.";

/// One merged `(name, unit)` group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    /// Ingredient name.
    pub name: String,
    /// Unit shared by every merged amount.
    pub measurement_unit: String,
    /// Sum of the amounts across the cart.
    pub total: i64,
}

/// Aggregated shopping list, ordered by ingredient name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    lines: Vec<ShoppingListLine>,
}

impl ShoppingList {
    /// Wrap lines already grouped and ordered by storage.
    pub fn from_sorted(lines: Vec<ShoppingListLine>) -> Self {
        Self { lines }
    }

    /// Merge raw `(name, unit, amount)` ingredient lines.
    ///
    /// Lines sharing a name but not a unit stay separate; no unit
    /// conversion happens.
    ///
    /// # Examples
    /// ```
    /// use foodgram_backend::domain::ShoppingList;
    ///
    /// let list = ShoppingList::aggregate([
    ///     ("Salt".to_owned(), "g".to_owned(), 10),
    ///     ("Salt".to_owned(), "g".to_owned(), 15),
    /// ]);
    /// assert_eq!(list.render(), "Список покупок для Foodgram:\n\n• Salt (g) — 25\n");
    /// ```
    pub fn aggregate(lines: impl IntoIterator<Item = (String, String, i64)>) -> Self {
        let mut groups: BTreeMap<(String, String), i64> = BTreeMap::new();
        for (name, unit, amount) in lines {
            *groups.entry((name, unit)).or_default() += amount;
        }
        let lines = groups
            .into_iter()
            .map(|((name, measurement_unit), total)| ShoppingListLine {
                name,
                measurement_unit,
                total,
            })
            .collect();
        Self { lines }
    }

    /// Aggregated lines.
    pub fn lines(&self) -> &[ShoppingListLine] {
        &self.lines
    }

    /// Whether nothing needs buying.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Plain-text report: header, blank line, one bullet per group.
    pub fn render(&self) -> String {
        let mut out = format!("{SHOPPING_LIST_HEADER}\n\n");
        for line in &self.lines {
            out.push_str(&format!(
                "• {} ({}) — {}\n",
                line.name, line.measurement_unit, line.total
            ));
        }
        out
    }
}
