//! Type definitions for the FatSecret platform API.
//!
//! This module contains the wire shapes returned by the token endpoint and the
//! food API, plus the domain records handed back to callers.
//!
//! ## Key Types
//!
//! - [`SearchResult`] - One match from `foods.search`
//! - [`NutritionDetails`] - A food and its servings from `food.get`
//! - [`Serving`] - One portion measurement, numeric values kept as text
//!
//! ## API Compatibility
//!
//! FatSecret serialises single-element lists as a bare object and omits the
//! list entirely when there are no hits. The [`one_or_many`] deserializer folds
//! all three shapes into a `Vec` so callers only ever see an ordered sequence.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Token endpoint response for the client-credentials grant.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Lifetime in seconds, when the server reports one.
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Error envelope the food API returns, usually with a 200 status.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: i64,
    pub message: String,
}

impl ApiErrorDetail {
    /// Codes for which the cached access token should be thrown away.
    pub fn invalidates_token(&self) -> bool {
        matches!(self.code, 13 | 14)
    }
}

#[derive(Debug, Deserialize)]
pub struct FoodSearchResponse {
    pub foods: FoodsPage,
}

/// One page of `foods.search` hits.
#[derive(Debug, Deserialize)]
pub struct FoodsPage {
    #[serde(default, deserialize_with = "one_or_many")]
    pub food: Vec<SearchResult>,
}

/// A single match from a food search.
///
/// The `id` is the lookup key for [`crate::client::FatSecretClient::get_food`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "food_id")]
    pub id: String,
    #[serde(rename = "food_name")]
    pub name: String,
    /// Short nutrition blurb, e.g. `Per 100g - Calories: 52kcal`.
    #[serde(rename = "food_description", default)]
    pub description: Option<String>,
    #[serde(rename = "brand_name", default)]
    pub brand: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FoodDetailsResponse {
    pub food: NutritionDetails,
}

/// A food with every serving the server reported, in server order.
///
/// `servings` may be empty; callers must not assume a first serving exists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NutritionDetails {
    #[serde(rename = "food_id")]
    pub id: String,
    #[serde(rename = "food_name")]
    pub name: String,
    #[serde(default, deserialize_with = "servings_list")]
    pub servings: Vec<Serving>,
}

impl NutritionDetails {
    pub fn first_serving(&self) -> Option<&Serving> {
        self.servings.first()
    }
}

/// Nutrition for one portion size.
///
/// Numeric values are carried exactly as the API sends them (as text).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Serving {
    pub calories: String,
    pub serving_description: String,
    #[serde(rename = "metric_serving_amount", default)]
    pub metric_amount: Option<String>,
    #[serde(rename = "metric_serving_unit", default)]
    pub metric_unit: Option<String>,
    #[serde(default)]
    pub protein: Option<String>,
    #[serde(default)]
    pub carbohydrate: Option<String>,
    #[serde(default)]
    pub fat: Option<String>,
}

impl fmt::Display for Serving {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
        writeln!(f, "Calories: {}", self.calories)?;
        writeln!(f, "Protein: {}", or_na(&self.protein))?;
        writeln!(f, "Carbs: {}", or_na(&self.carbohydrate))?;
        writeln!(f, "Fat: {}", or_na(&self.fat))?;
        write!(f, "Serving: {}", self.serving_description)
    }
}

/// Accepts a JSON array, a single object, or `null`/absent and yields a `Vec`.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

/// Unwraps the `servings: { serving: ... }` nesting.
fn servings_list<'de, D>(deserializer: D) -> Result<Vec<Serving>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Servings {
        #[serde(default, deserialize_with = "one_or_many")]
        serving: Vec<Serving>,
    }

    Ok(Option::<Servings>::deserialize(deserializer)?
        .map(|s| s.serving)
        .unwrap_or_default())
}
