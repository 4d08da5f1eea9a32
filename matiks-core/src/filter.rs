//! Categorical filters over a dataset.
//!
//! A [`FilterSelection`] holds one set of allowed values per filterable
//! [`Dimension`]. An empty set places no restriction on its dimension; the
//! active dimensions combine with logical AND.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use crate::types::{Dataset, UserActivityRecord};

/// A column the user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dimension {
    Country,
    GameTitle,
    SubscriptionTier,
}

impl Dimension {
    /// All filterable dimensions, in display order.
    pub const ALL: [Dimension; 3] = [
        Dimension::Country,
        Dimension::GameTitle,
        Dimension::SubscriptionTier,
    ];

    /// Value of this dimension for a record.
    pub fn value_of<'a>(&self, record: &'a UserActivityRecord) -> &'a str {
        match self {
            Dimension::Country => &record.country,
            Dimension::GameTitle => &record.game_title,
            Dimension::SubscriptionTier => &record.subscription_tier,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Country => "Country",
            Dimension::GameTitle => "Game Title",
            Dimension::SubscriptionTier => "Subscription Tier",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Allowed values per dimension. Empty means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub countries: BTreeSet<String>,
    pub game_titles: BTreeSet<String>,
    pub subscription_tiers: BTreeSet<String>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper that allows `values` for `dimension`.
    pub fn with<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values_mut(dimension)
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn values(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Country => &self.countries,
            Dimension::GameTitle => &self.game_titles,
            Dimension::SubscriptionTier => &self.subscription_tiers,
        }
    }

    fn values_mut(&mut self, dimension: Dimension) -> &mut BTreeSet<String> {
        match dimension {
            Dimension::Country => &mut self.countries,
            Dimension::GameTitle => &mut self.game_titles,
            Dimension::SubscriptionTier => &mut self.subscription_tiers,
        }
    }

    /// Add `value` if absent, remove it if present. Returns true if now selected.
    pub fn toggle(&mut self, dimension: Dimension, value: &str) -> bool {
        let values = self.values_mut(dimension);
        if values.remove(value) {
            false
        } else {
            values.insert(value.to_string());
            true
        }
    }

    pub fn is_selected(&self, dimension: Dimension, value: &str) -> bool {
        self.values(dimension).contains(value)
    }

    /// Clear one dimension.
    pub fn clear_dimension(&mut self, dimension: Dimension) {
        self.values_mut(dimension).clear();
    }

    /// Clear every dimension.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when no dimension is restricted.
    pub fn is_empty(&self) -> bool {
        Dimension::ALL.iter().all(|d| self.values(*d).is_empty())
    }

    /// Whether `record` passes every active dimension.
    pub fn matches(&self, record: &UserActivityRecord) -> bool {
        Dimension::ALL.iter().all(|dimension| {
            let allowed = self.values(*dimension);
            allowed.is_empty() || allowed.contains(dimension.value_of(record))
        })
    }
}

/// Apply `selection` to `dataset`, producing the working subset.
///
/// The input is left untouched; the result shares its records.
pub fn filter(dataset: &Dataset, selection: &FilterSelection) -> Dataset {
    if selection.is_empty() {
        return dataset.clone();
    }
    dataset.subset(|record| selection.matches(record))
}

/// Distinct values offered for each dimension, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub game_titles: Vec<String>,
    pub subscription_tiers: Vec<String>,
}

impl FilterOptions {
    pub fn values(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Country => &self.countries,
            Dimension::GameTitle => &self.game_titles,
            Dimension::SubscriptionTier => &self.subscription_tiers,
        }
    }
}

/// Collect the values each filter control should offer.
pub fn filter_options(dataset: &Dataset) -> FilterOptions {
    fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
        let mut seen = HashSet::new();
        values
            .filter(|v| seen.insert(*v))
            .map(str::to_string)
            .collect()
    }

    FilterOptions {
        countries: distinct(dataset.iter().map(|r| r.country.as_str())),
        game_titles: distinct(dataset.iter().map(|r| r.game_title.as_str())),
        subscription_tiers: distinct(dataset.iter().map(|r| r.subscription_tier.as_str())),
    }
}
