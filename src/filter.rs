//! Row filtering over the tract table.
//!
//! A [`FilterSpec`] is a conjunction of independent criteria. The selected
//! county and the compared counties are merged into one set first; that set
//! is then ANDed with the urban and income criteria. Filtering never touches
//! the input slice.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::derive::normalize_county;
use crate::error::{FoodAccessError, Result};
use crate::model::Tract;

/// Inclusive bounds on median family income.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncomeRange {
    min: f64,
    max: f64,
}

impl IncomeRange {
    /// Fails if either bound is not finite or `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(FoodAccessError::InvalidParameter(format!(
                "income bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min > max {
            return Err(FoodAccessError::InvalidParameter(format!(
                "income range is inverted: [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    /// A tract with no reported income never falls inside a range.
    pub fn contains(&self, income: Option<f64>) -> bool {
        income.is_some_and(|v| v >= self.min && v <= self.max)
    }
}

/// Filter parameters supplied by the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSpec {
    /// The single selected county. `None`, `""` and `"All"` mean no selection.
    pub county: Option<String>,
    /// Counties picked for side-by-side comparison.
    pub compare: Vec<String>,
    pub urban_only: bool,
    pub income_range: Option<IncomeRange>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn with_compare<I, S>(mut self, counties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compare = counties.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_urban_only(mut self, urban_only: bool) -> Self {
        self.urban_only = urban_only;
        self
    }

    pub fn with_income_range(mut self, range: IncomeRange) -> Self {
        self.income_range = Some(range);
        self
    }

    /// The union of the selected and compared counties, normalized.
    ///
    /// Returns `None` when the union is empty, meaning no county restriction.
    pub fn county_set(&self) -> Option<BTreeSet<String>> {
        let set: BTreeSet<String> = self
            .county
            .iter()
            .chain(self.compare.iter())
            .filter(|name| !is_all(name))
            .map(|name| normalize_county(name))
            .collect();

        if set.is_empty() { None } else { Some(set) }
    }

    /// Returns `true` if the tract satisfies every criterion.
    pub fn matches(&self, tract: &Tract) -> bool {
        self.matches_with(self.county_set().as_ref(), tract)
    }

    fn matches_with(&self, counties: Option<&BTreeSet<String>>, tract: &Tract) -> bool {
        if let Some(set) = counties {
            if !set.contains(&tract.county) {
                return false;
            }
        }

        if self.urban_only && !tract.is_urban {
            return false;
        }

        if let Some(range) = &self.income_range {
            if !range.contains(tract.median_family_income) {
                return false;
            }
        }

        true
    }

    /// Returns the matching rows as a new table, in input order.
    pub fn apply(&self, tracts: &[Tract]) -> Vec<Tract> {
        let counties = self.county_set();
        tracts
            .iter()
            .filter(|t| self.matches_with(counties.as_ref(), t))
            .cloned()
            .collect()
    }
}

fn is_all(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name.eq_ignore_ascii_case("all")
}
