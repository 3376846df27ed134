//! Locale reference data.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::LocaleId;

/// A locale known to the catalog, e.g. `de_DE` with ID 1.
///
/// Locales are reference data: the reconciler never creates or mutates them,
/// it only carries their IDs into URL records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    /// Catalog identifier.
    pub id: LocaleId,
    /// Locale name in `language_REGION` form.
    pub name: String,
}

impl Locale {
    /// Create a locale from its ID and name.
    #[must_use]
    pub fn new(id: LocaleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns the language part of the locale name.
    ///
    /// `de_DE` yields `de`. Names without a region separator are returned
    /// whole, lowercased.
    ///
    /// ```
    /// use product_url_store_core::{Locale, LocaleId};
    ///
    /// assert_eq!(Locale::new(LocaleId::new(1), "de_DE").language_code(), "de");
    /// assert_eq!(Locale::new(LocaleId::new(2), "en-US").language_code(), "en");
    /// assert_eq!(Locale::new(LocaleId::new(3), "FR").language_code(), "fr");
    /// ```
    #[must_use]
    pub fn language_code(&self) -> String {
        self.name
            .split(['_', '-'])
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
