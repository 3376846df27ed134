//! URL generation.
//!
//! A [`UrlGenerator`] turns a product abstract into one URL per locale,
//! independent of stores. [`SlugUrlGenerator`] is the default: it builds
//! `/{language}/{slug}-{id}` paths from URL keys or localized names.
//!
//! Any `Fn(&ProductAbstract) -> Result<ProductUrl, GenerationError>` is also a
//! generator, which keeps fixed outputs in tests short.

use std::collections::HashSet;

use slug::slugify;
use thiserror::Error;

use product_url_store_core::{
    LocaleId, LocalizedAttributes, LocalizedUrl, ProductAbstract, ProductUrl,
};

/// Errors that can occur while generating product URLs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The product ID is part of the URL but the product has none.
    #[error("product abstract has no identifier to append to its URL")]
    MissingIdentifier,

    /// A localized attributes entry has a blank locale name.
    #[error("locale {0} has no name")]
    InvalidLocale(LocaleId),

    /// The same locale appears twice in the localized attributes.
    #[error("locale {0} appears more than once")]
    DuplicateLocale(String),

    /// Nothing usable was left after slugifying the URL source.
    #[error("no URL slug could be derived for locale {locale}")]
    EmptySlug {
        /// Locale name the slug was generated for.
        locale: String,
    },
}

/// Produces localized URLs for a product abstract.
///
/// Implementations must be deterministic: the same product attributes always
/// yield the same URLs, so reconciling an unchanged product is a no-op on
/// stored URLs.
pub trait UrlGenerator: Send + Sync {
    /// Generate one URL per locale the product supports.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the attributes cannot produce a URL.
    fn generate_product_url(&self, product: &ProductAbstract)
    -> Result<ProductUrl, GenerationError>;
}

impl<F> UrlGenerator for F
where
    F: Fn(&ProductAbstract) -> Result<ProductUrl, GenerationError> + Send + Sync,
{
    fn generate_product_url(
        &self,
        product: &ProductAbstract,
    ) -> Result<ProductUrl, GenerationError> {
        self(product)
    }
}

/// Shape of URLs built by [`SlugUrlGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Prefix every URL with the locale's language code (`/de/...`).
    pub language_prefix: bool,
    /// Suffix every slug with the product abstract ID (`...-42`).
    pub append_id: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            language_prefix: true,
            append_id: true,
        }
    }
}

/// Default generator: slugified URL keys and names.
///
/// The slug source for a locale is, in order of preference: the localized
/// `url_key` attribute, the localized name, the abstract `url_key` attribute,
/// and finally the SKU.
///
/// ```
/// use product_url_store::{SlugUrlGenerator, UrlGenerator};
/// use product_url_store_core::{
///     Locale, LocaleId, LocalizedAttributes, ProductAbstract, ProductAbstractId,
/// };
///
/// let product = ProductAbstract::new("bag-001")
///     .with_id(ProductAbstractId::new(42))
///     .with_localized_attributes(LocalizedAttributes::new(
///         Locale::new(LocaleId::new(1), "de_DE"),
///         "Rote Tasche",
///     ));
///
/// let urls = SlugUrlGenerator::default().generate_product_url(&product).unwrap();
/// assert_eq!(urls.urls[0].url, "/de/rote-tasche-42");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugUrlGenerator {
    options: GeneratorOptions,
}

impl SlugUrlGenerator {
    /// Create a generator with the given options.
    #[must_use]
    pub const fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    /// Options this generator was built with.
    #[must_use]
    pub const fn options(&self) -> GeneratorOptions {
        self.options
    }

    fn generate_url(
        &self,
        product: &ProductAbstract,
        localized: &LocalizedAttributes,
    ) -> Result<String, GenerationError> {
        let locale = &localized.locale;
        if locale.name.trim().is_empty() {
            return Err(GenerationError::InvalidLocale(locale.id));
        }

        let source = localized
            .url_key()
            .or_else(|| Some(localized.name.as_str()).filter(|name| !name.trim().is_empty()))
            .or_else(|| product.url_key())
            .unwrap_or(product.sku.as_str());

        let slug = slugify(source);
        if slug.is_empty() {
            return Err(GenerationError::EmptySlug {
                locale: locale.name.clone(),
            });
        }

        let mut url = String::from("/");
        if self.options.language_prefix {
            url.push_str(&locale.language_code());
            url.push('/');
        }
        url.push_str(&slug);
        if self.options.append_id {
            let id = product.id.ok_or(GenerationError::MissingIdentifier)?;
            url.push('-');
            url.push_str(&id.to_string());
        }

        Ok(url)
    }
}

impl UrlGenerator for SlugUrlGenerator {
    fn generate_product_url(
        &self,
        product: &ProductAbstract,
    ) -> Result<ProductUrl, GenerationError> {
        let mut product_url = ProductUrl::new(product.sku.clone());
        let mut seen = HashSet::new();

        for localized in &product.localized_attributes {
            if !seen.insert(localized.locale.id) {
                return Err(GenerationError::DuplicateLocale(localized.locale.name.clone()));
            }
            let url = self.generate_url(product, localized)?;
            product_url.add_url(LocalizedUrl::new(localized.locale.clone(), url));
        }

        Ok(product_url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use product_url_store_core::{Locale, ProductAbstractId, URL_KEY_ATTRIBUTE};

    use super::*;

    fn de() -> Locale {
        Locale::new(LocaleId::new(1), "de_DE")
    }

    fn en() -> Locale {
        Locale::new(LocaleId::new(2), "en_US")
    }

    fn product() -> ProductAbstract {
        ProductAbstract::new("product-test")
            .with_id(ProductAbstractId::new(1))
            .with_localized_attributes(
                LocalizedAttributes::new(de(), "Produkt Größe M")
                    .with_attribute(URL_KEY_ATTRIBUTE, "product-url-de"),
            )
            .with_localized_attributes(LocalizedAttributes::new(en(), "Product Size M"))
    }

    #[test]
    fn test_one_url_per_locale_in_order() {
        let urls = SlugUrlGenerator::default()
            .generate_product_url(&product())
            .unwrap();

        assert_eq!(urls.abstract_sku, "product-test");
        assert_eq!(urls.urls.len(), 2);
        assert_eq!(urls.urls[0].locale, de());
        assert_eq!(urls.urls[0].url, "/de/product-url-de-1");
        assert_eq!(urls.urls[1].locale, en());
        assert_eq!(urls.urls[1].url, "/en/product-size-m-1");
    }

    #[test]
    fn test_transliterates_names() {
        let product = ProductAbstract::new("sku")
            .with_id(ProductAbstractId::new(5))
            .with_localized_attributes(LocalizedAttributes::new(de(), "Größe Übersicht"));

        let urls = SlugUrlGenerator::default().generate_product_url(&product).unwrap();
        assert_eq!(urls.urls[0].url, "/de/grosse-ubersicht-5");
    }

    #[test]
    fn test_falls_back_to_abstract_url_key_then_sku() {
        let generator = SlugUrlGenerator::default();

        let with_key = ProductAbstract::new("SKU 9")
            .with_id(ProductAbstractId::new(9))
            .with_attribute(URL_KEY_ATTRIBUTE, "url-test-default")
            .with_localized_attributes(LocalizedAttributes::new(en(), ""));
        let urls = generator.generate_product_url(&with_key).unwrap();
        assert_eq!(urls.urls[0].url, "/en/url-test-default-9");

        let bare = ProductAbstract::new("SKU 9")
            .with_id(ProductAbstractId::new(9))
            .with_localized_attributes(LocalizedAttributes::new(en(), "  "));
        let urls = generator.generate_product_url(&bare).unwrap();
        assert_eq!(urls.urls[0].url, "/en/sku-9-9");
    }

    #[test]
    fn test_options_disable_prefix_and_id() {
        let generator = SlugUrlGenerator::new(GeneratorOptions {
            language_prefix: false,
            append_id: false,
        });

        let urls = generator.generate_product_url(&product()).unwrap();
        assert_eq!(urls.urls[0].url, "/product-url-de");
        assert_eq!(urls.urls[1].url, "/product-size-m");
    }

    #[test]
    fn test_missing_identifier_when_id_is_appended() {
        let mut product = product();
        product.id = None;

        let result = SlugUrlGenerator::default().generate_product_url(&product);
        assert_eq!(result, Err(GenerationError::MissingIdentifier));

        let generator = SlugUrlGenerator::new(GeneratorOptions {
            language_prefix: true,
            append_id: false,
        });
        assert!(generator.generate_product_url(&product).is_ok());
    }

    #[test]
    fn test_empty_slug_is_rejected() {
        let product = ProductAbstract::new("---")
            .with_id(ProductAbstractId::new(1))
            .with_localized_attributes(LocalizedAttributes::new(de(), "!!!"));

        let result = SlugUrlGenerator::default().generate_product_url(&product);
        assert_eq!(
            result,
            Err(GenerationError::EmptySlug {
                locale: "de_DE".to_string()
            })
        );
    }

    #[test]
    fn test_blank_locale_name_is_rejected() {
        let product = ProductAbstract::new("sku")
            .with_id(ProductAbstractId::new(1))
            .with_localized_attributes(LocalizedAttributes::new(
                Locale::new(LocaleId::new(3), " "),
                "Name",
            ));

        let result = SlugUrlGenerator::default().generate_product_url(&product);
        assert_eq!(result, Err(GenerationError::InvalidLocale(LocaleId::new(3))));
    }

    #[test]
    fn test_duplicate_locale_is_rejected() {
        let product =
            product().with_localized_attributes(LocalizedAttributes::new(de(), "Noch eins"));

        let result = SlugUrlGenerator::default().generate_product_url(&product);
        assert_eq!(result, Err(GenerationError::DuplicateLocale("de_DE".to_string())));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = SlugUrlGenerator::default();
        assert_eq!(
            generator.generate_product_url(&product()).unwrap(),
            generator.generate_product_url(&product()).unwrap()
        );
    }

    #[test]
    fn test_closure_generator() {
        let generator = |product: &ProductAbstract| {
            let mut urls = ProductUrl::new(product.sku.clone());
            urls.add_url(LocalizedUrl::new(de(), "fixed"));
            Ok::<_, GenerationError>(urls)
        };

        let urls = generator.generate_product_url(&product()).unwrap();
        assert_eq!(urls.url_for_locale(LocaleId::new(1)), Some("fixed"));
    }
}
