//! Locale catalog queries.

use sqlx::{PgConnection, PgPool};

use product_url_store_core::{Locale, LocaleId};

use super::map_write_error;
use crate::repository::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct LocaleRow {
    id_locale: i32,
    locale_name: String,
}

impl From<LocaleRow> for Locale {
    fn from(row: LocaleRow) -> Self {
        Self::new(LocaleId::new(row.id_locale), row.locale_name)
    }
}

/// All locales, ordered by ID.
///
/// # Errors
///
/// Returns `sqlx::Error` if the query fails.
pub async fn list_locales(pool: &PgPool) -> Result<Vec<Locale>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LocaleRow>(
        r"
        SELECT id_locale, locale_name
        FROM url_store.locale
        ORDER BY id_locale
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Locale::from).collect())
}

/// Insert a locale or rename the existing one with the same ID.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if another locale already has the name.
pub async fn upsert_locale(
    conn: &mut PgConnection,
    locale: &Locale,
) -> Result<Locale, RepositoryError> {
    let row = sqlx::query_as::<_, LocaleRow>(
        r"
        INSERT INTO url_store.locale (id_locale, locale_name)
        VALUES ($1, $2)
        ON CONFLICT (id_locale) DO UPDATE SET locale_name = EXCLUDED.locale_name
        RETURNING id_locale, locale_name
        ",
    )
    .bind(locale.id)
    .bind(&locale.name)
    .fetch_one(conn)
    .await
    .map_err(|e| map_write_error(e, "locale name already taken"))?;

    Ok(row.into())
}
