//! Locale extractor for translated response messages.

use axum::extract::{FromRequestParts, Query};
use axum::http::header::{ACCEPT_LANGUAGE, COOKIE};
use axum::http::request::Parts;
use feedback_core::i18n::{LocaleInputs, Translator};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Name of the cookie holding a stored locale preference.
pub const LOCALE_COOKIE: &str = "locale";

#[derive(Debug, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

/// Locale negotiated for the current request.
///
/// Resolution order: `?lang=`, the `locale` cookie, `Accept-Language`,
/// then the configured default.
///
/// ```ignore
/// async fn handler(State(state): State<AppState>, locale: RequestLocale) {
///     let t = locale.translator(&state);
///     let message = t.t("support.created", &[]);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestLocale {
    pub locale: String,
}

impl RequestLocale {
    pub fn translator<'a>(&self, state: &'a AppState) -> Translator<'a> {
        state.i18n.translator(&self.locale)
    }
}

impl FromRequestParts<AppState> for RequestLocale {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let hint = Query::<LangQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.lang);
        let stored = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|header| cookie_value(header, LOCALE_COOKIE));
        let accept_language = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());

        let locale = state.i18n.resolve(LocaleInputs {
            hint: hint.as_deref(),
            stored: stored.as_deref(),
            accept_language,
        });

        Ok(RequestLocale { locale })
    }
}

/// Read one cookie from a `Cookie` header value.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.trim_matches('"').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_finds_named_pair() {
        assert_eq!(
            cookie_value("session=abc; locale=es; theme=dark", "locale").as_deref(),
            Some("es")
        );
        assert_eq!(cookie_value("locale=\"en\"", "locale").as_deref(), Some("en"));
        assert!(cookie_value("session=abc", "locale").is_none());
    }
}
