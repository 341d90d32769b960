//! Translation catalogs and locale resolution.
//!
//! A [`Catalog`] is built once at startup and shared read-only. Each request
//! resolves its locale with [`resolve_locale`] from explicit inputs and asks
//! the catalog for a [`Translator`], which is then passed to whatever code
//! produces user-facing text.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::error::CoreError;

/// Locale used when nothing else matches.
pub const DEFAULT_LOCALE: &str = "en";

const BUILTIN_CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en.json")),
    ("es", include_str!("../locales/es.json")),
];

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern is valid")
});

// ---------------------------------------------------------------------------
// Locale resolution
// ---------------------------------------------------------------------------

/// Everything a request can say about its preferred locale.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocaleInputs<'a> {
    /// Explicit hint, e.g. a `?lang=` query parameter.
    pub hint: Option<&'a str>,
    /// Stored user preference, e.g. a `locale` cookie.
    pub stored: Option<&'a str>,
    /// Raw `Accept-Language` header value.
    pub accept_language: Option<&'a str>,
}

/// Pick the locale for a request.
///
/// Candidates are tried in order: hint, stored preference, each
/// `Accept-Language` tag by descending quality. The first one matching a
/// supported locale wins; otherwise `default` is returned.
pub fn resolve_locale(inputs: LocaleInputs<'_>, supported: &[&str], default: &str) -> String {
    let header_tags = inputs
        .accept_language
        .map(parse_accept_language)
        .unwrap_or_default();

    inputs
        .hint
        .into_iter()
        .chain(inputs.stored)
        .chain(header_tags.iter().map(String::as_str))
        .find_map(|candidate| match_supported(candidate, supported))
        .unwrap_or_else(|| default.to_string())
}

/// Match a locale tag against the supported set.
///
/// Comparison is case-insensitive; a region tag (`es-MX`, `pt_BR`) falls
/// back to its primary language.
pub fn match_supported(candidate: &str, supported: &[&str]) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    if let Some(exact) = supported.iter().find(|s| s.eq_ignore_ascii_case(candidate)) {
        return Some((*exact).to_string());
    }
    let primary = candidate.split(['-', '_']).next().unwrap_or(candidate);
    supported
        .iter()
        .find(|s| s.eq_ignore_ascii_case(primary))
        .map(|s| (*s).to_string())
}

/// Parse an `Accept-Language` header into tags ordered by quality.
///
/// Tags with `q=0` and the `*` wildcard are dropped. Equal qualities keep
/// header order.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut tags: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let quality = pieces
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (quality > 0.0).then(|| (tag.to_string(), quality))
        })
        .collect();

    tags.sort_by(|a, b| b.1.total_cmp(&a.1));
    tags.into_iter().map(|(tag, _)| tag).collect()
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Translation maps keyed by locale.
#[derive(Debug, Clone)]
pub struct Catalog {
    default_locale: String,
    maps: HashMap<String, Value>,
}

impl Catalog {
    /// Load the catalogs compiled into the binary.
    pub fn builtin(default_locale: &str) -> Result<Self, CoreError> {
        let mut maps = HashMap::new();
        for (locale, raw) in BUILTIN_CATALOGS {
            let map: Value = serde_json::from_str(raw).map_err(|e| {
                CoreError::Internal(format!("Invalid '{locale}' translation catalog: {e}"))
            })?;
            maps.insert((*locale).to_string(), map);
        }
        Self::from_maps(default_locale, maps)
    }

    /// Build a catalog from already-parsed maps.
    ///
    /// Fails if `default_locale` has no map.
    pub fn from_maps(default_locale: &str, maps: HashMap<String, Value>) -> Result<Self, CoreError> {
        if !maps.contains_key(default_locale) {
            return Err(CoreError::Validation(format!(
                "Default locale '{default_locale}' has no translation catalog"
            )));
        }
        Ok(Self {
            default_locale: default_locale.to_string(),
            maps,
        })
    }

    /// Supported locales, sorted.
    pub fn supported(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.maps.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    /// Resolve a locale from request inputs against this catalog.
    pub fn resolve(&self, inputs: LocaleInputs<'_>) -> String {
        resolve_locale(inputs, &self.supported(), &self.default_locale)
    }

    /// A translator for `locale`. Unsupported locales use the default.
    pub fn translator(&self, locale: &str) -> Translator<'_> {
        let locale = if self.maps.contains_key(locale) {
            locale.to_string()
        } else {
            self.default_locale.clone()
        };
        Translator {
            catalog: self,
            locale,
        }
    }
}

// ---------------------------------------------------------------------------
// Translator
// ---------------------------------------------------------------------------

/// Translation context for a single locale.
#[derive(Debug, Clone)]
pub struct Translator<'a> {
    catalog: &'a Catalog,
    locale: String,
}

impl Translator<'_> {
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Translate a dotted key and fill `{{name}}` placeholders from `vars`.
    ///
    /// Lookup falls back to the default locale, then to the key itself.
    /// Placeholders without a matching variable are left as written.
    pub fn t(&self, key: &str, vars: &[(&str, &str)]) -> String {
        let template = [self.locale.as_str(), self.catalog.default_locale.as_str()]
            .into_iter()
            .filter_map(|locale| self.catalog.maps.get(locale))
            .find_map(|map| lookup(map, key))
            .unwrap_or(key);
        interpolate(template, vars)
    }
}

fn lookup<'v>(map: &'v Value, key: &str) -> Option<&'v str> {
    key.split('.')
        .try_fold(map, |node, segment| node.get(segment))
        .and_then(Value::as_str)
}

fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map_or_else(|| caps[0].to_string(), |(_, v)| (*v).to_string())
        })
        .into_owned()
}
