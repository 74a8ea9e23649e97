//! Audit filter state and its mapping onto dashboard URLs
//!
//! The seven filter fields map one-to-one onto query parameters of the same
//! name. Empty values never reach the URL, the API or the saved filter store:
//! they are normalised to "no constraint" on the way in.

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use url::Url;

use crate::client::models::Criticality;
use crate::error::{ConfigError, Result};

const START_DATE: &str = "startDate";
const END_DATE: &str = "endDate";
const USER: &str = "user";
const ACTION: &str = "action";
const LABEL: &str = "label";
const SOURCE_MODULE: &str = "sourceModule";
const CRITICALITY: &str = "criticality";

/// Query parameter names owned by the filter state
pub const FILTER_KEYS: [&str; 7] = [
    START_DATE,
    END_DATE,
    USER,
    ACTION,
    LABEL,
    SOURCE_MODULE,
    CRITICALITY,
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Audit log filter constraints. `None` means the field does not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub source_module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub criticality: Option<Criticality>,
}

/// Deserialize an optional field from a string, mapping empty or unparsable
/// values to `None`
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_field))
}

fn parse_field<T: FromStr>(value: &str) -> Option<T> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl FilterState {
    /// Trim text fields and drop the empty ones
    pub fn normalised(self) -> Self {
        Self {
            start_date: self.start_date,
            end_date: self.end_date,
            user: non_empty(self.user),
            action: non_empty(self.action),
            label: non_empty(self.label),
            source_module: non_empty(self.source_module),
            criticality: self.criticality,
        }
    }

    /// True when no field constrains the query
    pub fn is_empty(&self) -> bool {
        self.to_query_pairs().is_empty()
    }

    /// Non-empty fields as query parameters, in a fixed field order
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let text = |key: &'static str, value: &Option<String>| {
            non_empty(value.clone()).map(|v| (key, v))
        };

        [
            self.start_date
                .map(|d| (START_DATE, d.format(DATE_FORMAT).to_string())),
            self.end_date
                .map(|d| (END_DATE, d.format(DATE_FORMAT).to_string())),
            text(USER, &self.user),
            text(ACTION, &self.action),
            text(LABEL, &self.label),
            text(SOURCE_MODULE, &self.source_module),
            self.criticality.map(|c| (CRITICALITY, c.to_string())),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Build filter state from query parameters, ignoring unrelated keys.
    /// Values that do not parse are dropped with a warning.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut state = FilterState::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                START_DATE => state.start_date = parse_logged(START_DATE, value),
                END_DATE => state.end_date = parse_logged(END_DATE, value),
                USER => state.user = non_empty(Some(value.to_string())),
                ACTION => state.action = non_empty(Some(value.to_string())),
                LABEL => state.label = non_empty(Some(value.to_string())),
                SOURCE_MODULE => state.source_module = non_empty(Some(value.to_string())),
                CRITICALITY => state.criticality = parse_logged(CRITICALITY, value),
                _ => {}
            }
        }
        state
    }

    /// Read filter state from a URL's query string
    pub fn from_url(url: &Url) -> Self {
        Self::from_query_pairs(url.query_pairs())
    }

    /// Rewrite a URL's query so exactly the non-empty filter fields appear,
    /// leaving every other parameter in place
    pub fn apply_to_url(&self, url: &mut Url) {
        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !FILTER_KEYS.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        pairs.extend(
            self.to_query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v)),
        );

        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }
}

fn parse_logged<T: FromStr>(key: &str, value: &str) -> Option<T> {
    let parsed = parse_field(value);
    if parsed.is_none() && !value.trim().is_empty() {
        warn!("Ignoring invalid {} filter value '{}'", key, value);
    }
    parsed
}

/// The dashboard page address that mirrors the committed filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardLocation {
    url: Url,
}

impl DashboardLocation {
    pub fn parse(value: &str) -> Result<Self> {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::Invalid(format!("Invalid dashboard URL '{}': {}", value, e)))?;
        Ok(Self { url })
    }

    /// Filters currently encoded in the address
    pub fn filters(&self) -> FilterState {
        FilterState::from_url(&self.url)
    }

    /// Replace the filter parameters, keeping all others
    pub fn replace_filters(&mut self, filters: &FilterState) {
        filters.apply_to_url(&mut self.url);
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}
