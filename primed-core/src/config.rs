use crate::{Error, ErrorContext, Result};
use std::env;
use url::Url;

/// Runtime options of the preparation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareConfig {
    /// Prepare every known statement when the application signals it is ready.
    pub prepare_on_start: bool,
    /// Lists longer than this bind as a single array parameter instead of one parameter per
    /// element, so that they all share one compiled variant.
    pub list_expansion_limit: u32,
}

impl PrepareConfig {
    pub const PREPARE_ON_START: (&'static str, &'static str) =
        ("prepare_on_start", "PRIMED_PREPARE_ON_START");
    pub const LIST_EXPANSION_LIMIT: (&'static str, &'static str) =
        ("list_expansion_limit", "PRIMED_LIST_EXPANSION_LIMIT");

    /// Read the options from the query of `url` (falling back to the environment), removing them
    /// from the url so that it can be handed to the driver untouched otherwise.
    pub fn take_from_url(url: &mut Url) -> Result<Self> {
        let mut result = Self::default();
        if let Some(v) = take_url_param(url, Self::PREPARE_ON_START) {
            result.prepare_on_start = parse_bool(&v)
                .with_context(|| format!("While reading `{}`", Self::PREPARE_ON_START.0))?;
        }
        if let Some(v) = take_url_param(url, Self::LIST_EXPANSION_LIMIT) {
            result.list_expansion_limit = v.trim().parse().map_err(|e| {
                Error::new(e).context(format!(
                    "While reading `{}`: `{}` is not a valid limit",
                    Self::LIST_EXPANSION_LIMIT.0,
                    v
                ))
            })?;
        }
        Ok(result)
    }
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            prepare_on_start: true,
            list_expansion_limit: 32,
        }
    }
}

/// Remove `key` from the query of `url` and return its value, or the value of the environment
/// variable `env_var` when the url does not have it.
pub fn take_url_param(url: &mut Url, (key, env_var): (&str, &str)) -> Option<String> {
    let mut value = None;
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    if let Some(pos) = pairs.iter().position(|(k, _)| k == key) {
        let (_, v) = pairs.remove(pos);
        value = Some(v);
    }
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    value.or_else(|| env::var(env_var).ok())
}

pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::msg(format!("`{}` is not a boolean", value))),
    }
}
