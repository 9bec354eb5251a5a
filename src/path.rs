use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::UsageError;

/// Placeholder naming the company (tenant) every company-scoped path is keyed by.
pub const COMPANY_SLUG: &str = "companySlug";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// Call-site arguments. Keys that fill a placeholder are consumed; the rest end up in the
/// query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Args(BTreeMap<String, String>);

impl Args {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument, replacing any previous value for `key`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                f.write_char('&')?;
            }
            first = false;
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Exposes the fields of an outgoing object by their placeholder name.
pub trait PathFields {
    /// The string form of the field named `name`, or `None` if there is no such field or it
    /// is not set.
    fn path_field(&self, name: &str) -> Option<String>;
}

/// A field value that can be substituted into a path.
pub trait PathValue {
    fn path_value(&self) -> Option<String>;
}

impl<T: PathValue> PathValue for Option<T> {
    fn path_value(&self) -> Option<String> {
        self.as_ref().and_then(PathValue::path_value)
    }
}

impl PathValue for i64 {
    fn path_value(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl PathValue for String {
    fn path_value(&self) -> Option<String> {
        Some(self.clone())
    }
}

/// Names of all placeholders in `template`, in order of appearance.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Encodes `value` as exactly one path segment.
///
/// Everything outside the unreserved set is percent-encoded, so `/`, `?` and `#` can't
/// change the shape of the URL. Empty and dot segments are rejected since URL parsing
/// would drop or collapse them.
pub fn encode_segment(placeholder: &str, value: &str) -> Result<String, UsageError> {
    if matches!(value, "" | "." | "..") {
        return Err(UsageError::InvalidPathValue {
            placeholder: placeholder.to_string(),
            value: value.to_string(),
        });
    }
    Ok(urlencoding::encode(value).into_owned())
}

fn substitute(
    template: &str,
    mut value_for: impl FnMut(&str) -> Option<String>,
) -> Result<String, UsageError> {
    let mut filled = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        filled.push_str(&template[last..whole.start()]);
        match value_for(name.as_str()) {
            Some(value) => filled.push_str(&encode_segment(name.as_str(), &value)?),
            None => filled.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    filled.push_str(&template[last..]);
    Ok(filled)
}

/// Substitutes every placeholder `fields` has a value for. Unmatched placeholders are left
/// as they are.
pub fn fill_from_fields(
    template: &str,
    fields: &(impl PathFields + ?Sized),
) -> Result<String, UsageError> {
    substitute(template, |name| fields.path_field(name))
}

/// Substitutes every remaining placeholder from `args`, removing the consumed keys.
///
/// Every placeholder must have an argument; the first one missing is reported.
pub fn fill_from_args(template: &str, args: &mut Args) -> Result<String, UsageError> {
    if let Some(missing) = placeholders(template).find(|p| !args.contains(p)) {
        return Err(UsageError::MissingPlaceholder {
            placeholder: missing.to_string(),
            template: template.to_string(),
        });
    }

    let names: Vec<String> = placeholders(template).map(String::from).collect();
    let filled = substitute(template, |name| args.get(name).map(str::to_string))?;

    for name in names {
        args.remove(&name);
    }
    Ok(filled)
}

/// Resolves `template` into a concrete path and the arguments left for the query string.
///
/// The object-field pass runs first, then the company slug is injected when the template
/// asks for it and the caller did not pass one, then the argument pass fills the rest. When
/// an object field and an argument share a name, the object's value lands in the path and
/// the argument is left over.
pub fn resolve(
    template: &str,
    fields: Option<&(dyn PathFields + Sync)>,
    mut args: Args,
    company_slug: Option<&str>,
) -> Result<(String, Args), UsageError> {
    let template = match fields {
        Some(fields) => fill_from_fields(template, fields)?,
        None => template.to_string(),
    };

    if let Some(slug) = company_slug
        && !args.contains(COMPANY_SLUG)
        && placeholders(&template).any(|p| p == COMPANY_SLUG)
    {
        args.insert(COMPANY_SLUG, slug);
    }

    let path = fill_from_args(&template, &mut args)?;
    trace!(%path, leftover = %args, "resolved path");
    Ok((path, args))
}
