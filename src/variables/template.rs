use crate::value::Value;
use ahash::AHashMap;
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").expect("valid placeholder pattern")
});

/// Supplies the values substituted into `{{key}}` placeholders.
pub trait TemplateSource {
    fn lookup(&self, key: &str) -> Option<Value>;
}

impl TemplateSource for IndexMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl TemplateSource for HashMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl TemplateSource for AHashMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl TemplateSource for super::VariableRegistry {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

/// Template source with no keys. Every placeholder renders empty.
pub struct NoSource;

impl TemplateSource for NoSource {
    fn lookup(&self, _key: &str) -> Option<Value> {
        None
    }
}

/// Renders a value template.
///
/// A template consisting of exactly one placeholder yields the looked-up value
/// unchanged, so lists and numbers survive. Anything else is rendered as text,
/// with missing keys substituted by the empty string.
pub fn render(template: &str, source: &dyn TemplateSource) -> Value {
    if let Some(caps) = PLACEHOLDER_RE.captures(template.trim())
        && caps.get(0).map(|m| m.len()) == Some(template.trim().len())
    {
        return source.lookup(&caps[1]).unwrap_or_default();
    }
    let rendered = PLACEHOLDER_RE.replace_all(template, |caps: &regex::Captures<'_>| {
        source
            .lookup(&caps[1])
            .map(|value| value.as_text())
            .unwrap_or_default()
    });
    Value::Text(rendered.into_owned())
}
