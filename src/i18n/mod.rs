//! Internationalization (i18n) support
//!
//! Built-in `ja` and `en` catalogs, optionally overridden by YAML or JSON
//! language files from the site's `i18n_dir`.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const BUILTIN: &[(&str, &str)] = &[
    ("ja", include_str!("ja.yml")),
    ("en", include_str!("en.yml")),
];

/// Internationalization handler
#[derive(Debug, Clone)]
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

impl I18n {
    /// Create a handler preloaded with the built-in catalogs
    pub fn new(language: &str) -> Self {
        let mut translations = HashMap::new();
        for (lang, source) in BUILTIN {
            match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(source) {
                Ok(data) => {
                    translations.insert(lang.to_string(), data);
                }
                Err(e) => tracing::error!("Built-in language {} is invalid: {}", lang, e),
            }
        }
        Self {
            language: language.to_string(),
            translations,
        }
    }

    /// Load language files from a directory, merging over built-in keys
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() {
                let ext = path.extension().and_then(|e| e.to_str());
                if matches!(ext, Some("yml") | Some("yaml") | Some("json")) {
                    let lang = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("en")
                        .to_string();

                    let content = fs::read_to_string(&path)?;

                    // Try to parse, skip invalid files
                    let data: Option<HashMap<String, serde_yaml::Value>> = if ext == Some("json") {
                        match serde_json::from_str::<serde_json::Value>(&content) {
                            Ok(json) => Some(convert_json_to_yaml(json)),
                            Err(e) => {
                                tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                                None
                            }
                        }
                    } else {
                        match serde_yaml::from_str(&content) {
                            Ok(data) => Some(data),
                            Err(e) => {
                                tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                                None
                            }
                        }
                    };

                    if let Some(data) = data {
                        let existing = self.translations.entry(lang).or_default();
                        for (key, value) in data {
                            merge_value(existing, key, value);
                        }
                        tracing::debug!("Loaded language file: {:?}", path);
                    }
                }
            }
        }

        Ok(())
    }

    /// Get the current language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get a translation by key; keys can be nested like "works.empty"
    pub fn get(&self, key: &str) -> String {
        self.get_for_lang(&self.language, key)
    }

    /// Get a translation for a specific language
    pub fn get_for_lang(&self, lang: &str, key: &str) -> String {
        if let Some(lang_data) = self.translations.get(lang) {
            if let Some(value) = get_nested_value(lang_data, key) {
                return yaml_value_to_string(value);
            }
        }

        // Fallback to English
        if lang != "en" {
            if let Some(lang_data) = self.translations.get("en") {
                if let Some(value) = get_nested_value(lang_data, key) {
                    return yaml_value_to_string(value);
                }
            }
        }

        // Return key as fallback
        key.to_string()
    }

    /// Nested catalog for template contexts: current language over English
    pub fn catalog(&self) -> serde_json::Value {
        let mut merged = serde_json::Value::Object(serde_json::Map::new());

        if self.language != "en" {
            if let Some(en_data) = self.translations.get("en") {
                merge_json(&mut merged, serde_json::to_value(en_data).unwrap_or_default());
            }
        }
        if let Some(lang_data) = self.translations.get(&self.language) {
            merge_json(&mut merged, serde_json::to_value(lang_data).unwrap_or_default());
        }

        merged
    }
}

/// Merge `value` into `target[key]`, recursing into mappings
fn merge_value(
    target: &mut HashMap<String, serde_yaml::Value>,
    key: String,
    value: serde_yaml::Value,
) {
    match target.get_mut(&key) {
        Some(serde_yaml::Value::Mapping(existing)) if value.is_mapping() => {
            if let serde_yaml::Value::Mapping(incoming) = value {
                for (k, v) in incoming {
                    existing.insert(k, v);
                }
            }
        }
        _ => {
            target.insert(key, value);
        }
    }
}

/// Get a nested value from a YAML map using dot notation
fn get_nested_value<'a>(
    data: &'a HashMap<String, serde_yaml::Value>,
    key: &str,
) -> Option<&'a serde_yaml::Value> {
    let parts: Vec<&str> = key.split('.').collect();
    let mut current: Option<&serde_yaml::Value> = data.get(parts[0]);

    for part in &parts[1..] {
        match current {
            Some(serde_yaml::Value::Mapping(map)) => {
                current = map.get(serde_yaml::Value::String(part.to_string()));
            }
            _ => return None,
        }
    }

    current
}

/// Convert a YAML value to a string
fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}

/// Deep-merge `incoming` into `target`; scalars in `incoming` win
fn merge_json(target: &mut serde_json::Value, incoming: serde_json::Value) {
    match (target, incoming) {
        (serde_json::Value::Object(existing), serde_json::Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (target, incoming) => *target = incoming,
    }
}

/// Convert JSON value to YAML HashMap
fn convert_json_to_yaml(json: serde_json::Value) -> HashMap<String, serde_yaml::Value> {
    let mut result = HashMap::new();

    if let serde_json::Value::Object(obj) = json {
        for (key, value) in obj {
            result.insert(key, json_value_to_yaml(value));
        }
    }

    result
}

fn json_value_to_yaml(json: serde_json::Value) -> serde_yaml::Value {
    match json {
        serde_json::Value::Null => serde_yaml::Value::Null,
        serde_json::Value::Bool(b) => serde_yaml::Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_yaml::Value::Number(i.into())
            } else if let Some(f) = n.as_f64() {
                serde_yaml::Value::Number(serde_yaml::Number::from(f))
            } else {
                serde_yaml::Value::Null
            }
        }
        serde_json::Value::String(s) => serde_yaml::Value::String(s),
        serde_json::Value::Array(arr) => {
            serde_yaml::Value::Sequence(arr.into_iter().map(json_value_to_yaml).collect())
        }
        serde_json::Value::Object(obj) => {
            let mut map = serde_yaml::Mapping::new();
            for (k, v) in obj {
                map.insert(serde_yaml::Value::String(k), json_value_to_yaml(v));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("ja")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogs() {
        let ja = I18n::new("ja");
        assert_eq!(ja.get("works.empty"), "現在、表示できるPortfolioがありません");
        assert_eq!(ja.get("works.libs"), "使用技術:");

        let en = I18n::new("en");
        assert_eq!(en.get("works.heading"), "Portfolio");
    }

    #[test]
    fn test_fallback_to_english_then_key() {
        let i18n = I18n::new("ko");
        assert_eq!(i18n.get("works.heading"), "Portfolio");
        assert_eq!(i18n.get("unknown.key"), "unknown.key");
    }

    #[test]
    fn test_language_dir_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ja.yml"), "works:\n  heading: 作品\n").unwrap();
        fs::write(dir.path().join("de.json"), r#"{"works": {"heading": "Arbeiten"}}"#).unwrap();
        fs::write(dir.path().join("broken.yml"), "works: [unclosed").unwrap();

        let mut i18n = I18n::new("ja");
        i18n.load_languages(dir.path()).unwrap();
        assert_eq!(i18n.get("works.heading"), "作品");
        // untouched keys of the same section survive the merge
        assert_eq!(i18n.get("works.empty"), "現在、表示できるPortfolioがありません");
        assert_eq!(i18n.get_for_lang("de", "works.heading"), "Arbeiten");
    }

    #[test]
    fn test_catalog_merges_english_under_current() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ko.yml"), "works:\n  heading: 포트폴리오\n").unwrap();

        let mut i18n = I18n::new("ko");
        i18n.load_languages(dir.path()).unwrap();
        let catalog = i18n.catalog();
        assert_eq!(catalog["works"]["heading"], "포트폴리오");
        assert_eq!(catalog["works"]["empty"], "There is no portfolio to display right now");
        assert_eq!(catalog["site"]["back"], "Back to works");
    }
}
