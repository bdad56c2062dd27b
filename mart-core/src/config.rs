//! # Configuration
//!
//! A string key/value store mirroring Feathers' `app.set()` / `app.get()`.
//! Keys are dotted and lowercase (`http.port`, `blob.max_bytes`).
//!
//! Environment overrides use a prefix and double underscores as the
//! separator:
//!
//! ```bash
//! export STOREFRONT__HTTP__PORT=8080   # → http.port = "8080"
//! ```

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MartConfig {
    values: HashMap<String, String>,
}

impl MartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Sets `key` only when nothing has been configured for it yet.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Overlay variables from the process environment.
    pub fn load_env(&mut self, prefix: &str) -> usize {
        self.load_vars(prefix, std::env::vars())
    }

    /// Overlay `PREFIX__A__B=value` pairs as `a.b = value`.
    ///
    /// Returns how many keys were applied.
    pub fn load_vars<I>(&mut self, prefix: &str, vars: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = format!("{}__", prefix.trim_end_matches('_'));
        let mut applied = 0;

        for (key, value) in vars {
            let Some(stripped) = key.strip_prefix(&prefix) else {
                continue;
            };
            if stripped.is_empty() {
                continue;
            }

            let normalized = stripped.to_lowercase().replace("__", ".");
            self.values.insert(normalized, value);
            applied += 1;
        }

        applied
    }

    pub fn snapshot(&self) -> MartConfigSnapshot {
        MartConfigSnapshot::new(self.values.clone())
    }
}

/// Immutable copy of the config handed to hooks and route state.
#[derive(Debug, Clone, Default)]
pub struct MartConfigSnapshot {
    map: HashMap<String, String>,
}

impl MartConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_u16(&self, key: &str) -> Option<u16> {
        self.get(key).and_then(|v| v.trim().parse::<u16>().ok())
    }

    /// Accepts `true/false`, `1/0`, `yes/no`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn env_overlay_normalizes_keys() {
        let mut cfg = MartConfig::new();
        cfg.set("http.port", "3036");

        let applied = cfg.load_vars(
            "STOREFRONT",
            vars(&[
                ("STOREFRONT__HTTP__PORT", "8080"),
                ("STOREFRONT__BLOB__PUBLIC_BASE_URL", "https://cdn.example.com"),
                ("OTHER__HTTP__PORT", "1"),
                ("STOREFRONT__", "ignored"),
            ]),
        );

        assert_eq!(applied, 2);
        assert_eq!(cfg.get("http.port"), Some("8080"));
        assert_eq!(
            cfg.get("blob.public_base_url"),
            Some("https://cdn.example.com")
        );
    }

    #[test]
    fn set_default_keeps_existing_values() {
        let mut cfg = MartConfig::new();
        cfg.set("seed.on_start", "true");
        cfg.set_default("seed.on_start", "false");
        cfg.set_default("http.host", "127.0.0.1");

        assert_eq!(cfg.get("seed.on_start"), Some("true"));
        assert_eq!(cfg.get("http.host"), Some("127.0.0.1"));
    }

    #[test]
    fn snapshot_typed_getters() {
        let mut cfg = MartConfig::new();
        cfg.set("blob.max_bytes", "1048576");
        cfg.set("seed.on_start", "yes");
        cfg.set("http.port", "not-a-port");

        let snap = cfg.snapshot();
        assert_eq!(snap.get_u64("blob.max_bytes"), Some(1_048_576));
        assert_eq!(snap.get_bool("seed.on_start"), Some(true));
        assert_eq!(snap.get_u16("http.port"), None);
        assert_eq!(snap.get_string_or("http.host", "0.0.0.0"), "0.0.0.0");
    }
}
