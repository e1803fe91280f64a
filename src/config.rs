use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::auth::DEFAULT_TOKEN_TTL_SECONDS;
use crate::db::DatabaseConfig;

/// Service configuration, read from `contacts.json`.
///
/// ```json
/// {
///   "jwt": { "key": "${CONTACTS_JWT_KEY}", "ttlSeconds": 3600 },
///   "database": { "url": "memory", "namespace": "contacts", "database": "service" }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JwtConfig {
    /// HS256 signing key. Must be at least 32 bytes.
    pub key: String,
    pub ttl_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            key: env::var("CONTACTS_JWT_KEY").unwrap_or_default(),
            ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file, expanding `${VAR}` references.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let mut value: serde_json::Value = serde_json::from_str(&raw)?;
        expand_strings(&mut value);

        Ok(serde_json::from_value(value)?)
    }

    /// Load from the resolved config file, or fall back to the environment.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match resolve_config_path(explicit) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Locate `contacts.json`.
///
/// An explicit path wins, then `CONTACTS_CONFIG`, then
/// `$XDG_CONFIG_HOME/contacts/contacts.json`, then `./contacts.json`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }

    if let Ok(p) = env::var("CONTACTS_CONFIG") {
        return Some(PathBuf::from(p));
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let candidate = PathBuf::from(xdg).join("contacts").join("contacts.json");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    let candidate = PathBuf::from("contacts.json");
    if candidate.exists() {
        return Some(candidate);
    }

    None
}

fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            match env::var(&name) {
                Ok(val) => out.push_str(&val),
                Err(_) => {
                    out.push_str("${");
                    out.push_str(&name);
                    out.push('}');
                }
            }
        } else {
            out.push(ch);
        }
    }

    out
}

fn expand_strings(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::String(s) => *s = expand_env_vars(s),
        serde_json::Value::Array(items) => items.iter_mut().for_each(expand_strings),
        serde_json::Value::Object(map) => map.values_mut().for_each(expand_strings),
        _ => {}
    }
}
