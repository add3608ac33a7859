//! Connection configuration.
//!
//! A builder reaches its database either through a logical resource name
//! (resolved by the host, typically against a pool) or through direct
//! credentials. Both can be loaded from TOML:
//!
//! ```toml
//! resource = "jdbc/app"
//!
//! [credentials]
//! url = "mysql://db.internal:3306/app"
//! user = "app"
//! password = "${APP_DB_PASSWORD}"
//! ```
//!
//! `${VAR}` references are expanded from the process environment.

use crate::error::{SqlError, SqlResult};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Direct connection credentials.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub url: String,
    pub user: String,
    pub password: String,
}

impl Credentials {
    /// Create credentials from URL, user and password.
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// All three parts are non-blank.
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.url) && !is_blank(&self.user) && !is_blank(&self.password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How a builder obtains a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    /// Logical resource name; takes precedence over credentials when non-blank.
    #[serde(default)]
    pub resource: Option<String>,
    /// Direct credentials.
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

/// The connection route chosen from a [`ConnectionConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionTarget<'a> {
    Named(&'a str),
    Direct(&'a Credentials),
}

impl ConnectionConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a logical resource name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            resource: Some(name.into()),
            credentials: None,
        }
    }

    /// Use direct credentials.
    pub fn direct(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            resource: None,
            credentials: Some(Credentials::new(url, user, password)),
        }
    }

    /// Pick the route: a non-blank resource name first, then complete credentials.
    pub fn target(&self) -> SqlResult<ConnectionTarget<'_>> {
        if let Some(name) = self.resource.as_deref().filter(|n| !is_blank(n)) {
            return Ok(ConnectionTarget::Named(name));
        }
        if let Some(credentials) = self.credentials.as_ref().filter(|c| c.is_complete()) {
            return Ok(ConnectionTarget::Direct(credentials));
        }
        Err(SqlError::config("db is empty"))
    }

    /// Parse from TOML, expanding `${VAR}` references and validating the result.
    pub fn from_toml_str(raw: &str) -> SqlResult<Self> {
        let mut config: ConnectionConfig = toml::from_str(raw)?;
        config.expand_env()?;
        config.target()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SqlResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SqlError::config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            SqlError::Config(msg) => {
                SqlError::config(format!("invalid config file {}: {msg}", path.display()))
            }
            other => other,
        })
    }

    fn expand_env(&mut self) -> SqlResult<()> {
        if let Some(name) = self.resource.as_mut() {
            *name = expand_env_vars(name)?;
        }
        if let Some(c) = self.credentials.as_mut() {
            c.url = expand_env_vars(&c.url)?;
            c.user = expand_env_vars(&c.user)?;
            c.password = expand_env_vars(&c.password)?;
        }
        Ok(())
    }
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn expand_env_vars(input: &str) -> SqlResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(SqlError::config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(SqlError::config("invalid env var reference: ${}"));
            }

            let v = std::env::var(&key).map_err(|_| {
                SqlError::config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
