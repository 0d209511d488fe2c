//! LDAP connection management.

use std::collections::HashSet;

use ldap3::{LdapConnAsync, Mod, SearchEntry, SearchResult};
use orgtree_core::error::{TreeError, TreeResult};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::directory::{AttributeSet, DirEntry, Directory, DirectorySession, Filter, SearchScope};
use crate::error::DirectoryError;

/// Keys a directory configuration object must carry.
pub const REQUIRED_KEYS: &[&str] = &["Host", "Port", "Base", "User", "Password"];

/// Configuration for connecting to an LDAP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DirectoryConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port. Accepts integral JSON floats (`389.0`).
    #[serde(deserialize_with = "port_from_number")]
    pub port: u16,
    /// DN under which tenant roots live (e.g., `dc=example,dc=com`).
    pub base: String,
    /// Bind DN.
    pub user: String,
    /// Bind password.
    pub password: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 389,
            base: "dc=example,dc=com".into(),
            user: "cn=admin,dc=example,dc=com".into(),
            password: "admin".into(),
        }
    }
}

impl DirectoryConfig {
    pub fn url(&self) -> String {
        format!("ldap://{}:{}", self.host, self.port)
    }

    /// Build a configuration from a JSON object keyed by
    /// [`REQUIRED_KEYS`], rejecting missing or empty entries.
    pub fn from_value(value: &serde_json::Value) -> TreeResult<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| TreeError::invalid("directory config must be an object"))?;
        for key in REQUIRED_KEYS {
            if map.get(*key).is_none_or(serde_json::Value::is_null) {
                return Err(TreeError::invalid(format!("missing config key {key}")));
            }
        }

        let config: Self = serde_json::from_value(value.clone())
            .map_err(|e| TreeError::invalid(format!("invalid directory config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TreeResult<()> {
        for (key, value) in [
            ("Host", &self.host),
            ("Base", &self.base),
            ("User", &self.user),
        ] {
            if value.trim().is_empty() {
                return Err(TreeError::invalid(format!("config key {key} is empty")));
            }
        }
        if self.port == 0 {
            return Err(TreeError::invalid("config key Port must be non-zero"));
        }
        Ok(())
    }
}

fn port_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    let port = value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        })
        .ok_or_else(|| D::Error::custom(format!("invalid port {value}")))?;
    u16::try_from(port).map_err(|_| D::Error::custom(format!("port {port} out of range")))
}

/// A network LDAP server. Every [`connect`](Directory::connect) dials a
/// fresh connection and binds with the configured credentials.
#[derive(Debug, Clone)]
pub struct LdapDirectory {
    config: DirectoryConfig,
}

impl LdapDirectory {
    pub fn new(config: DirectoryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }
}

impl Directory for LdapDirectory {
    type Session = LdapSession;

    async fn connect(&self) -> Result<LdapSession, DirectoryError> {
        let url = self.config.url();
        info!(url = %url, user = %self.config.user, "Connecting to LDAP server");

        let (conn, mut ldap) =
            LdapConnAsync::new(&url)
                .await
                .map_err(|e| DirectoryError::Connect {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver stopped");
            }
        });

        let bind_err = |reason: String| DirectoryError::Bind {
            user: self.config.user.clone(),
            reason,
        };
        let result = ldap
            .simple_bind(&self.config.user, &self.config.password)
            .await
            .map_err(|e| bind_err(e.to_string()))?;
        if result.rc != 0 {
            return Err(bind_err(format!("rc={} {}", result.rc, result.text)));
        }

        debug!(url = %url, "Bound to LDAP server");
        Ok(LdapSession { ldap })
    }
}

/// A bound LDAP connection.
pub struct LdapSession {
    ldap: ldap3::Ldap,
}

impl DirectorySession for LdapSession {
    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &Filter,
        attrs: &[&str],
    ) -> Result<Vec<DirEntry>, DirectoryError> {
        let filter = filter.to_string();
        debug!(base, filter = %filter, ?scope, "search");
        let SearchResult(entries, result) = self
            .ldap
            .search(base, scope.into(), &filter, attrs.to_vec())
            .await?;
        DirectoryError::check(result.rc, base, &result.text)?;

        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(|e| DirEntry {
                dn: e.dn,
                attrs: e.attrs,
            })
            .collect())
    }

    async fn add(&mut self, dn: &str, attrs: AttributeSet) -> Result<(), DirectoryError> {
        let attrs: Vec<(String, HashSet<String>)> = attrs
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().collect()))
            .collect();
        let result = self.ldap.add(dn, attrs).await?;
        DirectoryError::check(result.rc, dn, &result.text)
    }

    async fn delete(&mut self, dn: &str) -> Result<(), DirectoryError> {
        let result = self.ldap.delete(dn).await?;
        DirectoryError::check(result.rc, dn, &result.text)
    }

    async fn modify_dn(&mut self, dn: &str, new_rdn: &str) -> Result<(), DirectoryError> {
        let result = self.ldap.modifydn(dn, new_rdn, true, None).await?;
        DirectoryError::check(result.rc, dn, &result.text)
    }

    async fn replace(
        &mut self,
        dn: &str,
        attr: &str,
        values: Vec<String>,
    ) -> Result<(), DirectoryError> {
        let values: HashSet<String> = values.into_iter().collect();
        let result = self
            .ldap
            .modify(dn, vec![Mod::Replace(attr.to_string(), values)])
            .await?;
        DirectoryError::check(result.rc, dn, &result.text)
    }

    async fn close(mut self) -> Result<(), DirectoryError> {
        self.ldap.unbind().await?;
        Ok(())
    }
}
