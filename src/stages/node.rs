//! node stage: record this machine's identity in `node.yaml`
//!
//! The identity either comes from an existing file (`--node-config`) or is
//! built from the bootstrap flags (`--profile`, `--hostname`, `--user`,
//! `--age-key-file`). Sections kindling does not interpret are carried through
//! unchanged, so a full identity written by other tooling survives a copy.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{KindlingError, Result, fs::write_failed};
use crate::files::write_if_changed;

use super::{Stage, StageContext, StageOutcome};

const IDENTITY_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub version: String,
    pub profile: String,
    pub hostname: String,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
    #[serde(default)]
    pub nix: NixNodeConfig,
    /// Everything else in the file, kept as written
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_uid")]
    pub uid: u32,
    #[serde(default = "default_shell")]
    pub shell: String,
    #[serde(default)]
    pub email: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            uid: default_uid(),
            shell: default_shell(),
            email: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretsConfig {
    #[serde(default = "default_secrets_provider")]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_key_file: Option<PathBuf>,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            provider: default_secrets_provider(),
            age_key_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NixNodeConfig {
    #[serde(default = "default_trusted_users")]
    pub trusted_users: Vec<String>,
}

impl Default for NixNodeConfig {
    fn default() -> Self {
        Self {
            trusted_users: default_trusted_users(),
        }
    }
}

fn default_uid() -> u32 {
    1000
}

fn default_shell() -> String {
    "zsh".to_string()
}

fn default_secrets_provider() -> String {
    "sops".to_string()
}

fn default_trusted_users() -> Vec<String> {
    vec!["root".to_string()]
}

impl NodeIdentity {
    /// Identity for a freshly bootstrapped machine.
    pub fn from_bootstrap(
        profile: &str,
        hostname: &str,
        user: &str,
        age_key_file: Option<&Path>,
    ) -> Self {
        Self {
            version: IDENTITY_VERSION.to_string(),
            profile: profile.to_string(),
            hostname: hostname.to_string(),
            user: UserConfig {
                name: user.to_string(),
                ..UserConfig::default()
            },
            secrets: SecretsConfig {
                age_key_file: age_key_file.map(Path::to_path_buf),
                ..SecretsConfig::default()
            },
            nix: NixNodeConfig {
                trusted_users: vec!["root".to_string(), user.to_string()],
            },
            other: BTreeMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| KindlingError::ConfigReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let identity: Self =
            serde_yaml::from_str(&content).map_err(|e| KindlingError::ConfigParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        identity.validate(path)?;
        Ok(identity)
    }

    /// Profile and host name are required; `path` names the file in errors.
    pub fn validate(&self, path: &Path) -> Result<()> {
        for (key, value) in [("profile", &self.profile), ("hostname", &self.hostname)] {
            if value.trim().is_empty() {
                return Err(KindlingError::ConfigParseFailed {
                    path: path.display().to_string(),
                    reason: format!("`{key}` must not be empty"),
                });
            }
        }
        Ok(())
    }

    pub fn to_yaml(&self, path: &Path) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| write_failed(path, e))
    }
}

/// Where the node identity comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSource {
    /// An existing `node.yaml`
    File(PathBuf),
    /// Bootstrap flags, with host and user defaults already filled in
    Flags {
        profile: String,
        hostname: String,
        user: String,
        age_key_file: Option<PathBuf>,
    },
}

impl NodeSource {
    pub fn identity(&self) -> Result<NodeIdentity> {
        match self {
            NodeSource::File(path) => NodeIdentity::load(path),
            NodeSource::Flags {
                profile,
                hostname,
                user,
                age_key_file,
            } => Ok(NodeIdentity::from_bootstrap(
                profile,
                hostname,
                user,
                age_key_file.as_deref(),
            )),
        }
    }
}

pub struct NodeStage;

impl Stage for NodeStage {
    fn name(&self) -> &'static str {
        "node"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome> {
        let mut outcome = StageOutcome::default();
        let Some(source) = ctx.node.clone() else {
            return Ok(outcome);
        };

        let identity = source.identity()?;
        let path = ctx.layout.node_config_file();
        identity.validate(&path)?;
        let yaml = identity.to_yaml(&path)?;

        if !path.exists() {
            ctx.require_consent(&format!("Write node identity for {}", identity.hostname))?;
        }
        if write_if_changed(&path, &yaml)? {
            info!(path = %path.display(), profile = %identity.profile, "node identity saved");
            outcome.push(format!("Saved node identity to {}", path.display()));
        }

        Ok(outcome)
    }
}
