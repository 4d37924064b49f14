//! Helpers shared by the command implementations

use crate::config::{Config, ConfigStore};
use crate::error::Result;
use crate::paths::Layout;
use crate::platform::{Target, host};
use crate::resolver::Resolver;
use crate::runner::SystemRunner;

/// Host facts and user configuration every command starts from
pub struct Session {
    pub target: Target,
    pub layout: Layout,
    pub store: ConfigStore,
    pub config: Config,
    pub runner: SystemRunner,
}

impl Session {
    /// Detect the platform first so an unsupported host fails before anything is read or written.
    pub fn open() -> Result<Self> {
        let target = Target::current()?;
        let layout = Layout::discover()?;
        let store = ConfigStore::new(layout.config_file());
        let config = store.load()?;
        Ok(Self {
            target,
            layout,
            store,
            config,
            runner: SystemRunner,
        })
    }

    pub fn resolver(&self) -> Result<Resolver> {
        Resolver::system()
    }
}

/// This machine's host name, if the OS reports a non-empty one.
pub fn host_name() -> Option<String> {
    hostname::get()
        .ok()
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
}

/// Login user from `$USER`.
pub fn login_user() -> Option<String> {
    std::env::var("USER").ok().filter(|s| !s.is_empty())
}

/// Login shell from `$SHELL`.
pub fn login_shell() -> Option<String> {
    std::env::var("SHELL").ok().filter(|s| !s.is_empty())
}

pub fn wsl_without_systemd() -> bool {
    host::is_wsl() && !host::has_systemd()
}
