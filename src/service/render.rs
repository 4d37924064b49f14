//! Rendered daemon configuration

use serde::Serialize;

use crate::config::DaemonConfig;
use crate::error::Result;

#[derive(Serialize)]
struct Rendered<'a> {
    daemon: &'a DaemonConfig,
}

/// TOML document `{ daemon = config }`, every key written out explicitly.
pub fn render_config(config: &DaemonConfig) -> Result<String> {
    Ok(toml::to_string_pretty(&Rendered { daemon: config })?)
}
