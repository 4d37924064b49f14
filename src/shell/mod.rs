//! Shell integration
//!
//! The fast path run while a shell or direnv environment initializes. It must
//! finish quickly, so it stops at the first step that finds the managed tool:
//! 1. the managed tool is on the search path
//! 2. the managed tool is at a known location (its directory is activated)
//! 3. kindling is resolved through the full resolver chain and runs
//!    `kindling ensure` non-interactively
//!
//! Whichever step succeeds, the managed tool's activation script is reported
//! when it exists. [`ShellHook`] is the in-process version behind
//! `kindling hook`; [`render_library`] emits the same steps as the direnv
//! `use_kindling` function, generated from the same [`ToolSpec`]s.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, resolve};
use crate::platform::Target;
use crate::resolver::{Resolver, ToolSpec};
use crate::runner::{CommandRunner, Invocation};

/// Environment variable that makes `kindling ensure` install without prompting
pub const AUTO_INSTALL_ENV: &str = "KINDLING_AUTO_INSTALL";

/// Which step of the fast path found the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStep {
    SearchPath,
    KnownLocation,
    Ensured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookReport {
    pub tool: PathBuf,
    pub step: HookStep,
    /// Directories the shell must prepend to `PATH`
    pub path_dirs: Vec<PathBuf>,
    /// Script the shell must source
    pub activation: Option<PathBuf>,
}

impl HookReport {
    /// Lines for the calling shell to `eval`.
    pub fn to_shell(&self) -> String {
        let mut lines = Vec::new();
        if !self.path_dirs.is_empty() {
            let dirs = self
                .path_dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(":");
            lines.push(format!("export PATH={}:\"$PATH\"", quote(&dirs)));
        }
        if let Some(script) = &self.activation {
            lines.push(format!(". {}", quote(&script.display().to_string())));
        }
        lines
            .into_iter()
            .map(|line| line + "\n")
            .collect::<String>()
    }
}

pub struct ShellHook {
    pub managed: ToolSpec,
    pub kindling: ToolSpec,
}

impl ShellHook {
    pub fn new(managed: ToolSpec, kindling: ToolSpec) -> Self {
        Self { managed, kindling }
    }

    pub fn run(
        &self,
        resolver: &mut Resolver,
        target: &Target,
        runner: &dyn CommandRunner,
    ) -> Result<HookReport> {
        let activation = self.activation_script();

        if let Some(tool) = resolver.find_on_path(&self.managed.name) {
            debug!(tool = %tool.display(), "hook: on search path");
            return Ok(HookReport {
                tool,
                step: HookStep::SearchPath,
                path_dirs: Vec::new(),
                activation,
            });
        }

        if let Some(tool) = resolver.probe_candidates(&self.managed) {
            debug!(tool = %tool.display(), "hook: known location");
            return Ok(self.activated(resolver, tool, HookStep::KnownLocation));
        }

        let kindling = resolver.resolve(&self.kindling, target)?;
        debug!(kindling = %kindling.path.display(), via = %kindling.via, "hook: running ensure");
        let ensure = Invocation::new(&kindling.path)
            .arg("ensure")
            .env(AUTO_INSTALL_ENV, "1")
            .env("PATH", resolver.search_path().to_env());
        runner.run_checked(&ensure)?;

        let tool = resolver.probe_candidates(&self.managed).ok_or_else(|| {
            resolve::failed(
                &self.managed.name,
                "`kindling ensure` succeeded but the tool is still missing",
            )
        })?;
        Ok(self.activated(resolver, tool, HookStep::Ensured))
    }

    fn activated(&self, resolver: &mut Resolver, tool: PathBuf, step: HookStep) -> HookReport {
        let path_dirs = tool
            .parent()
            .filter(|dir| resolver.prepend_dir(dir))
            .map(Path::to_path_buf)
            .into_iter()
            .collect();
        HookReport {
            tool,
            step,
            path_dirs,
            activation: self.activation_script(),
        }
    }

    fn activation_script(&self) -> Option<PathBuf> {
        self.managed
            .activation
            .clone()
            .filter(|script| script.is_file())
    }
}

/// Single-quote `value` for POSIX shells.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn quoted_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| quote(&p.display().to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the direnv library providing `use kindling`.
///
/// Candidate locations, the cache path and the download URL come from the
/// tool specs, so the shell and the resolver probe the same places in the same
/// order. Failures `return 1`; the function never exits the shell.
pub fn render_library(managed: &ToolSpec, kindling: &ToolSpec, target: &Target) -> String {
    let name = &managed.name;
    let managed_candidates = quoted_list(&managed.candidates);
    let kindling_candidates = quoted_list(&kindling.candidates);
    let install_dir = quote(&kindling.install_dir.display().to_string());
    let cached = quote(&kindling.cached_path().display().to_string());
    let activation = managed
        .activation
        .as_ref()
        .map(|script| quote(&script.display().to_string()))
        .unwrap_or_else(|| "''".to_string());
    let download = match kindling.download_url(target) {
        Some(url) => format!(
            r#"  local dir={install_dir} tmp
  mkdir -p "$dir" || return 1
  tmp="$(mktemp "$dir/.kindling-XXXXXX")" || return 1
  if ! curl -sSfL -o "$tmp" {url}; then
    rm -f "$tmp"
    log_error "kindling: download failed from {url}"
    return 1
  fi
  if ! {{ chmod +x "$tmp" && mv -f "$tmp" {cached}; }}; then
    rm -f "$tmp"
    return 1
  fi
  printf '%s\n' {cached}"#,
            url = quote(&url),
        ),
        None => r#"  log_error "kindling: not found and no download source"
  return 1"#
            .to_string(),
    };

    format!(
        r#"# shellcheck shell=bash
# direnv library generated by kindling for {target}.
# Usage in .envrc: use kindling

_kindling_activate() {{
  local script={activation}
  if [[ -n "$script" && -f "$script" ]]; then
    # shellcheck disable=SC1090
    source "$script"
  fi
}}

_kindling_find_{ident}() {{
  local candidate
  for candidate in {managed_candidates}; do
    if [[ -x "$candidate" ]]; then
      printf '%s\n' "$candidate"
      return 0
    fi
  done
  return 1
}}

_kindling_resolve() {{
  if has kindling; then
    command -v kindling
    return 0
  fi
  local candidate
  for candidate in {kindling_candidates}; do
    if [[ -x "$candidate" ]]; then
      printf '%s\n' "$candidate"
      return 0
    fi
  done
  if [[ -x {cached} ]]; then
    printf '%s\n' {cached}
    return 0
  fi
{download}
}}

use_kindling() {{
  local found kindling
  if has {name}; then
    _kindling_activate
    return 0
  fi
  if found="$(_kindling_find_{ident})"; then
    PATH_add "$(dirname "$found")"
    _kindling_activate
    return 0
  fi
  kindling="$(_kindling_resolve)" || return 1
  if ! {auto}=1 "$kindling" ensure; then
    log_error "kindling: ensure failed for {name}"
    return 1
  fi
  if found="$(_kindling_find_{ident})"; then
    PATH_add "$(dirname "$found")"
  else
    log_error "kindling: {name} still missing after ensure"
    return 1
  fi
  _kindling_activate
}}
"#,
        ident = name.replace('-', "_"),
        auto = AUTO_INSTALL_ENV,
    )
}
