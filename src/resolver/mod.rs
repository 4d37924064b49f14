//! Artifact resolution for kindling tools
//!
//! This module handles:
//! - Finding a tool on the resolver's search path
//! - Probing the tool's known install locations in declared order
//! - Reusing a previously downloaded binary from the install directory
//! - Downloading the platform artifact and renaming it into place
//!
//! Steps short-circuit: the first hit wins and nothing after it is probed.
//! Only the download step writes to disk.

pub mod fetcher;
pub mod probe;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, resolve};
use crate::platform::Target;
use crate::progress::{CopyError, DownloadProgress, copy_split};

pub use fetcher::{Fetcher, HttpFetcher};
pub use probe::{FsProbe, Probe, SearchPath};

/// How to find or fetch one tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    /// Known install locations, probed in order
    pub candidates: Vec<PathBuf>,
    /// URL template with `{tool}`, `{target}` and `{system}` placeholders
    pub download: Option<String>,
    /// Per-user directory downloads are cached in
    pub install_dir: PathBuf,
    /// Profile script to source when the tool is found at a known location
    pub activation: Option<PathBuf>,
    /// File name of the downloaded copy, when it differs from `name`
    pub cache_name: Option<String>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            candidates: Vec::new(),
            download: None,
            install_dir: install_dir.into(),
            activation: None,
            cache_name: None,
        }
    }

    pub fn candidate(mut self, path: impl Into<PathBuf>) -> Self {
        self.candidates.push(path.into());
        self
    }

    pub fn download(mut self, template: impl Into<String>) -> Self {
        self.download = Some(template.into());
        self
    }

    pub fn activation(mut self, script: impl Into<PathBuf>) -> Self {
        self.activation = Some(script.into());
        self
    }

    /// Cache downloads under `file_name` instead of the tool name.
    pub fn cache_as(mut self, file_name: impl Into<String>) -> Self {
        self.cache_name = Some(file_name.into());
        self
    }

    /// Concrete download URL for `target`, if the tool has a template.
    pub fn download_url(&self, target: &Target) -> Option<String> {
        self.download.as_ref().map(|template| {
            template
                .replace("{tool}", &self.name)
                .replace("{target}", &target.to_string())
                .replace("{system}", &target.nix_system())
        })
    }

    /// Where a downloaded copy of the tool lives.
    pub fn cached_path(&self) -> PathBuf {
        self.install_dir
            .join(self.cache_name.as_deref().unwrap_or(&self.name))
    }
}

/// Which resolution step produced the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Via {
    SearchPath,
    KnownLocation,
    Cache,
    Downloaded,
}

impl std::fmt::Display for Via {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Via::SearchPath => "PATH",
            Via::KnownLocation => "known location",
            Via::Cache => "cache",
            Via::Downloaded => "download",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: PathBuf,
    pub via: Via,
    /// Activation script the caller should source (known locations only)
    pub activation: Option<PathBuf>,
}

/// Resolves tools to executable paths
pub struct Resolver {
    search_path: SearchPath,
    probe: Box<dyn Probe>,
    fetcher: Box<dyn Fetcher>,
}

impl Resolver {
    pub fn new(search_path: SearchPath, probe: Box<dyn Probe>, fetcher: Box<dyn Fetcher>) -> Self {
        Self {
            search_path,
            probe,
            fetcher,
        }
    }

    /// Resolver over the process `PATH`, the real file system and HTTPS.
    pub fn system() -> Result<Self> {
        Ok(Self::new(
            SearchPath::from_env(),
            Box::new(FsProbe),
            Box::new(HttpFetcher::new()?),
        ))
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// First executable named `name` on the search path.
    pub fn find_on_path(&self, name: &str) -> Option<PathBuf> {
        self.search_path
            .dirs()
            .iter()
            .map(|dir| dir.join(name))
            .find(|path| self.probe.is_executable(path))
    }

    /// First of the tool's known locations holding an executable.
    pub fn probe_candidates(&self, tool: &ToolSpec) -> Option<PathBuf> {
        tool.candidates
            .iter()
            .find(|candidate| self.probe.is_executable(candidate))
            .cloned()
    }

    /// Resolution steps that never write: search path, known locations, cache.
    pub fn locate(&self, tool: &ToolSpec) -> Option<Resolved> {
        if let Some(path) = self.find_on_path(&tool.name) {
            debug!(tool = %tool.name, path = %path.display(), "found on search path");
            return Some(Resolved {
                path,
                via: Via::SearchPath,
                activation: None,
            });
        }

        if let Some(path) = self.probe_candidates(tool) {
            debug!(tool = %tool.name, path = %path.display(), "found at known location");
            return Some(Resolved {
                path,
                via: Via::KnownLocation,
                activation: tool.activation.clone().filter(|script| script.is_file()),
            });
        }

        let cached = tool.cached_path();
        if self.probe.is_executable(&cached) {
            debug!(tool = %tool.name, path = %cached.display(), "found in cache");
            return Some(Resolved {
                path: cached,
                via: Via::Cache,
                activation: None,
            });
        }

        None
    }

    /// Resolve `tool`, downloading the `target` artifact as a last resort.
    pub fn resolve(&self, tool: &ToolSpec, target: &Target) -> Result<Resolved> {
        if let Some(found) = self.locate(tool) {
            return Ok(found);
        }

        let path = self.download(tool, target)?;
        Ok(Resolved {
            path,
            via: Via::Downloaded,
            activation: None,
        })
    }

    /// Put the resolved binary's directory at the front of the search path.
    pub fn activate(&mut self, resolved: &Resolved) -> bool {
        resolved
            .path
            .parent()
            .is_some_and(|dir| self.search_path.prepend(dir))
    }

    /// Put `dir` at the front of the search path.
    pub fn prepend_dir(&mut self, dir: &Path) -> bool {
        self.search_path.prepend(dir)
    }

    fn download(&self, tool: &ToolSpec, target: &Target) -> Result<PathBuf> {
        let url = tool.download_url(target).ok_or_else(|| {
            resolve::failed(&tool.name, "not found and no download source is known")
        })?;

        info!(tool = %tool.name, %url, %target, "downloading");
        let download = self.fetcher.open(&url)?;

        fs::create_dir_all(&tool.install_dir).map_err(|e| {
            resolve::failed(
                &tool.name,
                format!("cannot create {}: {e}", tool.install_dir.display()),
            )
        })?;

        let mut part = tempfile::Builder::new()
            .prefix(&format!(".{}-", tool.name))
            .suffix(".part")
            .tempfile_in(&tool.install_dir)
            .map_err(|e| resolve::failed(&tool.name, format!("cannot create temporary file: {e}")))?;

        let progress = DownloadProgress::new(&tool.name, download.length);
        let mut reader = progress.wrap(download.reader);
        let bytes = match copy_split(&mut reader, part.as_file_mut()) {
            Ok(bytes) => bytes,
            Err(CopyError::Read(e)) => {
                progress.abandon();
                return Err(resolve::download_failed(&url, e));
            }
            Err(CopyError::Write(e)) => {
                progress.abandon();
                return Err(resolve::failed(&tool.name, format!("write failed: {e}")));
            }
        };
        progress.finish();

        part.as_file()
            .sync_all()
            .map_err(|e| resolve::failed(&tool.name, format!("write failed: {e}")))?;
        probe::set_executable(part.path())
            .map_err(|e| resolve::failed(&tool.name, format!("cannot mark executable: {e}")))?;

        let dest = tool.cached_path();
        part.persist(&dest).map_err(|e| {
            resolve::failed(
                &tool.name,
                format!("cannot move into {}: {}", dest.display(), e.error),
            )
        })?;

        info!(tool = %tool.name, path = %dest.display(), bytes, "installed");
        Ok(dest)
    }
}
