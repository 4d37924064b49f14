//! direnv stage: install direnv, hook it into the login shell, install `use kindling`

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, fs::read_failed, fs::write_failed};
use crate::files::write_if_changed;
use crate::shell::render_library;
use crate::tools::DIRENV_INSTALLABLE;

use super::{Stage, StageContext, StageOutcome};

/// Marker line written above hooks kindling adds to rc files
pub const HOOK_MARKER: &str = "# Added by kindling";

/// File name of the rendered direnv library
pub const LIBRARY_FILE: &str = "kindling.sh";

pub struct DirenvStage;

impl Stage for DirenvStage {
    fn name(&self) -> &'static str {
        "direnv"
    }

    fn run(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome> {
        let mut outcome = StageOutcome::default();

        let spec = ctx.catalog.direnv();
        let (direnv, installed) = ctx.ensure_profile_tool(&spec, DIRENV_INSTALLABLE)?;
        if installed {
            outcome.push(format!("Installed direnv at {}", direnv.path.display()));
        }

        let (rc, line) = rc_hook(ctx.layout.home(), ctx.shell.as_deref());
        match hook_state(&rc)? {
            HookState::Symlink => {
                info!(rc = %rc.display(), "rc file is a symlink, leaving it alone");
            }
            HookState::Present => {}
            HookState::Missing | HookState::Absent => {
                ctx.require_consent(&format!("Add the direnv hook to {}", rc.display()))?;
                append_hook(&rc, &line)?;
                outcome.push(format!("Added direnv hook to {}", rc.display()));
            }
        }

        let library = render_library(&ctx.catalog.nix(), &ctx.catalog.kindling(), &ctx.target);
        let lib_path = ctx.layout.direnv_lib_dir().join(LIBRARY_FILE);
        if write_if_changed(&lib_path, &library)? {
            outcome.push(format!("Installed direnv library {}", lib_path.display()));
        }

        Ok(outcome)
    }
}

/// rc file and hook line for a login shell; bash unless zsh or fish.
pub fn rc_hook(home: &Path, shell: Option<&str>) -> (PathBuf, String) {
    let shell = shell.unwrap_or_default();
    if shell.ends_with("fish") {
        (
            home.join(".config").join("fish").join("config.fish"),
            "direnv hook fish | source".to_string(),
        )
    } else if shell.ends_with("zsh") {
        (home.join(".zshrc"), "eval \"$(direnv hook zsh)\"".to_string())
    } else {
        (
            home.join(".bashrc"),
            "eval \"$(direnv hook bash)\"".to_string(),
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
enum HookState {
    /// Managed elsewhere (home-manager and friends)
    Symlink,
    Present,
    /// File exists without the hook
    Missing,
    /// No rc file yet
    Absent,
}

fn hook_state(rc: &Path) -> Result<HookState> {
    if rc.is_symlink() {
        return Ok(HookState::Symlink);
    }
    if !rc.exists() {
        return Ok(HookState::Absent);
    }
    let content = fs::read_to_string(rc).map_err(|e| read_failed(rc, e))?;
    if content.contains("direnv hook") {
        Ok(HookState::Present)
    } else {
        Ok(HookState::Missing)
    }
}

fn append_hook(rc: &Path, line: &str) -> Result<()> {
    let mut content = match fs::read_to_string(rc) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(read_failed(rc, e)),
    };
    if !content.is_empty() {
        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push('\n');
    }
    content.push_str(HOOK_MARKER);
    content.push('\n');
    content.push_str(line);
    content.push('\n');

    if let Some(parent) = rc.parent() {
        fs::create_dir_all(parent).map_err(|e| write_failed(parent, e))?;
    }
    fs::write(rc, content).map_err(|e| write_failed(rc, e))
}
