use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const ROOT_ENV_VAR: &str = "OVERWORLD_ROOT";

/// Where the running build finds its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
}

impl AppPaths {
    fn under(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        Self { root, assets_dir }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("{var} points at {path}, which has no Cargo.toml and assets/ directory")]
    InvalidEnvRoot { var: &'static str, path: PathBuf },
    #[error(
        "no directory containing Cargo.toml and assets/ above {start_dir}; \
set {var} to the project root"
    )]
    RootNotFound {
        start_dir: PathBuf,
        var: &'static str,
    },
}

/// `OVERWORLD_ROOT` wins when set; otherwise the first ancestor of the
/// executable that looks like the project root.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    resolve_from(env::var(ROOT_ENV_VAR), env::current_exe)
}

fn resolve_from(
    root_override: Result<String, env::VarError>,
    current_exe: impl FnOnce() -> io::Result<PathBuf>,
) -> Result<AppPaths, StartupError> {
    let root = match root_override {
        Ok(raw) => {
            let path = canonical_or_given(Path::new(raw.trim()));
            if !looks_like_root(&path) {
                return Err(StartupError::InvalidEnvRoot {
                    var: ROOT_ENV_VAR,
                    path,
                });
            }
            path
        }
        Err(env::VarError::NotPresent) => {
            let exe = current_exe().map_err(StartupError::CurrentExe)?;
            let start_dir = exe
                .parent()
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            start_dir
                .ancestors()
                .find(|candidate| looks_like_root(candidate))
                .map(canonical_or_given)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: canonical_or_given(start_dir),
                    var: ROOT_ENV_VAR,
                })?
        }
        Err(source) => {
            return Err(StartupError::EnvVar {
                var: ROOT_ENV_VAR,
                source,
            })
        }
    };
    Ok(AppPaths::under(root))
}

fn looks_like_root(path: &Path) -> bool {
    path.join("Cargo.toml").is_file() && path.join("assets").is_dir()
}

fn canonical_or_given(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
