//! Versioned tool binary download and installation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{RunnerError, RunnerResult};

/// Default release archive host.
const DEFAULT_RELEASE_BASE: &str = "https://releases.hashicorp.com";

/// Product name, also the binary name inside the release archive.
const TOOL_NAME: &str = "terraform";

/// Downloads a versioned, platform-specific tool archive and installs the
/// binary under `<workdir>/bin`.
#[derive(Debug, Clone)]
pub struct ReleaseInstaller {
    base_url: String,
}

impl ReleaseInstaller {
    /// Installer against a non-default release host.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Archive URL for `version` on the current platform.
    pub fn release_url(&self, version: &str) -> String {
        format!(
            "{base}/{tool}/{version}/{tool}_{version}_{os}_{arch}.zip",
            base = self.base_url,
            tool = TOOL_NAME,
            version = version,
            os = platform_os(),
            arch = platform_arch(),
        )
    }

    /// Download and unpack the tool, returning the installed binary path.
    ///
    /// The download and extraction helpers are synchronous, so the work
    /// runs on a blocking task.
    pub async fn install(&self, version: &str, workdir: &Path) -> RunnerResult<PathBuf> {
        let url = self.release_url(version);
        let bin_dir = workdir.join("bin");
        info!("fetching {} {} from {}", TOOL_NAME, version, url);

        let tool = tokio::task::spawn_blocking(move || download_and_extract(&url, &bin_dir))
            .await
            .map_err(|e| RunnerError::InstallFailed(format!("install task failed: {}", e)))??;

        info!("installed {}", tool.display());
        Ok(tool)
    }
}

impl Default for ReleaseInstaller {
    fn default() -> Self {
        Self::new(DEFAULT_RELEASE_BASE)
    }
}

fn download_and_extract(url: &str, bin_dir: &Path) -> RunnerResult<PathBuf> {
    fs::create_dir_all(bin_dir)?;

    let archive_path = bin_dir.join("release.zip");
    let mut archive = fs::File::create(&archive_path)?;
    self_update::Download::from_url(url)
        .download_to(&mut archive)
        .map_err(|e| RunnerError::InstallFailed(e.to_string()))?;
    drop(archive);

    self_update::Extract::from_source(&archive_path)
        .archive(self_update::ArchiveKind::Zip)
        .extract_file(bin_dir, TOOL_NAME)
        .map_err(|e| RunnerError::InstallFailed(e.to_string()))?;
    let _ = fs::remove_file(&archive_path);

    let tool = bin_dir.join(TOOL_NAME);
    make_executable(&tool)?;
    Ok(tool)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> RunnerResult<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> RunnerResult<()> {
    Ok(())
}

fn platform_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn platform_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    }
}
