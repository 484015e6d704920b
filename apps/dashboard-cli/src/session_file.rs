use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use dashboard_client_core::{SessionStore, SessionStoreError};

pub const DEFAULT_SESSION_FILE: &str = ".dashboard-session";

/// Session token persisted as the sole contents of a file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load_token(&self) -> Result<Option<String>, SessionStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw.trim().to_string()).filter(|token| !token.is_empty())),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(SessionStoreError::Read(format!(
                "{}: {error}",
                self.path.display()
            ))),
        }
    }

    fn persist_token(&self, token: &str) -> Result<(), SessionStoreError> {
        let write_error = |error: io::Error| {
            SessionStoreError::Write(format!("{}: {error}", self.path.display()))
        };
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let mut file = owner_only_options()
            .open(&self.path)
            .map_err(write_error)?;
        restrict_permissions(&file).map_err(write_error)?;
        file.write_all(token.as_bytes()).map_err(write_error)
    }

    fn clear_token(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SessionStoreError::Write(format!(
                "{}: {error}",
                self.path.display()
            ))),
        }
    }
}

fn owner_only_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

/// `mode` only applies when the file is created; an existing file keeps its
/// old bits until they are reset here.
#[cfg(unix)]
fn restrict_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}
