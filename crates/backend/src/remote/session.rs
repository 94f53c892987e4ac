use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::debug;

/// Where the bearer credential lives between requests.
pub trait Session: Send + Sync {
    fn token(&self) -> Option<String>;

    fn set_token(&self, token: String) -> io::Result<()>;

    fn clear(&self) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl Session for MemorySession {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_token(&self, token: String) -> io::Result<()> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token);
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

/// Token persisted in a plain file so it survives between `desk` invocations.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    cached: MemorySession,
}

impl FileSession {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let cached = MemorySession::new();

        match fs::read_to_string(&path) {
            Ok(contents) => {
                let token = contents.trim();
                if !token.is_empty() {
                    cached.set_token(token.to_string())?;
                    debug!("Loaded session token from {}", path.display());
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        Ok(Self { path, cached })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Session for FileSession {
    fn token(&self) -> Option<String> {
        self.cached.token()
    }

    fn set_token(&self, token: String) -> io::Result<()> {
        fs::write(&self.path, &token)?;
        self.cached.set_token(token)
    }

    fn clear(&self) -> io::Result<()> {
        self.cached.clear()?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_session_roundtrip() {
        let session = MemorySession::new();
        assert_eq!(session.token(), None);

        session.set_token("abc".to_string()).unwrap();
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.clear().unwrap();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_file_session_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");

        let first = FileSession::open(&path).unwrap();
        assert_eq!(first.token(), None);
        first.set_token("persisted".to_string()).unwrap();

        let second = FileSession::open(&path).unwrap();
        assert_eq!(second.token().as_deref(), Some("persisted"));

        second.clear().unwrap();
        assert!(!path.exists());
        // Clearing twice is fine.
        second.clear().unwrap();
        assert_eq!(FileSession::open(&path).unwrap().token(), None);
    }

    #[test]
    fn test_blank_token_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "  \n").unwrap();

        assert_eq!(FileSession::open(&path).unwrap().token(), None);
    }
}
