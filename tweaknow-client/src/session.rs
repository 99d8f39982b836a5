use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::logging::CONFIG_TARGET;

/// Bearer tokens longer than this are treated as corrupted
const MAX_TOKEN_LEN: usize = 4096;

/// Stores the backend access token in `<config dir>/token`, readable by
/// the owner only.
#[derive(Debug, Clone)]
pub struct TokenStore {
    file_path: PathBuf,
}

impl TokenStore {
    pub fn new(config_dir: &Path) -> Self {
        Self { file_path: config_dir.join("token") }
    }

    /// Load the stored token.
    ///
    /// Missing, empty or corrupted files all yield `Ok(None)`; only I/O
    /// failures on an existing file are errors.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.file_path).context("Failed to read token file")?;
        let token = content.trim();

        if token.is_empty() {
            log::warn!(target: CONFIG_TARGET, "Token file is empty, treating as logged out");
            return Ok(None);
        }

        if token.len() > MAX_TOKEN_LEN || token.chars().any(|c| c.is_control() || c.is_whitespace()) {
            log::warn!(target: CONFIG_TARGET, "Token file looks corrupted ({} bytes), ignoring it", token.len());
            return Ok(None);
        }

        log::debug!(target: CONFIG_TARGET, "Loaded access token from {}", self.file_path.display());
        Ok(Some(token.to_string()))
    }

    /// Save the token with 0600 permissions, via a temporary file and rename
    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).context("Failed to create .tweaknow directory")?;
        }

        let temp_path = self.file_path.with_extension("tmp");
        // A leftover temp file would keep its old permissions
        if temp_path.exists() {
            fs::remove_file(&temp_path).context("Failed to remove stale temporary token file")?;
        }

        let mut file = create_private(&temp_path).context("Failed to create temporary token file")?;
        file.write_all(token.trim().as_bytes())
            .context("Failed to write access token")?;
        file.sync_all().context("Failed to sync token file to disk")?;
        drop(file);

        fs::rename(&temp_path, &self.file_path).context("Failed to rename temporary token file")?;

        log::info!(target: CONFIG_TARGET, "Saved access token to {}", self.file_path.display());
        Ok(())
    }

    /// Remove the token. Succeeds when there is nothing to remove.
    pub fn delete(&self) -> Result<()> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path).context("Failed to delete token file")?;
            log::info!(target: CONFIG_TARGET, "Deleted token file at {}", self.file_path.display());
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Create a new file that only the owner can read, before anything is
/// written to it
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = TokenStore::new(temp_dir.path());

        store.save("eyJhbGciOiJIUzI1NiJ9.payload.sig\n").unwrap();

        assert_eq!(store.load().unwrap(), Some("eyJhbGciOiJIUzI1NiJ9.payload.sig".to_string()));
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(TokenStore::new(temp_dir.path()).load().unwrap(), None);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = TokenStore::new(temp_dir.path());

        store.save("token-value").unwrap();
        store.delete().unwrap();
        assert!(!store.path().exists());
        store.delete().unwrap();
    }

    #[test]
    fn test_blank_and_corrupted_files_return_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = TokenStore::new(temp_dir.path());

        fs::write(store.path(), "   \n\t  ").unwrap();
        assert_eq!(store.load().unwrap(), None);

        fs::write(store.path(), b"tok\x00en").unwrap();
        assert_eq!(store.load().unwrap(), None);

        fs::write(store.path(), "a".repeat(MAX_TOKEN_LEN + 1)).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = TokenStore::new(temp_dir.path());
        store.save("token-value").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    #[cfg(unix)]
    fn test_file_is_private_before_token_is_written() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("token.tmp");

        let file = create_private(&path).unwrap();
        let mode = file.metadata().unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(file.metadata().unwrap().len(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn test_stale_temp_file_is_replaced() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = TokenStore::new(temp_dir.path());
        let temp_path = store.path().with_extension("tmp");
        fs::write(&temp_path, "old").unwrap();
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o644)).unwrap();

        store.save("fresh-token").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap().as_deref(), Some("fresh-token"));
    }
}
