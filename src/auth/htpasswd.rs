use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::password::StoredPassword;
use super::{CredentialCheck, Credentials};

#[derive(Debug, thiserror::Error)]
pub enum CredentialFileError {
    #[error("Failed to read credential file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credential file {0} contains no usable entries")]
    Empty(PathBuf),
}

/// `username:password` entries loaded from an htpasswd file.
pub struct HtpasswdFile {
    entries: HashMap<String, StoredPassword>,
}

impl HtpasswdFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CredentialFileError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CredentialFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file = Self::parse(&contents);
        if file.entries.is_empty() {
            return Err(CredentialFileError::Empty(path.to_path_buf()));
        }

        tracing::info!(
            path = %path.display(),
            users = file.len(),
            "Loaded credential file"
        );

        Ok(file)
    }

    pub fn parse(contents: &str) -> Self {
        let mut entries = HashMap::new();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((username, password)) = line.split_once(':') else {
                tracing::warn!(line = index + 1, "Skipping credential line without ':'");
                continue;
            };

            let Some(stored) = StoredPassword::parse(password) else {
                tracing::warn!(
                    line = index + 1,
                    username = %username,
                    "Skipping credential entry with unsupported hash format"
                );
                continue;
            };

            entries.insert(username.to_string(), stored);
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl CredentialCheck for HtpasswdFile {
    fn verify(&self, credentials: &Credentials) -> bool {
        self.entries
            .get(&credentials.username)
            .is_some_and(|stored| stored.verify(&credentials.password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_skips_comments_blank_and_unsupported_lines() {
        let file = HtpasswdFile::parse(
            "# operators\n\nadmin:pw\nbroken-line\nglibc:$6$salt$abcdef\n",
        );

        assert_eq!(file.len(), 1);
        assert!(file.verify(&Credentials::new("admin", "pw")));
        assert!(!file.verify(&Credentials::new("glibc", "$6$salt$abcdef")));
    }

    #[test]
    fn test_hashed_entries_are_loaded_and_verified() {
        let bcrypt_hash = bcrypt::hash_with_result("b-secret", 4)
            .unwrap()
            .format_for_version(bcrypt::Version::TwoY);
        let contents = format!(
            "md5:$apr1$r31.....$HqJZimcKQFAMYayBlzkrA/\n\
             sha:{{SHA}}VBPuJHI7uixaa6LQGWx4s+5GKNE=\n\
             crypt:{bcrypt_hash}\n"
        );

        let file = HtpasswdFile::parse(&contents);

        assert_eq!(file.len(), 3);
        assert!(file.verify(&Credentials::new("md5", "myPassword")));
        assert!(file.verify(&Credentials::new("sha", "myPassword")));
        assert!(file.verify(&Credentials::new("crypt", "b-secret")));
        assert!(!file.verify(&Credentials::new("md5", "$apr1$r31.....$HqJZimcKQFAMYayBlzkrA/")));
        assert!(!file.verify(&Credentials::new("crypt", "myPassword")));
    }

    #[test]
    fn test_load_hashed_only_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "admin:$apr1$r31.....$HqJZimcKQFAMYayBlzkrA/").unwrap();

        let file = HtpasswdFile::load(tmp.path()).unwrap();
        assert_eq!(file.len(), 1);
        assert!(file.verify(&Credentials::new("admin", "myPassword")));
    }

    #[test]
    fn test_verify_rejects_wrong_password_and_unknown_user() {
        let file = HtpasswdFile::parse("admin:pw\n");

        assert!(!file.verify(&Credentials::new("admin", "PW")));
        assert!(!file.verify(&Credentials::new("guest", "pw")));
    }

    #[test]
    fn test_load_from_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "admin:pw").unwrap();

        let file = HtpasswdFile::load(tmp.path()).unwrap();
        assert!(file.verify(&Credentials::new("admin", "pw")));
    }

    #[test]
    fn test_load_missing_file() {
        let result = HtpasswdFile::load("/definitely/not/here.htpasswd");
        assert!(matches!(result, Err(CredentialFileError::Read { .. })));
    }

    #[test]
    fn test_load_file_without_entries() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "# nobody").unwrap();

        let result = HtpasswdFile::load(tmp.path());
        assert!(matches!(result, Err(CredentialFileError::Empty(_))));
    }
}
