// src/config/credential.rs
//
// The api.data.gov key. Always passed explicitly into a request; nothing in
// the crate reads it from ambient state on its own.

use std::fmt;
use std::fs;
use std::path::Path;

use super::consts::API_KEY_ENV;
use crate::error::{Result, ScorecardError};

#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trimmed, non-empty key.
    pub fn new(key: impl AsRef<str>) -> Result<Self> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            return Err(ScorecardError::InvalidRequest(s!("api key is empty")));
        }
        Ok(Self(s!(key)))
    }

    /// First non-empty line of a key file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
        Self::new(line).map_err(|_| {
            ScorecardError::InvalidRequest(format!("no api key in {}", path.display()))
        })
    }

    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(v) => Self::new(v),
            Err(_) => Err(ScorecardError::InvalidRequest(format!("{API_KEY_ENV} is not set"))),
        }
    }

    /// Explicit key, then key file, then environment.
    pub fn resolve(explicit: Option<&str>, file: Option<&Path>) -> Result<Self> {
        if let Some(k) = explicit {
            return Self::new(k);
        }
        if let Some(p) = file {
            return Self::from_file(p);
        }
        Self::from_env().map_err(|_| {
            ScorecardError::InvalidRequest(format!(
                "no api key: pass --api-key, --api-key-file or set {API_KEY_ENV}"
            ))
        })
    }

    /// The raw key, for the query string only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank() {
        assert!(Credential::new("   ").is_err());
        assert_eq!(Credential::new(" abc \n").unwrap().expose(), "abc");
    }

    #[test]
    fn debug_redacts() {
        let c = Credential::new("secret").unwrap();
        assert!(!format!("{c:?}").contains("secret"));
    }

    #[test]
    fn explicit_wins() {
        let c = Credential::resolve(Some("k1"), Some(Path::new("/nonexistent/key"))).unwrap();
        assert_eq!(c.expose(), "k1");
    }

    #[test]
    fn key_file_first_line() {
        let mut p = std::env::temp_dir();
        p.push("scorecard_cred_test.txt");
        fs::write(&p, "\n  filekey  \nignored\n").unwrap();
        assert_eq!(Credential::from_file(&p).unwrap().expose(), "filekey");
        let _ = fs::remove_file(&p);
    }
}
