//! Project discovery and layout
//!
//! A tender project is any directory containing a `.tender/` folder, which
//! holds `config.yaml` and the `tender.db` store.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a tender project (or any parent directory): run 'tender init' first")]
    NotFound,

    #[error("tender project already exists at {0} (use --force to reinitialize)")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A discovered tender project
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub const DIR: &'static str = ".tender";
    pub const CONFIG_FILE: &'static str = "config.yaml";
    pub const DATABASE_FILE: &'static str = "tender.db";

    /// Find the project containing the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Walk up from `start` looking for a `.tender/` directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        start
            .ancestors()
            .find(|dir| dir.join(Self::DIR).is_dir())
            .map(|dir| Self {
                root: dir.to_path_buf(),
            })
            .ok_or(ProjectError::NotFound)
    }

    /// Create the project directory and a starter config
    pub fn init(root: &Path, force: bool) -> Result<Self, ProjectError> {
        let dir = root.join(Self::DIR);
        if dir.exists() && !force {
            return Err(ProjectError::AlreadyExists(root.to_path_buf()));
        }

        std::fs::create_dir_all(&dir)?;

        let project = Self {
            root: root.to_path_buf(),
        };
        let config_path = project.config_path();
        if !config_path.exists() || force {
            std::fs::write(&config_path, DEFAULT_CONFIG)?;
        }

        Ok(project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tender_dir(&self) -> PathBuf {
        self.root.join(Self::DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.tender_dir().join(Self::CONFIG_FILE)
    }

    pub fn database_path(&self) -> PathBuf {
        self.tender_dir().join(Self::DATABASE_FILE)
    }
}

const DEFAULT_CONFIG: &str = "\
# Tender project configuration
# author: Jane Doe
# company: Acme Corp
# city: Springfield
max_quotations: 3
";

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_layout() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        assert!(project.tender_dir().is_dir());
        assert!(project.config_path().is_file());
        assert_eq!(
            project.database_path(),
            tmp.path().join(".tender").join("tender.db")
        );
    }

    #[test]
    fn test_init_twice_requires_force() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), false).unwrap();

        assert!(matches!(
            Project::init(tmp.path(), false),
            Err(ProjectError::AlreadyExists(_))
        ));
        assert!(Project::init(tmp.path(), true).is_ok());
    }

    #[test]
    fn test_discover_walks_up() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), false).unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let project = Project::discover_from(&nested).unwrap();
        assert_eq!(project.root(), tmp.path());
    }

    #[test]
    fn test_discover_outside_project() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("not a tender project"));
    }
}
