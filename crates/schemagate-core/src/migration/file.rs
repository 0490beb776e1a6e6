//! Migration file naming.

use std::path::{Path, PathBuf};

/// Companion rollback file for a migration script: `.drop` goes before the
/// extension, and a path without one gets `.drop.sql`.
pub fn rollback_file_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match path.extension() {
        Some(extension) => format!("{}.drop.{}", stem, extension.to_string_lossy()),
        None => format!("{}.drop.sql", stem),
    };

    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_inserted_before_extension() {
        assert_eq!(
            rollback_file_path(Path::new("update.sql")),
            PathBuf::from("update.drop.sql")
        );
    }

    #[test]
    fn test_directories_preserved() {
        assert_eq!(
            rollback_file_path(Path::new("migrations/2024/update.sql")),
            PathBuf::from("migrations/2024/update.drop.sql")
        );
    }

    #[test]
    fn test_missing_extension() {
        assert_eq!(
            rollback_file_path(Path::new("migrations/update")),
            PathBuf::from("migrations/update.drop.sql")
        );
    }
}
