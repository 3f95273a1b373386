// Cache path utilities.
// Locates the files backing each local store.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/herolist on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "herolist").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Directory holding all store files under a base directory.
pub fn stores_dir(base: &Path) -> PathBuf {
    base.join("stores")
}

/// Path to the file backing a named store.
pub fn store_path(base: &Path, name: &str) -> PathBuf {
    stores_dir(base).join(format!("{}.json", sanitize_name(name)))
}

/// Path to a named store in the default cache directory.
pub fn default_store_path(name: &str) -> Option<PathBuf> {
    cache_dir().map(|dir| store_path(&dir, name))
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("heroes"), "heroes");
        assert_eq!(sanitize_name("with/slash"), "with_slash");
        assert_eq!(sanitize_name("query: naruto"), "query__naruto");
    }

    #[test]
    fn test_store_paths() {
        let base = Path::new("/tmp/herolist");
        let path = store_path(base, "heroes");
        assert!(path.ends_with("stores/heroes.json"));
        assert!(path.starts_with(base));
    }
}
