use std::path::{Path, PathBuf};

/// Resolves a path found in a configuration file against the directory of that file.
pub fn resolve_path(root: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

/// The lock file that guards the updates of `path`, shared by all the processes.
pub fn lock_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!("{}.lock", file_name))
}

/// The directory of `path`, or the current directory for a bare file name.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_resolved() {
        let root = Path::new("/data/forms");
        assert_eq!(
            resolve_path(root, "form.json"),
            PathBuf::from("/data/forms/form.json")
        );
        assert_eq!(
            resolve_path(root, "/tmp/form.json"),
            PathBuf::from("/tmp/form.json")
        );
        assert_eq!(resolve_path(Path::new(""), "form.json"), PathBuf::from("form.json"));
    }

    #[test]
    fn lock_file_is_a_sibling() {
        assert_eq!(
            lock_sibling(Path::new("/data/responses.json")),
            PathBuf::from("/data/responses.json.lock")
        );
    }

    #[test]
    fn bare_file_names_live_in_current_dir() {
        assert_eq!(parent_dir(Path::new("responses.json")), PathBuf::from("."));
        assert_eq!(
            parent_dir(Path::new("/data/responses.json")),
            PathBuf::from("/data")
        );
    }
}
