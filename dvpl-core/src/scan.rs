use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::container::footer::CONTAINER_EXT;
use crate::error::{DvplError, Result};

/// True when the path carries the `.dvpl` suffix.
pub fn is_container_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == CONTAINER_EXT)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeCounts {
    pub files: usize,
    pub containers: usize,
    pub folders: usize,
}

/// Snapshot of a directory tree split by entry kind. Not refreshed after the scan.
#[derive(Clone, Debug, Default)]
pub struct TreeClassification {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub containers: Vec<PathBuf>,
    pub folders: Vec<PathBuf>,
}

impl TreeClassification {
    pub fn counts(&self) -> TreeCounts {
        TreeCounts {
            files: self.files.len(),
            containers: self.containers.len(),
            folders: self.folders.len(),
        }
    }
}

impl fmt::Display for TreeClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.counts();
        writeln!(f, "DVPL Folder Info:")?;
        writeln!(f, "-|  Path: {}", self.root.display())?;
        writeln!(f, "-|  Files count: {}", c.files)?;
        writeln!(f, "-|  DVPL count: {}", c.containers)?;
        writeln!(f, "-|  Folders count: {}", c.folders)
    }
}

/// Walk every descendant of `root` once and classify it.
///
/// Anything that is not a regular file (after following symlinks) counts as a
/// folder. Entries are visited in file-name order within each directory, so the
/// result is stable for an unchanged tree.
pub fn scan(root: &Path) -> Result<TreeClassification> {
    if !root.exists() {
        return Err(DvplError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(DvplError::NotADirectory(root.to_path_buf()));
    }

    let mut out = TreeClassification {
        root: root.to_path_buf(),
        ..Default::default()
    };

    for e in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let e = match e {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "scan: skipping unreadable entry");
                continue;
            }
        };
        let p = e.path();
        if !p.is_file() {
            out.folders.push(p.to_path_buf());
        } else if is_container_path(p) {
            out.containers.push(p.to_path_buf());
        } else {
            out.files.push(p.to_path_buf());
        }
    }

    let c = out.counts();
    debug!(
        root = %root.display(),
        files = c.files,
        containers = c.containers,
        folders = c.folders,
        "scan complete"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn classifies_by_kind_and_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::write(root.join("b.bin"), b"b").unwrap();
        fs::write(root.join("c.txt.dvpl"), b"c").unwrap();
        fs::write(root.join("d.dvpl"), b"d").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("e.png.dvpl"), b"e").unwrap();

        let tree = scan(root).unwrap();
        assert_eq!(
            tree.counts(),
            TreeCounts {
                files: 2,
                containers: 3,
                folders: 1
            }
        );
        assert!(tree.folders.iter().all(|p| p.is_dir()));
        assert!(tree.containers.iter().all(|p| is_container_path(p)));
    }

    #[test]
    fn order_is_stable_between_scans() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["z.txt", "m.txt", "a.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let first = scan(dir.path()).unwrap();
        let second = scan(dir.path()).unwrap();
        assert_eq!(first.files, second.files);
        assert!(first.files[0].ends_with("a.txt"));
    }

    #[test]
    fn rejects_missing_root_and_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(scan(&missing), Err(DvplError::NotFound(_))));

        let file = dir.path().join("f.txt");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(scan(&file), Err(DvplError::NotADirectory(_))));
    }

    #[test]
    fn suffix_match_is_exact() {
        assert!(is_container_path(Path::new("x/y.tex.dvpl")));
        assert!(!is_container_path(Path::new("x/y.dvplx")));
        assert!(!is_container_path(Path::new("dvpl")));
    }
}
