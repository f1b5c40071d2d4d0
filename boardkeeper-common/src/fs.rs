//! Filesystem helpers shared by the stores

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Atomic write via temp file and rename
///
/// The temp file lives next to the target (`.<name>.tmp`) so the rename never
/// crosses a filesystem boundary, and its name never matches a record extension.
pub async fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no file name in {}", path.display()),
        )
    })?;
    let mut temp_name = OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, content).await?;
    if let Err(e) = fs::rename(&temp_path, path).await {
        tracing::debug!("rename into {} failed: {}", path.display(), e);
        let _ = fs::remove_file(&temp_path).await;
        return Err(e);
    }
    tracing::trace!("wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Resolve `.` and `..` components without touching the filesystem
///
/// `..` at the root of a relative path is kept, so an escaping path stays
/// recognisably outside whatever it is compared against.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// Whether `candidate` resolves strictly inside `root` (never `root` itself)
pub fn is_within(root: &Path, candidate: &Path) -> bool {
    let root = normalize_lexically(root);
    let candidate = normalize_lexically(candidate);
    candidate != root && candidate.starts_with(&root)
}
