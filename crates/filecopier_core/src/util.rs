use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use filetime::FileTime;

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Canonical form of `path`; for paths that do not exist yet, the deepest
/// existing ancestor is canonicalized and the rest appended.
fn _normalize_path(path: &Path) -> PathBuf {
    let path_abs = _absolutize_path(path);
    let mut path_head = path_abs.as_path();
    let mut l_tail = Vec::new();
    loop {
        if let Ok(resolved) = fs::canonicalize(path_head) {
            return l_tail.iter().rev().fold(resolved, |acc, part| acc.join(part));
        }
        match (path_head.parent(), path_head.file_name()) {
            (Some(path_parent), Some(name)) => {
                l_tail.push(name.to_os_string());
                path_head = path_parent;
            }
            _ => return path_abs,
        }
    }
}

/// Whether either directory contains the other (or both are the same).
pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved)
}

/// Whether `path` only consists of plain (non-`..`, non-root) segments.
pub(crate) fn is_plain_relative_path(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Refuse destination paths that escape `path_dir_dst_root` or pass through
/// an existing symbolic link below it.
pub(crate) fn validate_destination_path_safety(
    path_dst_item: &Path,
    path_dir_dst_root: &Path,
) -> Result<(), String> {
    let path_dir_dst_root_abs = _absolutize_path(path_dir_dst_root);
    let path_dst_item_abs = _absolutize_path(path_dst_item);

    let path_rel = path_dst_item_abs
        .strip_prefix(&path_dir_dst_root_abs)
        .map_err(|_| {
            format!(
                "Unsafe destination path escapes destination root: {} (root={})",
                path_dst_item.display(),
                path_dir_dst_root.display()
            )
        })?;
    if !is_plain_relative_path(path_rel) {
        return Err(format!(
            "Unsafe destination path escapes destination root: {} (root={})",
            path_dst_item.display(),
            path_dir_dst_root.display()
        ));
    }

    let Some(path_parent_rel) = path_rel.parent() else {
        return Ok(());
    };
    let mut path_cursor = path_dir_dst_root_abs.clone();
    for part_rel in path_parent_rel.components() {
        path_cursor.push(part_rel.as_os_str());
        match fs::symlink_metadata(&path_cursor) {
            Ok(meta_cursor) => {
                if meta_cursor.file_type().is_symlink() {
                    return Err(format!(
                        "Unsafe destination path traverses symlink component: {}",
                        path_cursor.display()
                    ));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => break,
            Err(e) => {
                return Err(format!(
                    "Failed to inspect destination path component {} ({e})",
                    path_cursor.display()
                ));
            }
        }
    }

    Ok(())
}

/// Create the parent directory chain of `path_file`. Existing directories are fine.
pub(crate) fn ensure_parent_dir(path_file: &Path) -> Result<(), io::Error> {
    match path_file.parent() {
        Some(path_parent) if !path_parent.as_os_str().is_empty() => {
            fs::create_dir_all(path_parent)
        }
        _ => Ok(()),
    }
}

/// `symlink_metadata` that maps "not found" to `None`.
pub(crate) fn stat_no_follow(path: &Path) -> Result<Option<Metadata>, io::Error> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Comparison

/// Size + modification time equality of two regular files.
pub(crate) fn is_shallow_identical(meta_src: &Metadata, meta_dst: &Metadata) -> bool {
    meta_src.file_type().is_file()
        && meta_dst.file_type().is_file()
        && meta_src.len() == meta_dst.len()
        && FileTime::from_last_modification_time(meta_src)
            == FileTime::from_last_modification_time(meta_dst)
}

/// Byte-for-byte equality of two files.
pub(crate) fn is_content_identical(path_a: &Path, path_b: &Path) -> Result<bool, io::Error> {
    const N_BUF: usize = 64 * 1024;

    let meta_a = fs::metadata(path_a)?;
    let meta_b = fs::metadata(path_b)?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut file_a = File::open(path_a)?;
    let mut file_b = File::open(path_b)?;
    let mut buf_a = vec![0_u8; N_BUF];
    let mut buf_b = vec![0_u8; N_BUF];
    loop {
        let n_read_a = read_full(&mut file_a, &mut buf_a)?;
        let n_read_b = read_full(&mut file_b, &mut buf_b)?;
        if n_read_a != n_read_b || buf_a[..n_read_a] != buf_b[..n_read_b] {
            return Ok(false);
        }
        if n_read_a == 0 {
            return Ok(true);
        }
    }
}

fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize, io::Error> {
    let mut n_total = 0;
    while n_total < buf.len() {
        match reader.read(&mut buf[n_total..]) {
            Ok(0) => break,
            Ok(n) => n_total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(n_total)
}

/// Whether two symbolic links point at the same target text.
pub(crate) fn is_same_link_target(path_src: &Path, path_dst: &Path) -> Result<bool, io::Error> {
    Ok(fs::read_link(path_src)? == fs::read_link(path_dst)?)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CopyPrimitives

/// Recreate the symbolic link `path_src` at `path_dst` (target not followed).
pub(crate) fn create_symbolic_link(path_src: &Path, path_dst: &Path) -> Result<(), io::Error> {
    let target = fs::read_link(path_src)?;

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(&target, path_dst)
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::{symlink_dir, symlink_file};
        if path_src.is_dir() {
            symlink_dir(&target, path_dst)
        } else {
            symlink_file(&target, path_dst)
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (target, path_dst);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Symbolic links are unsupported on this platform",
        ))
    }
}

/// Copy bytes, permissions and timestamps (plus xattrs on Linux).
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;
    filetime::set_file_times(
        path_file_dst,
        FileTime::from_last_access_time(&stat_src),
        FileTime::from_last_modification_time(&stat_src),
    )?;

    #[cfg(target_os = "linux")]
    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
