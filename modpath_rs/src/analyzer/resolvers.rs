//! Path normalization and quoted-include resolution.
//!
//! Everything here is lexical: `..` is folded without touching the disk and
//! symlinks are not followed. Existence checks go through [`SourceProvider`].

use std::path::{Component, Path, PathBuf};

use crate::fs_utils::SourceProvider;

/// Fold `.` and `..` components without consulting the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(_) | Component::RootDir => out.push(comp.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Project-relative key with `/` separators, or `None` when `path` lies outside `root`.
pub fn project_key(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Display form of a path: project-relative when possible, absolute otherwise.
pub fn display_path(path: &Path, root: &Path) -> String {
    project_key(path, root).unwrap_or_else(|| path.display().to_string())
}

/// Deepest directory shared by every input.
///
/// Falls back to `fallback` when there are no inputs or they share nothing
/// beyond the filesystem root.
pub fn infer_project_root(dirs: &[PathBuf], fallback: &Path) -> PathBuf {
    let mut iter = dirs.iter();
    let Some(first) = iter.next() else {
        return normalize_path(fallback);
    };

    let mut common: Vec<Component<'_>> = first.components().collect();
    for dir in iter {
        let shared = common
            .iter()
            .zip(dir.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
    }

    let has_normal = common.iter().any(|c| matches!(c, Component::Normal(_)));
    if !has_normal {
        return normalize_path(fallback);
    }
    common.iter().map(|c| c.as_os_str()).collect()
}

/// Resolve a quoted include target.
///
/// Order: absolute target, the including file's directory, then each root.
pub fn resolve_include(
    target: &str,
    including_file: &Path,
    roots: &[PathBuf],
    source: &dyn SourceProvider,
) -> Option<PathBuf> {
    let target_path = Path::new(target);
    if target_path.is_absolute() {
        let candidate = normalize_path(target_path);
        return source.is_file(&candidate).then_some(candidate);
    }

    let local = including_file
        .parent()
        .map(|dir| normalize_path(&dir.join(target_path)));

    local
        .into_iter()
        .chain(roots.iter().map(|root| normalize_path(&root.join(target_path))))
        .find(|candidate| source.is_file(candidate))
}
