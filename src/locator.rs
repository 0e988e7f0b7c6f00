//! Locating the plugin directory inside a project.
//!
//! The expected layout is `<root>/Assets/Plugins/Editor/<vendor>`. Every
//! segment is resolved with [`find_unique_child`]: exactly one matching child
//! directory or nothing. Ambiguous layouts are reported as absent rather than
//! guessed at, which callers treat as "not installed yet".

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{PluginLayout, ProjectRoot};

pub const ASSETS_DIR: &str = "Assets";
pub const PLUGINS_DIR: &str = "Plugins";
pub const EDITOR_DIR: &str = "Editor";

/// Returns the single child directory of `dir` named `name`.
///
/// Names compare ASCII case-insensitively, so `Plugins` and `plugins` side by
/// side count as two matches. Zero or several matches yield `None`, as does
/// a `dir` that is missing or not a directory.
pub fn find_unique_child(dir: &Path, name: &str) -> io::Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut found: Option<PathBuf> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        if !entry.file_name().to_string_lossy().eq_ignore_ascii_case(name) {
            continue;
        }
        if found.is_some() {
            tracing::warn!("Ambiguous directory {:?} under {:?}", name, dir);
            return Ok(None);
        }
        found = Some(entry.path());
    }

    Ok(found)
}

/// The project's `Assets` directory, if it has exactly one.
pub fn resolve_assets_directory(project: &ProjectRoot) -> io::Result<Option<PathBuf>> {
    find_unique_child(project.path(), ASSETS_DIR)
}

/// `Assets/Plugins/Editor/<vendor>`, looked up segment by segment.
pub fn resolve_target_directory(
    project: &ProjectRoot,
    layout: &PluginLayout,
) -> io::Result<Option<PathBuf>> {
    match resolve_assets_directory(project)? {
        Some(assets) => resolve_below_assets(&assets, layout),
        None => Ok(None),
    }
}

pub(crate) fn resolve_below_assets(
    assets: &Path,
    layout: &PluginLayout,
) -> io::Result<Option<PathBuf>> {
    let mut current = assets.to_path_buf();
    for segment in [PLUGINS_DIR, EDITOR_DIR, layout.vendor.as_str()] {
        match find_unique_child(&current, segment)? {
            Some(next) => current = next,
            None => {
                tracing::debug!("No unique {:?} directory under {:?}", segment, current);
                return Ok(None);
            }
        }
    }
    Ok(Some(current))
}

/// Where the plugin files belong, whether or not the directory exists yet.
pub fn target_path(assets: &Path, layout: &PluginLayout) -> PathBuf {
    assets.join(PLUGINS_DIR).join(EDITOR_DIR).join(&layout.vendor)
}

/// Names of the non-directory entries directly inside `dir`.
///
/// Symlinks are not followed, a dangling link still occupies its name and
/// would make an exclusive create fail.
pub fn list_file_names(dir: &Path) -> io::Result<HashSet<String>> {
    let mut names = HashSet::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}
