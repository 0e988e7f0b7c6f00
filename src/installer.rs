//! Checking and installing the editor plugin files.
//!
//! - Check: which required files are missing from `Assets/Plugins/Editor/<vendor>`
//! - Install: write the missing ones from a [`ResourceProvider`], never touching
//!   files that already exist

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{InstallError, Result};
use crate::locator::{list_file_names, resolve_assets_directory, resolve_below_assets, target_path};
use crate::resources::{BundledResources, ResourceProvider};
use crate::{InstallationState, PluginLayout, ProjectRoot};

/// Installs the plugin files into projects.
///
/// One lock per installer serializes every `install` call, whatever the
/// project. Share the installer through an `Arc` to get the guarantee across
/// threads.
pub struct Installer<R = BundledResources> {
    layout: PluginLayout,
    resources: R,
    lock: Mutex<()>,
}

impl Installer<BundledResources> {
    /// Default layout with the resources compiled into this crate.
    pub fn bundled() -> Self {
        Installer::with_checked_layout(PluginLayout::default(), BundledResources::rider_plugin())
    }
}

impl<R: ResourceProvider> Installer<R> {
    /// Fails with [`InstallError::UnsafeLayoutEntry`] if the layout would
    /// write outside `Assets/Plugins/Editor/<vendor>`.
    pub fn new(layout: PluginLayout, resources: R) -> Result<Self> {
        layout.validate()?;
        Ok(Installer::with_checked_layout(layout, resources))
    }

    fn with_checked_layout(layout: PluginLayout, resources: R) -> Self {
        Installer {
            layout,
            resources,
            lock: Mutex::new(()),
        }
    }

    pub fn layout(&self) -> &PluginLayout {
        &self.layout
    }

    /// True when the project has an `Assets` directory and at least one
    /// required file is missing from the plugin directory.
    pub fn is_installation_needed(&self, project: &ProjectRoot) -> Result<bool> {
        Ok(self.installation_state(project)?.needs_install())
    }

    /// Which required files are present and which are missing.
    pub fn installation_state(&self, project: &ProjectRoot) -> Result<InstallationState> {
        let assets = resolve_assets_directory(project)
            .map_err(|e| InstallError::io(project.path(), e))?;
        let assets = match assets {
            Some(assets) => assets,
            None => {
                tracing::debug!("No Assets directory in {:?}, skipping", project.path());
                return Ok(InstallationState::not_applicable());
            }
        };

        let target =
            resolve_below_assets(&assets, &self.layout).map_err(|e| InstallError::io(&assets, e))?;
        let existing = match &target {
            Some(dir) => list_file_names(dir).map_err(|e| InstallError::io(dir, e))?,
            None => Default::default(),
        };

        let (present, missing): (Vec<String>, Vec<String>) = self
            .layout
            .required_files
            .iter()
            .cloned()
            .partition(|f| existing.contains(f));

        Ok(InstallationState {
            applicable: true,
            target_dir: target,
            present,
            missing,
        })
    }

    /// Writes every missing required file into the plugin directory.
    ///
    /// Returns the files this call created, in installation order. Fails with
    /// [`InstallError::InvalidProject`] if the project has no `Assets`
    /// directory. The first failing file aborts the rest; files written
    /// before it are kept.
    pub fn install(&self, project: &ProjectRoot) -> Result<Vec<PathBuf>> {
        let assets = resolve_assets_directory(project)
            .map_err(|e| InstallError::io(project.path(), e))?
            .ok_or_else(|| InstallError::InvalidProject {
                project: project.path().to_path_buf(),
            })?;

        let plugin_dir = target_path(&assets, &self.layout);
        fs::create_dir_all(&plugin_dir).map_err(|e| InstallError::io(&plugin_dir, e))?;

        // The guarded value is (), a panic elsewhere leaves nothing to repair.
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let existing =
            list_file_names(&plugin_dir).map_err(|e| InstallError::io(&plugin_dir, e))?;
        let mut written = Vec::new();

        for file in &self.layout.required_files {
            if existing.contains(file) {
                tracing::debug!("{} already present in {:?}", file, plugin_dir);
                continue;
            }

            let dest = plugin_dir.join(file);
            self.copy_resource(file, &dest)?;
            tracing::info!("Installed {:?}", dest);
            written.push(dest);
        }

        Ok(written)
    }

    /// Installs only if [`is_installation_needed`](Self::is_installation_needed) says so.
    pub fn install_if_required(&self, project: &ProjectRoot) -> Result<Vec<PathBuf>> {
        if self.is_installation_needed(project)? {
            self.install(project)
        } else {
            Ok(Vec::new())
        }
    }

    fn copy_resource(&self, file: &str, dest: &Path) -> Result<()> {
        let key = self.layout.resource_key(file);
        let mut source = self
            .resources
            .fetch(&key)
            .ok_or(InstallError::MissingResource { key })?;

        let mut target = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => InstallError::FileConflict {
                    path: dest.to_path_buf(),
                },
                _ => InstallError::io(dest, e),
            })?;

        io::copy(&mut source, &mut target).map_err(|e| InstallError::io(dest, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn unity_project() -> (TempDir, ProjectRoot) {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Assets")).unwrap();
        let project = ProjectRoot::new(temp.path());
        (temp, project)
    }

    fn plugin_dir(temp: &TempDir) -> PathBuf {
        temp.path().join("Assets/Plugins/Editor/JetBrains")
    }

    #[test]
    fn test_not_a_unity_project() {
        let temp = TempDir::new().unwrap();
        let project = ProjectRoot::new(temp.path());
        let installer = Installer::bundled();

        assert!(!installer.is_installation_needed(&project).unwrap());
        assert!(matches!(
            installer.install(&project),
            Err(InstallError::InvalidProject { .. })
        ));
        assert!(fs::read_dir(temp.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_installs_into_fresh_project() {
        let (temp, project) = unity_project();
        let installer = Installer::bundled();
        assert!(installer.is_installation_needed(&project).unwrap());

        let written = installer.install(&project).unwrap();
        let dir = plugin_dir(&temp);
        assert_eq!(
            written,
            vec![dir.join("RiderAssetPostprocessor.cs"), dir.join("RiderPlugin.cs")]
        );
        assert!(!installer.is_installation_needed(&project).unwrap());
    }

    #[test]
    fn test_only_missing_file_is_written() {
        let (temp, project) = unity_project();
        let dir = plugin_dir(&temp);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("RiderPlugin.cs"), b"// user edited").unwrap();

        let installer = Installer::bundled();
        let state = installer.installation_state(&project).unwrap();
        assert_eq!(state.present, vec!["RiderPlugin.cs".to_string()]);
        assert_eq!(state.missing, vec!["RiderAssetPostprocessor.cs".to_string()]);

        let written = installer.install(&project).unwrap();
        assert_eq!(written, vec![dir.join("RiderAssetPostprocessor.cs")]);
        assert_eq!(fs::read(dir.join("RiderPlugin.cs")).unwrap(), b"// user edited");
    }

    #[test]
    fn test_second_install_writes_nothing() {
        let (_temp, project) = unity_project();
        let installer = Installer::bundled();

        assert_eq!(installer.install(&project).unwrap().len(), 2);
        assert!(installer.install(&project).unwrap().is_empty());
    }

    #[test]
    fn test_missing_resource_aborts() {
        let (temp, project) = unity_project();
        let mut resources = BundledResources::new();
        let layout = PluginLayout::default();
        resources.insert(layout.resource_key("RiderPlugin.cs"), b"plugin".to_vec());
        let installer = Installer::new(layout, resources).unwrap();

        let err = installer.install(&project).unwrap_err();
        assert!(matches!(
            err,
            InstallError::MissingResource { ref key } if key.ends_with("RiderAssetPostprocessor.cs")
        ));
        // aborted before the second file
        assert!(!plugin_dir(&temp).join("RiderPlugin.cs").exists());
    }

    #[test]
    fn test_conflicting_entry_aborts_and_is_left_alone() {
        let (temp, project) = unity_project();
        let dir = plugin_dir(&temp);
        let blocker = dir.join("RiderAssetPostprocessor.cs");
        fs::create_dir_all(&blocker).unwrap();
        fs::write(blocker.join("keep.txt"), b"untouched").unwrap();

        let installer = Installer::bundled();
        assert!(installer.is_installation_needed(&project).unwrap());

        let err = installer.install(&project).unwrap_err();
        assert!(matches!(err, InstallError::FileConflict { ref path } if *path == blocker));
        // the conflict stops the iteration before the second file
        assert!(!dir.join("RiderPlugin.cs").exists());
        assert!(blocker.is_dir());
        assert_eq!(fs::read(blocker.join("keep.txt")).unwrap(), b"untouched");
    }

    #[test]
    fn test_escaping_layout_is_rejected() {
        let (temp, _project) = unity_project();
        let layout = PluginLayout {
            vendor: "../../../Outside".to_string(),
            required_files: vec!["../../escaped.cs".to_string()],
            ..PluginLayout::default()
        };
        let mut resources = BundledResources::new();
        resources.insert(layout.resource_key("../../escaped.cs"), b"x".to_vec());

        assert!(matches!(
            Installer::new(layout, resources),
            Err(InstallError::UnsafeLayoutEntry { field: "vendor", .. })
        ));
        assert!(!temp.path().join("Assets/Plugins").exists());
    }

    #[test]
    fn test_install_if_required_skips_non_unity_project() {
        let temp = TempDir::new().unwrap();
        let installer = Installer::bundled();

        let written = installer.install_if_required(&ProjectRoot::new(temp.path())).unwrap();
        assert!(written.is_empty());
        assert!(!temp.path().join("Assets").exists());
    }
}
