use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{InstallError, Result};

/// Root directory of a project as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectRoot(PathBuf);

impl ProjectRoot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ProjectRoot(dir.into())
    }

    /// Hosts usually identify a project by its project file (e.g. `Foo.csproj`),
    /// the root is the directory containing it.
    pub fn from_project_file(file: impl AsRef<Path>) -> Option<Self> {
        file.as_ref()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(ProjectRoot::new)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Where the companion files go and where their bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginLayout {
    /// Last segment of `Assets/Plugins/Editor/<vendor>`.
    pub vendor: String,
    pub resource_namespace: String,
    pub resource_subpackage: String,
    /// Installed in this order.
    pub required_files: Vec<String>,
}

impl Default for PluginLayout {
    fn default() -> Self {
        PluginLayout {
            vendor: "JetBrains".to_string(),
            resource_namespace: "JetBrains.ReSharper.Plugins.Unity".to_string(),
            resource_subpackage: "Unity3dRider".to_string(),
            required_files: vec![
                "RiderAssetPostprocessor.cs".to_string(),
                "RiderPlugin.cs".to_string(),
            ],
        }
    }
}

impl PluginLayout {
    /// `<namespace>.<subpackage>.<file>`
    pub fn resource_key(&self, file: &str) -> String {
        format!("{}.{}.{}", self.resource_namespace, self.resource_subpackage, file)
    }

    /// Parses a layout without checking it, see [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| InstallError::io(path, e))?;
        let layout = Self::from_json_str(&content).map_err(|e| InstallError::InvalidLayout {
            path: path.to_path_buf(),
            source: e,
        })?;
        layout.validate()?;
        Ok(layout)
    }

    /// The vendor directory and every required file must be a single plain
    /// name, so nothing is written outside `Assets/Plugins/Editor/<vendor>`.
    pub fn validate(&self) -> Result<()> {
        if !is_plain_name(&self.vendor) {
            return Err(InstallError::UnsafeLayoutEntry {
                field: "vendor",
                value: self.vendor.clone(),
            });
        }
        if let Some(file) = self.required_files.iter().find(|f| !is_plain_name(f)) {
            return Err(InstallError::UnsafeLayoutEntry {
                field: "required_files",
                value: file.clone(),
            });
        }
        Ok(())
    }
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Snapshot of which required files a project already has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationState {
    /// False when the project has no unique `Assets` directory.
    pub applicable: bool,
    pub target_dir: Option<PathBuf>,
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

impl InstallationState {
    pub fn not_applicable() -> Self {
        InstallationState {
            applicable: false,
            target_dir: None,
            present: Vec::new(),
            missing: Vec::new(),
        }
    }

    pub fn needs_install(&self) -> bool {
        self.applicable && !self.missing.is_empty()
    }
}
