//! Byte sources for the files the installer writes.
//!
//! The installer only knows resource keys (`<namespace>.<subpackage>.<file>`),
//! how the bytes are packaged is up to the [`ResourceProvider`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use crate::PluginLayout;

/// Lookup of resource bytes by key.
pub trait ResourceProvider: Send + Sync {
    /// Opens the resource, or `None` if this provider does not carry it.
    fn fetch(&self, key: &str) -> Option<Box<dyn Read + Send + '_>>;
}

impl<P: ResourceProvider + ?Sized> ResourceProvider for Box<P> {
    fn fetch(&self, key: &str) -> Option<Box<dyn Read + Send + '_>> {
        (**self).fetch(key)
    }
}

const RIDER_ASSET_POSTPROCESSOR: &[u8] =
    include_bytes!("../resources/Unity3dRider/RiderAssetPostprocessor.cs");
const RIDER_PLUGIN: &[u8] = include_bytes!("../resources/Unity3dRider/RiderPlugin.cs");

/// Resources held in memory, usually compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct BundledResources {
    entries: HashMap<String, Cow<'static, [u8]>>,
}

impl BundledResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// The editor plugin shipped with this crate, keyed for the default layout.
    pub fn rider_plugin() -> Self {
        let layout = PluginLayout::default();
        let mut resources = Self::new();
        resources.insert(
            layout.resource_key("RiderAssetPostprocessor.cs"),
            RIDER_ASSET_POSTPROCESSOR,
        );
        resources.insert(layout.resource_key("RiderPlugin.cs"), RIDER_PLUGIN);
        resources
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) {
        self.entries.insert(key.into(), bytes.into());
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(|b| b.as_ref())
    }
}

impl ResourceProvider for BundledResources {
    fn fetch(&self, key: &str) -> Option<Box<dyn Read + Send + '_>> {
        self.get(key)
            .map(|bytes| Box::new(io::Cursor::new(bytes)) as Box<dyn Read + Send + '_>)
    }
}

/// Resources shipped as loose files named by their key.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryResources { root: root.into() }
    }
}

impl ResourceProvider for DirectoryResources {
    fn fetch(&self, key: &str) -> Option<Box<dyn Read + Send + '_>> {
        let path = self.root.join(key);
        match File::open(&path) {
            Ok(file) => Some(Box::new(file)),
            Err(e) => {
                tracing::debug!("Resource {:?} unavailable: {}", path, e);
                None
            }
        }
    }
}
