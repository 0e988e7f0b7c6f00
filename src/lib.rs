//! UnityDeploy Core Library
//!
//! Deploys the IDE's companion editor plugin into Unity projects.
//!
//! # Architecture
//!
//! This library is designed to be driven by an IDE host:
//! - **Rust hosts**: use [`Installer`] directly, optionally wired to a
//!   [`ProjectChangeTracker`](trigger::ProjectChangeTracker)
//! - **Native hosts**: link the cdylib/staticlib and call the C ABI in [`ffi`]
//!
//! # Core Features Implemented
//!
//! ## Plugin Location (`locator` module)
//! - `resolve_assets_directory()` - Find the project's single `Assets` directory
//! - `resolve_target_directory()` - Find `Assets/Plugins/Editor/<vendor>`
//! - `find_unique_child()` - Strict single-match directory lookup
//!
//! ## Plugin Installation (`installer` module)
//! - `Installer::is_installation_needed()` - Any required file missing?
//! - `Installer::installation_state()` - Present and missing files
//! - `Installer::install()` - Write missing files with exclusive create
//!
//! ## Resources (`resources` module)
//! - `ResourceProvider` - Byte source keyed by `<namespace>.<subpackage>.<file>`
//! - `BundledResources` - Files compiled into the library
//! - `DirectoryResources` - Files shipped next to the host
//!
//! ## Data Structures (`plugin` module)
//! - `ProjectRoot` - Project directory handle
//! - `PluginLayout` - Vendor directory, resource naming and required files
//! - `InstallationState` - Derived installation report

pub mod error;
pub mod ffi;
pub mod installer;
pub mod locator;
pub mod plugin;
pub mod resources;
pub mod trigger;

pub use error::{InstallError, Result};
pub use installer::Installer;
pub use plugin::{InstallationState, PluginLayout, ProjectRoot};
pub use resources::{BundledResources, DirectoryResources, ResourceProvider};
