//! FFI (Foreign Function Interface) bindings for IDE hosts.
//!
//! This module exposes the installer through C-compatible functions that can
//! be called from C# (P/Invoke) or any C ABI consumer.
//!
//! # Memory Management
//!
//! - Rust allocates the installer handle and returned strings
//! - The calling code MUST call the corresponding `_free` functions to prevent leaks
//! - Strings are null-terminated UTF-8
//!
//! # Usage from C#
//!
//! ```csharp
//! [DllImport("unitydeploy_core.dll")]
//! private static extern IntPtr unitydeploy_installer_new();
//!
//! [DllImport("unitydeploy_core.dll")]
//! private static extern int unitydeploy_install(IntPtr installer, string projectDir);
//! ```

use crate::error::InstallError;
use crate::{Installer, ProjectRoot};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::sync::Mutex;

// ============================================================================
// C-Compatible Types
// ============================================================================

/// Opaque handle to an installer
pub struct CInstaller {
    installer: Installer,
    last_error: Mutex<Option<String>>,
}

/// Result code for operations
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CResultCode {
    Success = 0,
    Error = 1,
    InvalidProject = 2,
    MissingResource = 3,
    FileConflict = 4,
}

impl CInstaller {
    fn record(&self, message: Option<String>) {
        *self.last_error.lock().unwrap_or_else(|p| p.into_inner()) = message;
    }
}

// ============================================================================
// Installer Lifecycle
// ============================================================================

/// Create an installer with the bundled resources and default layout.
/// Caller MUST call unitydeploy_installer_free() when done.
#[no_mangle]
pub extern "C" fn unitydeploy_installer_new() -> *mut CInstaller {
    let handle = Box::new(CInstaller {
        installer: Installer::bundled(),
        last_error: Mutex::new(None),
    });
    Box::into_raw(handle)
}

/// Free an installer returned by unitydeploy_installer_new().
#[no_mangle]
pub extern "C" fn unitydeploy_installer_free(installer: *mut CInstaller) {
    if !installer.is_null() {
        unsafe {
            let _ = Box::from_raw(installer);
        }
    }
}

// ============================================================================
// Installer Operations
// ============================================================================

/// Check whether the project at `project_dir` needs the plugin files.
/// Returns 1 if needed, 0 if not, -1 on error.
#[no_mangle]
pub extern "C" fn unitydeploy_is_installation_needed(
    installer: *const CInstaller,
    project_dir: *const c_char,
) -> c_int {
    let (handle, project) = match unsafe { handle_and_project(installer, project_dir) } {
        Some(pair) => pair,
        None => return -1,
    };

    match handle.installer.is_installation_needed(&project) {
        Ok(needed) => {
            handle.record(None);
            c_int::from(needed)
        }
        Err(e) => {
            tracing::error!("Error checking plugin installation: {}", e);
            handle.record(Some(e.to_string()));
            -1
        }
    }
}

/// Install any missing plugin files into the project at `project_dir`.
#[no_mangle]
pub extern "C" fn unitydeploy_install(
    installer: *const CInstaller,
    project_dir: *const c_char,
) -> CResultCode {
    let (handle, project) = match unsafe { handle_and_project(installer, project_dir) } {
        Some(pair) => pair,
        None => return CResultCode::Error,
    };

    match handle.installer.install(&project) {
        Ok(_) => {
            handle.record(None);
            CResultCode::Success
        }
        Err(e) => {
            tracing::error!("Error installing plugin: {}", e);
            handle.record(Some(e.to_string()));
            error_to_code(&e)
        }
    }
}

/// Message of the last failed call on this installer, or null.
/// Caller MUST call unitydeploy_free_string() when done.
#[no_mangle]
pub extern "C" fn unitydeploy_last_error(installer: *const CInstaller) -> *mut c_char {
    if installer.is_null() {
        return ptr::null_mut();
    }

    let handle = unsafe { &*installer };
    let last_error = handle.last_error.lock().unwrap_or_else(|p| p.into_inner());
    match last_error.as_deref() {
        Some(message) => string_to_c_char(message),
        None => ptr::null_mut(),
    }
}

// ============================================================================
// String Management
// ============================================================================

/// Free a string returned by FFI functions.
#[no_mangle]
pub extern "C" fn unitydeploy_free_string(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

unsafe fn handle_and_project<'a>(
    installer: *const CInstaller,
    project_dir: *const c_char,
) -> Option<(&'a CInstaller, ProjectRoot)> {
    if installer.is_null() || project_dir.is_null() {
        return None;
    }

    let handle = &*installer;
    match CStr::from_ptr(project_dir).to_str() {
        Ok(dir) => Some((handle, ProjectRoot::new(dir))),
        Err(_) => {
            handle.record(Some("project path is not valid UTF-8".to_string()));
            None
        }
    }
}

fn string_to_c_char(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn error_to_code(error: &InstallError) -> CResultCode {
    match error {
        InstallError::InvalidProject { .. } => CResultCode::InvalidProject,
        InstallError::MissingResource { .. } => CResultCode::MissingResource,
        InstallError::FileConflict { .. } => CResultCode::FileConflict,
        InstallError::InvalidLayout { .. }
        | InstallError::UnsafeLayoutEntry { .. }
        | InstallError::Io { .. } => CResultCode::Error,
    }
}
