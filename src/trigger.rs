//! Wiring the installer to a host's project-change notifications.
//!
//! The installer does not depend on any event system. A host implements
//! [`ProjectChangeTracker`] and the installer registers one handler on it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::installer::Installer;
use crate::resources::ResourceProvider;
use crate::ProjectRoot;

/// Lifetime token passed along with a notification.
#[derive(Debug, Default)]
pub struct ChangeScope {
    terminated: AtomicBool,
}

impl ChangeScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

pub type ProjectChangeHandler = Box<dyn Fn(&ChangeScope, &ProjectRoot) + Send + Sync>;

/// Host-side source of project change notifications.
pub trait ProjectChangeTracker {
    fn register_project_change_handler(&self, handler: ProjectChangeHandler);
}

impl<R: ResourceProvider + 'static> Installer<R> {
    /// Registers the check-then-install handler on `tracker`.
    ///
    /// The handler only holds a weak reference, dropping the last `Arc`
    /// turns further notifications into no-ops.
    pub fn subscribe(self: &Arc<Self>, tracker: &dyn ProjectChangeTracker) {
        let installer = Arc::downgrade(self);
        tracker.register_project_change_handler(Box::new(move |scope, project| {
            if scope.is_terminated() {
                return;
            }
            let Some(installer) = installer.upgrade() else {
                return;
            };
            if let Err(e) = installer.install_if_required(project) {
                if e.is_fatal() {
                    tracing::error!("Plugin install failed for {:?}: {}", project.path(), e);
                } else {
                    tracing::warn!("Plugin install failed for {:?}: {}", project.path(), e);
                }
            }
        }));
    }
}

/// In-process tracker that fans a notification out to every handler.
#[derive(Default)]
pub struct ChangeBroadcaster {
    handlers: Mutex<Vec<ProjectChangeHandler>>,
}

impl ChangeBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self, scope: &ChangeScope, project: &ProjectRoot) {
        let handlers = self.handlers.lock().unwrap_or_else(|p| p.into_inner());
        for handler in handlers.iter() {
            handler(scope, project);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

impl ProjectChangeTracker for ChangeBroadcaster {
    fn register_project_change_handler(&self, handler: ProjectChangeHandler) {
        self.handlers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_notification_installs_plugin() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Assets")).unwrap();
        let project = ProjectRoot::new(temp.path());

        let installer = Arc::new(Installer::bundled());
        let tracker = ChangeBroadcaster::new();
        installer.subscribe(&tracker);
        assert_eq!(tracker.handler_count(), 1);

        tracker.notify(&ChangeScope::new(), &project);
        assert!(!installer.is_installation_needed(&project).unwrap());
    }

    #[test]
    fn test_terminated_scope_is_ignored() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Assets")).unwrap();
        let project = ProjectRoot::new(temp.path());

        let installer = Arc::new(Installer::bundled());
        let tracker = ChangeBroadcaster::new();
        installer.subscribe(&tracker);

        let scope = ChangeScope::new();
        scope.terminate();
        tracker.notify(&scope, &project);
        assert!(installer.is_installation_needed(&project).unwrap());
    }

    #[test]
    fn test_dropped_installer_is_not_kept_alive() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Assets")).unwrap();
        let project = ProjectRoot::new(temp.path());

        let tracker = ChangeBroadcaster::new();
        let installer = Arc::new(Installer::bundled());
        installer.subscribe(&tracker);
        drop(installer);

        tracker.notify(&ChangeScope::new(), &project);
        assert!(!temp.path().join("Assets/Plugins").exists());
    }

    #[test]
    fn test_non_unity_project_is_silent() {
        let temp = TempDir::new().unwrap();
        let installer = Arc::new(Installer::bundled());
        let tracker = ChangeBroadcaster::new();
        installer.subscribe(&tracker);

        tracker.notify(&ChangeScope::new(), &ProjectRoot::new(temp.path()));
        assert!(fs::read_dir(temp.path()).unwrap().next().is_none());
    }
}
