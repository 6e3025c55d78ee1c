//! Named process locks over exclusive-create lock files.
//!
//! A lock is a file under `locks/` created with `create_new`; whoever creates
//! it holds the lock. There is deliberately no expiry: a lock abandoned by a
//! crashed holder stays visible until an operator force-releases it, so stale
//! state is diagnosed rather than silently raced over. Contenders must fall
//! back to cached data instead of blocking.

pub mod errors;
pub mod types;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::clock::now_ms;
pub use errors::LockError;
use gauge_paths::GaugePaths;
pub use types::{LockInfo, LockStatus, LockToken};

/// Acquire the named lock, failing immediately when it is already held.
pub fn acquire(paths: &GaugePaths, name: &str) -> Result<LockToken, LockError> {
    acquire_at(now_ms(), paths, name)
}

pub fn acquire_at(now_ms: u64, paths: &GaugePaths, name: &str) -> Result<LockToken, LockError> {
    let path = paths.lock_file(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| LockError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            let holder_pid = read_info(&path).map(|info| info.pid);
            tracing::debug!(
                event = "core.lock.contended",
                name = %name,
                holder_pid = ?holder_pid,
            );
            return Err(LockError::Held {
                name: name.to_string(),
                holder_pid,
            });
        }
        Err(e) => {
            return Err(LockError::Io {
                path: path.clone(),
                source: e,
            });
        }
    };

    let info = LockInfo {
        pid: std::process::id(),
        acquired_at: now_ms,
    };
    let json = serde_json::to_string(&info)?;
    if let Err(e) = file.write_all(json.as_bytes()) {
        // Half-written lock files are worse than no lock at all
        let _ = fs::remove_file(&path);
        return Err(LockError::Io { path, source: e });
    }

    tracing::debug!(event = "core.lock.acquired", name = %name, pid = info.pid);
    Ok(LockToken::new(name.to_string(), path))
}

/// Run `f` while holding the named lock. The lock is released before the
/// result is returned, on the panic path via the token's drop.
pub fn with_lock<T>(
    paths: &GaugePaths,
    name: &str,
    f: impl FnOnce() -> T,
) -> Result<T, LockError> {
    let token = acquire(paths, name)?;
    let result = f();
    token.release()?;
    Ok(result)
}

/// Remove the named lock file regardless of holder. Operator escape hatch for
/// locks abandoned by crashed processes. Returns whether a file was removed.
pub fn force_release(paths: &GaugePaths, name: &str) -> Result<bool, LockError> {
    let path = paths.lock_file(name);
    match fs::remove_file(&path) {
        Ok(()) => {
            tracing::info!(event = "core.lock.force_released", name = %name);
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(LockError::Io { path, source: e }),
    }
}

/// Observed state of one named lock, including whether the recorded holder
/// pid is still alive.
pub fn status(paths: &GaugePaths, name: &str) -> LockStatus {
    let path = paths.lock_file(name);
    let holder = read_info(&path);
    let holder_alive = holder.as_ref().map(|info| process_alive(info.pid));
    LockStatus {
        name: name.to_string(),
        holder,
        holder_alive,
    }
}

/// All locks currently present on disk, sorted by name.
pub fn list(paths: &GaugePaths) -> Vec<LockStatus> {
    let dir = paths.locks_dir();
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut statuses: Vec<LockStatus> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "lock"))
        .filter_map(|entry| {
            let path = entry.path();
            let name = path.file_stem()?.to_str()?.to_string();
            Some(status(paths, &name))
        })
        .collect();
    statuses.sort_by(|a, b| a.name.cmp(&b.name));
    statuses
}

/// Whether a pid maps to a live process.
pub fn process_alive(pid: u32) -> bool {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);
    system.process(Pid::from_u32(pid)).is_some()
}

fn read_info(path: &Path) -> Option<LockInfo> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::debug!(
                event = "core.lock.info_unparseable",
                file = %path.display(),
                error = %e,
            );
            None
        }
    }
}
