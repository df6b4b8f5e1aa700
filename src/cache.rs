//! Persistent cache of remote-repository probe responses.
//!
//! Maps probe URLs to the HTTP status they returned, so repeated builds and
//! concurrent build steps share one set of network round-trips. The map
//! lives behind a mutex, is shared across steps through an `Arc`, and is
//! snapshotted to `tools/cache/url_response.json` under the build root:
//! loaded from disk on the first open of the process, written back once
//! when the last open handle closes. Entries are never re-probed or
//! expired within a process or across builds; a repository that moves
//! needs `clear`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};
use ureq::Agent;

use crate::error::{BridgeError, BridgeResult};

pub const CACHE_DIR: &str = "tools/cache";
pub const CACHE_FILE: &str = "url_response.json";

const TMP_SUFFIX: &str = ".tmp";
const CORRUPT_SUFFIX: &str = ".corrupt";

pub struct ProbeCache {
    path: PathBuf,
    agent: Agent,
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    responses: BTreeMap<String, u16>,
    refcount: usize,
    loaded: bool,
}

/// Live reference to the shared cache. Dropping releases the reference;
/// build steps call `close` instead so persistence failures surface.
pub struct CacheHandle {
    cache: Arc<ProbeCache>,
    released: bool,
}

impl std::fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHandle")
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

pub fn cache_path(build_root: &Path) -> PathBuf {
    build_root.join(CACHE_DIR).join(CACHE_FILE)
}

pub fn tmp_path(cache_path: &Path) -> PathBuf {
    suffixed(cache_path, TMP_SUFFIX)
}

pub fn corrupt_path(cache_path: &Path) -> PathBuf {
    suffixed(cache_path, CORRUPT_SUFFIX)
}

impl ProbeCache {
    pub fn new(build_root: &Path) -> Self {
        Self::at_path(cache_path(build_root))
    }

    pub fn at_path(path: PathBuf) -> Self {
        let config = Agent::config_builder().http_status_as_error(false).build();
        Self {
            path,
            agent: Agent::new_with_config(config),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire a reference to the shared cache, bulk-loading the snapshot
    /// on the first open of the process. A snapshot that exists but does
    /// not parse is renamed aside with a `.corrupt` suffix and the open
    /// fails; the increment is undone so other steps stay unaffected.
    pub fn open(self: &Arc<Self>) -> BridgeResult<CacheHandle> {
        let mut state = self.state();
        state.refcount += 1;
        if !state.loaded {
            match load_snapshot(&self.path) {
                Ok(responses) => {
                    state.responses = responses;
                    state.loaded = true;
                }
                Err(err) => {
                    state.refcount -= 1;
                    return Err(err);
                }
            }
        }
        Ok(CacheHandle {
            cache: Arc::clone(self),
            released: false,
        })
    }

    /// Status code for `url`, hitting the network at most once per URL for
    /// the process lifetime. The state lock is not held across the request,
    /// so probes of distinct URLs run in parallel; two racing probes of the
    /// same URL insert the same status twice.
    pub fn response_code(&self, url: &str) -> BridgeResult<u16> {
        {
            let state = self.state();
            if let Some(code) = state.responses.get(url) {
                return Ok(*code);
            }
        }

        debug!(url, "probing remote repository");
        let response = self.agent.get(url).call().map_err(|e| BridgeError::Probe {
            url: url.to_string(),
            source: Box::new(e),
        })?;
        let code = response.status().as_u16();

        self.state().responses.insert(url.to_string(), code);
        Ok(code)
    }

    fn release(&self) -> BridgeResult<()> {
        let mut state = self.state();
        state.refcount -= 1;
        if state.refcount == 0 {
            persist_snapshot(&self.path, &state.responses)?;
        }
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheHandle {
    /// Release this reference; the last close writes the snapshot to disk.
    pub fn close(mut self) -> BridgeResult<()> {
        self.released = true;
        self.cache.release()
    }
}

impl Drop for CacheHandle {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.cache.release() {
            error!("probe cache not persisted: {err}");
        }
    }
}

/// Read-only snapshot summary for the `stats` subcommand.
#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub cache_path: String,
    pub entries: u64,
    pub hosted: u64,
}

pub fn stats(cache_path: &Path) -> BridgeResult<CacheStats> {
    let responses = load_snapshot(cache_path)?;
    Ok(CacheStats {
        cache_path: cache_path.to_string_lossy().to_string(),
        entries: responses.len() as u64,
        hosted: responses.values().filter(|code| **code == 200).count() as u64,
    })
}

fn load_snapshot(path: &Path) -> BridgeResult<BTreeMap<String, u16>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(err) => {
            return Err(BridgeError::CacheRead {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    match serde_json::from_str(&raw) {
        Ok(responses) => Ok(responses),
        Err(err) => {
            let quarantine = corrupt_path(path);
            let _ = std::fs::rename(path, &quarantine);
            Err(BridgeError::CorruptCache {
                path: path.to_path_buf(),
                quarantine,
                reason: err.to_string(),
            })
        }
    }
}

fn persist_snapshot(path: &Path, responses: &BTreeMap<String, u16>) -> BridgeResult<()> {
    let fail = |source: std::io::Error| BridgeError::CachePersist {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }

    let json = serde_json::to_string_pretty(responses)
        .map_err(std::io::Error::other)
        .map_err(fail)?;

    let tmp = tmp_path(path);
    let written = std::fs::write(&tmp, json).and_then(|()| std::fs::rename(&tmp, path));
    if let Err(err) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(fail(err));
    }

    debug!(path = %path.display(), entries = responses.len(), "probe cache persisted");
    Ok(())
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}
