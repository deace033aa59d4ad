//! Engine executable discovery
//!
//! Resolution order:
//!
//! 1. An explicit path hint, if it names an existing file
//! 2. A fixed list of common install locations
//! 3. Every directory on `PATH`, looking for the default binary name

use std::env;
use std::path::{Path, PathBuf};

/// Binary name searched on `PATH`
pub const DEFAULT_ENGINE_NAME: &str = "stockfish";

/// Well-known install locations, checked in order
pub const DISCOVERY_PATHS: &[&str] = &[
    "C:\\stockfish\\stockfish-windows-x86-64-avx2.exe",
    "C:\\Program Files\\stockfish\\stockfish.exe",
    "C:\\stockfish\\stockfish.exe",
    "/usr/local/bin/stockfish",
    "/usr/bin/stockfish",
    "/usr/games/stockfish",
    "/opt/homebrew/bin/stockfish",
];

/// Locates an engine executable
#[derive(Debug, Clone)]
pub struct EngineLocator {
    candidates: Vec<PathBuf>,
    search_path: bool,
}

impl Default for EngineLocator {
    fn default() -> Self {
        Self {
            candidates: DISCOVERY_PATHS.iter().map(PathBuf::from).collect(),
            search_path: true,
        }
    }
}

impl EngineLocator {
    /// A locator that only considers the hint, without any fallback
    pub fn hint_only() -> Self {
        Self {
            candidates: Vec::new(),
            search_path: false,
        }
    }

    /// Resolve an executable path, or `None` if nothing was found
    pub fn resolve(&self, hint: Option<&Path>) -> Option<PathBuf> {
        if let Some(hint) = hint {
            if hint.is_file() {
                return Some(hint.to_path_buf());
            }
            log::warn!("[ENGINE] Engine not found at {}", hint.display());
        }

        if let Some(found) = self.candidates.iter().find(|p| p.is_file()) {
            return Some(found.clone());
        }

        if self.search_path {
            log::info!("[ENGINE] Searching PATH for `{}`", DEFAULT_ENGINE_NAME);
            return find_on_path(DEFAULT_ENGINE_NAME);
        }
        None
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var).find_map(|dir| {
        let plain = dir.join(name);
        if plain.is_file() {
            return Some(plain);
        }
        let exe = dir.join(format!("{name}.exe"));
        exe.is_file().then_some(exe)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_hint_wins() {
        //! Any existing file is accepted as the hint; launching is checked later
        let file = env::temp_dir().join("uci_engine_locator_hint");
        std::fs::write(&file, b"").unwrap();

        let resolved = EngineLocator::hint_only().resolve(Some(&file));
        assert_eq!(resolved.as_deref(), Some(file.as_path()));

        std::fs::remove_file(&file).ok();
    }

    #[test]
    fn test_missing_hint_without_fallback_resolves_nothing() {
        let missing = Path::new("/definitely/not/an/engine");
        assert!(EngineLocator::hint_only().resolve(Some(missing)).is_none());
        assert!(EngineLocator::hint_only().resolve(None).is_none());
    }
}
