//! Storage module for saving and loading the deck collection.
//!
//! All decks live in one JSON file that is read and written as a whole.
//! Reads heal missing or corrupt files by resetting them to an empty
//! collection (after moving a corrupt file aside). Writes go to a sibling
//! temp file that is renamed over the snapshot, so a failed write leaves the
//! previous snapshot intact.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::error::Result;
use crate::models::Deck;

/// What `load` had to do to produce a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreHealth {
    /// The snapshot was read as-is.
    Clean,
    /// No snapshot existed; an empty one was written.
    Initialized,
    /// The snapshot was unreadable and the collection starts over empty.
    /// `backup` holds the moved-aside original when that succeeded.
    Recovered {
        reason: String,
        backup: Option<PathBuf>,
    },
}

/// Result of reading the snapshot.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub decks: Vec<Deck>,
    pub health: StoreHealth,
}

/// Handles deck persistence.
pub struct DeckStore {
    path: PathBuf,
}

impl DeckStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Get default storage location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flashdeck")
            .join("decks.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole collection, healing missing or corrupt storage.
    pub fn load(&self) -> LoadReport {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no deck store at {:?}, initializing", self.path);
                if let Err(e) = self.write_snapshot(&[]) {
                    error!("failed to initialize deck store {:?}: {}", self.path, e);
                }
                return LoadReport {
                    decks: Vec::new(),
                    health: StoreHealth::Initialized,
                };
            }
            Err(e) => return self.recover(format!("unreadable: {}", e)),
        };

        match serde_json::from_str::<Vec<Deck>>(&content) {
            Ok(decks) => LoadReport {
                decks,
                health: StoreHealth::Clean,
            },
            Err(e) => self.recover(format!("invalid deck collection: {}", e)),
        }
    }

    /// Load the whole collection; recovery is logged, not reported.
    pub fn load_all(&self) -> Vec<Deck> {
        self.load().decks
    }

    /// Replace the persisted collection with `decks`.
    pub fn save_all(&self, decks: &[Deck]) -> Result<()> {
        self.write_snapshot(decks).map_err(|e| {
            error!("failed to save decks to {:?}: {}", self.path, e);
            e
        })
    }

    fn write_snapshot(&self, decks: &[Deck]) -> Result<()> {
        let json = serde_json::to_string_pretty(decks)?;
        let tmp = self.sibling("tmp");

        let written = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn recover(&self, reason: String) -> LoadReport {
        warn!("deck store {:?} is {}", self.path, reason);

        let backup = match self.move_aside() {
            Ok(path) => {
                warn!("kept the unreadable deck store as {:?}", path);
                Some(path)
            }
            Err(e) => {
                error!("could not back up deck store {:?}: {}", self.path, e);
                None
            }
        };

        // Never overwrite a file we failed to preserve.
        if backup.is_some() {
            if let Err(e) = self.write_snapshot(&[]) {
                error!("failed to reset deck store {:?}: {}", self.path, e);
            }
        }

        LoadReport {
            decks: Vec::new(),
            health: StoreHealth::Recovered { reason, backup },
        }
    }

    fn move_aside(&self) -> io::Result<PathBuf> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let mut candidate = self.sibling(&format!("corrupt-{}", timestamp));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.sibling(&format!("corrupt-{}-{}", timestamp, n));
            n += 1;
        }
        fs::rename(&self.path, &candidate)?;
        Ok(candidate)
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "decks.json".into());
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble_deck;
    use crate::generate::RawCard;

    fn store_in(dir: &tempfile::TempDir) -> DeckStore {
        DeckStore::new(dir.path().join("data").join("decks.json")).unwrap()
    }

    fn sample_deck(name: &str) -> Deck {
        assemble_deck(
            name,
            format!("Generated from {}.pdf", name),
            vec![
                RawCard::new("Q1", "A1").with_keyword("atom"),
                RawCard::new("Q2", "A2"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_missing_file_initializes_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let report = store.load();
        assert!(report.decks.is_empty());
        assert_eq!(report.health, StoreHealth::Initialized);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");

        assert_eq!(store.load().health, StoreHealth::Clean);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let decks = vec![sample_deck("Physics"), sample_deck("Chemistry")];

        store.save_all(&decks).unwrap();
        let loaded = store.load_all();

        assert_eq!(loaded, decks);
        assert!(!store.sibling("tmp").exists());
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_all(&[sample_deck("Physics")]).unwrap();

        assert_eq!(store.load_all(), store.load_all());
    }

    #[test]
    fn test_save_of_load_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_all(&[sample_deck("Physics"), sample_deck("History")]).unwrap();
        let before = fs::read(store.path()).unwrap();

        store.save_all(&store.load_all()).unwrap();

        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn test_reads_generator_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let json = r#"[{
            "id": "d1",
            "name": "lecture3",
            "description": "Generated from lecture3.pdf",
            "studied": false,
            "total": 1,
            "learned": 0,
            "due": 1,
            "cards": [{
                "id": "c1",
                "question": "Q",
                "answer": "A",
                "repetitions": 0,
                "interval": 0,
                "ef": 2.5,
                "due": "2024-06-01"
            }]
        }]"#;
        fs::write(store.path(), json).unwrap();

        let report = store.load();
        assert_eq!(report.health, StoreHealth::Clean);
        assert_eq!(report.decks[0].cards[0].ease_factor, 2.5);
        assert_eq!(report.decks[0].cards[0].image, None);
    }

    #[test]
    fn test_corrupt_file_is_backed_up_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();

        let report = store.load();
        assert!(report.decks.is_empty());
        let backup = match report.health {
            StoreHealth::Recovered { backup: Some(path), .. } => path,
            other => panic!("unexpected health {:?}", other),
        };

        assert_eq!(fs::read_to_string(&backup).unwrap(), "{ not json");
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
        assert_eq!(store.load().health, StoreHealth::Clean);
    }

    #[test]
    fn test_non_array_is_treated_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"decks": []}"#).unwrap();

        assert!(matches!(store.load().health, StoreHealth::Recovered { .. }));
    }

    #[test]
    fn test_repeated_corruption_keeps_every_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        fs::write(store.path(), "first").unwrap();
        store.load();
        fs::write(store.path(), "second").unwrap();
        store.load();

        let backups = fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
            .count();
        assert_eq!(backups, 2);
    }

    #[test]
    fn test_failed_save_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_all(&[sample_deck("Physics")]).unwrap();
        let before = fs::read(store.path()).unwrap();

        // A directory squatting on the temp path makes the write fail.
        fs::create_dir(store.sibling("tmp")).unwrap();
        assert!(store.save_all(&[]).is_err());

        assert_eq!(fs::read(store.path()).unwrap(), before);
    }
}
