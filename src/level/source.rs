//! Where levels come from
//!
//! Levels are addressed by index. `LevelDir` reads `N.lvl` files from a
//! directory; `MemoryLevels` holds encoded levels in memory.

use std::path::{Path, PathBuf};

use super::LevelData;
use super::decode::decode;
use super::error::LevelError;

pub trait LevelSource {
    /// Number of levels; indices run from 0 to `len() - 1`
    fn len(&self) -> usize;

    fn load(&self, index: usize) -> Result<LevelData, LevelError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A directory of `0.lvl`, `1.lvl`, ...
#[derive(Debug, Clone)]
pub struct LevelDir {
    root: PathBuf,
    count: usize,
}

impl LevelDir {
    /// Open a level directory. The level count is the number of `.lvl` files.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LevelError> {
        let root = root.into();
        let entries = std::fs::read_dir(&root).map_err(|source| LevelError::Io {
            path: root.clone(),
            source,
        })?;

        let mut count = 0;
        for entry in entries {
            let entry = entry.map_err(|source| LevelError::Io {
                path: root.clone(),
                source,
            })?;
            if entry.path().extension().is_some_and(|ext| ext == "lvl") {
                count += 1;
            }
        }

        log::info!("Found {} levels in {}", count, root.display());
        Ok(Self { root, count })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, index: usize) -> PathBuf {
        self.root.join(format!("{index}.lvl"))
    }
}

impl LevelSource for LevelDir {
    fn len(&self) -> usize {
        self.count
    }

    fn load(&self, index: usize) -> Result<LevelData, LevelError> {
        if index >= self.count {
            return Err(LevelError::NotFound(index));
        }
        let path = self.path(index);
        let bytes = std::fs::read(&path).map_err(|source| LevelError::Io { path, source })?;
        decode(&bytes).map_err(|source| LevelError::Format { index, source })
    }
}

/// Encoded levels held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLevels {
    levels: Vec<Vec<u8>>,
}

impl MemoryLevels {
    pub fn new(levels: Vec<Vec<u8>>) -> Self {
        Self { levels }
    }

    pub fn push(&mut self, bytes: Vec<u8>) {
        self.levels.push(bytes);
    }
}

impl LevelSource for MemoryLevels {
    fn len(&self) -> usize {
        self.levels.len()
    }

    fn load(&self, index: usize) -> Result<LevelData, LevelError> {
        let bytes = self.levels.get(index).ok_or(LevelError::NotFound(index))?;
        decode(bytes).map_err(|source| LevelError::Format { index, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::FormatError;

    fn minimal() -> Vec<u8> {
        let mut bytes = b"lvlM\0\x80".to_vec();
        bytes.extend([127, 127, 127, 126]);
        bytes
    }

    #[test]
    fn test_memory_levels() {
        let levels = MemoryLevels::new(vec![minimal(), b"nope".to_vec()]);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels.load(0).unwrap().title, "M");
        assert!(matches!(
            levels.load(1),
            Err(LevelError::Format {
                index: 1,
                source: FormatError::BadMagic
            })
        ));
        assert!(matches!(levels.load(2), Err(LevelError::NotFound(2))));
    }

    #[test]
    fn test_level_dir_counts_lvl_files() {
        let root = std::env::temp_dir().join(format!("monoman-levels-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("0.lvl"), minimal()).unwrap();
        std::fs::write(root.join("1.lvl"), minimal()).unwrap();
        std::fs::write(root.join("notes.txt"), "ignored").unwrap();

        let dir = LevelDir::open(&root).unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.load(1).unwrap().title, "M");
        assert!(matches!(dir.load(2), Err(LevelError::NotFound(2))));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let err = LevelDir::open("/definitely/not/a/level/dir").unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
    }
}
