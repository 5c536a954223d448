//! Where battery-backed cartridge RAM is kept between sessions.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Storage for save documents, keyed by game id (`<rom file name>.sav`).
pub trait SaveStore: Send {
    fn open(&self, game: &str) -> io::Result<Box<dyn Read>>;
    fn create(&self, game: &str) -> io::Result<Box<dyn Write>>;
}

/// Saves as files under a base directory.
#[derive(Clone, Debug)]
pub struct FileSystemStore {
    base_dir: PathBuf,
}

impl FileSystemStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn path_for(&self, game: &str) -> PathBuf {
        self.base_dir.join(game)
    }
}

impl SaveStore for FileSystemStore {
    fn open(&self, game: &str) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(self.path_for(game))?))
    }

    fn create(&self, game: &str) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(File::create(self.path_for(game))?))
    }
}

/// Store that never has a save and discards writes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopStore;

impl SaveStore for NoopStore {
    fn open(&self, game: &str) -> io::Result<Box<dyn Read>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no save for {game}"),
        ))
    }

    fn create(&self, _game: &str) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(io::sink()))
    }
}
