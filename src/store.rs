//! JSON files backing the league, round and decklist state.

use {
    std::{
        fs::File,
        io::{
            self,
            BufReader,
            prelude::*,
        },
    },
    serde::de::DeserializeOwned,
    tempfile::NamedTempFile,
    crate::prelude::*,
};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] Io(#[from] io::Error),
    #[error(transparent)] Json(#[from] serde_json::Error),
    #[error(transparent)] Persist(#[from] tempfile::PersistError),
}

/// Reads `path` as JSON, falling back to `T::default()` if the file is missing or unreadable.
///
/// A missing file is the normal first-run case and is silent. Anything else is logged, since the
/// next successful save will overwrite whatever was on disk.
pub(crate) fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            log::warn!("failed to open {}, starting from an empty state: {e}", path.display());
            return T::default()
        }
    };
    match serde_json::from_reader(BufReader::new(file)) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("malformed JSON in {}, starting from an empty state: {e}", path.display());
            T::default()
        }
    }
}

/// Serializes `value` to `path`, replacing the previous contents atomically.
pub(crate) fn save<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), Error> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path)?;
    Ok(())
}

/// Deletes `path`, treating a missing file as success.
pub(crate) fn remove(path: &Path) -> Result<(), Error> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
