use crate::{
    prelude::*,
    store,
};

const TALLY_FILE: &str = "tally.json";

#[derive(Debug, Default, Deserialize, Serialize)]
struct Count {
    count: u64,
}

/// A running server-wide counter, persisted after every change.
pub(crate) struct Tally {
    path: PathBuf,
    count: Count,
}

impl Tally {
    pub(crate) fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(TALLY_FILE);
        Self {
            count: store::load_or_default(&path),
            path,
        }
    }

    /// Returns the new count.
    pub(crate) fn increment(&mut self) -> Result<u64, store::Error> {
        self.count.count = self.count.count.saturating_add(1);
        store::save(&self.path, &self.count)?;
        Ok(self.count.count)
    }

    pub(crate) fn reset(&mut self) -> Result<(), store::Error> {
        self.count.count = 0;
        store::save(&self.path, &self.count)
    }
}

/// `1st`, `2nd`, `3rd`, `4th`, …, `11th`, `12th`, `13th`, …, `21st`.
pub(crate) fn ordinal(n: u64) -> String {
    let suffix = if (10..=20).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{n}{suffix}")
}
