use crate::{
    prelude::*,
    store,
};

const DECKLIST_FILE: &str = "decklists.json";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct Decklist {
    #[serde(default)]
    pub(crate) text: String,
    /// Attachment URLs, shown one per message.
    #[serde(default)]
    pub(crate) images: Vec<String>,
}

pub(crate) struct DecklistStore {
    path: PathBuf,
    decklists: BTreeMap<PlayerId, Decklist>,
}

impl DecklistStore {
    pub(crate) fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(DECKLIST_FILE);
        Self {
            decklists: store::load_or_default(&path),
            path,
        }
    }

    /// Replaces any decklist previously saved for this player.
    pub(crate) fn save_decklist(&mut self, id: PlayerId, decklist: Decklist) -> Result<(), store::Error> {
        self.decklists.insert(id, decklist);
        store::save(&self.path, &self.decklists)
    }

    pub(crate) fn decklist(&self, id: &PlayerId) -> Option<&Decklist> {
        self.decklists.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_replaces_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut decklists = DecklistStore::load(dir.path());
        assert!(decklists.decklist(&PlayerId::from("1")).is_none());
        decklists.save_decklist(PlayerId::from("1"), Decklist { text: format!("40 Islands"), images: Vec::default() }).unwrap();
        decklists.save_decklist(PlayerId::from("1"), Decklist { text: String::default(), images: vec![format!("https://cdn.example/deck.png")] }).unwrap();
        let reloaded = DecklistStore::load(dir.path());
        let decklist = reloaded.decklist(&PlayerId::from("1")).unwrap();
        assert!(decklist.text.is_empty());
        assert_eq!(decklist.images, ["https://cdn.example/deck.png"]);
    }
}
