use {
    std::cmp::Reverse,
    derive_more::{
        Display,
        From,
    },
    crate::{
        prelude::*,
        store,
    },
};

/// Points for a declared win. Byes are worth the same.
pub(crate) const WIN_POINTS: i64 = 3;

/// An opaque, stable player identifier. The Discord layer uses user IDs.
#[derive(Debug, Display, From, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub(crate) struct PlayerId(String);

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct Player {
    pub(crate) points: i64,
    pub(crate) opponents: BTreeSet<PlayerId>,
    pub(crate) received_bye: bool,
}

impl Player {
    pub(crate) fn has_faced(&self, other: &PlayerId) -> bool {
        self.opponents.contains(other)
    }
}

/// All player records at a point in time, keyed by ID.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub(crate) struct Standings(BTreeMap<PlayerId, Player>);

impl Standings {
    pub(crate) fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.0.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.0.get_mut(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `false` without touching the existing record if `id` is already present.
    pub(crate) fn insert(&mut self, id: PlayerId) -> bool {
        if self.0.contains_key(&id) {
            false
        } else {
            self.0.insert(id, Player::default());
            true
        }
    }

    pub(crate) fn remove(&mut self, id: &PlayerId) -> bool {
        self.0.remove(id).is_some()
    }

    pub(crate) fn add_points(&mut self, id: &PlayerId, amount: i64) -> i64 {
        let player = self.0.entry(id.clone()).or_default();
        player.points = player.points.saturating_add(amount);
        player.points
    }

    /// Players ordered by descending points, then ascending ID.
    pub(crate) fn ranked(&self) -> Vec<(&PlayerId, &Player)> {
        let mut ranked = self.0.iter().collect_vec();
        ranked.sort_by_key(|(id, player)| (Reverse(player.points), *id));
        ranked
    }

    /// Records that `a` and `b` have played each other.
    pub(crate) fn link(&mut self, a: &PlayerId, b: &PlayerId) {
        if a == b {
            return
        }
        if let Some(player) = self.0.get_mut(a) {
            player.opponents.insert(b.clone());
        }
        if let Some(player) = self.0.get_mut(b) {
            player.opponents.insert(a.clone());
        }
    }

    pub(crate) fn unlink(&mut self, a: &PlayerId, b: &PlayerId) {
        if let Some(player) = self.0.get_mut(a) {
            player.opponents.remove(b);
        }
        if let Some(player) = self.0.get_mut(b) {
            player.opponents.remove(a);
        }
    }

    fn drop_self_references(&mut self) {
        for (id, player) in &mut self.0 {
            if player.opponents.remove(id) {
                log::warn!("player {id} was listed as their own opponent, dropping the entry");
            }
        }
    }
}

/// The league roster, persisted to a JSON file after every mutation.
pub(crate) struct StandingsStore {
    path: PathBuf,
    standings: Standings,
}

impl StandingsStore {
    pub(crate) fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut standings = store::load_or_default::<Standings>(&path);
        standings.drop_self_references();
        log::debug!("loaded {} players from {}", standings.len(), path.display());
        Self { path, standings }
    }

    pub(crate) fn save(&self) -> Result<(), store::Error> {
        store::save(&self.path, &self.standings)
    }

    pub(crate) fn snapshot(&self) -> &Standings {
        &self.standings
    }

    /// Mutable access for the pairing engine. Callers are responsible for calling [`Self::save`].
    pub(crate) fn standings_mut(&mut self) -> &mut Standings {
        &mut self.standings
    }

    pub(crate) fn add_player(&mut self, id: PlayerId) -> Result<bool, store::Error> {
        if !self.standings.insert(id) {
            return Ok(false)
        }
        self.save()?;
        Ok(true)
    }

    pub(crate) fn remove_player(&mut self, id: &PlayerId) -> Result<bool, store::Error> {
        if !self.standings.remove(id) {
            return Ok(false)
        }
        self.save()?;
        Ok(true)
    }

    /// Adds `amount` to the player's total, creating them first if needed. Returns the new total.
    pub(crate) fn add_points(&mut self, id: &PlayerId, amount: i64) -> Result<i64, store::Error> {
        let total = self.standings.add_points(id, amount);
        self.save()?;
        Ok(total)
    }

    pub(crate) fn standings(&self) -> Vec<(&PlayerId, &Player)> {
        self.standings.ranked()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn standings(players: &[(&str, i64)]) -> Standings {
        let mut standings = Standings::default();
        for &(id, points) in players {
            standings.add_points(&PlayerId::from(id), points);
        }
        standings
    }

    #[test]
    fn ranked_by_points_then_id() {
        let standings = standings(&[("carol", 5), ("alice", 10), ("bob", 5), ("dave", 0)]);
        let order = standings.ranked().into_iter().map(|(id, _)| id.to_string()).collect_vec();
        assert_eq!(order, ["alice", "bob", "carol", "dave"]);
    }

    #[test]
    fn ranked_is_stable_across_calls() {
        let standings = standings(&[("x", 3), ("y", 3), ("z", 6)]);
        assert_eq!(standings.ranked(), standings.ranked());
    }

    #[test]
    fn add_player_twice() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = StandingsStore::load(dir.path().join("league.json"));
        assert!(store.add_player(PlayerId::from("1")).unwrap());
        store.add_points(&PlayerId::from("1"), 3).unwrap();
        assert!(!store.add_player(PlayerId::from("1")).unwrap());
        assert_eq!(store.snapshot().get(&PlayerId::from("1")).unwrap().points, 3);
    }

    #[test]
    fn add_points_creates_player() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = StandingsStore::load(dir.path().join("league.json"));
        assert_eq!(store.add_points(&PlayerId::from("new"), WIN_POINTS).unwrap(), 3);
        assert_eq!(store.add_points(&PlayerId::from("new"), WIN_POINTS).unwrap(), 6);
        let player = store.snapshot().get(&PlayerId::from("new")).unwrap();
        assert!(player.opponents.is_empty());
        assert!(!player.received_bye);
    }

    #[test]
    fn save_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = StandingsStore::load(dir.path().join("missing").join("league.json"));
        assert!(matches!(store.add_player(PlayerId::from("1")), Err(store::Error::Io(_))));
        assert!(matches!(store.add_points(&PlayerId::from("1"), WIN_POINTS), Err(store::Error::Io(_))));
    }

    #[test]
    fn remove_keeps_history_of_others() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = StandingsStore::load(dir.path().join("league.json"));
        store.add_player(PlayerId::from("a")).unwrap();
        store.add_player(PlayerId::from("b")).unwrap();
        store.standings_mut().link(&PlayerId::from("a"), &PlayerId::from("b"));
        assert!(store.remove_player(&PlayerId::from("b")).unwrap());
        assert!(!store.remove_player(&PlayerId::from("b")).unwrap());
        assert!(store.snapshot().get(&PlayerId::from("a")).unwrap().has_faced(&PlayerId::from("b")));
    }

    #[test]
    fn persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("league.json");
        let mut store = StandingsStore::load(&path);
        store.add_points(&PlayerId::from("a"), 9).unwrap();
        store.add_player(PlayerId::from("b")).unwrap();
        store.standings_mut().link(&PlayerId::from("a"), &PlayerId::from("b"));
        store.standings_mut().get_mut(&PlayerId::from("b")).unwrap().received_bye = true;
        store.save().unwrap();
        let reloaded = StandingsStore::load(&path);
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[test]
    fn reads_existing_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("league.json");
        std::fs::write(&path, r#"{
            "111": {"points": 6, "opponents": ["222", "111"], "received_bye": false},
            "222": {"points": 3, "opponents": ["111"], "received_bye": true}
        }"#).unwrap();
        let store = StandingsStore::load(&path);
        let first = store.snapshot().get(&PlayerId::from("111")).unwrap();
        assert_eq!(first.points, 6);
        assert_eq!(first.opponents, BTreeSet::from([PlayerId::from("222")]));
        assert!(store.snapshot().get(&PlayerId::from("222")).unwrap().received_bye);
    }

    #[test]
    fn positive_awards_never_go_negative() {
        let mut standings = Standings::default();
        for amount in [3, 3, 1, 0, 3] {
            assert!(standings.add_points(&PlayerId::from("p"), amount) >= 0);
        }
    }
}
