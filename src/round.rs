use crate::{
    league::StandingsStore,
    pairing::{
        self,
        ByeAward,
        Match,
        RoundPlan,
        Strategy,
    },
    prelude::*,
    store,
};

const LEAGUE_FILE: &str = "league.json";
const ROUND_FILE: &str = "round.json";

/// The most recently generated round, as persisted to `round.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoundRecord {
    pub(crate) round: u32,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) matches: Vec<Match>,
    #[serde(default)]
    pub(crate) unpaired: Vec<PlayerId>,
    pub(crate) bye: Option<ByeAward>,
}

impl RoundRecord {
    pub(crate) fn plan(&self) -> RoundPlan {
        RoundPlan {
            matches: self.matches.clone(),
            unpaired: self.unpaired.clone(),
        }
    }
}

/// The standings together with the current round, owned by whoever handles commands.
pub(crate) struct League {
    store: StandingsStore,
    round_path: PathBuf,
    round: Option<RoundRecord>,
    strategy: Strategy,
}

impl League {
    pub(crate) fn load(data_dir: &Path, strategy: Strategy) -> Self {
        let round_path = data_dir.join(ROUND_FILE);
        Self {
            store: StandingsStore::load(data_dir.join(LEAGUE_FILE)),
            round: store::load_or_default(&round_path),
            round_path,
            strategy,
        }
    }

    pub(crate) fn store(&self) -> &StandingsStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut StandingsStore {
        &mut self.store
    }

    pub(crate) fn current_round(&self) -> Option<&RoundRecord> {
        self.round.as_ref()
    }

    /// Pairs the next round and applies it to the standings.
    ///
    /// This does not check whether the previous round has been played; calling it twice in a row
    /// pairs two rounds. Use [`Self::repair`] to redo the current round instead.
    pub(crate) fn generate(&mut self) -> Result<RoundPlan, store::Error> {
        let round = self.round.as_ref().map_or(1, |record| record.round + 1);
        self.pair(round)
    }

    /// Reverts the current round's effects on the standings, then pairs it again.
    ///
    /// Points awarded for declared wins are left alone; only the opponent links and the bye
    /// recorded for the round are undone.
    pub(crate) fn repair(&mut self) -> Result<RoundPlan, store::Error> {
        let Some(record) = self.round.take() else {
            log::info!("no round to repair, pairing a new one");
            return self.pair(1)
        };
        pairing::revert(self.store.standings_mut(), &record.matches, record.bye.as_ref());
        store::remove(&self.round_path)?;
        log::info!("reverted round {}", record.round);
        self.pair(record.round)
    }

    fn pair(&mut self, round: u32) -> Result<RoundPlan, store::Error> {
        let plan = pairing::plan(self.store.snapshot(), self.strategy);
        if plan.is_empty() {
            log::info!("not enough players to pair round {round}");
            return Ok(plan)
        }
        let bye = pairing::apply(self.store.standings_mut(), &plan);
        self.store.save()?;
        let record = RoundRecord {
            round,
            generated_at: Utc::now(),
            matches: plan.matches.clone(),
            unpaired: plan.unpaired.clone(),
            bye,
        };
        store::save(&self.round_path, &record)?;
        self.round = Some(record);
        log::info!("paired round {round}: {} matches, {} unpaired", plan.matches.len(), plan.unpaired.len());
        Ok(plan)
    }
}
