//! Swiss-style round pairing.
//!
//! Pairing happens in two steps: [`plan`] is a pure function of a standings snapshot, and
//! [`apply`] writes the resulting opponent history and bye award back into the standings.

use {
    std::collections::HashSet,
    crate::{
        league::WIN_POINTS,
        prelude::*,
    },
};

/// Upper bound on search steps for [`Strategy::Backtracking`] before giving up on a full pairing.
const BACKTRACKING_BUDGET: usize = 100_000;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Strategy {
    /// Single left-to-right pass. Each player takes the first eligible opponent below them.
    #[default]
    Greedy,
    /// Same preference order, but backtracks so that at most one player is left over.
    Backtracking,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub(crate) enum Match {
    Pair {
        home: PlayerId,
        away: PlayerId,
    },
    Bye {
        player: PlayerId,
    },
}

/// The pairings for one round, before they're applied to the standings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct RoundPlan {
    /// Pairs in scan order, followed by the bye if there is one.
    pub(crate) matches: Vec<Match>,
    /// Players who got neither an opponent nor the bye.
    pub(crate) unpaired: Vec<PlayerId>,
}

impl RoundPlan {
    pub(crate) fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub(crate) fn pairs(&self) -> impl Iterator<Item = (&PlayerId, &PlayerId)> {
        self.matches.iter().filter_map(|m| match m {
            Match::Pair { home, away } => Some((home, away)),
            Match::Bye { .. } => None,
        })
    }

    pub(crate) fn bye(&self) -> Option<&PlayerId> {
        self.matches.iter().find_map(|m| match m {
            Match::Pair { .. } => None,
            Match::Bye { player } => Some(player),
        })
    }
}

/// What [`apply`] did for the bye, kept so the round can be reverted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ByeAward {
    pub(crate) player: PlayerId,
    pub(crate) points: i64,
    pub(crate) had_bye: bool,
}

fn eligible(standings: &Standings, a: &PlayerId, b: &PlayerId) -> bool {
    !standings.get(a).is_some_and(|player| player.has_faced(b))
        && !standings.get(b).is_some_and(|player| player.has_faced(a))
}

pub(crate) fn plan(standings: &Standings, strategy: Strategy) -> RoundPlan {
    let order = standings.ranked().into_iter().map(|(id, _)| id.clone()).collect_vec();
    match strategy {
        Strategy::Greedy => greedy(standings, &order),
        Strategy::Backtracking => backtracking(standings, &order).unwrap_or_else(|| {
            log::info!("no complete pairing found for {} players, falling back to greedy pairing", order.len());
            greedy(standings, &order)
        }),
    }
}

fn greedy(standings: &Standings, order: &[PlayerId]) -> RoundPlan {
    let mut used = HashSet::<&PlayerId>::default();
    let mut matches = Vec::default();
    for (i, p1) in order.iter().enumerate() {
        if used.contains(p1) {
            continue
        }
        if let Some(p2) = order[i + 1..].iter().find(|p2| !used.contains(p2) && eligible(standings, p1, p2)) {
            used.insert(p1);
            used.insert(p2);
            matches.push(Match::Pair { home: p1.clone(), away: p2.clone() });
        }
    }
    let mut leftovers = order.iter().filter(|id| !used.contains(id)).cloned();
    if let Some(player) = leftovers.next() {
        matches.push(Match::Bye { player });
    }
    RoundPlan { matches, unpaired: leftovers.collect() }
}

fn backtracking(standings: &Standings, order: &[PlayerId]) -> Option<RoundPlan> {
    fn search<'a>(standings: &Standings, remaining: &[&'a PlayerId], bye: &mut Option<&'a PlayerId>, pairs: &mut Vec<(&'a PlayerId, &'a PlayerId)>, budget: &mut usize) -> bool {
        let Some((&first, rest)) = remaining.split_first() else { return true };
        if *budget == 0 {
            return false
        }
        *budget -= 1;
        for (j, &candidate) in rest.iter().enumerate() {
            if !eligible(standings, first, candidate) {
                continue
            }
            let next = rest[..j].iter().chain(&rest[j + 1..]).copied().collect_vec();
            pairs.push((first, candidate));
            if search(standings, &next, bye, pairs, budget) {
                return true
            }
            pairs.pop();
        }
        if bye.is_none() && remaining.len() % 2 == 1 {
            *bye = Some(first);
            if search(standings, rest, bye, pairs, budget) {
                return true
            }
            *bye = None;
        }
        false
    }

    let remaining = order.iter().collect_vec();
    let mut bye = None;
    let mut pairs = Vec::default();
    let mut budget = BACKTRACKING_BUDGET;
    if !search(standings, &remaining, &mut bye, &mut pairs, &mut budget) {
        return None
    }
    let mut matches = pairs.into_iter().map(|(home, away)| Match::Pair { home: home.clone(), away: away.clone() }).collect_vec();
    if let Some(player) = bye {
        matches.push(Match::Bye { player: player.clone() });
    }
    Some(RoundPlan { matches, unpaired: Vec::default() })
}

/// Records the planned pairs as played and awards the bye.
pub(crate) fn apply(standings: &mut Standings, plan: &RoundPlan) -> Option<ByeAward> {
    for (home, away) in plan.pairs() {
        standings.link(home, away);
    }
    let player = plan.bye()?;
    let had_bye = standings.get(player).is_some_and(|record| record.received_bye);
    standings.add_points(player, WIN_POINTS);
    if let Some(record) = standings.get_mut(player) {
        record.received_bye = true;
    }
    Some(ByeAward { player: player.clone(), points: WIN_POINTS, had_bye })
}

/// Undoes [`apply`]. Players who have since left the league are skipped.
pub(crate) fn revert(standings: &mut Standings, matches: &[Match], bye: Option<&ByeAward>) {
    for m in matches {
        if let Match::Pair { home, away } = m {
            standings.unlink(home, away);
        }
    }
    if let Some(ByeAward { player, points, had_bye }) = bye {
        // a player who left and rejoined has a fresh record that never got this bye
        if let Some(record) = standings.get_mut(player).filter(|record| record.received_bye) {
            record.points = record.points.saturating_sub(*points).max(0);
            record.received_bye = *had_bye;
        }
    }
}
