//! Prefix commands, independent of the chat gateway that delivers them.

use {
    serenity::utils::MessageBuilder,
    crate::{
        decklist::{
            Decklist,
            DecklistStore,
        },
        league::WIN_POINTS,
        pairing::{
            Match,
            RoundPlan,
        },
        prelude::*,
        quotes::QuotePool,
        round::League,
        store,
        tally::{
            self,
            Tally,
        },
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Hello,
    JoinLeague,
    RemoveLeague,
    Win,
    Pairings,
    RepairPairings,
    Round,
    Table,
    Decklist,
    Quote,
    Tally,
    ResetTally,
}

impl Command {
    /// Splits `content` into a command and its argument text, if it starts with `prefix` followed by a known command name.
    pub(crate) fn parse<'a>(prefix: &str, content: &'a str) -> Option<(Self, &'a str)> {
        let rest = content.strip_prefix(prefix)?;
        let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let command = match name {
            "hello" => Self::Hello,
            "joinleague" => Self::JoinLeague,
            "removeleague" => Self::RemoveLeague,
            "win" => Self::Win,
            "pairings" => Self::Pairings,
            "repairpairings" => Self::RepairPairings,
            "round" => Self::Round,
            "table" => Self::Table,
            "decklist" => Self::Decklist,
            "quote" => Self::Quote,
            "tally" => Self::Tally,
            "resettally" => Self::ResetTally,
            _ => return None,
        };
        Some((command, args.trim()))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Author {
    pub(crate) id: PlayerId,
    pub(crate) name: String,
}

/// Everything a command needs to know about the message that triggered it.
pub(crate) struct Invocation<'a> {
    pub(crate) author: Author,
    pub(crate) mentions: Vec<Author>,
    pub(crate) attachments: Vec<String>,
    pub(crate) args: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Reply {
    /// Sent in order, one chat message each.
    pub(crate) messages: Vec<String>,
    /// Whether user mentions in the reply should notify the users.
    pub(crate) ping: bool,
}

impl Reply {
    fn ping(message: String) -> Self {
        Self { messages: vec![message], ping: true }
    }

    fn quiet(message: String) -> Self {
        Self { messages: vec![message], ping: false }
    }
}

fn mention(id: &PlayerId) -> String {
    format!("<@{id}>")
}

/// League state shared by all commands. Held behind a single lock by the gateway handler.
pub(crate) struct State {
    pub(crate) league: League,
    pub(crate) decklists: DecklistStore,
    pub(crate) quotes: QuotePool,
    pub(crate) tally: Tally,
}

impl State {
    pub(crate) fn handle(&mut self, command: Command, invocation: Invocation<'_>) -> Result<Reply, store::Error> {
        let Invocation { author, mentions, attachments, args } = invocation;
        Ok(match command {
            Command::Hello => Reply::ping(MessageBuilder::new()
                .push("Hello ")
                .push(mention(&author.id))
                .push("! I am Clive, and I am a big dumb idiot.")
                .build()
            ),
            Command::JoinLeague => if self.league.store_mut().add_player(author.id.clone())? {
                Reply::ping(format!("✅ {} has joined the league!", mention(&author.id)))
            } else {
                Reply::ping(format!("{}, you're already in the league!", mention(&author.id)))
            },
            Command::RemoveLeague => {
                if mentions.is_empty() {
                    return Ok(Reply::quiet(format!("⚠️ Please tag at least one user to remove them from the league.")))
                }
                let mut removed = Vec::default();
                let mut not_found = Vec::default();
                for user in mentions {
                    if self.league.store_mut().remove_player(&user.id)? {
                        removed.push(user.name);
                    } else {
                        not_found.push(user.name);
                    }
                }
                let mut builder = MessageBuilder::new();
                if !removed.is_empty() {
                    builder.push("❌ Removed: ").push_safe(removed.join(", "));
                }
                if !not_found.is_empty() {
                    if !removed.is_empty() {
                        builder.push("\n");
                    }
                    builder.push("ℹ️ Not in league: ").push_safe(not_found.join(", "));
                }
                Reply::quiet(builder.build())
            }
            Command::Win => {
                let total = self.league.store_mut().add_points(&author.id, WIN_POINTS)?;
                Reply::ping(format!("🏆 {} declared a win (+{WIN_POINTS} points) and now has {total} pts.", mention(&author.id)))
            }
            Command::Pairings => {
                let plan = self.league.generate()?;
                self.format_round("Round Pairings", &plan, true)
            }
            Command::RepairPairings => {
                let plan = self.league.repair()?;
                self.format_round("Repaired Round Pairings", &plan, true)
            }
            Command::Round => if let Some(record) = self.league.current_round() {
                self.format_round("Current Round Pairings", &record.plan(), false)
            } else {
                Reply::quiet(format!("No round has been paired yet."))
            },
            Command::Table => {
                let standings = self.league.store().standings();
                if standings.is_empty() {
                    Reply::quiet(format!("📊 The league table is empty!"))
                } else {
                    let mut builder = MessageBuilder::new();
                    builder.push("📊 **League Table** 📊");
                    for (rank, (id, player)) in standings.into_iter().enumerate() {
                        builder.push(format!("\n{}. {} — {} pts", rank + 1, mention(id), player.points));
                    }
                    Reply::quiet(builder.build())
                }
            }
            Command::Decklist => if let Some(target) = mentions.into_iter().next() {
                if let Some(Decklist { text, images }) = self.decklists.decklist(&target.id) {
                    let mut builder = MessageBuilder::new();
                    builder.push("📜 ").push_safe(&target.name).push_line("'s decklist:");
                    if !text.is_empty() {
                        builder.push_codeblock_safe(text, None);
                    }
                    let mut messages = vec![builder.build()];
                    messages.extend(images.iter().cloned());
                    Reply { messages, ping: false }
                } else {
                    Reply::quiet(format!("❌ {} has not saved a decklist yet.", mention(&target.id)))
                }
            } else if args.is_empty() && attachments.is_empty() {
                Reply::quiet(format!("⚠️ Please include text or attach an image of your decklist."))
            } else {
                self.decklists.save_decklist(author.id.clone(), Decklist { text: args.to_owned(), images: attachments })?;
                Reply::ping(format!("🗡️ Clive remembers your decklist, {}.", mention(&author.id)))
            },
            Command::Quote => if let Some(quote) = self.quotes.next() {
                Reply::quiet(MessageBuilder::new().push("🗡️ Clive says: *\"").push_safe(quote).push("\"*").build())
            } else {
                Reply::quiet(format!("🗡️ Clive has nothing to say."))
            },
            Command::Tally => {
                let count = self.tally.increment()?;
                Reply::quiet(format!("🔔 The tally has been rung for the {} time.", tally::ordinal(count)))
            }
            Command::ResetTally => {
                self.tally.reset()?;
                Reply::quiet(format!("🔄 The tally has been reset to 0."))
            }
        })
    }

    fn format_round(&self, title: &str, plan: &RoundPlan, ping: bool) -> Reply {
        if plan.is_empty() {
            return Reply::quiet(format!("⚠️ Not enough players to generate pairings."))
        }
        let mut builder = MessageBuilder::new();
        builder.push("📜 ").push_bold(title);
        if let Some(record) = self.league.current_round() {
            builder.push(format!(" (round {})", record.round));
        }
        builder.push(":");
        for m in &plan.matches {
            match m {
                Match::Pair { home, away } => builder.push(format!("\n- {} vs {}", mention(home), mention(away))),
                Match::Bye { player } => builder.push(format!("\n- {} has a **bye** (awarded {WIN_POINTS} points).", mention(player))),
            };
        }
        for player in &plan.unpaired {
            builder.push(format!("\n- {} could not be paired this round.", mention(player)));
        }
        Reply { messages: vec![builder.build()], ping }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Harness {
        _dir: tempfile::TempDir,
        state: State,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let state = State {
                league: League::load(dir.path(), Default::default()),
                decklists: DecklistStore::load(dir.path()),
                quotes: QuotePool::new(vec![format!("only quote")]),
                tally: Tally::load(dir.path()),
            };
            Self { _dir: dir, state }
        }

        fn run(&mut self, author: &str, content: &str, mentions: &[&str], attachments: &[&str]) -> Reply {
            let (command, args) = Command::parse("!", content).unwrap();
            self.state.handle(command, Invocation {
                author: user(author),
                mentions: mentions.iter().map(|id| user(id)).collect(),
                attachments: attachments.iter().map(|url| url.to_string()).collect(),
                args,
            }).unwrap()
        }
    }

    fn user(id: &str) -> Author {
        Author { id: PlayerId::from(id), name: format!("user{id}") }
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("!", "!pairings"), Some((Command::Pairings, "")));
        assert_eq!(Command::parse("!", "!decklist  4 Bolt\n2 Path "), Some((Command::Decklist, "4 Bolt\n2 Path")));
        assert_eq!(Command::parse("?", "?table"), Some((Command::Table, "")));
        assert_eq!(Command::parse("!", "pairings"), None);
        assert_eq!(Command::parse("!", "!unknown"), None);
        assert_eq!(Command::parse("!", "!Table"), None);
    }

    #[test]
    fn join_twice() {
        let mut harness = Harness::new();
        assert_eq!(harness.run("1", "!joinleague", &[], &[]).messages, ["✅ <@1> has joined the league!"]);
        assert_eq!(harness.run("1", "!joinleague", &[], &[]).messages, ["<@1>, you're already in the league!"]);
    }

    #[test]
    fn remove_reports_both_lists() {
        let mut harness = Harness::new();
        harness.run("1", "!joinleague", &[], &[]);
        let reply = harness.run("9", "!removeleague <@1> <@2>", &["1", "2"], &[]);
        assert_eq!(reply.messages, ["❌ Removed: user1\nℹ️ Not in league: user2"]);
        let reply = harness.run("9", "!removeleague", &[], &[]);
        assert_eq!(reply.messages, ["⚠️ Please tag at least one user to remove them from the league."]);
    }

    #[test]
    fn pairings_with_bye() {
        let mut harness = Harness::new();
        for id in ["1", "2", "3"] {
            harness.run(id, "!joinleague", &[], &[]);
        }
        harness.run("1", "!win", &[], &[]);
        let reply = harness.run("1", "!pairings", &[], &[]);
        assert!(reply.ping);
        assert_eq!(reply.messages, ["📜 **Round Pairings** (round 1):\n- <@1> vs <@2>\n- <@3> has a **bye** (awarded 3 points)."]);
        let redisplay = harness.run("2", "!round", &[], &[]);
        assert!(!redisplay.ping);
        assert!(redisplay.messages[0].ends_with("- <@1> vs <@2>\n- <@3> has a **bye** (awarded 3 points)."));
    }

    #[test]
    fn pairings_without_players() {
        let mut harness = Harness::new();
        assert_eq!(harness.run("1", "!pairings", &[], &[]).messages, ["⚠️ Not enough players to generate pairings."]);
        assert_eq!(harness.run("1", "!round", &[], &[]).messages, ["No round has been paired yet."]);
    }

    #[test]
    fn table_is_ranked_and_quiet() {
        let mut harness = Harness::new();
        assert_eq!(harness.run("1", "!table", &[], &[]).messages, ["📊 The league table is empty!"]);
        harness.run("2", "!joinleague", &[], &[]);
        harness.run("1", "!win", &[], &[]);
        let reply = harness.run("1", "!table", &[], &[]);
        assert!(!reply.ping);
        assert_eq!(reply.messages, ["📊 **League Table** 📊\n1. <@1> — 3 pts\n2. <@2> — 0 pts"]);
    }

    #[test]
    fn decklist_save_and_show() {
        let mut harness = Harness::new();
        assert_eq!(harness.run("1", "!decklist", &[], &[]).messages, ["⚠️ Please include text or attach an image of your decklist."]);
        assert_eq!(harness.run("2", "!decklist <@1>", &["1"], &[]).messages, ["❌ <@1> has not saved a decklist yet."]);
        harness.run("1", "!decklist 4 Lightning Bolt", &[], &["https://cdn.example/deck.png"]);
        let reply = harness.run("2", "!decklist <@1>", &["1"], &[]);
        assert_eq!(reply.messages.len(), 2);
        assert!(reply.messages[0].contains("4 Lightning Bolt"));
        assert_eq!(reply.messages[1], "https://cdn.example/deck.png");
    }

    #[test]
    fn quote() {
        let mut harness = Harness::new();
        assert_eq!(harness.run("1", "!quote", &[], &[]).messages, ["🗡️ Clive says: *\"only quote\"*"]);
    }

    #[test]
    fn tally_counts_and_resets() {
        let mut harness = Harness::new();
        assert_eq!(harness.run("1", "!tally", &[], &[]).messages, ["🔔 The tally has been rung for the 1st time."]);
        assert_eq!(harness.run("2", "!tally", &[], &[]).messages, ["🔔 The tally has been rung for the 2nd time."]);
        assert_eq!(harness.run("1", "!resettally", &[], &[]).messages, ["🔄 The tally has been reset to 0."]);
        assert_eq!(harness.run("1", "!tally", &[], &[]).messages, ["🔔 The tally has been rung for the 1st time."]);
    }
}
