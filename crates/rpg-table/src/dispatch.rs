//! Turning chat messages into table operations and chat replies.
//!
//! The dispatcher is the only place that sees raw text or speaks to
//! players. It parses, checks the caller is allowed to run the command,
//! runs it against the [`Table`], and phrases the result. Errors never
//! escape: each one becomes a reply.

use rpg_mechanics::{AttackOutcome, Character, MechError, Roller};

use crate::command::{Actor, Command, Invocation, XpTarget, title_case};
use crate::error::{TableError, TableResult};
use crate::store::RoomStore;
use crate::table::{AttackReport, Table};
use crate::templates::TemplateSource;

const NO_ORDER: &str = "Looks like there isn't an initiative order yet!";
const GM_ONLY: &str = "That functionality is reserved for the Game Master";

/// An incoming chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Who sent it.
    pub user: String,
    /// Where it was sent.
    pub room: String,
    /// What it says.
    pub text: String,
}

impl ChatMessage {
    /// Create a message.
    pub fn new(user: impl Into<String>, room: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            room: room.into(),
            text: text.into(),
        }
    }
}

/// A reply to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The text to post.
    pub text: String,
    /// The room to post it in.
    pub room: String,
}

impl Response {
    fn new(room: &str, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            room: room.to_string(),
        }
    }
}

/// Who may run a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any player.
    Anyone,
    /// Only the game master.
    GameMaster,
    /// The player whose turn it is, or the game master.
    ActivePlayer,
}

impl Access {
    /// The access a command needs.
    pub fn required_for(command: &Command) -> Self {
        match command {
            Command::Load { .. }
            | Command::Remove { .. }
            | Command::GrantXp { .. }
            | Command::SetField { .. }
            | Command::ChangeField { .. }
            | Command::Heal { .. }
            | Command::AddToInitiative { .. }
            | Command::AddEvent { .. }
            | Command::RemoveFromInitiative { .. }
            | Command::EndCombat => Self::GameMaster,
            Command::NextTurn => Self::ActivePlayer,
            Command::RollInitiative
            | Command::ReportOrder
            | Command::WhoseTurn
            | Command::ListCharacters
            | Command::WhoAmI
            | Command::HowIs { .. }
            | Command::Check { .. }
            | Command::Attack { .. }
            | Command::LongRest
            | Command::TellDm { .. } => Self::Anyone,
        }
    }
}

/// Routes chat messages to a [`Table`].
pub struct Dispatcher<S, T, R> {
    table: Table<S, T, R>,
}

impl<S: RoomStore, T: TemplateSource, R: Roller> Dispatcher<S, T, R> {
    /// Serve a table.
    pub fn new(table: Table<S, T, R>) -> Self {
        Self { table }
    }

    /// The table being served.
    pub fn table(&self) -> &Table<S, T, R> {
        &self.table
    }

    /// Handle one message. Ordinary conversation gets no reply.
    pub fn handle(&mut self, message: &ChatMessage) -> Vec<Response> {
        let invocation = match Invocation::parse(&message.text) {
            Ok(Some(invocation)) => invocation,
            Ok(None) => return Vec::new(),
            Err(e) => {
                // Only the field edits fail to parse, and those are GM-only.
                let error = self
                    .authorize(&message.user, &message.room, Access::GameMaster)
                    .err()
                    .unwrap_or_else(|| e.into());
                return vec![Response::new(&message.room, describe(&error))];
            }
        };
        tracing::debug!(user = %message.user, room = %message.room, command = ?invocation.command, "dispatching");

        let result = self.run(message, invocation);
        let mut responses: Vec<Response> = self
            .table
            .take_notices()
            .into_iter()
            .map(|notice| Response::new(&message.room, notice))
            .collect();
        match result {
            Ok(replies) => responses.extend(replies),
            Err(e) => {
                match &e {
                    TableError::Mech(_) | TableError::Unauthorized { .. } => {
                        tracing::debug!(error = %e, "command refused");
                    }
                    _ => tracing::warn!(error = %e, "command failed"),
                }
                responses.push(Response::new(&message.room, describe(&e)));
            }
        }
        responses
    }

    fn authorize(&self, caller: &str, room: &str, access: Access) -> TableResult<()> {
        let config = self.table.config();
        if config.is_game_master(caller) {
            return Ok(());
        }
        let refuse = |reason: String| TableError::Unauthorized {
            caller: caller.to_string(),
            reason,
        };
        match access {
            Access::Anyone => Ok(()),
            Access::GameMaster => Err(refuse(GM_ONLY.to_string())),
            Access::ActivePlayer => {
                let tracker = self.table.tracker(room)?;
                match tracker.whose_turn() {
                    Some(active)
                        if tracker.event_text(&active.name).is_none()
                            && active.name.to_lowercase() != caller.to_lowercase() =>
                    {
                        Err(refuse(format!("It's {}'s turn", active.name)))
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    fn run(&mut self, message: &ChatMessage, invocation: Invocation) -> TableResult<Vec<Response>> {
        let caller = message.user.as_str();
        if invocation.room.is_some() && !self.table.config().is_game_master(caller) {
            return Err(TableError::Unauthorized {
                caller: caller.to_string(),
                reason: "Only the Game Master can use another room's memory".to_string(),
            });
        }
        let room = invocation.room.as_deref().unwrap_or(&message.room);
        self.authorize(caller, room, Access::required_for(&invocation.command))?;

        let here = message.room.as_str();
        let say = |text: String| Ok(vec![Response::new(here, text)]);
        let name_of = |actor: &Actor| match actor {
            Actor::Caller => title_case(caller),
            Actor::Named(name) => name.clone(),
        };

        match invocation.command {
            Command::RollInitiative => {
                let tracker = self.table.roll_initiative(room)?;
                if !tracker.is_active() {
                    return say("There's nobody here to roll initiative for!".to_string());
                }
                let lines: Vec<String> = tracker
                    .entries()
                    .iter()
                    .map(|e| format!("{} rolled {}", e.name, e.value))
                    .collect();
                say(lines.join("\n"))
            }
            Command::ReportOrder => {
                let tracker = self.table.tracker(room)?;
                match tracker.report_order() {
                    Some(order) => say(
                        order
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join("\n"),
                    ),
                    None => say(NO_ORDER.to_string()),
                }
            }
            Command::WhoseTurn => match self.table.tracker(room)?.whose_turn() {
                Some(active) => say(format!("It's {}'s turn", active.name)),
                None => say(NO_ORDER.to_string()),
            },
            Command::NextTurn => {
                let turn = self.table.advance_turn(room)?;
                say(turn
                    .event_text
                    .unwrap_or_else(|| format!("Next up: {}", turn.entry.name)))
            }
            Command::AddToInitiative { name, value } => {
                let entry = self.table.add_to_initiative(room, &name, value)?;
                say(format!("{} joins the fight at initiative {}", entry.name, entry.value))
            }
            Command::AddEvent { name, value, text } => {
                self.table.add_event(room, &name, value, &text)?;
                say(format!("Event {name} added at initiative {value}"))
            }
            Command::RemoveFromInitiative { name } => {
                let removal = self.table.remove_from_initiative(room, &name)?;
                let mut text = format!("{} is out of the initiative order", removal.removed.name);
                match &removal.now_active {
                    None => text.push_str("\nCombat is over!"),
                    Some(next) if removal.was_active => {
                        text.push_str(&format!("\nNext up: {}", next.name));
                    }
                    Some(_) => {}
                }
                say(text)
            }
            Command::EndCombat => {
                self.table.end_combat(room)?;
                say("Combat is over!".to_string())
            }
            Command::Load {
                name,
                copies,
                template,
            } => {
                let names = self
                    .table
                    .load_template(room, name.as_deref(), copies, &template)?;
                match names.as_slice() {
                    [_] => say("Character loaded from config.".to_string()),
                    _ => say(format!("Loaded {} from config.", names.join(", "))),
                }
            }
            Command::Remove { name } => {
                let removed = self.table.remove_character(room, &name)?;
                say(format!("{} has left the game.", removed.name))
            }
            Command::ListCharacters => {
                let roster = self.table.roster(room)?;
                if roster.is_empty() {
                    return say("There are no characters here yet.".to_string());
                }
                say(roster
                    .values()
                    .map(Character::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Command::WhoAmI => {
                if self.table.config().is_game_master(caller) {
                    return say(
                        "You're the Game Master! You don't have a character, silly!".to_string(),
                    );
                }
                let character = self.table.character(room, &title_case(caller))?;
                say(format!("You are {character}, a fearless adventurer!"))
            }
            Command::HowIs { subject } => {
                let character = self.table.character(room, &name_of(&subject))?;
                let config = self.table.config();
                let yours = subject == Actor::Caller;
                let prefix = if yours { "You're" } else { "They're" };
                let mut text = format!("{prefix} {}", character.health());
                if yours || here == config.gm_room || config.is_player(room, &character.name) {
                    text.push_str(&format!(
                        " ({}/{})",
                        character.current_hp, character.max_hp
                    ));
                }
                say(text)
            }
            Command::GrantXp { target, amount } => {
                let (mut lines, results) = match target {
                    XpTarget::Everyone => (
                        vec![format!("Everyone gains {amount} XP!")],
                        self.table.grant_xp_all(room, amount)?,
                    ),
                    XpTarget::Named(name) => {
                        let (character, gained) = self.table.grant_xp(room, &name, amount)?;
                        let line = format!("{} now has {} XP", character.name, character.xp);
                        (vec![line], vec![(character, gained)])
                    }
                };
                lines.extend(results.iter().filter(|(_, gained)| *gained > 0).map(
                    |(character, _)| {
                        format!(
                            "{}, you have reached level {}! Hooray!",
                            character.name, character.level
                        )
                    },
                ));
                Ok(lines.into_iter().map(|l| Response::new(here, l)).collect())
            }
            Command::Check {
                actor,
                check,
                passive,
            } => {
                let name = name_of(&actor);
                let roll = self.table.check(room, &name, &check, passive)?;
                say(format!("{name} gets {roll}!"))
            }
            Command::SetField { name, field, value } => {
                let character = self.table.set_field(room, &name, field, value)?;
                say(format!(
                    "{}'s {field} is now {}",
                    character.name,
                    character.field(field)
                ))
            }
            Command::ChangeField { name, field, delta } => {
                let character = self.table.change_field(room, &name, field, delta)?;
                say(format!(
                    "{}'s {field} is now {}",
                    character.name,
                    character.field(field)
                ))
            }
            Command::Attack {
                attacker,
                target,
                weapon,
                advantage,
            } => {
                let report =
                    self.table
                        .attack(room, &name_of(&attacker), &target, &weapon, advantage)?;
                Ok(attack_lines(&report)
                    .into_iter()
                    .map(|l| Response::new(here, l))
                    .collect())
            }
            Command::Heal { name, amount } => {
                let character = self.table.heal(room, &name, amount)?;
                say(format!(
                    "{} now has {}/{} hit points",
                    character.name, character.current_hp, character.max_hp
                ))
            }
            Command::LongRest => {
                self.table.long_rest(room)?;
                say("Everyone takes a long rest and wakes fully healed.".to_string())
            }
            Command::TellDm { text } => {
                let gm_room = self.table.config().gm_room.clone();
                Ok(vec![Response::new(
                    &gm_room,
                    format!("{caller} says: {text}"),
                )])
            }
        }
    }
}

fn shortname(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}

fn attack_lines(report: &AttackReport) -> Vec<String> {
    let verb = match report.attack.outcome {
        AttackOutcome::CriticalHit => "critically hits",
        AttackOutcome::Hit => "hits",
        AttackOutcome::Miss => "misses",
        AttackOutcome::CriticalMiss => "critically misses",
    };
    let mut lines = vec![
        format!(
            "{} {verb} {} with a roll of {}!",
            report.attacker,
            shortname(&report.target),
            report.attack.total()
        ),
        format!("({})", report.attack.breakdown()),
    ];
    if let Some(damage) = &report.damage {
        lines.push(format!("{} takes {} damage!", report.target, damage.total));
        lines.push(format!("({})", damage.breakdown()));
    }
    if report.killed() {
        lines.push(format!("{} died!", shortname(&report.target)));
    }
    lines
}

/// Phrase an error for the chat.
fn describe(error: &TableError) -> String {
    match error {
        TableError::Mech(e) => match e {
            MechError::UnknownCharacter(name) => format!("I don't know anyone called {name}!"),
            MechError::UnknownSkillOrAbility(s) => {
                format!("{s} isn't a skill or ability I know")
            }
            MechError::UnknownWeapon { character, weapon } => {
                format!("{character} doesn't have a {weapon}!")
            }
            MechError::UnknownField(field) => format!("{field} isn't something I can change"),
            MechError::InvalidFieldValue { field, value } => {
                format!("{value} isn't a valid {field}")
            }
            MechError::NoActiveCombat => NO_ORDER.to_string(),
            MechError::MalformedDamageSpec(spec) => format!("I don't know how to roll {spec}"),
        },
        TableError::Unauthorized { caller, reason } => {
            format!("I can't let you do that, {caller}. {reason}")
        }
        TableError::StoreUnavailable(_) => {
            "I can't reach my notes right now. Try again in a moment.".to_string()
        }
        TableError::CorruptState { .. } | TableError::Template { .. } | TableError::Config(_) => {
            format!("Something went wrong: {error}")
        }
    }
}
