//! Parsing chat text into commands.
//!
//! Each command is recognised by a case-insensitive pattern over the whole
//! message. Text that matches nothing is ordinary conversation and parses
//! to `None`. Any command may carry `!usemem <room>` to address another
//! room's state.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use rpg_mechanics::{Advantage, CharacterField, MechResult};

/// Who a command is about: the person typing, or a named character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// "I": the caller's own character.
    Caller,
    /// A character by name.
    Named(String),
}

impl Actor {
    fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("i") {
            Self::Caller
        } else {
            Self::Named(title_case(s))
        }
    }
}

/// Who receives experience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XpTarget {
    /// Every character in the room.
    Everyone,
    /// One character.
    Named(String),
}

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `roll initiative`
    RollInitiative,
    /// `!init order`
    ReportOrder,
    /// `whose turn`
    WhoseTurn,
    /// `next player`
    NextTurn,
    /// `!init add <name> <value>`
    AddToInitiative {
        /// Character joining the fight.
        name: String,
        /// Their initiative.
        value: i32,
    },
    /// `!init event <value> <name>: <text>`
    AddEvent {
        /// Event name, as it appears in the order.
        name: String,
        /// When in the round it fires.
        value: i32,
        /// What happens.
        text: String,
    },
    /// `!init remove <name>`
    RemoveFromInitiative {
        /// Entry to take out.
        name: String,
    },
    /// `!init end`
    EndCombat,
    /// `!load [N x] [name] <template>`
    Load {
        /// Name to load under; defaults to the template's file name.
        name: Option<String>,
        /// How many numbered copies to load.
        copies: u32,
        /// Template path.
        template: String,
    },
    /// `!remove <name>`
    Remove {
        /// Character to remove.
        name: String,
    },
    /// `!list characters`
    ListCharacters,
    /// `who am I`
    WhoAmI,
    /// `how am I`, `how's <name>`
    HowIs {
        /// Whose health to report.
        subject: Actor,
    },
    /// `<name> gains <n> XP`
    GrantXp {
        /// Who gets it.
        target: XpTarget,
        /// How much.
        amount: u32,
    },
    /// `<name> makes a [passive] <skill> check`
    Check {
        /// Who rolls.
        actor: Actor,
        /// Skill or ability name.
        check: String,
        /// Take 10 instead of rolling.
        passive: bool,
    },
    /// `!setvalue <name> <field> <value>`
    SetField {
        /// Character to edit.
        name: String,
        /// Field to set.
        field: CharacterField,
        /// New value.
        value: i64,
    },
    /// `!changevalue <name> <field> <+n|-n>`
    ChangeField {
        /// Character to edit.
        name: String,
        /// Field to change.
        field: CharacterField,
        /// Amount to add.
        delta: i64,
    },
    /// `<name> attacks <target> with his <weapon> [with advantage]`
    Attack {
        /// Who swings.
        attacker: Actor,
        /// Who is hit.
        target: String,
        /// Weapon name.
        weapon: String,
        /// Advantage state of the attack roll.
        advantage: Advantage,
    },
    /// `!heal <name> <n>`
    Heal {
        /// Who is healed.
        name: String,
        /// Hit points restored.
        amount: u32,
    },
    /// `we take a long rest`
    LongRest,
    /// `tell the dm ...`
    TellDm {
        /// The message.
        text: String,
    },
}

/// A command plus the room whose state it should use, if not the room it
/// was typed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// What to do.
    pub command: Command,
    /// Room override from `!usemem`.
    pub room: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    RollInitiative,
    ReportOrder,
    WhoseTurn,
    NextTurn,
    InitAdd,
    InitEvent,
    InitRemove,
    InitEnd,
    Load,
    Remove,
    ListCharacters,
    WhoAmI,
    HowIs,
    GrantXp,
    Check,
    SetField,
    ChangeField,
    Heal,
    Attack,
    LongRest,
    TellDm,
}

/// Tried in order; the first match wins.
const RULES: &[(Rule, &str)] = &[
    (Rule::RollInitiative, r"^roll initiative$"),
    (Rule::ReportOrder, r"^!init order$"),
    (Rule::WhoseTurn, r"^whose turn\b"),
    (Rule::NextTurn, r"^next player\b"),
    (Rule::InitAdd, r"^!init add (?P<name>.+?) (?P<value>-?\d+)$"),
    (Rule::InitEvent, r"^!init event (?P<value>-?\d+) (?P<rest>.+)$"),
    (Rule::InitRemove, r"^!init remove (?P<name>.+)$"),
    (Rule::InitEnd, r"^!init end$"),
    (
        Rule::Load,
        r"^!load (?:(?P<n>\d+) ?x )?(?:(?P<name>.+?) )?(?P<file>\S+)$",
    ),
    (Rule::Remove, r"^!remove (?P<name>.+)$"),
    (Rule::ListCharacters, r"^!list characters$"),
    (Rule::WhoAmI, r"^who am i\??$"),
    (Rule::HowIs, r"^how(?:'s| am| is) (?P<subject>.+?)\??$"),
    (
        Rule::GrantXp,
        r"^(?P<object>.+?) (?:gains?|gets?|earns?|receives?) (?P<n>\d+) xp$",
    ),
    (
        Rule::Check,
        r"^(?P<object>.+?),? makes? an? (?P<passive>passive )?(?P<check>.+?) check$",
    ),
    (
        Rule::SetField,
        r"^!setvalue (?P<name>.+?) (?P<field>\w+) (?P<value>-?\d+)$",
    ),
    (
        Rule::ChangeField,
        r"^!changevalue (?P<name>.+?) (?P<field>\w+) (?P<delta>[+-]\d+)$",
    ),
    (Rule::Heal, r"^!heal (?P<name>.+?) (?P<n>\d+)$"),
    (
        Rule::Attack,
        r"^(?P<object>.+?) (?:hits?|attacks?|swings? at) (?P<subject>.+?) with (?:his|her|their|my|its) (?P<weapon>.+?)(?: with (?P<adv>advantage|disadvantage))?$",
    ),
    (Rule::LongRest, r"^(?:you|we) (?:take|have) a long rest\b"),
    (Rule::TellDm, r"^tell the dm\b[:,]?\s*(?P<text>.*)$"),
];

static PATTERNS: LazyLock<Vec<(Rule, Regex)>> = LazyLock::new(|| {
    RULES
        .iter()
        .filter_map(|(rule, pattern)| {
            Regex::new(&format!("(?i){pattern}"))
                .ok()
                .map(|re| (*rule, re))
        })
        .collect()
});

static ROOM_OVERRIDE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\s*!usemem\s+(\S+)").ok());

const EVERYONE: [&str; 5] = ["everyone", "you all", "the party", "the group", "all"];

/// Capitalise each word, lower-casing the rest: `aria swiftwind` becomes
/// `Aria Swiftwind`.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Split a `!usemem <room>` override out of the text.
fn split_room_override(text: &str) -> (String, Option<String>) {
    let Some(re) = ROOM_OVERRIDE.as_ref() else {
        return (text.to_string(), None);
    };
    match re.captures(text) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let room = caps.get(1).map(|m| m.as_str().to_string());
            let rest = format!("{} {}", &text[..whole.start], &text[whole.end..]);
            (rest, room)
        }
        None => (text.to_string(), None),
    }
}

impl Invocation {
    /// Parse a chat message. Returns `Ok(None)` for text that is not a
    /// command, and an error for a command naming an unknown field.
    pub fn parse(text: &str) -> MechResult<Option<Self>> {
        let (text, room) = split_room_override(text);
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        for (rule, re) in PATTERNS.iter() {
            if let Some(caps) = re.captures(&text) {
                return Ok(build(*rule, &caps)?.map(|command| Self { command, room }));
            }
        }
        Ok(None)
    }
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    caps.name(name)?.as_str().trim_start_matches('+').parse().ok()
}

fn text<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str().trim())
}

fn build(rule: Rule, caps: &Captures<'_>) -> MechResult<Option<Command>> {
    let command = match rule {
        Rule::RollInitiative => Command::RollInitiative,
        Rule::ReportOrder => Command::ReportOrder,
        Rule::WhoseTurn => Command::WhoseTurn,
        Rule::NextTurn => Command::NextTurn,
        Rule::InitAdd => {
            let Some(value) = number(caps, "value") else {
                return Ok(None);
            };
            Command::AddToInitiative {
                name: title_case(text(caps, "name")),
                value,
            }
        }
        Rule::InitEvent => {
            let Some(value) = number(caps, "value") else {
                return Ok(None);
            };
            let rest = text(caps, "rest");
            let (name, event_text) = match rest.split_once(':') {
                Some((name, t)) if !name.trim().is_empty() => (name.trim(), t.trim()),
                _ => (rest, rest),
            };
            Command::AddEvent {
                name: name.to_string(),
                value,
                text: event_text.to_string(),
            }
        }
        Rule::InitRemove => Command::RemoveFromInitiative {
            name: title_case(text(caps, "name")),
        },
        Rule::InitEnd => Command::EndCombat,
        Rule::Load => Command::Load {
            name: caps.name("name").map(|m| title_case(m.as_str())),
            copies: number(caps, "n").unwrap_or(1),
            template: text(caps, "file").to_string(),
        },
        Rule::Remove => Command::Remove {
            name: title_case(text(caps, "name")),
        },
        Rule::ListCharacters => Command::ListCharacters,
        Rule::WhoAmI => Command::WhoAmI,
        Rule::HowIs => Command::HowIs {
            subject: Actor::parse(text(caps, "subject")),
        },
        Rule::GrantXp => {
            let Some(amount) = number(caps, "n") else {
                return Ok(None);
            };
            let object = text(caps, "object");
            let target = if EVERYONE.iter().any(|e| object.eq_ignore_ascii_case(e)) {
                XpTarget::Everyone
            } else {
                XpTarget::Named(title_case(object))
            };
            Command::GrantXp { target, amount }
        }
        Rule::Check => Command::Check {
            actor: Actor::parse(text(caps, "object")),
            check: text(caps, "check").to_string(),
            passive: caps.name("passive").is_some(),
        },
        Rule::SetField => {
            let Some(value) = number(caps, "value") else {
                return Ok(None);
            };
            Command::SetField {
                name: title_case(text(caps, "name")),
                field: CharacterField::parse(text(caps, "field"))?,
                value,
            }
        }
        Rule::ChangeField => {
            let Some(delta) = number(caps, "delta") else {
                return Ok(None);
            };
            Command::ChangeField {
                name: title_case(text(caps, "name")),
                field: CharacterField::parse(text(caps, "field"))?,
                delta,
            }
        }
        Rule::Heal => {
            let Some(amount) = number(caps, "n") else {
                return Ok(None);
            };
            Command::Heal {
                name: title_case(text(caps, "name")),
                amount,
            }
        }
        Rule::Attack => {
            let advantage = match caps.name("adv").map(|m| m.as_str().to_lowercase()) {
                Some(a) if a == "advantage" => Advantage::Advantage,
                Some(_) => Advantage::Disadvantage,
                None => Advantage::Normal,
            };
            Command::Attack {
                attacker: Actor::parse(text(caps, "object")),
                target: title_case(text(caps, "subject")),
                weapon: text(caps, "weapon").to_string(),
                advantage,
            }
        }
        Rule::LongRest => Command::LongRest,
        Rule::TellDm => Command::TellDm {
            text: text(caps, "text").to_string(),
        },
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpg_mechanics::{Ability, MechError};

    fn parse(text: &str) -> Option<Command> {
        Invocation::parse(text).unwrap().map(|i| i.command)
    }

    #[test]
    fn every_pattern_compiles() {
        assert_eq!(PATTERNS.len(), RULES.len());
        assert!(ROOM_OVERRIDE.is_some());
    }

    #[test]
    fn chatter_is_not_a_command() {
        assert_eq!(parse("hello everyone"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn title_case_names() {
        assert_eq!(title_case("aria swiftwind"), "Aria Swiftwind");
        assert_eq!(title_case("BORIN"), "Borin");
        assert_eq!(title_case("  goblin2 "), "Goblin2");
    }

    #[test]
    fn initiative_commands() {
        assert_eq!(parse("Roll Initiative"), Some(Command::RollInitiative));
        assert_eq!(parse("!init order"), Some(Command::ReportOrder));
        assert_eq!(parse("whose turn is it?"), Some(Command::WhoseTurn));
        assert_eq!(parse("next player"), Some(Command::NextTurn));
        assert_eq!(
            parse("!init add goblin 12"),
            Some(Command::AddToInitiative {
                name: "Goblin".to_string(),
                value: 12
            })
        );
        assert_eq!(
            parse("!init remove aria"),
            Some(Command::RemoveFromInitiative {
                name: "Aria".to_string()
            })
        );
        assert_eq!(parse("!init end"), Some(Command::EndCombat));
    }

    #[test]
    fn events_with_and_without_a_name() {
        assert_eq!(
            parse("!init event 15 fire: The room ignites!"),
            Some(Command::AddEvent {
                name: "fire".to_string(),
                value: 15,
                text: "The room ignites!".to_string()
            })
        );
        assert_eq!(
            parse("!init event 5 Thunder rolls"),
            Some(Command::AddEvent {
                name: "Thunder rolls".to_string(),
                value: 5,
                text: "Thunder rolls".to_string()
            })
        );
    }

    #[test]
    fn load_forms() {
        assert_eq!(
            parse("!load aria players/aria.yaml"),
            Some(Command::Load {
                name: Some("Aria".to_string()),
                copies: 1,
                template: "players/aria.yaml".to_string()
            })
        );
        assert_eq!(
            parse("!load 3x goblin monsters/goblin"),
            Some(Command::Load {
                name: Some("Goblin".to_string()),
                copies: 3,
                template: "monsters/goblin".to_string()
            })
        );
        assert_eq!(
            parse("!load 2x monsters/goblin"),
            Some(Command::Load {
                name: None,
                copies: 2,
                template: "monsters/goblin".to_string()
            })
        );
    }

    #[test]
    fn health_and_identity() {
        assert_eq!(parse("who am I?"), Some(Command::WhoAmI));
        assert_eq!(
            parse("how am I"),
            Some(Command::HowIs {
                subject: Actor::Caller
            })
        );
        assert_eq!(
            parse("how's borin?"),
            Some(Command::HowIs {
                subject: Actor::Named("Borin".to_string())
            })
        );
    }

    #[test]
    fn xp_grants() {
        assert_eq!(
            parse("The Party gains 300 XP"),
            Some(Command::GrantXp {
                target: XpTarget::Everyone,
                amount: 300
            })
        );
        assert_eq!(
            parse("aria gains 50 xp"),
            Some(Command::GrantXp {
                target: XpTarget::Named("Aria".to_string()),
                amount: 50
            })
        );
    }

    #[test]
    fn checks() {
        assert_eq!(
            parse("I make a passive perception check"),
            Some(Command::Check {
                actor: Actor::Caller,
                check: "perception".to_string(),
                passive: true
            })
        );
        assert_eq!(
            parse("Aria, make a sleight of hand check"),
            Some(Command::Check {
                actor: Actor::Named("Aria".to_string()),
                check: "sleight of hand".to_string(),
                passive: false
            })
        );
    }

    #[test]
    fn field_edits() {
        assert_eq!(
            parse("!setvalue borin AC 18"),
            Some(Command::SetField {
                name: "Borin".to_string(),
                field: CharacterField::ArmorClass,
                value: 18
            })
        );
        assert_eq!(
            parse("!changevalue borin str +2"),
            Some(Command::ChangeField {
                name: "Borin".to_string(),
                field: CharacterField::Ability(Ability::Str),
                delta: 2
            })
        );
        assert_eq!(
            Invocation::parse("!setvalue borin name 3"),
            Err(MechError::UnknownField("name".to_string()))
        );
    }

    #[test]
    fn attacks() {
        assert_eq!(
            parse("Thorin attacks the goblin with his greatsword"),
            Some(Command::Attack {
                attacker: Actor::Named("Thorin".to_string()),
                target: "The Goblin".to_string(),
                weapon: "greatsword".to_string(),
                advantage: Advantage::Normal
            })
        );
        assert_eq!(
            parse("I swing at goblin1 with my short sword with disadvantage"),
            Some(Command::Attack {
                attacker: Actor::Caller,
                target: "Goblin1".to_string(),
                weapon: "short sword".to_string(),
                advantage: Advantage::Disadvantage
            })
        );
    }

    #[test]
    fn rest_heal_and_relay() {
        assert_eq!(parse("we take a long rest"), Some(Command::LongRest));
        assert_eq!(
            parse("!heal borin 5"),
            Some(Command::Heal {
                name: "Borin".to_string(),
                amount: 5
            })
        );
        assert_eq!(
            parse("tell the dm I pocket the ring"),
            Some(Command::TellDm {
                text: "I pocket the ring".to_string()
            })
        );
    }

    #[test]
    fn room_override_is_split_out() {
        let inv = Invocation::parse("!list characters !usemem dungeon")
            .unwrap()
            .unwrap();
        assert_eq!(inv.command, Command::ListCharacters);
        assert_eq!(inv.room.as_deref(), Some("dungeon"));

        let inv = Invocation::parse("!remove !usemem dungeon goblin")
            .unwrap()
            .unwrap();
        assert_eq!(
            inv.command,
            Command::Remove {
                name: "Goblin".to_string()
            }
        );
        assert_eq!(inv.room.as_deref(), Some("dungeon"));
    }

    proptest::proptest! {
        #[test]
        fn parsing_never_panics(text in "\\PC{0,60}") {
            let _ = Invocation::parse(&text);
        }

        #[test]
        fn title_case_is_stable_on_ascii(name in "[a-zA-Z]{1,8}( [a-zA-Z]{1,8}){0,2}") {
            let once = title_case(&name);
            proptest::prop_assert_eq!(title_case(&once), once.clone());
            proptest::prop_assert!(once.eq_ignore_ascii_case(&name));
        }

        #[test]
        fn load_command_survives_whitespace(spaces in " {1,4}", file in "[a-z]{1,10}") {
            let text = format!("!load{spaces}{file}");
            proptest::prop_assert_eq!(
                Invocation::parse(&text).unwrap().map(|i| i.command),
                Some(Command::Load { name: None, copies: 1, template: file })
            );
        }
    }
}
