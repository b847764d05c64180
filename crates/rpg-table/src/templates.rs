//! Character templates: YAML files the game master writes ahead of time.
//!
//! A template lists character fields using the stored names (`AC`, `XP`,
//! `class_`, ...). It may name a `loadfile`, another template whose
//! fields act as defaults underneath its own:
//!
//! ```yaml
//! loadfile: monsters/goblin
//! max_hp: 12
//! ```

use std::path::{Path, PathBuf};

use rpg_mechanics::Character;
use serde_yaml::{Mapping, Value};

use crate::error::{TableError, TableResult};

/// Somewhere character templates can be loaded from.
pub trait TemplateSource {
    /// Build a character named `name` from the template at `path`.
    fn load(&self, path: &str, name: &str) -> TableResult<Character>;
}

/// Templates read from YAML files under a base directory.
#[derive(Debug, Clone)]
pub struct YamlTemplates {
    base: PathBuf,
}

impl YamlTemplates {
    /// Resolve relative template paths against `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut full = self.base.join(path);
        if full.extension().is_none() {
            full.set_extension("yaml");
        }
        full
    }

    fn read(&self, path: &str) -> TableResult<Mapping> {
        let full = self.resolve(path);
        let err = |reason: String| TableError::Template {
            path: full.display().to_string(),
            reason,
        };
        tracing::debug!(path = %full.display(), "reading template");
        let text = std::fs::read_to_string(&full).map_err(|e| err(e.to_string()))?;
        match serde_yaml::from_str(&text).map_err(|e| err(e.to_string()))? {
            Value::Mapping(fields) => Ok(fields),
            _ => Err(err("not a mapping of character fields".to_string())),
        }
    }
}

impl TemplateSource for YamlTemplates {
    fn load(&self, path: &str, name: &str) -> TableResult<Character> {
        let mut fields = self.read(path)?;
        if let Some(loadfile) = fields.remove("loadfile") {
            let Some(loadfile) = loadfile.as_str() else {
                return Err(TableError::Template {
                    path: path.to_string(),
                    reason: "loadfile must be a path".to_string(),
                });
            };
            let mut defaults = self.read(loadfile)?;
            defaults.extend(fields);
            fields = defaults;
        }
        fields.insert(Value::from("name"), Value::from(name));

        serde_yaml::from_value(Value::Mapping(fields)).map_err(|e| TableError::Template {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpg_mechanics::Ability;

    const GOBLIN: &str = "\
name: Goblin
level: 1
race: Goblin
class_: Warrior
AC: 15
max_hp: 7
abilities: {Str: 8, Dex: 14, Con: 10, Int: 10, Wis: 8, Cha: 8}
weapons:
  scimitar: {damage: 1d6, modifier: Dex}
";

    fn dir_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, text) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, text).unwrap();
        }
        dir
    }

    #[test]
    fn loads_under_given_name() {
        let dir = dir_with(&[("monsters/goblin.yaml", GOBLIN)]);
        let templates = YamlTemplates::new(dir.path());
        let goblin = templates.load("monsters/goblin", "Goblin2").unwrap();
        assert_eq!(goblin.name, "Goblin2");
        assert_eq!(goblin.armor_class, 15);
        assert_eq!(goblin.current_hp, 7);
        assert_eq!(goblin.weapon("scimitar").unwrap().ability, Ability::Dex);
    }

    #[test]
    fn loadfile_supplies_defaults() {
        let dir = dir_with(&[
            ("monsters/goblin.yaml", GOBLIN),
            ("boss.yaml", "loadfile: monsters/goblin\nmax_hp: 30\nlevel: 4\n"),
        ]);
        let boss = YamlTemplates::new(dir.path()).load("boss.yaml", "Grik").unwrap();
        assert_eq!(boss.max_hp, 30);
        assert_eq!(boss.level, 4);
        assert_eq!(boss.race, "Goblin");
        assert_eq!(boss.abilities.dexterity, 14);
    }

    #[test]
    fn missing_template() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            YamlTemplates::new(dir.path()).load("nobody", "Nobody"),
            Err(TableError::Template { .. })
        ));
    }

    #[test]
    fn invalid_fields_rejected() {
        let dir = dir_with(&[("bad.yaml", "level: 40\nAC: 10\nmax_hp: 5\n")]);
        assert!(matches!(
            YamlTemplates::new(dir.path()).load("bad", "Bad"),
            Err(TableError::Template { .. })
        ));
    }
}
