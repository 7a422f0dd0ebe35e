use anyhow::{bail, Context, Result};
use regex::Regex;
use std::collections::{HashMap, HashSet};

use super::command::{CommandDefinition, ResponseLayout};
use super::error;

/// Grouped command-name lists a family declares alongside its table.
#[derive(Debug, Clone)]
pub struct Groups {
    pub status: Vec<&'static str>,
    pub settings: Vec<&'static str>,
    pub default: &'static str,
}

/// Immutable, ordered command table for one device family. Built once
/// at handler construction; resolution never mutates it, so shared use
/// across sessions needs no locking.
pub struct Registry {
    commands: Vec<CommandDefinition>,
    matchers: Vec<Option<Regex>>,
    by_name: HashMap<&'static str, usize>,
    groups: Groups,
}

impl Registry {
    /// Build a registry, validating the table author's invariants:
    /// unique names, unique field labels per definition, parameter
    /// patterns that compile, derived fields only on parameterized
    /// definitions, indexed layouts fully indexed, and group lists that
    /// reference real commands.
    pub fn build(commands: Vec<CommandDefinition>, groups: Groups) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(commands.len());
        let mut matchers = Vec::with_capacity(commands.len());

        for (position, command) in commands.iter().enumerate() {
            if by_name.insert(command.name, position).is_some() {
                bail!("duplicate command name {} in registry", command.name);
            }
            if command.fields.is_empty() {
                bail!("{}: definition declares no fields", command.name);
            }

            let mut labels = HashSet::new();
            for field in &command.fields {
                if !labels.insert(field.label) {
                    bail!("{}: duplicate field label {:?}", command.name, field.label);
                }
                if field.is_derived() && command.pattern.is_none() {
                    bail!(
                        "{}: derived field {:?} requires a parameter pattern",
                        command.name,
                        field.label
                    );
                }
                if command.layout == ResponseLayout::Indexed
                    && !field.is_derived()
                    && field.index.is_none()
                {
                    bail!("{}: field {:?} missing its index", command.name, field.label);
                }
            }

            let matcher = match command.pattern {
                Some(pattern) => Some(
                    Regex::new(pattern)
                        .with_context(|| format!("{}: bad parameter pattern", command.name))?,
                ),
                None => None,
            };
            matchers.push(matcher);
        }

        for name in groups
            .status
            .iter()
            .chain(groups.settings.iter())
            .chain(std::iter::once(&groups.default))
        {
            if !by_name.contains_key(name) {
                bail!("group references unknown command {}", name);
            }
        }

        Ok(Self {
            commands,
            matchers,
            by_name,
            groups,
        })
    }

    /// Derive a family registry from this one: additions replace
    /// same-named entries in place or append, removals drop by name
    /// (missing names are fine), and the new group lists are set
    /// verbatim. `self` is left untouched.
    pub fn layer(
        &self,
        additions: Vec<CommandDefinition>,
        removals: &[&str],
        groups: Groups,
    ) -> Result<Registry> {
        let mut commands = self.commands.clone();

        for addition in additions {
            match commands.iter().position(|c| c.name == addition.name) {
                Some(position) => commands[position] = addition,
                None => commands.push(addition),
            }
        }
        commands.retain(|c| !removals.contains(&c.name));

        Self::build(commands, groups)
    }

    /// Resolve a caller-supplied command string. Exact names win
    /// outright; otherwise parameterized patterns are tried in
    /// registration order and the first full match supplies the
    /// captured parameter.
    pub fn resolve(&self, command: &str) -> error::Result<(&CommandDefinition, Option<String>)> {
        if let Some(&position) = self.by_name.get(command) {
            return Ok((&self.commands[position], None));
        }

        for (definition, matcher) in self.commands.iter().zip(&self.matchers) {
            let Some(matcher) = matcher else { continue };
            let Some(captures) = matcher.captures(command) else {
                continue;
            };
            // only a whole-string match counts
            if captures.get(0).map(|m| m.as_str()) != Some(command) {
                continue;
            }

            let param: String = captures
                .iter()
                .skip(1)
                .flatten()
                .map(|group| group.as_str())
                .collect();
            let param = (!param.is_empty()).then_some(param);
            return Ok((definition, param));
        }

        // a near-miss on a known name is worth distinguishing from
        // complete garbage
        if let Some(definition) = self
            .commands
            .iter()
            .find(|c| command.starts_with(c.name))
        {
            return Err(error::Error::ParameterMismatch {
                command: command.to_string(),
                name: definition.name.to_string(),
            });
        }

        Err(error::Error::UnknownCommand {
            command: command.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.by_name.get(name).map(|&position| &self.commands[position])
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn status_commands(&self) -> &[&'static str] {
        &self.groups.status
    }

    pub fn settings_commands(&self) -> &[&'static str] {
        &self.groups.settings
    }

    pub fn default_command(&self) -> &'static str {
        self.groups.default
    }
}
