//! Skill registry: verb-indexed lookup of registered skills.
//!
//! Skills are registered once at startup and looked up by verb for every
//! command. Two indices are kept: identity → skill and lowercase verb →
//! skill. Lookup is case-insensitive.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Skill;

/// What to do when a newly registered skill claims a verb that another
/// skill already owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The later registration takes the verb.
    #[default]
    LastWins,
    /// The incumbent keeps the verb.
    FirstWins,
}

/// Registry of skills indexed by name and by verb.
pub struct SkillRegistry {
    by_name: HashMap<String, Arc<dyn Skill>>,
    by_verb: HashMap<String, Arc<dyn Skill>>,
    policy: CollisionPolicy,
}

impl SkillRegistry {
    /// Empty registry using [`CollisionPolicy::LastWins`].
    pub fn new() -> Self {
        Self::with_policy(CollisionPolicy::default())
    }

    pub fn with_policy(policy: CollisionPolicy) -> Self {
        Self {
            by_name: HashMap::new(),
            by_verb: HashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Register a skill under its name and each of its verbs.
    ///
    /// A skill registered under an existing name replaces the old one, and
    /// verbs still pointing at the replaced skill are dropped from the index.
    pub fn register(&mut self, skill: Arc<dyn Skill>) {
        let name = skill.name().to_string();

        if skill.verbs().is_empty() {
            log::warn!("Skill '{}' registered without any verbs", name);
        }

        if let Some(replaced) = self.by_name.insert(name.clone(), Arc::clone(&skill)) {
            log::debug!("Skill '{}' replaced an earlier registration", name);
            self.by_verb
                .retain(|_, owner| !Arc::ptr_eq(owner, &replaced));
        }

        for verb in skill.verbs() {
            let key = verb.to_lowercase();
            match self.by_verb.get(&key) {
                Some(current) if self.policy == CollisionPolicy::FirstWins => {
                    log::warn!(
                        "Verb '{}' already owned by '{}'; keeping it (first wins), '{}' not indexed for it",
                        key,
                        current.name(),
                        name
                    );
                    continue;
                }
                Some(current) => {
                    log::debug!(
                        "Verb '{}' moved from '{}' to '{}' (last wins)",
                        key,
                        current.name(),
                        name
                    );
                }
                None => {}
            }
            self.by_verb.insert(key, Arc::clone(&skill));
        }
    }

    /// Skill owning `verb`, compared case-insensitively.
    pub fn resolve(&self, verb: &str) -> Option<Arc<dyn Skill>> {
        self.by_verb.get(&verb.to_lowercase()).cloned()
    }

    /// Skill registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Skill>> {
        self.by_name.get(name).cloned()
    }

    /// Registered skill names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Indexed verbs with the name of their owner, sorted by verb.
    pub fn verbs(&self) -> Vec<(String, String)> {
        let mut verbs: Vec<(String, String)> = self
            .by_verb
            .iter()
            .map(|(verb, skill)| (verb.clone(), skill.name().to_string()))
            .collect();
        verbs.sort();
        verbs
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SkillRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillRegistry")
            .field("skills", &self.names())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::skills::SkillResult;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Fixed {
        name: &'static str,
        verbs: &'static [&'static str],
    }

    #[async_trait]
    impl Skill for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn verbs(&self) -> &[&'static str] {
            self.verbs
        }

        async fn handle(&self, _command: &Command) -> SkillResult {
            Ok(Some(self.name.to_string()))
        }
    }

    fn fixed(name: &'static str, verbs: &'static [&'static str]) -> Arc<dyn Skill> {
        Arc::new(Fixed { name, verbs })
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let mut registry = SkillRegistry::new();
        registry.register(fixed("notes", &["Save_Note"]));

        assert_eq!(registry.resolve("save_note").unwrap().name(), "notes");
        assert_eq!(registry.resolve("SAVE_NOTE").unwrap().name(), "notes");
        assert!(registry.resolve("read_note").is_none());
    }

    #[test]
    fn test_last_registration_wins_verb() {
        let mut registry = SkillRegistry::new();
        registry.register(fixed("first", &["ping"]));
        registry.register(fixed("second", &["ping", "pong"]));

        assert_eq!(registry.resolve("ping").unwrap().name(), "second");
        // Both remain reachable by identity
        assert_eq!(registry.get("first").unwrap().name(), "first");
        assert_eq!(registry.get("second").unwrap().name(), "second");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_first_wins_policy_keeps_incumbent() {
        let mut registry = SkillRegistry::with_policy(CollisionPolicy::FirstWins);
        registry.register(fixed("first", &["ping"]));
        registry.register(fixed("second", &["ping", "pong"]));

        assert_eq!(registry.resolve("ping").unwrap().name(), "first");
        assert_eq!(registry.resolve("pong").unwrap().name(), "second");
    }

    #[test]
    fn test_reregistering_name_drops_stale_verbs() {
        let mut registry = SkillRegistry::new();
        registry.register(fixed("music", &["music_play", "music_stop"]));
        registry.register(fixed("music", &["music_play"]));

        assert!(registry.resolve("music_play").is_some());
        assert!(registry.resolve("music_stop").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_verb_index_points_at_claiming_skill() {
        let mut registry = SkillRegistry::new();
        registry.register(fixed("a", &["x", "Y"]));
        registry.register(fixed("b", &["y", "z"]));

        for (verb, owner) in registry.verbs() {
            let skill = registry.get(&owner).unwrap();
            assert!(skill.verbs().iter().any(|v| v.to_lowercase() == verb));
        }
        assert_eq!(registry.names(), vec!["a", "b"]);
    }
}
