//! The skill repository contract (§6) and an in-memory reference
//! implementation. No persistent backend ships here (Non-goals).

use std::collections::BTreeMap;
use std::sync::Mutex;

use skillrt_core::types::Skill;
use skillrt_core::SkillError;

/// `findById`/`findAllVersions`/`save`/`delete`/`exists` over versioned
/// skill records (§6).
pub trait SkillRepository: Send + Sync {
    /// The latest version of `id`, if any exists.
    fn find_by_id(&self, id: &str) -> Option<Skill>;
    fn find_by_id_version(&self, id: &str, version: &str) -> Option<Skill>;
    /// The latest version of every known skill id.
    fn find_all(&self) -> Vec<Skill>;
    fn find_all_versions(&self, id: &str) -> Vec<Skill>;
    fn save(&self, skill: Skill) -> Result<(), SkillError>;
    fn delete(&self, id: &str, version: &str) -> bool;
    fn exists(&self, id: &str, version: &str) -> bool;
}

/// `Mutex<BTreeMap<id, BTreeMap<version, Skill>>>` — versions sort
/// lexicographically, which is sufficient since `compare_versions`
/// (`skillrt_core::version`) is only consulted by callers that need
/// semantic ordering, not by the repository itself.
#[derive(Default)]
pub struct InMemorySkillRepository {
    skills: Mutex<BTreeMap<String, BTreeMap<String, Skill>>>,
}

impl InMemorySkillRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SkillRepository for InMemorySkillRepository {
    fn find_by_id(&self, id: &str) -> Option<Skill> {
        let skills = self.skills.lock().unwrap();
        let versions = skills.get(id)?;
        latest_version(versions).cloned()
    }

    fn find_by_id_version(&self, id: &str, version: &str) -> Option<Skill> {
        let skills = self.skills.lock().unwrap();
        skills.get(id)?.get(version).cloned()
    }

    fn find_all(&self) -> Vec<Skill> {
        let skills = self.skills.lock().unwrap();
        skills.values().filter_map(latest_version).cloned().collect()
    }

    fn find_all_versions(&self, id: &str) -> Vec<Skill> {
        let skills = self.skills.lock().unwrap();
        skills
            .get(id)
            .map(|versions| versions.values().cloned().collect())
            .unwrap_or_default()
    }

    fn save(&self, skill: Skill) -> Result<(), SkillError> {
        let mut skills = self.skills.lock().unwrap();
        skills
            .entry(skill.id.clone())
            .or_default()
            .insert(skill.version.clone(), skill);
        Ok(())
    }

    fn delete(&self, id: &str, version: &str) -> bool {
        let mut skills = self.skills.lock().unwrap();
        let Some(versions) = skills.get_mut(id) else {
            return false;
        };
        let removed = versions.remove(version).is_some();
        if versions.is_empty() {
            skills.remove(id);
        }
        removed
    }

    fn exists(&self, id: &str, version: &str) -> bool {
        let skills = self.skills.lock().unwrap();
        skills.get(id).map(|v| v.contains_key(version)).unwrap_or(false)
    }
}

fn latest_version(versions: &BTreeMap<String, Skill>) -> Option<&Skill> {
    versions
        .iter()
        .max_by(|(a, _), (b, _)| skillrt_core::version::compare_versions(a, b))
        .map(|(_, skill)| skill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillrt_core::types::{FieldMap, OutputContract};

    fn skill(id: &str, version: &str) -> Skill {
        Skill {
            id: id.to_string(),
            version: version.to_string(),
            description: None,
            intents: Vec::new(),
            input_schema: FieldMap::new(),
            output_contract: OutputContract::default(),
            steps: Vec::new(),
        }
    }

    #[test]
    fn find_by_id_returns_highest_semantic_version() {
        let repo = InMemorySkillRepository::new();
        repo.save(skill("s", "1.0.0")).unwrap();
        repo.save(skill("s", "2.0.0")).unwrap();
        repo.save(skill("s", "1.5.0")).unwrap();
        assert_eq!(repo.find_by_id("s").unwrap().version, "2.0.0");
        assert_eq!(repo.find_all_versions("s").len(), 3);
    }

    #[test]
    fn delete_removes_single_version() {
        let repo = InMemorySkillRepository::new();
        repo.save(skill("s", "1.0.0")).unwrap();
        repo.save(skill("s", "2.0.0")).unwrap();
        assert!(repo.delete("s", "1.0.0"));
        assert!(!repo.exists("s", "1.0.0"));
        assert!(repo.exists("s", "2.0.0"));
    }

    #[test]
    fn exists_and_find_all_reflect_state() {
        let repo = InMemorySkillRepository::new();
        assert!(!repo.exists("missing", "1.0.0"));
        repo.save(skill("a", "1.0.0")).unwrap();
        repo.save(skill("b", "1.0.0")).unwrap();
        assert_eq!(repo.find_all().len(), 2);
    }
}
