use std::sync::Arc;

use meditrack_models::family::{FamilyMember, FamilyMemberId};
use meditrack_storage::{KeyValueStore, StorageError, keys, load_json, save_json};

use crate::FamilyError;

/// Member every new household starts with.
pub const DEFAULT_MEMBER: &str = "Self";

/// People medicines can be assigned to.
pub struct FamilyRegistry {
    members: Vec<FamilyMember>,
    store: Arc<dyn KeyValueStore>,
}

impl FamilyRegistry {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let members: Vec<FamilyMember> =
            load_json(store.as_ref(), keys::FAMILY_MEMBERS)?.unwrap_or_default();

        let mut registry = Self { members, store };
        if registry.members.is_empty() {
            registry.members.push(FamilyMember::new(DEFAULT_MEMBER));
            registry.persist();
        }

        Ok(registry)
    }

    /// Replaces the in-memory members with the stored ones. On error nothing changes.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        self.members = load_json(self.store.as_ref(), keys::FAMILY_MEMBERS)?.unwrap_or_default();
        Ok(())
    }

    pub fn members(&self) -> &[FamilyMember] {
        &self.members
    }

    pub fn find(&self, name: &str) -> Option<&FamilyMember> {
        self.members.iter().find(|member| member.is_named(name))
    }

    pub fn add(&mut self, name: &str) -> Result<FamilyMember, FamilyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FamilyError::BlankName);
        }
        if self.find(name).is_some() {
            return Err(FamilyError::Duplicate(name.to_string()));
        }

        let member = FamilyMember::new(name);
        self.members.push(member.clone());
        self.persist();

        log::info!("Added family member. [member_id = {}, name = {}]", member.id, member.name);
        Ok(member)
    }

    /// Returns the member with this name, adding it first if needed.
    pub fn ensure(&mut self, name: &str) -> Result<FamilyMember, FamilyError> {
        match self.find(name) {
            Some(member) => Ok(member.clone()),
            None => self.add(name),
        }
    }

    pub fn remove(&mut self, id: FamilyMemberId) -> Option<FamilyMember> {
        let index = self.members.iter().position(|member| member.id == id)?;
        let removed = self.members.remove(index);
        self.persist();
        Some(removed)
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), keys::FAMILY_MEMBERS, &self.members) {
            log::error!("Failed to persist family members. [error = {e}]");
        }
    }
}

#[cfg(test)]
mod tests {
    use meditrack_storage::InMemoryStore;
    use uuid::Uuid;

    use super::*;

    fn names(registry: &FamilyRegistry) -> Vec<&str> {
        registry.members().iter().map(|member| member.name.as_str()).collect()
    }

    #[test]
    fn empty_registry_is_seeded_once() {
        let store = Arc::new(InMemoryStore::new());
        let mut registry = FamilyRegistry::load(store.clone()).unwrap();
        assert_eq!(names(&registry), vec!["Self"]);

        let mom = registry.add("Mom").unwrap();
        let seeded = registry.members()[0].id;
        registry.remove(seeded);

        let reloaded = FamilyRegistry::load(store).unwrap();
        assert_eq!(reloaded.members(), &[mom]);
    }

    #[test]
    fn blank_and_duplicate_names_are_rejected() {
        let mut registry = FamilyRegistry::load(Arc::new(InMemoryStore::new())).unwrap();

        assert_eq!(registry.add("   "), Err(FamilyError::BlankName));
        assert_eq!(
            registry.add(" self "),
            Err(FamilyError::Duplicate("self".to_string()))
        );
        assert_eq!(names(&registry), vec!["Self"]);
    }

    #[test]
    fn ensure_reuses_existing_members() {
        let mut registry = FamilyRegistry::load(Arc::new(InMemoryStore::new())).unwrap();

        let dad = registry.ensure("Dad").unwrap();
        let again = registry.ensure("DAD").unwrap();

        assert_eq!(dad, again);
        assert_eq!(names(&registry), vec!["Self", "Dad"]);
    }

    #[test]
    fn reload_sees_members_added_elsewhere() {
        let store = Arc::new(InMemoryStore::new());
        let mut registry = FamilyRegistry::load(store.clone()).unwrap();
        FamilyRegistry::load(store).unwrap().add("Grandpa").unwrap();

        assert!(registry.find("Grandpa").is_none());
        registry.reload().unwrap();
        assert_eq!(names(&registry), vec!["Self", "Grandpa"]);
    }

    #[test]
    fn removing_an_unknown_member_is_a_no_op() {
        let mut registry = FamilyRegistry::load(Arc::new(InMemoryStore::new())).unwrap();

        assert_eq!(registry.remove(Uuid::new_v4()), None);
        assert_eq!(registry.members().len(), 1);
    }
}
