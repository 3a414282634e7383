//! Identity-watch profiles: create once, read by id. No update, no TTL;
//! retention is a collaborator's concern.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::risk::identitywatch::ProfileRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub full_name: Option<String>,
    pub state: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct ProfileStore {
    profiles: Mutex<HashMap<String, Profile>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caller validates the request first; the store only assigns identity.
    pub fn create(&self, req: ProfileRequest) -> Profile {
        let profile = Profile {
            id: Uuid::new_v4().to_string(),
            emails: req.emails,
            phones: req.phones,
            full_name: req.full_name,
            state: req.state,
            created_at: Utc::now(),
        };
        self.profiles
            .lock()
            .expect("lock")
            .insert(profile.id.clone(), profile.clone());
        profile
    }

    pub fn get(&self, profile_id: &str) -> Result<Profile, EngineError> {
        self.profiles
            .lock()
            .expect("lock")
            .get(profile_id)
            .cloned()
            .ok_or(EngineError::NotFound("profile"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get() {
        let store = ProfileStore::new();
        let profile = store.create(ProfileRequest {
            emails: vec!["ada@example.com".to_string()],
            phones: vec!["5550102030".to_string()],
            full_name: Some("Ada".to_string()),
            state: None,
        });
        let fetched = store.get(&profile.id).unwrap();
        assert_eq!(fetched.emails, profile.emails);
    }

    #[test]
    fn missing_profile_is_not_found() {
        let store = ProfileStore::new();
        assert!(matches!(
            store.get("nope"),
            Err(EngineError::NotFound("profile"))
        ));
    }
}
