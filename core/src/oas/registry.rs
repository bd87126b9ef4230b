#![deny(missing_docs)]

//! # Name Registry
//!
//! Hands out unique `operationId`s while a document is assembled.
//!
//! Two distinct endpoints can derive the same identifier (`/bugs/{id}` and
//! `/bugs/{bugID}` both give `getBugsId`). The registry resolves that according
//! to the configured [`CollisionPolicy`].

use crate::error::{AppError, AppResult};
use crate::oas::models::HttpMethod;
use crate::oas::naming::operation_id;
use crate::options::CollisionPolicy;
use log::warn;
use std::collections::HashMap;

type Endpoint = (String, HttpMethod);

/// Registry of assigned operation ids.
#[derive(Debug, Default)]
pub struct NameRegistry {
    policy: CollisionPolicy,
    by_endpoint: HashMap<Endpoint, String>,
    owners: HashMap<String, Endpoint>,
}

impl NameRegistry {
    /// Creates an empty registry.
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Returns the id for `method path`, reusing the one already assigned to the
    /// same endpoint.
    pub fn assign(&mut self, path: &str, method: HttpMethod) -> AppResult<String> {
        let key = (path.to_string(), method);
        if let Some(existing) = self.by_endpoint.get(&key) {
            return Ok(existing.clone());
        }

        let base = operation_id(path, method);
        let mut candidate = base.clone();
        let mut counter = 2;
        while let Some((owner_path, owner_method)) = self.owners.get(&candidate) {
            match self.policy {
                CollisionPolicy::Fail => {
                    return Err(AppError::NameCollision(format!(
                        "`{}` is derived from both {} {} and {} {}",
                        base, owner_method, owner_path, method, path
                    )));
                }
                CollisionPolicy::Suffix => {
                    candidate = format!("{}{}", base, counter);
                    counter += 1;
                }
            }
        }

        if candidate != base {
            warn!(
                "operationId `{}` already taken; {} {} is named `{}`",
                base, method, path, candidate
            );
        }

        self.owners.insert(candidate.clone(), key.clone());
        self.by_endpoint.insert(key, candidate.clone());
        Ok(candidate)
    }

    /// Number of endpoints named so far.
    pub fn len(&self) -> usize {
        self.by_endpoint.len()
    }

    /// True if nothing was named yet.
    pub fn is_empty(&self) -> bool {
        self.by_endpoint.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_endpoint_gets_same_id() {
        let mut reg = NameRegistry::new(CollisionPolicy::Suffix);
        let a = reg.assign("/bugs/{id}", HttpMethod::Get).unwrap();
        let b = reg.assign("/bugs/{id}", HttpMethod::Get).unwrap();
        assert_eq!(a, "getBugsId");
        assert_eq!(a, b);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_suffix_policy() {
        let mut reg = NameRegistry::new(CollisionPolicy::Suffix);
        assert_eq!(reg.assign("/bugs/{id}", HttpMethod::Get).unwrap(), "getBugsId");
        assert_eq!(reg.assign("/bugs/{bugID}", HttpMethod::Get).unwrap(), "getBugsId2");
        assert_eq!(reg.assign("/bugs/{b}", HttpMethod::Get).unwrap(), "getBugsId3");
        assert_eq!(reg.assign("/bugs/{id}", HttpMethod::Put).unwrap(), "putBugsId");
    }

    #[test]
    fn test_fail_policy() {
        let mut reg = NameRegistry::new(CollisionPolicy::Fail);
        reg.assign("/bugs/{id}", HttpMethod::Get).unwrap();
        let err = reg.assign("/bugs/{bugID}", HttpMethod::Get).unwrap_err();
        assert!(matches!(err, AppError::NameCollision(_)));
        assert!(err.to_string().contains("getBugsId"));
    }
}
