//! Generation tokens for in-flight backend requests.
//!
//! Every request the editor issues gets a token carrying a per-key
//! generation number. A response is applied only when its token is still the
//! latest one issued for that key, so a slow reply can never overwrite the
//! result of a newer request.

use crate::{
    data::{Location, LocationId},
    prelude::HashMap,
};

/// What a request is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Create,
    Update(LocationId),
    Delete(LocationId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    pub key: RequestKey,
    pub generation: u64,
}

/// Result of a backend call, as reported back by the host
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Created(Location),
    Updated(Location),
    Deleted,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: HashMap<RequestKey, u64>,
    next_generation: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new token for `key`, superseding any earlier one
    pub fn issue(&mut self, key: RequestKey) -> RequestToken {
        self.next_generation += 1;
        self.latest.insert(key, self.next_generation);
        RequestToken {
            key,
            generation: self.next_generation,
        }
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.latest.get(&token.key) == Some(&token.generation)
    }

    /// Retires `token`. Returns true when its response should be applied.
    pub fn complete(&mut self, token: &RequestToken) -> bool {
        if !self.is_current(token) {
            log::debug!(
                "dropping stale response for {:?} (generation {})",
                token.key,
                token.generation
            );
            return false;
        }
        self.latest.remove(&token.key);
        true
    }

    /// Forgets any in-flight request for `key`; its response will be ignored.
    pub fn cancel(&mut self, key: &RequestKey) {
        self.latest.remove(key);
    }

    pub fn in_flight(&self, key: &RequestKey) -> bool {
        self.latest.contains_key(key)
    }

    pub fn pending(&self) -> usize {
        self.latest.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_request_supersedes_older() {
        let mut tracker = RequestTracker::new();
        let id = LocationId::new_v4();
        let first = tracker.issue(RequestKey::Update(id));
        let second = tracker.issue(RequestKey::Update(id));

        assert!(!tracker.is_current(&first));
        assert!(!tracker.complete(&first));
        assert!(tracker.complete(&second));
        // a token applies once
        assert!(!tracker.complete(&second));
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut tracker = RequestTracker::new();
        let a = tracker.issue(RequestKey::Delete(LocationId::new_v4()));
        let b = tracker.issue(RequestKey::Create);
        assert!(tracker.is_current(&a));
        assert!(tracker.is_current(&b));
        assert_eq!(tracker.pending(), 2);
    }

    #[test]
    fn test_cancel_drops_response() {
        let mut tracker = RequestTracker::new();
        let token = tracker.issue(RequestKey::Create);
        tracker.cancel(&RequestKey::Create);
        assert!(!tracker.in_flight(&RequestKey::Create));
        assert!(!tracker.complete(&token));
    }
}
