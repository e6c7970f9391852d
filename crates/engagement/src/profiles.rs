//! Profiles and the follow graph
//!
//! Follow edges are a pair of mirrored memberships: after a successful
//! follow, the target appears in the follower's `following` list and the
//! follower appears in the target's `followers` list. Both writes use
//! add-if-absent set semantics, so repeated follows and unfollows are
//! idempotent no-ops, unlike likes and retweets, which reject
//! duplicates (see [`crate::interactions`]).
//!
//! The two writes are not atomic. A failure or crash after the first
//! write leaves a one-sided edge; the operation still reports success
//! and the gap is logged, not repaired.

use storage::{Collection, StorageError};
use thiserror::Error;

use crate::models::{User, UserProfile};

/// Profile service error types
#[derive(Debug, Error)]
pub enum ProfileError {
    /// User not found
    #[error("User not found: {0}")]
    NotFound(String),

    /// Empty media reference
    #[error("No image reference supplied")]
    EmptyReference,

    /// Document store error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Partial profile update
///
/// Only the fields that are present are written.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New date of birth
    pub dob: Option<String>,
    /// New location
    pub location: Option<String>,
}

impl ProfileUpdate {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the date of birth
    pub fn with_dob(mut self, dob: impl Into<String>) -> Self {
        self.dob = Some(dob.into());
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Profile service
pub struct ProfileService {
    users: Collection<User>,
}

impl ProfileService {
    /// Create a new profile service over the given collection
    pub fn new(users: Collection<User>) -> Self {
        Self { users }
    }

    /// Fetch a user's public profile
    pub fn profile(&self, user_id: &str) -> Result<UserProfile> {
        let user = self
            .users
            .find_by_id(user_id)?
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))?;

        Ok(user.profile())
    }

    /// Apply a partial profile update
    ///
    /// # Errors
    ///
    /// - `ProfileError::NotFound` - no user under the id
    pub fn edit_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<UserProfile> {
        let updated = self.users.update_by_id(user_id, |user| {
            if let Some(name) = update.name {
                user.name = name;
            }
            if let Some(dob) = update.dob {
                user.dob = Some(dob);
            }
            if let Some(location) = update.location {
                user.location = Some(location);
            }
        })?;

        updated
            .map(|user| user.profile())
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))
    }

    /// Attach a new profile image reference
    ///
    /// The reference is opaque; it comes from the media store and is
    /// never interpreted here.
    ///
    /// # Errors
    ///
    /// - `ProfileError::EmptyReference` - reference is empty
    /// - `ProfileError::NotFound` - no user under the id
    pub fn update_profile_image(&self, user_id: &str, reference: &str) -> Result<UserProfile> {
        if reference.is_empty() {
            return Err(ProfileError::EmptyReference);
        }

        let updated = self.users.update_by_id(user_id, |user| {
            user.profile_img = Some(reference.to_string());
        })?;

        updated
            .map(|user| user.profile())
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))
    }

    /// Follow a user
    ///
    /// Adds the target to the follower's `following` list and the
    /// follower to the target's `followers` list, each only if absent.
    /// Repeated calls are no-ops. The follower id is trusted as already
    /// authenticated; a write against a missing document on either side
    /// is skipped with a warning rather than reported as failure.
    pub fn follow(&self, follower_id: &str, target_id: &str) -> Result<()> {
        let followed = self.users.update_by_id(follower_id, |user| {
            add_if_absent(&mut user.following, target_id);
        })?;
        if followed.is_none() {
            tracing::warn!("Follow source {} missing, edge not recorded", follower_id);
        }

        self.mirror_write(target_id, |user| {
            add_if_absent(&mut user.followers, follower_id);
        });

        Ok(())
    }

    /// Unfollow a user
    ///
    /// Symmetric removal with the same idempotent, best-effort shape as
    /// [`ProfileService::follow`].
    pub fn unfollow(&self, follower_id: &str, target_id: &str) -> Result<()> {
        let unfollowed = self.users.update_by_id(follower_id, |user| {
            user.following.retain(|id| id != target_id);
        })?;
        if unfollowed.is_none() {
            tracing::warn!("Unfollow source {} missing, edge not removed", follower_id);
        }

        self.mirror_write(target_id, |user| {
            user.followers.retain(|id| id != follower_id);
        });

        Ok(())
    }

    /// Second write of a follow/unfollow pair: never fails the operation
    fn mirror_write(&self, user_id: &str, patch: impl FnOnce(&mut User)) {
        match self.users.update_by_id(user_id, patch) {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::warn!("Mirror side {} missing, graph left one-sided", user_id);
            }
            Err(e) => {
                tracing::warn!("Mirror write for {} failed, graph left one-sided: {}", user_id, e);
            }
        }
    }
}

fn add_if_absent(list: &mut Vec<String>, id: &str) {
    if !list.iter().any(|existing| existing == id) {
        list.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::DocumentStore;

    struct Fixture {
        service: ProfileService,
        users: Collection<User>,
    }

    fn fixture() -> Fixture {
        let store = DocumentStore::in_memory().unwrap();
        let users = store.collection::<User>(crate::USERS_COLLECTION).unwrap();
        Fixture { service: ProfileService::new(users.clone()), users }
    }

    fn seed_user(fx: &Fixture, username: &str) -> User {
        let user = User::new(username, format!("{username}@example.com"), username, "hash");
        fx.users.insert(&user.id, &user).unwrap();
        user
    }

    #[test]
    fn test_profile_fetch() {
        let fx = fixture();
        let alice = seed_user(&fx, "alice");

        let profile = fx.service.profile(&alice.id).unwrap();
        assert_eq!(profile.username, "alice");
    }

    #[test]
    fn test_profile_missing_user() {
        let fx = fixture();

        assert!(matches!(fx.service.profile("nope"), Err(ProfileError::NotFound(_))));
    }

    #[test]
    fn test_edit_profile_partial_update() {
        let fx = fixture();
        let alice = seed_user(&fx, "alice");

        let update = ProfileUpdate::new().with_name("Alice A.").with_location("Berlin");
        let profile = fx.service.edit_profile(&alice.id, update).unwrap();

        assert_eq!(profile.name, "Alice A.");
        assert_eq!(profile.location.as_deref(), Some("Berlin"));
        assert!(profile.dob.is_none());
        assert_eq!(profile.username, "alice");
    }

    #[test]
    fn test_edit_profile_missing_user() {
        let fx = fixture();

        let result = fx.service.edit_profile("nope", ProfileUpdate::new());
        assert!(matches!(result, Err(ProfileError::NotFound(_))));
    }

    #[test]
    fn test_update_profile_image() {
        let fx = fixture();
        let alice = seed_user(&fx, "alice");

        let profile = fx.service.update_profile_image(&alice.id, "abc.png").unwrap();
        assert_eq!(profile.profile_img.as_deref(), Some("abc.png"));
    }

    #[test]
    fn test_update_profile_image_empty_reference() {
        let fx = fixture();
        let alice = seed_user(&fx, "alice");

        let result = fx.service.update_profile_image(&alice.id, "");
        assert!(matches!(result, Err(ProfileError::EmptyReference)));
    }

    #[test]
    fn test_follow_is_symmetric() {
        let fx = fixture();
        let alice = seed_user(&fx, "alice");
        let bob = seed_user(&fx, "bob");

        fx.service.follow(&alice.id, &bob.id).unwrap();

        let alice = fx.users.find_by_id(&alice.id).unwrap().unwrap();
        let bob = fx.users.find_by_id(&bob.id).unwrap().unwrap();
        assert_eq!(alice.following, vec![bob.id.clone()]);
        assert_eq!(bob.followers, vec![alice.id]);
    }

    #[test]
    fn test_follow_twice_is_idempotent() {
        let fx = fixture();
        let alice = seed_user(&fx, "alice");
        let bob = seed_user(&fx, "bob");

        fx.service.follow(&alice.id, &bob.id).unwrap();
        fx.service.follow(&alice.id, &bob.id).unwrap();

        let alice = fx.users.find_by_id(&alice.id).unwrap().unwrap();
        let bob = fx.users.find_by_id(&bob.id).unwrap().unwrap();
        assert_eq!(alice.following.len(), 1);
        assert_eq!(bob.followers.len(), 1);
    }

    #[test]
    fn test_unfollow_removes_both_sides() {
        let fx = fixture();
        let alice = seed_user(&fx, "alice");
        let bob = seed_user(&fx, "bob");

        fx.service.follow(&alice.id, &bob.id).unwrap();
        fx.service.unfollow(&alice.id, &bob.id).unwrap();

        let alice = fx.users.find_by_id(&alice.id).unwrap().unwrap();
        let bob = fx.users.find_by_id(&bob.id).unwrap().unwrap();
        assert!(alice.following.is_empty());
        assert!(bob.followers.is_empty());
    }

    #[test]
    fn test_unfollow_without_follow_is_noop() {
        let fx = fixture();
        let alice = seed_user(&fx, "alice");
        let bob = seed_user(&fx, "bob");

        fx.service.unfollow(&alice.id, &bob.id).unwrap();

        let alice = fx.users.find_by_id(&alice.id).unwrap().unwrap();
        assert!(alice.following.is_empty());
    }

    #[test]
    fn test_follow_missing_target_leaves_one_sided_edge() {
        let fx = fixture();
        let alice = seed_user(&fx, "alice");

        fx.service.follow(&alice.id, "ghost").unwrap();

        let alice = fx.users.find_by_id(&alice.id).unwrap().unwrap();
        assert_eq!(alice.following, vec!["ghost"]);
    }

    #[test]
    fn test_mutual_follows_coexist() {
        let fx = fixture();
        let alice = seed_user(&fx, "alice");
        let bob = seed_user(&fx, "bob");

        fx.service.follow(&alice.id, &bob.id).unwrap();
        fx.service.follow(&bob.id, &alice.id).unwrap();

        let alice = fx.users.find_by_id(&alice.id).unwrap().unwrap();
        assert_eq!(alice.following, vec![bob.id.clone()]);
        assert_eq!(alice.followers, vec![bob.id]);
    }
}
