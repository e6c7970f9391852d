//! Document models for the engagement graph
//!
//! Users and tweets are stored as JSON documents with camelCase field
//! names, addressed by UUID string ids. Follow edges live as mirrored
//! membership lists on the two user documents involved; engagement state
//! (likes, retweets, reply links) lives on the tweet documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user
///
/// `followers` and `following` hold user ids with set semantics: every
/// follow operation adds to both sides, every unfollow removes from both,
/// and neither list ever holds duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document id
    pub id: String,
    /// Display name
    pub name: String,
    /// Unique username
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Bcrypt password hash
    pub password_hash: String,
    /// Profile image reference (opaque, supplied by the media store)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_img: Option<String>,
    /// Date of birth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    /// Location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Ids of users following this user
    #[serde(default)]
    pub followers: Vec<String>,
    /// Ids of users this user follows
    #[serde(default)]
    pub following: Vec<String>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a generated id and empty graph edges
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            profile_img: None,
            dob: None,
            location: None,
            followers: Vec::new(),
            following: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Outward-facing view of this user, without the password hash
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            profile_img: self.profile_img.clone(),
            dob: self.dob.clone(),
            location: self.location.clone(),
            followers: self.followers.clone(),
            following: self.following.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public view of a user, safe to hand to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Document id
    pub id: String,
    /// Display name
    pub name: String,
    /// Unique username
    pub username: String,
    /// Email address
    pub email: String,
    /// Profile image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_img: Option<String>,
    /// Date of birth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    /// Location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Ids of users following this user
    pub followers: Vec<String>,
    /// Ids of users this user follows
    pub following: Vec<String>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

/// A tweet, reply, or retweeted post
///
/// `likes` is an unordered set of user ids. `retweets` is append-only
/// and its order is load-bearing: the last element identifies the most
/// recent retweeter. A reply carries `reply_to` and appears in the
/// parent's `replies` list; the two pointers are kept in agreement by
/// the reply and deletion operations, best effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    /// Document id
    pub id: String,
    /// Tweet text
    pub text: String,
    /// Author user id
    pub user: String,
    /// Attached image reference (opaque, supplied by the media store)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Ids of users who liked this tweet
    #[serde(default)]
    pub likes: Vec<String>,
    /// Ids of users who retweeted this tweet, in retweet order
    #[serde(default)]
    pub retweets: Vec<String>,
    /// Whether this tweet is a reply
    #[serde(default)]
    pub is_reply: bool,
    /// Parent tweet id, present iff `is_reply`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    /// Ids of direct replies to this tweet
    #[serde(default)]
    pub replies: Vec<String>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

impl Tweet {
    /// Create a new top-level tweet
    pub fn new(author_id: impl Into<String>, text: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            user: author_id.into(),
            image,
            likes: Vec::new(),
            retweets: Vec::new(),
            is_reply: false,
            reply_to: None,
            replies: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Create a reply to the given parent tweet
    pub fn reply(
        author_id: impl Into<String>,
        text: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            is_reply: true,
            reply_to: Some(parent_id.into()),
            ..Self::new(author_id, text, None)
        }
    }
}
