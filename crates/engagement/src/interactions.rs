//! Tweet interactions (like, unlike, retweet)
//!
//! Likes are an unordered set with reject-duplicate semantics: a second
//! like from the same user is a conflict, not a no-op. Retweets follow
//! the same duplicate policy but keep append order, which makes "who
//! retweeted this last" answerable. This is deliberately asymmetric with
//! follows, which are idempotent; see [`crate::profiles`].

use storage::{Collection, StorageError};
use thiserror::Error;

use crate::models::{Tweet, User};

/// Interaction service error types
#[derive(Debug, Error)]
pub enum InteractionError {
    /// Tweet not found
    #[error("Tweet not found: {0}")]
    TweetNotFound(String),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// User already liked this tweet
    #[error("Tweet already liked")]
    AlreadyLiked,

    /// User already retweeted this tweet
    #[error("Tweet already retweeted")]
    AlreadyRetweeted,

    /// Tweet has no retweets
    #[error("No retweets found for the tweet")]
    NoRetweets,

    /// Document store error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for interaction operations
pub type Result<T> = std::result::Result<T, InteractionError>;

/// Interaction service
///
/// # Example
///
/// ```rust,no_run
/// use engagement::interactions::InteractionService;
/// use storage::DocumentStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = DocumentStore::in_memory()?;
/// let service = InteractionService::new(
///     store.collection(engagement::TWEETS_COLLECTION)?,
///     store.collection(engagement::USERS_COLLECTION)?,
/// );
///
/// service.like("tweet-1", "user-1")?;
/// # Ok(())
/// # }
/// ```
pub struct InteractionService {
    tweets: Collection<Tweet>,
    users: Collection<User>,
}

impl InteractionService {
    /// Create a new interaction service over the given collections
    pub fn new(tweets: Collection<Tweet>, users: Collection<User>) -> Self {
        Self { tweets, users }
    }

    /// Like a tweet
    ///
    /// # Errors
    ///
    /// - `InteractionError::TweetNotFound` - no tweet under the id
    /// - `InteractionError::AlreadyLiked` - the user already liked it
    pub fn like(&self, tweet_id: &str, user_id: &str) -> Result<()> {
        let tweet = self.tweet(tweet_id)?;

        if tweet.likes.iter().any(|id| id == user_id) {
            return Err(InteractionError::AlreadyLiked);
        }

        self.tweets.update_by_id(tweet_id, |tweet| {
            tweet.likes.push(user_id.to_string());
        })?;

        Ok(())
    }

    /// Remove a like from a tweet
    ///
    /// Removing a like that was never there is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// - `InteractionError::TweetNotFound` - no tweet under the id
    pub fn unlike(&self, tweet_id: &str, user_id: &str) -> Result<()> {
        self.tweet(tweet_id)?;

        self.tweets.update_by_id(tweet_id, |tweet| {
            tweet.likes.retain(|id| id != user_id);
        })?;

        Ok(())
    }

    /// Retweet a tweet
    ///
    /// Appends the user to the tweet's retweet sequence, preserving
    /// order.
    ///
    /// # Errors
    ///
    /// - `InteractionError::UserNotFound` - no user under `user_id`
    /// - `InteractionError::TweetNotFound` - no tweet under the id
    /// - `InteractionError::AlreadyRetweeted` - the user already
    ///   retweeted it
    pub fn retweet(&self, tweet_id: &str, user_id: &str) -> Result<()> {
        if self.users.find_by_id(user_id)?.is_none() {
            return Err(InteractionError::UserNotFound(user_id.to_string()));
        }

        let tweet = self.tweet(tweet_id)?;

        if tweet.retweets.iter().any(|id| id == user_id) {
            return Err(InteractionError::AlreadyRetweeted);
        }

        self.tweets.update_by_id(tweet_id, |tweet| {
            tweet.retweets.push(user_id.to_string());
        })?;

        Ok(())
    }

    /// Username of the most recent retweeter of a tweet
    ///
    /// "Most recent" means the last entry of the append-only retweet
    /// sequence.
    ///
    /// # Errors
    ///
    /// - `InteractionError::TweetNotFound` - no tweet under the id
    /// - `InteractionError::NoRetweets` - the tweet has no retweets
    /// - `InteractionError::UserNotFound` - the last retweeter's user
    ///   document is gone
    pub fn last_retweeter(&self, tweet_id: &str) -> Result<String> {
        let tweet = self.tweet(tweet_id)?;

        let last_id = tweet.retweets.last().ok_or(InteractionError::NoRetweets)?;

        let user = self
            .users
            .find_by_id(last_id)?
            .ok_or_else(|| InteractionError::UserNotFound(last_id.clone()))?;

        Ok(user.username)
    }

    fn tweet(&self, tweet_id: &str) -> Result<Tweet> {
        self.tweets
            .find_by_id(tweet_id)?
            .ok_or_else(|| InteractionError::TweetNotFound(tweet_id.to_string()))
    }
}
