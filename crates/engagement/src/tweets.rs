//! Tweet creation, retrieval, and deletion
//!
//! This module provides the tweet lifecycle: posting, single and feed
//! retrieval, and deletion with the one-level reply-unlink cascade.

use storage::{Collection, StorageError};
use thiserror::Error;

use crate::models::Tweet;

/// Tweet service error types
#[derive(Debug, Error)]
pub enum TweetError {
    /// Tweet text missing or empty
    #[error("Text is required for creating a tweet")]
    EmptyText,

    /// Tweet not found
    #[error("Tweet not found: {0}")]
    NotFound(String),

    /// Document store error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for tweet operations
pub type Result<T> = std::result::Result<T, TweetError>;

/// Tweet service
///
/// # Example
///
/// ```rust,no_run
/// use engagement::tweets::TweetService;
/// use storage::DocumentStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = DocumentStore::in_memory()?;
/// let service = TweetService::new(store.collection(engagement::TWEETS_COLLECTION)?);
///
/// let tweet = service.create_tweet("user-1", "hello world", None)?;
/// assert_eq!(service.tweet(&tweet.id)?.text, "hello world");
/// # Ok(())
/// # }
/// ```
pub struct TweetService {
    tweets: Collection<Tweet>,
}

impl TweetService {
    /// Create a new tweet service over the given collection
    pub fn new(tweets: Collection<Tweet>) -> Self {
        Self { tweets }
    }

    /// Post a new tweet
    ///
    /// The author id is trusted as already authenticated. The image
    /// reference, if any, is attached verbatim.
    ///
    /// # Errors
    ///
    /// - `TweetError::EmptyText` - text is empty
    pub fn create_tweet(
        &self,
        author_id: &str,
        text: &str,
        image: Option<String>,
    ) -> Result<Tweet> {
        if text.is_empty() {
            return Err(TweetError::EmptyText);
        }

        let tweet = Tweet::new(author_id, text, image);
        self.tweets.insert(&tweet.id, &tweet)?;

        Ok(tweet)
    }

    /// Fetch a single tweet by id
    pub fn tweet(&self, id: &str) -> Result<Tweet> {
        self.tweets
            .find_by_id(id)?
            .ok_or_else(|| TweetError::NotFound(id.to_string()))
    }

    /// All tweets, newest first
    ///
    /// With `exclude_replies`, replies are filtered out and only
    /// top-level tweets remain.
    pub fn timeline(&self, exclude_replies: bool) -> Result<Vec<Tweet>> {
        let mut tweets = if exclude_replies {
            self.tweets.find_where(|t| !t.is_reply)?
        } else {
            self.tweets.find_all()?
        };

        tweets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tweets)
    }

    /// All tweets by one author, newest first
    pub fn tweets_by(&self, user_id: &str) -> Result<Vec<Tweet>> {
        let mut tweets = self.tweets.find_where(|t| t.user == user_id)?;
        tweets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tweets)
    }

    /// Delete a tweet
    ///
    /// Deleting a reply removes its id from the parent's reply list; a
    /// missing parent is ignored. Deleting a parent leaves its replies
    /// in place with dangling parent pointers, an accepted state that
    /// readers tolerate. The cascade is one level only, never recursive.
    ///
    /// # Errors
    ///
    /// - `TweetError::NotFound` - no tweet under the id
    pub fn delete_tweet(&self, id: &str) -> Result<()> {
        let deleted = self
            .tweets
            .delete_by_id(id)?
            .ok_or_else(|| TweetError::NotFound(id.to_string()))?;

        if deleted.is_reply {
            if let Some(parent_id) = &deleted.reply_to {
                match self.tweets.update_by_id(parent_id, |parent| {
                    parent.replies.retain(|reply_id| reply_id != id);
                }) {
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Failed to unlink reply {} from parent {}: {}", id, parent_id, e);
                    }
                }
            }
        }

        Ok(())
    }
}
