//! Reply threads
//!
//! A reply is a tweet with its `reply_to` pointer set; the parent holds
//! the reply's id in its `replies` list. This module creates replies,
//! maintains that bidirectional link, and resolves a tweet's replies.

use storage::{Collection, StorageError};
use thiserror::Error;

use crate::models::Tweet;

/// Reply service error types
#[derive(Debug, Error)]
pub enum ReplyError {
    /// Reply text missing or empty
    #[error("Text is required for creating a reply")]
    EmptyText,

    /// Tweet not found
    #[error("Tweet not found: {0}")]
    NotFound(String),

    /// Document store error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for reply operations
pub type Result<T> = std::result::Result<T, ReplyError>;

/// Reply service
pub struct ReplyService {
    tweets: Collection<Tweet>,
}

impl ReplyService {
    /// Create a new reply service over the given collection
    pub fn new(tweets: Collection<Tweet>) -> Self {
        Self { tweets }
    }

    /// Reply to a tweet
    ///
    /// The reply document is persisted first and the parent's reply list
    /// is extended second. If the parent turns out to be absent the reply
    /// is left in place unreferenced rather than rolled back; readers
    /// skip such orphans.
    ///
    /// # Errors
    ///
    /// - `ReplyError::EmptyText` - text is empty
    /// - `ReplyError::NotFound` - parent absent (the reply persists as an
    ///   orphan)
    pub fn create_reply(&self, parent_id: &str, author_id: &str, text: &str) -> Result<Tweet> {
        if text.is_empty() {
            return Err(ReplyError::EmptyText);
        }

        let reply = Tweet::reply(author_id, text, parent_id);
        self.tweets.insert(&reply.id, &reply)?;

        let linked = self.tweets.update_by_id(parent_id, |parent| {
            parent.replies.push(reply.id.clone());
        })?;

        if linked.is_none() {
            return Err(ReplyError::NotFound(parent_id.to_string()));
        }

        Ok(reply)
    }

    /// Direct replies to a tweet, newest first
    ///
    /// Reply ids that no longer resolve to a document (deleted out of
    /// band, or never linked) are skipped.
    ///
    /// # Errors
    ///
    /// - `ReplyError::NotFound` - no tweet under `tweet_id`
    pub fn replies_of(&self, tweet_id: &str) -> Result<Vec<Tweet>> {
        let parent = self
            .tweets
            .find_by_id(tweet_id)?
            .ok_or_else(|| ReplyError::NotFound(tweet_id.to_string()))?;

        let mut replies = Vec::with_capacity(parent.replies.len());
        for reply_id in &parent.replies {
            if let Some(reply) = self.tweets.find_by_id(reply_id)? {
                replies.push(reply);
            }
        }

        replies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(replies)
    }
}
