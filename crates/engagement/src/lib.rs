//! Engagement core for Murmur
//!
//! This crate owns the rules keeping tweets, replies, likes, retweets,
//! and follow edges mutually consistent across independent update
//! operations, plus the account and profile surface around them. An HTTP
//! layer is expected to sit on top; nothing here touches the wire.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accounts;
pub mod interactions;
pub mod models;
pub mod profiles;
pub mod replies;
pub mod tweets;

pub use accounts::{AccountService, AuthenticatedUser, LoginParams, RegisterParams};
pub use interactions::InteractionService;
pub use models::{Tweet, User, UserProfile};
pub use profiles::{ProfileService, ProfileUpdate};
pub use replies::ReplyService;
pub use tweets::TweetService;

/// Collection name for user documents
pub const USERS_COLLECTION: &str = "users";

/// Collection name for tweet documents
pub const TWEETS_COLLECTION: &str = "tweets";
