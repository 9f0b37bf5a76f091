pub mod auth;
pub mod blogs;
pub mod engagement;
pub mod events;
pub mod leaderboard;
pub mod notifications;
pub mod posts;
pub mod properties;
pub mod search;
pub mod service_listings;
pub mod users;
