pub mod engagement;
pub mod leaderboard;
pub mod listing;
pub mod notification;
pub mod post;
pub mod user;
pub mod validation;
