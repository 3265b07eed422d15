pub mod content;
pub mod question;
pub mod user;
