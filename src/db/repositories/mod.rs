pub mod page;
pub mod post;
pub mod settings;
pub mod token;
pub mod user;
