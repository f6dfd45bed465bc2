pub mod prelude;

pub mod auth_tokens;
pub mod blog_settings;
pub mod global_settings;
pub mod landing_pages;
pub mod pages;
pub mod posts;
pub mod users;
