pub use super::auth_tokens::Entity as AuthTokens;
pub use super::blog_settings::Entity as BlogSettings;
pub use super::global_settings::Entity as GlobalSettings;
pub use super::landing_pages::Entity as LandingPages;
pub use super::pages::Entity as Pages;
pub use super::posts::Entity as Posts;
pub use super::users::Entity as Users;
