pub mod ai;
pub mod auth_service;
pub mod auth_service_impl;
pub mod storage;

pub use ai::{AiService, CannedAiService, DraftData, Generation};
pub use auth_service::{AuthError, AuthService, Identity, LoginResult, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;
pub use storage::{LocalObjectStorage, ObjectStorage, S3ObjectStorage, StorageError};
