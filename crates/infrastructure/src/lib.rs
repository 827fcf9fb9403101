//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod broadcast_change_feed;
mod console_contact_relay;
pub mod demo_seed;
mod filesystem_object_storage;
mod http_contact_relay;
mod http_data_source;
mod local_brokerage_config_repository;
mod local_data_source;
mod local_storage;
mod local_user_directory;
mod postgres_brokerage_config_repository;
mod postgres_data_source;
mod postgres_news_data_source;
mod postgres_user_directory;
mod rows;

pub use argon2_password_hasher::{Argon2PasswordHasher, LOCKED_PASSWORD};
pub use broadcast_change_feed::BroadcastChangeFeed;
pub use console_contact_relay::ConsoleContactRelay;
pub use filesystem_object_storage::FilesystemObjectStorage;
pub use http_contact_relay::HttpContactRelay;
pub use http_data_source::{HttpDataSource, sign_in, start_demo_session};
pub use local_brokerage_config_repository::LocalBrokerageConfigRepository;
pub use local_data_source::LocalDataSource;
pub use local_storage::LocalStorage;
pub use local_user_directory::LocalUserDirectory;
pub use postgres_brokerage_config_repository::PostgresBrokerageConfigRepository;
pub use postgres_data_source::PostgresDataSource;
pub use postgres_news_data_source::PostgresNewsDataSource;
pub use postgres_user_directory::PostgresUserDirectory;
pub use rows::{SqlValue, TableRecord};
