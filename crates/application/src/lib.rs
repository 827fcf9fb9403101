//! Application services and ports.

#![forbid(unsafe_code)]

mod brokerage_config_service;
mod cascade_service;
mod category_service;
pub mod client;
mod contact_service;
pub mod csv_import;
mod department_service;
mod integration_ports;
mod news_service;
mod notification_service;
mod permission_service;
mod resource_ports;
mod resource_service;
mod specification_service;
mod upload_service;
mod user_ports;
mod user_service;

#[cfg(test)]
mod test_support;

pub use brokerage_config_service::BrokerageConfigService;
pub use cascade_service::{CascadeParts, CascadeService};
pub use category_service::CategoryService;
pub use contact_service::ContactService;
pub use csv_import::{CsvImportable, ImportOutcome, ImportPreview};
pub use department_service::DepartmentService;
pub use integration_ports::{
    BrokerageConfigRepository, Bucket, ContactMessage, ContactRelay, ObjectStorage, StoredObject,
};
pub use news_service::{NewsLink, NewsService};
pub use notification_service::NotificationService;
pub use permission_service::PermissionService;
pub use resource_ports::{ChangeEvent, ChangeKind, ChangePublisher, DataSource, DiscardChanges};
pub use resource_service::ResourceService;
pub use specification_service::SpecificationService;
pub use upload_service::{MAX_UPLOAD_BYTES, Upload, UploadService};
pub use user_ports::{PasswordHasher, UserAccount, UserDirectory};
pub use user_service::{AuthOutcome, ProvisionUser, UserListing, UserService};
