//! Domain records, permission rules and invariants.

#![forbid(unsafe_code)]

mod brokerage;
mod catalog;
mod company;
mod news;
mod notification;
mod organization;
mod permissions;
mod resource;
mod user;

pub use brokerage::{
    BrokerageConfig, BrokerageConfigInput, NavigationShortcut, TerminologyEntry, ThemeColors,
};
pub use catalog::{
    CategoryHierarchy, Product, ProductCategory, ProductCategoryDraft, ProductCategoryPatch,
    ProductDocument, ProductDraft, ProductPatch,
};
pub use company::{
    Company, CompanyDraft, CompanyPatch, CompanySpecification, CompanySpecificationDraft,
    CompanySpecificationPatch, SpecificationCategory, SpecificationCategoryDraft,
    SpecificationCategoryPatch,
};
pub use news::{News, NewsDraft, NewsPatch};
pub use notification::{
    AlertSeverity, Notification, NotificationDraft, NotificationPatch, SystemAlert,
    SystemAlertDraft, SystemAlertPatch,
};
pub use organization::{
    Delegation, DelegationDraft, DelegationPatch, Department, DepartmentContent,
    DepartmentContentDraft, DepartmentContentPatch, DepartmentDraft, DepartmentPatch,
};
pub use permissions::{
    Capability, CapabilitySet, PermissionMatrix, PermissionSummary, Role, Section,
    SectionPermission,
};
pub use resource::{Resource, ResourceKind, sort_records};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserProfile, UserProfilePatch,
    validate_password,
};
