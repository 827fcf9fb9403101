use std::collections::BTreeMap;
use std::str::FromStr;

use brokerdesk_core::AppError;
use serde::{Deserialize, Serialize};

/// Role assigned to a user on provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to every section.
    Admin,
    /// View-only unless a section grants more.
    User,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Closed set of application sections that carry permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Landing dashboard and personal notifications.
    Dashboard,
    /// User administration.
    Users,
    /// Branch offices.
    Delegations,
    /// Insurers and their specifications.
    Companies,
    /// Product catalogue.
    Products,
    /// Product categories.
    Categories,
    /// Departments and their posts.
    Departments,
    /// News articles.
    News,
    /// Brokerage settings and system alerts.
    Settings,
}

impl Section {
    /// Returns all sections in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Section] = &[
            Section::Dashboard,
            Section::Users,
            Section::Delegations,
            Section::Companies,
            Section::Products,
            Section::Categories,
            Section::Departments,
            Section::News,
            Section::Settings,
        ];

        ALL
    }

    /// Returns a stable storage value for this section.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Users => "users",
            Self::Delegations => "delegations",
            Self::Companies => "companies",
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Departments => "departments",
            Self::News => "news",
            Self::Settings => "settings",
        }
    }
}

impl FromStr for Section {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|section| section.as_str() == value.trim())
            .ok_or_else(|| AppError::Validation(format!("unknown section '{value}'")))
    }
}

/// One gated action inside a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Read access.
    View,
    /// Create access.
    Create,
    /// Update access.
    Edit,
    /// Delete access.
    Delete,
}

impl Capability {
    /// Returns a stable label for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

/// The four capability flags of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySet {
    /// Read access.
    pub can_view: bool,
    /// Create access.
    pub can_create: bool,
    /// Update access.
    pub can_edit: bool,
    /// Delete access.
    pub can_delete: bool,
}

impl CapabilitySet {
    /// Every capability granted.
    #[must_use]
    pub fn all() -> Self {
        Self {
            can_view: true,
            can_create: true,
            can_edit: true,
            can_delete: true,
        }
    }

    /// Only read access.
    #[must_use]
    pub fn view_only() -> Self {
        Self {
            can_view: true,
            ..Self::default()
        }
    }

    /// Returns whether the capability is granted.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::View => self.can_view,
            Capability::Create => self.can_create,
            Capability::Edit => self.can_edit,
            Capability::Delete => self.can_delete,
        }
    }
}

/// Explicit per-section permission row stored for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPermission {
    /// Section the row applies to.
    pub section: Section,
    /// Flags granted in that section.
    pub capabilities: CapabilitySet,
}

/// Role plus explicit section rows, resolved on demand.
///
/// Admins hold every capability regardless of rows. Users fall back to
/// view-only for sections without an explicit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionMatrix {
    role: Role,
    #[serde(default)]
    overrides: BTreeMap<Section, CapabilitySet>,
}

impl PermissionMatrix {
    /// Builds the matrix for a role and its stored rows.
    #[must_use]
    pub fn for_role(role: Role, rows: &[SectionPermission]) -> Self {
        let overrides = rows
            .iter()
            .map(|row| (row.section, row.capabilities))
            .collect();

        Self { role, overrides }
    }

    /// Returns the role this matrix was built for.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the effective flags of one section.
    #[must_use]
    pub fn capabilities(&self, section: Section) -> CapabilitySet {
        match self.role {
            Role::Admin => CapabilitySet::all(),
            Role::User => self
                .overrides
                .get(&section)
                .copied()
                .unwrap_or_else(CapabilitySet::view_only),
        }
    }

    /// Returns whether the capability is granted in the section.
    #[must_use]
    pub fn allows(&self, section: Section, capability: Capability) -> bool {
        self.capabilities(section).allows(capability)
    }

    /// Returns the explicit rows, in section order.
    #[must_use]
    pub fn rows(&self) -> Vec<SectionPermission> {
        self.overrides
            .iter()
            .map(|(section, capabilities)| SectionPermission {
                section: *section,
                capabilities: *capabilities,
            })
            .collect()
    }

    /// Returns a copy with the role changed and rows kept.
    #[must_use]
    pub fn with_role(&self, role: Role) -> Self {
        Self {
            role,
            overrides: self.overrides.clone(),
        }
    }
}

/// Effective flags of every section, for list badges and menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSummary {
    /// Role the summary was resolved for.
    pub role: Role,
    /// Effective flags per section.
    pub sections: BTreeMap<Section, CapabilitySet>,
}

impl PermissionSummary {
    /// Sections where the capability is granted.
    #[must_use]
    pub fn sections_with(&self, capability: Capability) -> Vec<Section> {
        self.sections
            .iter()
            .filter_map(|(section, set)| set.allows(capability).then_some(*section))
            .collect()
    }
}

impl From<&PermissionMatrix> for PermissionSummary {
    fn from(value: &PermissionMatrix) -> Self {
        Self {
            role: value.role(),
            sections: Section::all()
                .iter()
                .map(|section| (*section, value.capabilities(*section)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{
        Capability, CapabilitySet, PermissionMatrix, PermissionSummary, Role, Section,
        SectionPermission,
    };

    fn any_section() -> impl Strategy<Value = Section> {
        proptest::sample::select(Section::all().to_vec())
    }

    fn any_capabilities() -> impl Strategy<Value = CapabilitySet> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(can_view, can_create, can_edit, can_delete)| CapabilitySet {
                can_view,
                can_create,
                can_edit,
                can_delete,
            },
        )
    }

    proptest! {
        #[test]
        fn admin_has_every_capability_whatever_the_rows(
            rows in proptest::collection::vec((any_section(), any_capabilities()), 0..6)
        ) {
            let rows: Vec<SectionPermission> = rows
                .into_iter()
                .map(|(section, capabilities)| SectionPermission { section, capabilities })
                .collect();
            let matrix = PermissionMatrix::for_role(Role::Admin, &rows);

            for section in Section::all() {
                prop_assert_eq!(matrix.capabilities(*section), CapabilitySet::all());
            }
        }

        #[test]
        fn user_rows_win_for_their_section_only(
            section in any_section(),
            capabilities in any_capabilities(),
        ) {
            let matrix = PermissionMatrix::for_role(
                Role::User,
                &[SectionPermission { section, capabilities }],
            );

            for other in Section::all() {
                let expected = if *other == section {
                    capabilities
                } else {
                    CapabilitySet::view_only()
                };
                prop_assert_eq!(matrix.capabilities(*other), expected);
            }
        }
    }

    #[test]
    fn user_without_rows_is_view_only() {
        let matrix = PermissionMatrix::for_role(Role::User, &[]);

        for section in Section::all() {
            assert!(matrix.allows(*section, Capability::View));
            assert!(!matrix.allows(*section, Capability::Create));
            assert!(!matrix.allows(*section, Capability::Edit));
            assert!(!matrix.allows(*section, Capability::Delete));
        }
    }

    #[test]
    fn summary_lists_sections_per_capability_without_merging() {
        let matrix = PermissionMatrix::for_role(
            Role::User,
            &[SectionPermission {
                section: Section::News,
                capabilities: CapabilitySet {
                    can_view: true,
                    can_create: true,
                    can_edit: false,
                    can_delete: false,
                },
            }],
        );
        let summary = PermissionSummary::from(&matrix);

        assert_eq!(summary.sections_with(Capability::Create), vec![Section::News]);
        assert!(summary.sections_with(Capability::Delete).is_empty());
        assert_eq!(
            summary.sections_with(Capability::View).len(),
            Section::all().len()
        );
    }

    #[test]
    fn matrix_serializes_sections_as_keys() -> Result<(), serde_json::Error> {
        let matrix = PermissionMatrix::for_role(
            Role::User,
            &[SectionPermission {
                section: Section::Products,
                capabilities: CapabilitySet::all(),
            }],
        );
        let value = serde_json::to_value(&matrix)?;

        assert_eq!(value["role"], "user");
        assert_eq!(value["overrides"]["products"]["canDelete"], true);
        let restored: PermissionMatrix = serde_json::from_value(value)?;
        assert_eq!(restored, matrix);
        Ok(())
    }
}
