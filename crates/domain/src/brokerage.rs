use std::collections::BTreeMap;

use brokerdesk_core::{AppResult, NonEmptyString};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ResourceKind;

/// Palette of one theme variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

impl ThemeColors {
    fn light() -> Self {
        Self {
            primary: "#1d4ed8".to_owned(),
            secondary: "#64748b".to_owned(),
            accent: "#f59e0b".to_owned(),
        }
    }

    fn dark() -> Self {
        Self {
            primary: "#60a5fa".to_owned(),
            secondary: "#94a3b8".to_owned(),
            accent: "#fbbf24".to_owned(),
        }
    }
}

/// Display-name override for one resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminologyEntry {
    /// Singular label, e.g. "Aseguradora".
    pub singular: String,
    /// Plural label, e.g. "Aseguradoras".
    pub plural: String,
}

/// Quick link pinned on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct NavigationShortcut {
    pub label: String,
    pub route: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub order: i32,
}

/// Tenant-wide settings. One per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerageConfig {
    /// Brokerage name shown in the header.
    pub name: String,
    /// Logo URL, empty when unset.
    #[serde(default)]
    pub logo_url: String,
    /// Contact email.
    #[serde(default)]
    pub contact_email: String,
    /// Contact phone.
    #[serde(default)]
    pub contact_phone: String,
    /// Postal address.
    #[serde(default)]
    pub address: String,
    /// Light theme palette.
    pub light_theme: ThemeColors,
    /// Dark theme palette.
    pub dark_theme: ThemeColors,
    /// Display-name overrides per kind.
    #[serde(default)]
    pub terminology: BTreeMap<ResourceKind, TerminologyEntry>,
    /// Dashboard shortcuts, sorted by order.
    #[serde(default)]
    pub navigation_shortcuts: Vec<NavigationShortcut>,
    /// Last update time, `None` until first saved.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for BrokerageConfig {
    fn default() -> Self {
        Self {
            name: "Mi Correduría".to_owned(),
            logo_url: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            address: String::new(),
            light_theme: ThemeColors::light(),
            dark_theme: ThemeColors::dark(),
            terminology: BTreeMap::new(),
            navigation_shortcuts: Vec::new(),
            updated_at: None,
        }
    }
}

impl BrokerageConfig {
    /// Builds a validated configuration from user input.
    pub fn from_input(input: BrokerageConfigInput, now: DateTime<Utc>) -> AppResult<Self> {
        let name = NonEmptyString::new(input.name)?;
        let terminology = input
            .terminology
            .into_iter()
            .filter_map(|(kind, entry)| {
                let singular = entry.singular.trim().to_owned();
                let plural = entry.plural.trim().to_owned();
                (!singular.is_empty() || !plural.is_empty())
                    .then_some((kind, TerminologyEntry { singular, plural }))
            })
            .collect();
        let mut navigation_shortcuts: Vec<NavigationShortcut> = input
            .navigation_shortcuts
            .into_iter()
            .filter(|shortcut| {
                !shortcut.label.trim().is_empty() && shortcut.route.starts_with('/')
            })
            .collect();
        navigation_shortcuts.sort_by_key(|shortcut| shortcut.order);

        Ok(Self {
            name: name.into(),
            logo_url: input.logo_url.trim().to_owned(),
            contact_email: input.contact_email.trim().to_owned(),
            contact_phone: input.contact_phone.trim().to_owned(),
            address: input.address,
            light_theme: input.light_theme.unwrap_or_else(ThemeColors::light),
            dark_theme: input.dark_theme.unwrap_or_else(ThemeColors::dark),
            terminology,
            navigation_shortcuts,
            updated_at: Some(now),
        })
    }

    /// Returns the display name of a kind, honouring overrides.
    #[must_use]
    pub fn display_name(&self, kind: ResourceKind, plural: bool) -> String {
        let entry = self.terminology.get(&kind);
        let overridden = entry.map(|entry| {
            if plural {
                entry.plural.as_str()
            } else {
                entry.singular.as_str()
            }
        });

        match overridden.filter(|value| !value.is_empty()) {
            Some(value) => value.to_owned(),
            None if plural => kind.default_plural().to_owned(),
            None => kind.default_singular().to_owned(),
        }
    }
}

/// Settings form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct BrokerageConfigInput {
    pub name: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub light_theme: Option<ThemeColors>,
    #[serde(default)]
    pub dark_theme: Option<ThemeColors>,
    #[serde(default)]
    pub terminology: BTreeMap<ResourceKind, TerminologyEntry>,
    #[serde(default)]
    pub navigation_shortcuts: Vec<NavigationShortcut>,
}
