//! Fixed example records the demo blob starts with.

use std::collections::BTreeMap;

use brokerdesk_core::{RecordId, TenantId, UserIdentity};
use brokerdesk_domain::{
    AlertSeverity, BrokerageConfig, CapabilitySet, Company, CompanyDraft, CompanySpecification,
    CompanySpecificationDraft, Delegation, DelegationDraft, Department, DepartmentContent,
    DepartmentContentDraft, DepartmentDraft, EmailAddress, News, NewsDraft, Notification,
    NotificationDraft, PermissionMatrix, Product, ProductCategory, ProductCategoryDraft,
    ProductDraft, Resource, Role, Section, SectionPermission, SpecificationCategory,
    SpecificationCategoryDraft, SystemAlert, SystemAlertDraft, UserProfile,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::argon2_password_hasher::LOCKED_PASSWORD;
use crate::local_brokerage_config_repository::CONFIG_KEY;
use crate::local_user_directory::{ACCOUNTS_KEY, StoredAccount};

/// Login email of the seeded demo administrator.
pub const DEMO_ADMIN_EMAIL: &str = "demo@correduria.es";

const DEMO_ADMIN_NAME: &str = "Demo Administrador";
const DEMO_BROKERAGE_NAME: &str = "Correduría Demo";

/// Tenant of the demo workspace.
#[must_use]
pub fn demo_tenant_id() -> TenantId {
    TenantId::from_uuid(Uuid::from_u128(0xde30_0000_0000_4000_8000_0000_0000_0001))
}

/// Id of the seeded demo administrator.
#[must_use]
pub fn demo_admin_id() -> RecordId {
    fixed_id(0x0100)
}

/// Session identity of the demo administrator.
#[must_use]
pub fn demo_admin_identity() -> UserIdentity {
    UserIdentity::new(
        demo_admin_id().to_string(),
        DEMO_ADMIN_NAME,
        Some(DEMO_ADMIN_EMAIL.to_owned()),
        demo_tenant_id(),
    )
}

fn fixed_id(sequence: u128) -> RecordId {
    RecordId::from_uuid(Uuid::from_u128(0xde30_0000_0000_4000_8000_0000_0000_0000 | sequence))
}

fn seeded_at(days: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_704_103_200, 0).unwrap_or_default() + Duration::days(days)
}

fn collection<T: Serialize>(records: &[T]) -> Value {
    serde_json::to_value(records).unwrap_or_else(|_| Value::Array(Vec::new()))
}

fn seeded<T: Resource>(sequence: u128, days: i64, draft: T::Draft) -> T {
    T::from_draft(fixed_id(sequence), draft, seeded_at(days))
}

fn account(
    sequence: u128,
    name: &str,
    email: &str,
    permissions: PermissionMatrix,
) -> Option<StoredAccount> {
    let created_at = seeded_at(0);
    Some(StoredAccount {
        tenant_id: demo_tenant_id(),
        profile: UserProfile {
            id: fixed_id(sequence),
            name: name.to_owned(),
            email: EmailAddress::new(email).ok()?,
            delegation_id: Some(fixed_id(0x0200)),
            permissions,
            avatar_url: String::new(),
            created_at,
            updated_at: created_at,
        },
        password_hash: LOCKED_PASSWORD.to_owned(),
    })
}

fn accounts() -> Vec<StoredAccount> {
    let agent_rows = [
        SectionPermission {
            section: Section::Products,
            capabilities: CapabilitySet {
                can_view: true,
                can_create: true,
                can_edit: true,
                can_delete: false,
            },
        },
        SectionPermission {
            section: Section::News,
            capabilities: CapabilitySet::all(),
        },
    ];

    [
        account(
            0x0100,
            DEMO_ADMIN_NAME,
            DEMO_ADMIN_EMAIL,
            PermissionMatrix::for_role(Role::Admin, &[]),
        ),
        account(
            0x0101,
            "Marta Ruiz",
            "marta.ruiz@correduria.es",
            PermissionMatrix::for_role(Role::User, &agent_rows),
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn delegations() -> Vec<Delegation> {
    vec![
        seeded(
            0x0200,
            0,
            DelegationDraft {
                name: "Madrid Centro".to_owned(),
                legal_name: "Correduría Demo Madrid S.L.".to_owned(),
                address: "Calle Mayor 10, 28013 Madrid".to_owned(),
                phone: "+34 910 000 000".to_owned(),
                email: "madrid@correduria.es".to_owned(),
                contact_person: "Luis Gómez".to_owned(),
                website: None,
            },
        ),
        seeded(
            0x0201,
            1,
            DelegationDraft {
                name: "Valencia".to_owned(),
                legal_name: "Correduría Demo Levante S.L.".to_owned(),
                address: "Avenida del Puerto 25, 46023 Valencia".to_owned(),
                phone: "+34 960 000 000".to_owned(),
                email: "valencia@correduria.es".to_owned(),
                contact_person: "Elena Navarro".to_owned(),
                website: None,
            },
        ),
    ]
}

fn companies() -> Vec<Company> {
    [
        (0x0300, "Aseguradora Atlántica", "Portal de mediadores con usuario propio"),
        (0x0301, "Mutua Mediterránea", "Acceso a través de la plataforma EIAC"),
        (0x0302, "Vida Norte Seguros", "Solicitar alta al gestor comercial"),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (sequence, name, access))| {
        seeded(
            sequence,
            i64::try_from(index).unwrap_or_default(),
            CompanyDraft {
                name: name.to_owned(),
                broker_access: access.to_owned(),
                commercial_manager: "Gestor comercial".to_owned(),
                manager_email: format!("gestor{index}@aseguradora.es"),
                website: None,
            },
        )
    })
    .collect()
}

fn specification_categories() -> Vec<SpecificationCategory> {
    vec![seeded(
        0x0400,
        2,
        SpecificationCategoryDraft {
            company_id: fixed_id(0x0300),
            name: "Hogar".to_owned(),
            order: 1,
        },
    )]
}

fn specifications() -> Vec<CompanySpecification> {
    vec![
        seeded(
            0x0410,
            2,
            CompanySpecificationDraft {
                company_id: fixed_id(0x0300),
                category_id: Some(fixed_id(0x0400)),
                title: "Coberturas de daños por agua".to_owned(),
                content: "<p>Incluye localización y reparación de fugas.</p>".to_owned(),
                order: 1,
            },
        ),
        seeded(
            0x0411,
            3,
            CompanySpecificationDraft {
                company_id: fixed_id(0x0300),
                category_id: None,
                title: "Plazos de tramitación".to_owned(),
                content: "<p>Peritación en 72 horas.</p>".to_owned(),
                order: 2,
            },
        ),
    ]
}

fn product_categories() -> Vec<ProductCategory> {
    vec![
        seeded(
            0x0500,
            0,
            ProductCategoryDraft {
                name: "Particulares".to_owned(),
                description: Some("Seguros para personas y familias".to_owned()),
                parent_id: None,
                level: 1,
            },
        ),
        seeded(
            0x0501,
            0,
            ProductCategoryDraft {
                name: "Hogar".to_owned(),
                description: None,
                parent_id: Some(fixed_id(0x0500)),
                level: 2,
            },
        ),
        seeded(
            0x0502,
            0,
            ProductCategoryDraft {
                name: "Empresas".to_owned(),
                description: None,
                parent_id: None,
                level: 1,
            },
        ),
    ]
}

fn products() -> Vec<Product> {
    [
        (0x0600, "Hogar Esencial", 0x0501, 0x0300),
        (0x0601, "Vida Riesgo", 0x0500, 0x0302),
        (0x0602, "Responsabilidad Civil Pyme", 0x0502, 0x0301),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (sequence, title, category, company))| {
        seeded(
            sequence,
            i64::try_from(index).unwrap_or_default() + 3,
            ProductDraft {
                title: title.to_owned(),
                process: "<p>Solicitar proyecto y enviar firmado.</p>".to_owned(),
                strengths: "<p>Precio competitivo.</p>".to_owned(),
                observations: String::new(),
                category_id: Some(fixed_id(category)),
                company_id: Some(fixed_id(company)),
                documents: Vec::new(),
            },
        )
    })
    .collect()
}

fn departments() -> Vec<Department> {
    vec![
        seeded(
            0x0700,
            0,
            DepartmentDraft {
                name: "Siniestros".to_owned(),
                responsible_name: "Pablo Ortega".to_owned(),
                responsible_email: "siniestros@correduria.es".to_owned(),
                description: "Gestión y seguimiento de siniestros.".to_owned(),
            },
        ),
        seeded(
            0x0701,
            0,
            DepartmentDraft {
                name: "Administración".to_owned(),
                responsible_name: "Carmen Vidal".to_owned(),
                responsible_email: "administracion@correduria.es".to_owned(),
                description: "Recibos, comisiones y facturación.".to_owned(),
            },
        ),
    ]
}

fn department_contents() -> Vec<DepartmentContent> {
    vec![seeded(
        0x0710,
        4,
        DepartmentContentDraft {
            department_id: fixed_id(0x0700),
            title: "Nuevo protocolo de aperturas".to_owned(),
            content: "<p>Todas las aperturas se registran el mismo día.</p>".to_owned(),
            image_url: None,
            published: true,
        },
    )]
}

fn news() -> Vec<News> {
    let mut published: News = seeded(
        0x0800,
        5,
        NewsDraft {
            title: "Nueva gama de seguros de hogar".to_owned(),
            content: "<p>Ya disponible para toda la red.</p>".to_owned(),
            image_url: None,
            published: false,
            company_ids: vec![fixed_id(0x0300)],
            category_ids: vec![fixed_id(0x0501)],
            product_ids: vec![fixed_id(0x0600)],
        },
    );
    published.set_published(true, seeded_at(5));

    let draft: News = seeded(
        0x0801,
        6,
        NewsDraft {
            title: "Convención anual".to_owned(),
            content: "<p>Borrador del programa.</p>".to_owned(),
            ..NewsDraft::default()
        },
    );

    vec![published, draft]
}

fn notifications() -> Vec<Notification> {
    vec![seeded(
        0x0900,
        5,
        NotificationDraft {
            user_id: demo_admin_id(),
            title: "Nueva noticia publicada".to_owned(),
            description: "Nueva gama de seguros de hogar".to_owned(),
            url: Some(format!("/news/{}", fixed_id(0x0800))),
        },
    )]
}

fn system_alerts() -> Vec<SystemAlert> {
    vec![seeded(
        0x0a00,
        6,
        SystemAlertDraft {
            title: "Modo demostración".to_owned(),
            message: "Los cambios solo se guardan en este dispositivo.".to_owned(),
            severity: AlertSeverity::Info,
            active: true,
        },
    )]
}

fn brokerage_config() -> BrokerageConfig {
    BrokerageConfig {
        name: DEMO_BROKERAGE_NAME.to_owned(),
        contact_email: "info@correduria.es".to_owned(),
        ..BrokerageConfig::default()
    }
}

/// Builds the blob a fresh demo workspace starts with.
#[must_use]
pub fn seed_blob() -> BTreeMap<String, Value> {
    BTreeMap::from([
        (ACCOUNTS_KEY.to_owned(), collection(&accounts())),
        (Delegation::KIND.collection().to_owned(), collection(&delegations())),
        (Company::KIND.collection().to_owned(), collection(&companies())),
        (
            SpecificationCategory::KIND.collection().to_owned(),
            collection(&specification_categories()),
        ),
        (
            CompanySpecification::KIND.collection().to_owned(),
            collection(&specifications()),
        ),
        (
            ProductCategory::KIND.collection().to_owned(),
            collection(&product_categories()),
        ),
        (Product::KIND.collection().to_owned(), collection(&products())),
        (Department::KIND.collection().to_owned(), collection(&departments())),
        (
            DepartmentContent::KIND.collection().to_owned(),
            collection(&department_contents()),
        ),
        (News::KIND.collection().to_owned(), collection(&news())),
        (Notification::KIND.collection().to_owned(), collection(&notifications())),
        (SystemAlert::KIND.collection().to_owned(), collection(&system_alerts())),
        (
            CONFIG_KEY.to_owned(),
            serde_json::to_value(brokerage_config()).unwrap_or(Value::Null),
        ),
    ])
}
