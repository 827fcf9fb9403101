use brokerdesk_domain::{
    Company, CompanyDraft, Delegation, DelegationDraft, Department, DepartmentDraft, Product,
    ProductDraft,
};

use super::{CsvImportable, CsvRow};

impl CsvImportable for Product {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["name"];
    const OPTIONAL_COLUMNS: &'static [&'static str] = &["process", "strengths", "observations"];

    fn draft_from_row(row: &CsvRow) -> Self::Draft {
        ProductDraft {
            title: row.text("name"),
            process: row.text("process"),
            strengths: row.text("strengths"),
            observations: row.text("observations"),
            ..ProductDraft::default()
        }
    }
}

impl CsvImportable for Company {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["name"];
    const OPTIONAL_COLUMNS: &'static [&'static str] = &[
        "broker_access",
        "commercial_manager",
        "manager_email",
        "website",
    ];

    fn draft_from_row(row: &CsvRow) -> Self::Draft {
        CompanyDraft {
            name: row.text("name"),
            broker_access: row.text("broker_access"),
            commercial_manager: row.text("commercial_manager"),
            manager_email: row.text("manager_email"),
            website: row.optional("website"),
        }
    }
}

impl CsvImportable for Delegation {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["name"];
    const OPTIONAL_COLUMNS: &'static [&'static str] = &[
        "legal_name",
        "address",
        "phone",
        "email",
        "contact_person",
        "website",
    ];

    fn draft_from_row(row: &CsvRow) -> Self::Draft {
        DelegationDraft {
            name: row.text("name"),
            legal_name: row.text("legal_name"),
            address: row.text("address"),
            phone: row.text("phone"),
            email: row.text("email"),
            contact_person: row.text("contact_person"),
            website: row.optional("website"),
        }
    }
}

impl CsvImportable for Department {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["name"];
    const OPTIONAL_COLUMNS: &'static [&'static str] =
        &["responsible_name", "responsible_email", "description"];

    fn draft_from_row(row: &CsvRow) -> Self::Draft {
        DepartmentDraft {
            name: row.text("name"),
            responsible_name: row.text("responsible_name"),
            responsible_email: row.text("responsible_email"),
            description: row.text("description"),
        }
    }
}
