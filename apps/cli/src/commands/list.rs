use std::sync::Arc;

use brokerdesk_application::client::{ResourceCollection, TracingToaster};
use brokerdesk_core::display::{format_timestamp, parse_timestamp};
use brokerdesk_core::{AppError, AppResult};
use brokerdesk_domain::{
    Company, Delegation, Department, News, Product, ProductCategory, Resource, ResourceKind,
    SystemAlert,
};

use crate::target::Target;

/// Timestamp fields and the day-first rendering added next to them.
const TIMESTAMP_FIELDS: [(&str, &str); 2] = [
    ("createdAt", "createdAtDisplay"),
    ("updatedAt", "updatedAtDisplay"),
];

/// Prints every record of a top-level collection as a JSON array.
pub async fn run(target: &Target, kind: ResourceKind) -> AppResult<()> {
    let rendered = match kind {
        ResourceKind::Delegation => render::<Delegation>(target).await?,
        ResourceKind::Company => render::<Company>(target).await?,
        ResourceKind::ProductCategory => render::<ProductCategory>(target).await?,
        ResourceKind::Product => render::<Product>(target).await?,
        ResourceKind::Department => render::<Department>(target).await?,
        ResourceKind::News => render::<News>(target).await?,
        ResourceKind::SystemAlert => render::<SystemAlert>(target).await?,
        other => {
            return Err(AppError::Validation(format!(
                "{} are not listed as a top-level collection",
                other.default_plural()
            )));
        }
    };

    println!("{rendered}");
    Ok(())
}

async fn render<T: Resource>(target: &Target) -> AppResult<String> {
    let collection = ResourceCollection::<T>::new(
        target.source::<T>()?,
        target.tenant_id(),
        Arc::new(TracingToaster),
    );
    let records = collection.refetch().await?;

    let rendered: Vec<serde_json::Value> = records
        .iter()
        .map(|record| serde_json::to_value(record).map(with_display_timestamps))
        .collect::<Result<_, _>>()
        .map_err(|error| AppError::Internal(format!("failed to render records: {error}")))?;

    serde_json::to_string_pretty(&rendered)
        .map_err(|error| AppError::Internal(format!("failed to render records: {error}")))
}

fn with_display_timestamps(mut record: serde_json::Value) -> serde_json::Value {
    if let Some(fields) = record.as_object_mut() {
        for (source, target) in TIMESTAMP_FIELDS {
            let display = fields
                .get(source)
                .and_then(serde_json::Value::as_str)
                .and_then(parse_timestamp)
                .map(format_timestamp);
            if let Some(display) = display {
                fields.insert(target.to_owned(), serde_json::Value::String(display));
            }
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use brokerdesk_domain::{Product, ResourceKind};
    use brokerdesk_infrastructure::LocalStorage;

    use super::{render, run, with_display_timestamps};
    use crate::target::Target;

    #[tokio::test]
    async fn renders_seeded_products_as_json() {
        let target = Target::Local(Arc::new(LocalStorage::in_memory()));

        let rendered = render::<Product>(&target)
            .await
            .unwrap_or_else(|_| unreachable!());
        let products: Vec<serde_json::Value> =
            serde_json::from_str(&rendered).unwrap_or_default();

        assert!(!products.is_empty());
        assert!(products.iter().all(|product| product["title"].is_string()));
        assert!(
            products
                .iter()
                .all(|product| product["createdAtDisplay"].is_string())
        );
    }

    #[test]
    fn timestamps_gain_a_day_first_rendering() {
        let record = with_display_timestamps(serde_json::json!({
            "title": "Hogar Esencial",
            "createdAt": "2024-03-07T09:05:00Z",
            "updatedAt": "no es una fecha",
        }));

        assert_eq!(record["createdAtDisplay"], "07/03/2024 09:05");
        assert!(record.get("updatedAtDisplay").is_none());
        assert_eq!(record["createdAt"], "2024-03-07T09:05:00Z");
    }

    #[tokio::test]
    async fn nested_kinds_are_rejected() {
        let target = Target::Local(Arc::new(LocalStorage::in_memory()));
        assert!(run(&target, ResourceKind::DepartmentContent).await.is_err());
    }
}
