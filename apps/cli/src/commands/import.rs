use std::path::Path;
use std::sync::Arc;

use brokerdesk_application::client::{ResourceCollection, TracingToaster};
use brokerdesk_application::csv_import::{self, CsvImportable, ImportOutcome, ImportPreview};
use brokerdesk_core::{AppError, AppResult};
use brokerdesk_domain::{Company, Delegation, Department, Product, ResourceKind};
use tracing::{info, warn};

use crate::target::Target;

/// Prints the header row of an empty import file.
pub fn template(kind: ResourceKind) -> AppResult<()> {
    let header = match kind {
        ResourceKind::Product => csv_import::template_header::<Product>(),
        ResourceKind::Company => csv_import::template_header::<Company>(),
        ResourceKind::Delegation => csv_import::template_header::<Delegation>(),
        ResourceKind::Department => csv_import::template_header::<Department>(),
        other => return Err(not_importable(other)),
    };

    println!("{header}");
    Ok(())
}

/// Previews a CSV file and, unless `dry_run`, creates its valid rows.
pub async fn run(target: &Target, kind: ResourceKind, file: &Path, dry_run: bool) -> AppResult<()> {
    let bytes = tokio::fs::read(file).await.map_err(|error| {
        AppError::Validation(format!("failed to read '{}': {error}", file.display()))
    })?;

    let outcome = match kind {
        ResourceKind::Product => import::<Product>(target, &bytes, dry_run).await?,
        ResourceKind::Company => import::<Company>(target, &bytes, dry_run).await?,
        ResourceKind::Delegation => import::<Delegation>(target, &bytes, dry_run).await?,
        ResourceKind::Department => import::<Department>(target, &bytes, dry_run).await?,
        other => return Err(not_importable(other)),
    };

    if let Some(outcome) = outcome {
        print_json(&outcome)?;
        if !outcome.failed.is_empty() {
            return Err(AppError::Validation(format!(
                "{} rows were rejected by the server",
                outcome.failed.len()
            )));
        }
    }
    Ok(())
}

pub(crate) async fn import<T: CsvImportable>(
    target: &Target,
    bytes: &[u8],
    dry_run: bool,
) -> AppResult<Option<ImportOutcome>> {
    let preview = csv_import::preview::<T>(bytes)?;
    report(&preview);

    if dry_run {
        print_json(&preview)?;
        return Ok(None);
    }

    let collection = ResourceCollection::new(
        target.source::<T>()?,
        target.tenant_id(),
        Arc::new(TracingToaster),
    );
    let outcome = collection.import(&preview).await;

    for failure in &outcome.failed {
        warn!(line = failure.line, message = %failure.message, "row rejected");
    }
    info!(
        created = outcome.created.len(),
        failed = outcome.failed.len(),
        skipped = outcome.skipped,
        "import finished"
    );
    Ok(Some(outcome))
}

fn report<T: CsvImportable>(preview: &ImportPreview<T>) {
    if !preview.missing_columns.is_empty() {
        warn!(columns = ?preview.missing_columns, "required columns missing");
    }
    for row in preview.rows.iter().filter(|row| row.has_errors()) {
        warn!(line = row.line, errors = ?row.errors, "invalid row");
    }
    info!(
        kind = T::KIND.collection(),
        valid = preview.valid_count(),
        invalid = preview.invalid_count(),
        "preview ready"
    );
}

fn print_json(value: &impl serde::Serialize) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|error| AppError::Internal(format!("failed to render output: {error}")))?;
    println!("{rendered}");
    Ok(())
}

fn not_importable(kind: ResourceKind) -> AppError {
    AppError::Validation(format!(
        "{} cannot be imported from CSV",
        kind.default_plural()
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use brokerdesk_application::DataSource;
    use brokerdesk_domain::{Delegation, ResourceKind};
    use brokerdesk_infrastructure::{LocalDataSource, LocalStorage, demo_seed};

    use super::{import, template};
    use crate::target::Target;

    #[tokio::test]
    async fn imports_valid_rows_into_local_storage() {
        let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let storage = Arc::new(
            LocalStorage::open(directory.path().join("demo.json"))
                .await
                .unwrap_or_else(|_| unreachable!()),
        );
        let source = LocalDataSource::<Delegation>::new(Arc::clone(&storage));
        let before = source
            .list(demo_seed::demo_tenant_id())
            .await
            .unwrap_or_default()
            .len();

        let csv = "name,email\nDelegación Levante,levante@correduria.es\n,sin@correduria.es\n";
        let outcome = import::<Delegation>(&Target::Local(storage), csv.as_bytes(), false)
            .await
            .unwrap_or_else(|_| unreachable!())
            .unwrap_or_default();

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.skipped, 1);
        let after = source
            .list(demo_seed::demo_tenant_id())
            .await
            .unwrap_or_default();
        assert_eq!(after.len(), before + 1);
        assert!(after.iter().any(|delegation| delegation.name == "Delegación Levante"));
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let storage = Arc::new(LocalStorage::in_memory());
        let source = LocalDataSource::<Delegation>::new(Arc::clone(&storage));
        let before = source
            .list(demo_seed::demo_tenant_id())
            .await
            .unwrap_or_default();

        let outcome = import::<Delegation>(
            &Target::Local(storage),
            b"name\nDelegaci\xc3\xb3n Norte\n",
            true,
        )
        .await
        .unwrap_or_else(|_| unreachable!());

        assert!(outcome.is_none());
        let after = source
            .list(demo_seed::demo_tenant_id())
            .await
            .unwrap_or_default();
        assert_eq!(after.len(), before.len());
    }

    #[test]
    fn templates_exist_only_for_importable_kinds() {
        assert!(template(ResourceKind::Product).is_ok());
        assert!(template(ResourceKind::News).is_err());
    }
}
