//! Where the CLI reads and writes records.

use std::path::PathBuf;
use std::sync::Arc;

use brokerdesk_application::DataSource;
use brokerdesk_core::{AppError, AppResult, TenantId};
use brokerdesk_domain::Resource;
use brokerdesk_infrastructure::{
    HttpDataSource, LocalDataSource, LocalStorage, demo_seed, sign_in, start_demo_session,
};
use clap::Args;
use tracing::info;
use url::Url;

/// Connection flags shared by every command.
#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Base URL of the live API tree
    #[arg(
        long,
        global = true,
        env = "BROKERDESK_API_URL",
        default_value = "http://localhost:3001/api/"
    )]
    pub api_url: String,

    /// Use the demo tree of the API instead of live data
    #[arg(long, global = true, conflicts_with = "local")]
    pub demo: bool,

    /// Work offline on a demo storage file
    #[arg(long, global = true, env = "BROKERDESK_LOCAL_STORAGE")]
    pub local: Option<PathBuf>,

    /// Login email for the live tree
    #[arg(long, global = true, env = "BROKERDESK_EMAIL")]
    pub email: Option<String>,

    /// Login password for the live tree
    #[arg(long, global = true, env = "BROKERDESK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// An authenticated API session or an offline demo blob.
pub enum Target {
    /// Demo records kept in a local JSON file.
    Local(Arc<LocalStorage>),
    /// A running API, reached with a cookie-holding client.
    Remote {
        client: reqwest::Client,
        api_base: Url,
    },
}

impl Target {
    /// Opens the storage file or signs in to the API.
    pub async fn connect(args: &ConnectionArgs) -> AppResult<Self> {
        if let Some(path) = &args.local {
            info!(path = %path.display(), "using local demo storage");
            return Ok(Self::Local(Arc::new(LocalStorage::open(path).await?)));
        }

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
        let live_base = api_base(&args.api_url)?;

        if args.demo {
            let demo_base = live_base
                .join("demo/")
                .map_err(|error| AppError::Validation(format!("invalid API URL: {error}")))?;
            start_demo_session(&client, &demo_base).await?;
            info!(api = %demo_base, "demo session started");
            return Ok(Self::Remote {
                client,
                api_base: demo_base,
            });
        }

        let (Some(email), Some(password)) = (&args.email, &args.password) else {
            return Err(AppError::Validation(
                "--email and --password (or BROKERDESK_EMAIL and BROKERDESK_PASSWORD) are required \
                 for the live workspace"
                    .to_owned(),
            ));
        };
        sign_in(&client, &live_base, email, password).await?;
        info!(api = %live_base, "signed in");

        Ok(Self::Remote {
            client,
            api_base: live_base,
        })
    }

    /// Data source for one kind.
    pub fn source<T: Resource>(&self) -> AppResult<Arc<dyn DataSource<T>>> {
        Ok(match self {
            Self::Local(storage) => Arc::new(LocalDataSource::new(Arc::clone(storage))),
            Self::Remote { client, api_base } => {
                Arc::new(HttpDataSource::<T>::new(client.clone(), api_base)?)
            }
        })
    }

    /// Tenant passed to the data sources.
    ///
    /// The API resolves the tenant from the session cookie and ignores it.
    pub fn tenant_id(&self) -> TenantId {
        match self {
            Self::Local(_) => demo_seed::demo_tenant_id(),
            Self::Remote { .. } => TenantId::new(),
        }
    }
}

/// Parses the API URL, keeping a trailing slash so relative joins nest.
fn api_base(value: &str) -> AppResult<Url> {
    let trimmed = value.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };

    Url::parse(&normalized)
        .map_err(|error| AppError::Validation(format!("invalid API URL '{value}': {error}")))
}
