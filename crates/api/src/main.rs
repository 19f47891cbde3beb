use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;

use folio_api::app::{build_app, AppServices};
use folio_api::config::Config;
use folio_auth::Hs256SessionCodec;
use folio_core::UserId;
use folio_infra::{InMemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    folio_observability::init();

    let config = Config::from_env()?;
    let codec = Hs256SessionCodec::new(&config.jwt_secret).with_ttl(config.session_ttl);

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => serve(config, codec).await,
        Some("issue-token") => {
            let raw = args.next().context("usage: folio-api issue-token <user-id>")?;
            let user_id: UserId = raw.parse()?;
            println!("{}", codec.issue(user_id, Utc::now())?);
            Ok(())
        }
        Some(other) => bail!("unknown command '{other}' (expected: issue-token)"),
    }
}

async fn serve(config: Config, codec: Hs256SessionCodec) -> anyhow::Result<()> {
    let services = match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url)
                .await
                .context("failed to connect to the database")?;
            tracing::info!("using postgres store");
            AppServices::new(Arc::new(store), codec, config.pagination)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using seeded in-memory store");
            AppServices::new(Arc::new(InMemoryStore::seeded()?), codec, config.pagination)
        }
    };

    let app = build_app(services);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
