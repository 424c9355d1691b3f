use crate::api;
use crate::api::handlers::auth::AuthConfig;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            frontend_url,
        } => {
            let dsn = Url::parse(&dsn)?;
            if !matches!(dsn.scheme(), "postgres" | "postgresql") {
                return Err(anyhow!("unsupported DSN scheme: {}", dsn.scheme()));
            }

            let auth_config = AuthConfig::new(&frontend_url);

            api::new(port, dsn.to_string(), globals, auth_config).await?;
        }
    }

    Ok(())
}
