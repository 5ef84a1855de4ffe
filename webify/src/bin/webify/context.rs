use std::path::PathBuf;

use anyhow::{Context, Result};
use webify::{Action, RedisStore, User, Webify, WebifyConfig, ensure};

use crate::output::OutputManager;

/// Connection settings shared by every command.
pub struct SessionOptions {
    pub config_path: Option<PathBuf>,
    pub admin_email: Option<String>,
}

/// A connected store plus the authenticated admin acting through it.
pub struct AdminSession {
    pub webify: Webify<RedisStore>,
    pub admin: User,
}

impl AdminSession {
    pub async fn open(options: &SessionOptions, output: &OutputManager) -> Result<Self> {
        let config = WebifyConfig::load(options.config_path.as_deref()).context("Failed to load configuration")?;
        output.verbose(&format!(
            "redis {} (prefix '{}')",
            config.redis.url, config.webify.key_prefix
        ));

        output.progress("Connecting to Redis");
        let webify = Webify::from_config(&config)
            .await
            .context("Failed to connect to Redis")?;
        output.clear_line();

        let email = options
            .admin_email
            .as_deref()
            .context("No admin identity given. Pass --as <email> or set WEBIFY_ADMIN.")?;
        let admin = webify
            .users()
            .authenticate(email)
            .await
            .with_context(|| format!("Unknown admin '{email}'"))?;
        ensure(admin.role, Action::ViewDashboard)
            .with_context(|| format!("{email} is a {}, not an admin", admin.role))?;
        output.verbose(&format!("acting as {} ({})", admin.name, admin.id));

        Ok(Self { webify, admin })
    }

    /// Resolves a user by email.
    pub async fn user_by_email(&self, email: &str) -> Result<User> {
        self.webify
            .users()
            .authenticate(email)
            .await
            .with_context(|| format!("No user registered as '{email}'"))
    }
}
