//! Outbound mail seam. Actual delivery is an external collaborator; the
//! default implementation records the event in the log stream.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Dispatch a password-reset token to the account's email address.
    async fn send_password_reset(&self, email: &str, name: &str, token: &str) -> Result<()>;
}

/// Log-only mailer for development and tests.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, email: &str, name: &str, token: &str) -> Result<()> {
        info!(email, name, "Password reset requested; token dispatched out of band");
        debug!(token, "Reset token (debug builds only; do not enable in production)");
        Ok(())
    }
}
