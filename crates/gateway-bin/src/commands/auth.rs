//! Authentication commands.

use super::Context;
use crate::output::{self, mask_token, row};
use anyhow::{bail, Result};
use gateway_auth::CredentialPair;
use serde::Serialize;
use std::fmt;

/// Store a credential pair obtained out of band.
pub fn login(ctx: &Context, access_token: String, refresh_token: String) -> Result<()> {
    let access_token = access_token.trim();
    let refresh_token = refresh_token.trim();
    if access_token.is_empty() || refresh_token.is_empty() {
        bail!("Both --access-token and --refresh-token are required");
    }

    let client = ctx.client()?;
    let replacing = client.is_logged_in();
    client.login(&CredentialPair::new(access_token, refresh_token))?;

    let message = if replacing {
        "Credentials replaced"
    } else {
        "Logged in"
    };
    output::print_success(message, ctx.format);
    Ok(())
}

/// Clear the stored credential pair.
pub fn logout(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    if !client.is_logged_in() {
        output::print_success("Not logged in", ctx.format);
        return Ok(());
    }

    client.logout()?;
    output::print_success("Logged out", ctx.format);
    Ok(())
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    logged_in: bool,
    access_token: Option<String>,
    credentials_file: String,
    api_base_url: String,
}

impl fmt::Display for StatusOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Authentication Status")?;
        writeln!(f, "{}", "-".repeat(40))?;
        writeln!(
            f,
            "{}",
            row("Logged in", if self.logged_in { "yes" } else { "no" })
        )?;
        if let Some(token) = &self.access_token {
            writeln!(f, "{}", row("Access token", token))?;
        }
        writeln!(f, "{}", row("Credentials", &self.credentials_file))?;
        write!(f, "{}", row("API", &self.api_base_url))
    }
}

/// Report whether a credential pair is stored.
pub fn status(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let pair = store.read();

    let status = StatusOutput {
        logged_in: pair.is_some(),
        access_token: pair.map(|p| mask_token(&p.access_token)),
        credentials_file: ctx.paths.credentials_file().display().to_string(),
        api_base_url: ctx.config.api_base_url.clone(),
    };
    output::print(&status, ctx.format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_context;

    #[test]
    fn test_login_then_logout() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = test_context(temp.path());

        login(&ctx, "A1".into(), "R1".into()).unwrap();
        assert_eq!(
            ctx.store().unwrap().read(),
            Some(CredentialPair::new("A1", "R1"))
        );

        logout(&ctx).unwrap();
        assert!(ctx.store().unwrap().read().is_none());
        logout(&ctx).unwrap();
    }

    #[test]
    fn test_login_rejects_blank_tokens() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = test_context(temp.path());

        assert!(login(&ctx, "A1".into(), "   ".into()).is_err());
        assert!(!ctx.store().unwrap().has_credentials());
    }

    #[test]
    fn test_status_output_masks_token() {
        let status = StatusOutput {
            logged_in: true,
            access_token: Some(mask_token("secret-access-token")),
            credentials_file: "/tmp/credentials.json".into(),
            api_base_url: "http://localhost:8080".into(),
        };

        let text = status.to_string();
        assert!(text.contains("yes"));
        assert!(!text.contains("secret-access-token"));
    }
}
