//! Civic - headless client
//!
//! Loads configuration, restores any persisted session, checks API health
//! and prints the current issue feed. A UI shell embeds `civic_app::AppContext`
//! the same way.

#![allow(clippy::print_stdout)]

use std::time::Instant;

use anyhow::{Context, Result};
use civic_app::utils::logging::{init_tracing, log_operation};
use civic_app::AppContext;
use civic_domain::ClientConfig;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the subscriber so RUST_LOG / CIVIC_LOG_JSON apply
    let dotenv = dotenvy::dotenv();
    init_tracing();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => info!(error = %e, "no .env file loaded"),
    }

    let config = match civic_infra::config::load() {
        Ok(config) => config,
        Err(e) if std::env::var_os("CIVIC_ENV").is_some() => {
            return Err(e).context("invalid CIVIC_* environment configuration");
        }
        Err(e) => {
            warn!(error = %e, "no configuration found, using development defaults");
            ClientConfig::default()
        }
    };

    let ctx = AppContext::new_with_config(config).context("failed to initialize application")?;

    if let Some(user) = ctx.restore_session().await.context("failed to restore session")? {
        println!("Signed in as {} <{}>", user.name, user.email);
    }

    let health = ctx.health_check().await;
    println!(
        "API {} ({} environment)",
        if health.is_healthy { "healthy" } else { "degraded" },
        ctx.config.environment
    );
    for component in health.failing() {
        println!("  {}: {}", component.name, component.message.as_deref().unwrap_or("unhealthy"));
    }

    let started = Instant::now();
    let fetched = ctx.issues.fetch_all(None).await;
    log_operation("issues::fetch_all", started.elapsed(), fetched.as_ref().map(|_| ()));

    match fetched {
        Ok(_) => {
            let issues = ctx.issues.issues();
            println!("{} issue(s)", issues.len());
            for issue in issues {
                println!(
                    "  [{}] {} ({}, {} up / {} down)",
                    issue.status, issue.title, issue.category, issue.upvotes, issue.downvotes
                );
            }
        }
        Err(e) => println!("{}", e.user_message()),
    }

    ctx.shutdown();
    Ok(())
}
