//! authz - forum role and permission administration
//!
//! Runs migrations, inspects roles and permissions, checks a user's
//! permission and manages role assignments against the configured store.

#![allow(missing_docs)]

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use forum_authz::storage::StorageLayer;
use forum_authz::utils::logging::init_logging;
use forum_authz::{
    AuthorizationService, AuthzError, Config, PermissionContext, Result, Role, RoleStore,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "authz", version, about = "Forum authorization administration")]
struct Cli {
    /// YAML configuration file; environment variables are used when omitted
    #[arg(short, long, global = true, env = "AUTHZ_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending database migrations
    Migrate,
    /// Report database and Redis reachability with RBAC row counts
    Health,
    /// List every role
    Roles,
    /// List every permission
    Permissions,
    /// Check one permission for a user
    Check {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        permission: String,
        /// Owner of the target resource
        #[arg(long)]
        owner: Option<i64>,
        /// Category of the target resource
        #[arg(long)]
        category: Option<i64>,
        /// Post count of the acting user
        #[arg(long)]
        posts: Option<u64>,
    },
    /// Assign a role to a user
    Assign {
        #[arg(long)]
        user: i64,
        /// Role slug
        #[arg(long)]
        role: String,
        #[arg(long)]
        expires_in_days: Option<i64>,
    },
    /// Remove a role from a user
    Revoke {
        #[arg(long)]
        user: i64,
        /// Role slug
        #[arg(long)]
        role: String,
    },
    /// Set or clear the parent of a role
    SetParent {
        /// Role slug
        #[arg(long)]
        role: String,
        /// Parent role slug; omit to make the role a root
        #[arg(long)]
        parent: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path).await,
        None => Config::from_env(),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_ref())
        .await
        .context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    match cli.command {
        Command::Migrate => {
            let storage = StorageLayer::new(&config.storage).await?;
            storage.migrate().await.context("Migration failed")?;
            info!("Migrations applied");
        }
        Command::Health => {
            let storage = StorageLayer::new(&config.storage).await?;
            let status = storage.health_check().await;
            println!("{} {}", forum_authz::NAME, forum_authz::VERSION);
            println!("database: {}", if status.database { "ok" } else { "unreachable" });
            if let Some(stats) = status.stats {
                println!(
                    "  roles={} permissions={} grants={} assignments={}",
                    stats.roles, stats.permissions, stats.grants, stats.assignments
                );
            }
            match status.redis {
                Some(true) => println!("redis: ok"),
                Some(false) => println!("redis: unreachable"),
                None => println!("redis: not in use"),
            }
            if !status.is_healthy() {
                anyhow::bail!("Storage is unhealthy");
            }
        }
        Command::Roles => {
            let authz = AuthorizationService::from_config(&config).await?;
            for role in authz.list_roles().await? {
                let parent = role
                    .parent_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:>5}  {:<20} priority={:<4} parent={}",
                    role.id, role.slug, role.priority, parent
                );
            }
        }
        Command::Permissions => {
            let authz = AuthorizationService::from_config(&config).await?;
            for permission in authz.list_permissions().await? {
                println!("{:>5}  {}", permission.id, permission.slug);
            }
        }
        Command::Check {
            user,
            permission,
            owner,
            category,
            posts,
        } => {
            let authz = AuthorizationService::from_config(&config).await?;
            let mut ctx = PermissionContext::new();
            if let Some(owner) = owner {
                ctx = ctx.with_owner(owner);
            }
            if let Some(category) = category {
                ctx = ctx.with_category(category);
            }
            if let Some(posts) = posts {
                ctx = ctx.with_post_count(posts);
            }

            let check = authz.can(user, &permission, &ctx).await?;
            if check.granted {
                match check.source_role_id {
                    Some(role_id) => println!("granted (role {})", role_id),
                    None => println!("granted"),
                }
            } else {
                println!(
                    "denied: {}",
                    check.denial_reason.as_deref().unwrap_or("no reason given")
                );
            }
        }
        Command::Assign {
            user,
            role,
            expires_in_days,
        } => {
            let authz = AuthorizationService::from_config(&config).await?;
            let role = role_by_slug(&authz, &role).await?;
            let expires_at = expires_in_days.map(|days| Utc::now() + Duration::days(days));
            authz
                .assign_role_to_user(user, role.id, expires_at, None)
                .await?;
            println!("assigned {} to user {}", role.slug, user);
        }
        Command::Revoke { user, role } => {
            let authz = AuthorizationService::from_config(&config).await?;
            let role = role_by_slug(&authz, &role).await?;
            if authz.remove_role_from_user(user, role.id).await? {
                println!("removed {} from user {}", role.slug, user);
            } else {
                println!("user {} did not hold {}", user, role.slug);
            }
        }
        Command::SetParent { role, parent } => {
            let authz = AuthorizationService::from_config(&config).await?;
            let role = role_by_slug(&authz, &role).await?;
            let parent_id = match parent {
                Some(slug) => Some(role_by_slug(&authz, &slug).await?.id),
                None => None,
            };
            authz.set_role_parent(role.id, parent_id).await?;
            println!("updated parent of {}", role.slug);
        }
    }

    Ok(())
}

async fn role_by_slug(authz: &AuthorizationService, slug: &str) -> Result<Role> {
    authz
        .store()
        .fetch_role_by_slug(slug)
        .await?
        .ok_or_else(|| AuthzError::not_found(format!("Role '{}' not found", slug)))
}
