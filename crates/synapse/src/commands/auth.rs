//! Auth command - user and role administration.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::{Style, style};
use synapse_client::{RoleInfo, UserInfo};

use super::Context;

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// List users
    Users,

    /// List roles
    Roles,

    /// Create a user
    AddUser {
        /// User name
        name: String,
    },

    /// Create a role
    AddRole {
        /// Role name
        name: String,
    },

    /// Delete a role
    DelRole {
        /// Role name
        name: String,
    },

    /// Set a user's password (prompted for)
    Passwd {
        /// User iden
        iden: String,
    },

    /// Grant a role to a user
    Grant {
        /// User iden
        user: String,
        /// Role iden
        role: String,
    },

    /// Revoke a role from a user
    Revoke {
        /// User iden
        user: String,
        /// Role iden
        role: String,
    },
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    let client = ctx.connect().await?;
    let auth = client.auth();
    let green = Style::new().green();
    let dim = Style::new().dim();

    match args.command {
        AuthCommand::Users => {
            let users = auth.users().await?;
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else {
                print_users(&users);
            }
        }
        AuthCommand::Roles => {
            let roles = auth.roles().await?;
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&roles)?);
            } else {
                print_roles(&roles);
            }
        }
        AuthCommand::AddUser { name } => {
            let user = auth.add_user(&name).await?;
            println!(
                "{} User created: {} {}",
                green.apply_to("✓"),
                user.name,
                dim.apply_to(&user.iden)
            );
        }
        AuthCommand::AddRole { name } => {
            let role = auth.add_role(&name).await?;
            println!(
                "{} Role created: {} {}",
                green.apply_to("✓"),
                role.name,
                dim.apply_to(&role.iden)
            );
        }
        AuthCommand::DelRole { name } => {
            auth.delete_role(&name).await?;
            println!("{} Role deleted: {}", green.apply_to("✓"), name);
        }
        AuthCommand::Passwd { iden } => {
            let passwd = rpassword::prompt_password("New password: ")
                .context("Failed to read password")?;
            let user = auth.change_password(&iden, &passwd).await?;
            println!("{} Password changed for {}", green.apply_to("✓"), user.name);
        }
        AuthCommand::Grant { user, role } => {
            let user = auth.grant(&user, &role).await?;
            println!("{} Granted {} to {}", green.apply_to("✓"), role, user.name);
        }
        AuthCommand::Revoke { user, role } => {
            let user = auth.revoke(&user, &role).await?;
            println!("{} Revoked {} from {}", green.apply_to("✓"), role, user.name);
        }
    }

    Ok(())
}

fn print_users(users: &[UserInfo]) {
    let dim = Style::new().dim();
    println!("{}", style("Users").bold());
    println!("{}", dim.apply_to("─".repeat(50)));

    if users.is_empty() {
        println!("{}", dim.apply_to("No users found"));
        return;
    }

    for user in users {
        let mut flags = Vec::new();
        if user.admin {
            flags.push("admin");
        }
        if user.locked {
            flags.push("locked");
        }
        if user.archived {
            flags.push("archived");
        }
        println!(
            "{} {} {}",
            dim.apply_to(&user.iden),
            user.name,
            dim.apply_to(flags.join(","))
        );
    }
}

fn print_roles(roles: &[RoleInfo]) {
    let dim = Style::new().dim();
    println!("{}", style("Roles").bold());
    println!("{}", dim.apply_to("─".repeat(50)));

    if roles.is_empty() {
        println!("{}", dim.apply_to("No roles found"));
        return;
    }

    for role in roles {
        println!(
            "{} {} {}",
            dim.apply_to(&role.iden),
            role.name,
            dim.apply_to(format!("({} rules)", role.rules.len()))
        );
    }
}
