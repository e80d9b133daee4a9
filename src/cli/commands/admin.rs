use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_data, output_success};
use crate::cli::{AdminClient, OutputFormat};

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Show whether the token owner is an admin")]
    Check,

    #[command(about = "List all admins")]
    List,

    #[command(about = "Grant admin privileges")]
    Add {
        #[arg(help = "Email of an existing account")]
        email: String,
    },

    #[command(about = "Revoke admin privileges")]
    Remove {
        #[arg(help = "Email of the admin to remove")]
        email: String,
    },
}

pub async fn handle(client: &AdminClient, cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Check => {
            let is_admin = client.check().await?;
            match output_format {
                OutputFormat::Json => output_data(&output_format, &json!({ "isAdmin": is_admin })),
                OutputFormat::Text => {
                    println!("{}", if is_admin { "admin" } else { "not an admin" });
                    Ok(())
                }
            }
        }
        AdminCommands::List => {
            let admins = client.list().await?;
            match output_format {
                OutputFormat::Json => output_data(&output_format, &json!({ "admins": admins })),
                OutputFormat::Text => {
                    if admins.is_empty() {
                        println!("No admins");
                    }
                    for admin in admins {
                        println!("{}\tadded {} by {}", admin.email, admin.added_at.to_rfc3339(), admin.added_by);
                    }
                    Ok(())
                }
            }
        }
        AdminCommands::Add { email } => {
            let reply = client.add(&email).await?;
            if !reply.claims_mirrored {
                eprintln!("warning: admin claim was not mirrored to the identity provider");
            }
            output_success(&output_format, &reply.message, Some(json!({ "claimsMirrored": reply.claims_mirrored })))
        }
        AdminCommands::Remove { email } => {
            let reply = client.remove(&email).await?;
            if !reply.claims_mirrored {
                eprintln!("warning: admin claim was not cleared in the identity provider");
            }
            output_success(&output_format, &reply.message, Some(json!({ "claimsMirrored": reply.claims_mirrored })))
        }
    }
}
