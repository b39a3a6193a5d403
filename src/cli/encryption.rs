//! Encryption CLI commands
//!
//! `validate` and `render` work offline on a draft file. `show`, `apply` and
//! `disable` talk to the tenant encryption endpoint through a
//! [`ConfigurationSession`].

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::output::{print_output, print_violations};
use crate::client::{ClientConfig, EncryptionClient};
use crate::domain::{EncryptionDraft, FieldId, RemovalSet, SlotKind};
use crate::session::{ConfigurationSession, LoadOutcome, SubmitOutcome, TenantRef};
use crate::synthesis::synthesize;
use crate::validation::validate;

/// Tenant address arguments
#[derive(Args, Debug, Clone)]
pub struct TenantArgs {
    /// Tenant namespace
    #[arg(short, long, value_name = "NAMESPACE")]
    pub namespace: String,

    /// Tenant name
    #[arg(short, long, value_name = "TENANT")]
    pub tenant: String,
}

impl From<TenantArgs> for TenantRef {
    fn from(args: TenantArgs) -> Self {
        TenantRef::new(args.namespace, args.tenant)
    }
}

#[derive(Subcommand)]
pub enum EncryptionCommands {
    /// Validate a draft file and list violations
    #[command(
        after_help = "EXAMPLES:\n    # Validate a draft\n    kmsplane validate draft.yaml\n\n    # Machine-readable violations\n    kmsplane validate draft.yaml --output json"
    )]
    Validate {
        /// Path to a YAML or JSON draft file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format (json, yaml, or table)
        #[arg(short, long, default_value = "table", value_parser = ["json", "yaml", "table"])]
        output: String,
    },

    /// Print the request a draft file would produce
    #[command(
        after_help = "EXAMPLES:\n    # Render the document as YAML\n    kmsplane render draft.yaml --output yaml\n\n    # Include certificate deletions\n    kmsplane render draft.yaml --remove-certificate old-kes-tls"
    )]
    Render {
        /// Path to a YAML or JSON draft file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Stored certificate names to delete
        #[arg(long = "remove-certificate", value_name = "NAME")]
        remove: Vec<String>,

        /// Output format (json or yaml)
        #[arg(short, long, default_value = "json", value_parser = ["json", "yaml"])]
        output: String,
    },

    /// Show the current encryption configuration of a tenant
    Show {
        #[command(flatten)]
        tenant: TenantArgs,

        /// Print the editable draft instead of the raw configuration.
        /// Credentials are written as [REDACTED]; `apply` fills them back in
        /// from the tenant's current configuration.
        #[arg(long)]
        draft: bool,

        /// Output format (json or yaml)
        #[arg(short, long, default_value = "yaml", value_parser = ["json", "yaml"])]
        output: String,
    },

    /// Submit a draft file for a tenant
    #[command(
        long_about = "Load the tenant's current configuration, replace it with the draft file and submit.\n\nStored certificates named with --remove-certificate are deleted on the server.\n\nCredentials written as [REDACTED] (as in `show --draft` output) keep the tenant's current value; the command fails if there is none.",
        after_help = "EXAMPLES:\n    # Apply a Vault configuration\n    kmsplane apply -n tenant-ns -t storage draft.yaml\n\n    # Replace the server certificate\n    kmsplane apply -n tenant-ns -t storage draft.yaml --remove-certificate kes-tls"
    )]
    Apply {
        #[command(flatten)]
        tenant: TenantArgs,

        /// Path to a YAML or JSON draft file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Stored certificate names to delete
        #[arg(long = "remove-certificate", value_name = "NAME")]
        remove: Vec<String>,
    },

    /// Disable encryption for a tenant
    Disable {
        #[command(flatten)]
        tenant: TenantArgs,

        /// Stored certificate names to delete
        #[arg(long = "remove-certificate", value_name = "NAME")]
        remove: Vec<String>,
    },
}

impl EncryptionCommands {
    /// Whether the command needs the HTTP client
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Validate { .. } | Self::Render { .. })
    }
}

/// Handle encryption commands. `client` is required for remote commands.
pub async fn handle_encryption_command(
    command: EncryptionCommands,
    client: Option<ClientConfig>,
) -> Result<()> {
    match command {
        EncryptionCommands::Validate { file, output } => validate_draft(&file, &output)?,
        EncryptionCommands::Render { file, remove, output } => {
            render_draft(&file, remove, &output)?
        }
        EncryptionCommands::Show { tenant, draft, output } => {
            let session = open_session(client, tenant)?;
            show_configuration(&session, draft, &output).await?
        }
        EncryptionCommands::Apply { tenant, file, remove } => {
            let draft = read_draft(&file)?;
            let session = open_session(client, tenant)?;
            apply_draft(&session, draft, &remove).await?
        }
        EncryptionCommands::Disable { tenant, remove } => {
            let session = open_session(client, tenant)?;
            disable_encryption(&session, &remove).await?
        }
    }

    Ok(())
}

fn open_session(client: Option<ClientConfig>, tenant: TenantArgs) -> Result<ConfigurationSession> {
    let config = client.context("HTTP client configuration is required for this command")?;
    let client = EncryptionClient::new(config).context("Failed to create HTTP client")?;
    Ok(ConfigurationSession::new(tenant.into(), Arc::new(client)))
}

/// Read a YAML or JSON draft file
pub fn read_draft(path: &Path) -> Result<EncryptionDraft> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
    if is_json {
        serde_json::from_str(&contents).context("Failed to parse JSON draft file")
    } else {
        serde_yaml::from_str(&contents).context("Failed to parse YAML draft file")
    }
}

fn validate_draft(file: &Path, output: &str) -> Result<()> {
    let draft = read_draft(file)?;
    let result = validate(&draft);

    print_violations(&result, output)?;
    if !result.is_empty() {
        anyhow::bail!("Draft has {} violation(s)", result.len());
    }
    Ok(())
}

fn render_draft(file: &Path, remove: Vec<String>, output: &str) -> Result<()> {
    let draft = read_draft(file)?;
    let result = validate(&draft);
    if !result.is_empty() {
        print_violations(&result, "table")?;
        anyhow::bail!("Draft has {} violation(s); nothing to render", result.len());
    }
    let redacted = draft.redacted_fields();
    if !redacted.is_empty() {
        anyhow::bail!("Draft holds redacted placeholders for: {}", field_list(&redacted));
    }

    let removals: RemovalSet = remove.into_iter().collect();
    let update = synthesize(&draft, &removals)?;
    print_output(&update, output)
}

async fn load_session(session: &ConfigurationSession) -> Result<()> {
    let tenant = session.tenant();
    match session.load().await? {
        LoadOutcome::Applied => Ok(()),
        outcome => anyhow::bail!("Load of {} did not apply: {:?}", tenant, outcome),
    }
}

async fn show_configuration(session: &ConfigurationSession, draft: bool, output: &str) -> Result<()> {
    load_session(session).await?;

    if draft {
        print_output(&session.draft(), output)
    } else {
        let baseline = session.baseline().context("No configuration loaded")?;
        print_output(&baseline, output)
    }
}

/// Mark stored certificates for removal by name
fn remove_certificates(session: &ConfigurationSession, names: &[String]) -> Result<()> {
    let draft = session.draft();
    for name in names {
        let slot = SlotKind::ALL.into_iter().find(|kind| {
            draft.certificates.get(*kind).stored().is_some_and(|info| &info.name == name)
        });
        match slot {
            Some(kind) => {
                session.remove_stored_certificate(kind);
            }
            None => anyhow::bail!("No stored certificate named '{}' on this tenant", name),
        }
    }
    Ok(())
}

async fn apply_draft(
    session: &ConfigurationSession,
    draft: EncryptionDraft,
    remove: &[String],
) -> Result<()> {
    load_session(session).await?;
    let draft = restore_credentials(draft, &session.draft())?;
    remove_certificates(session, remove)?;
    session.edit(|current| *current = draft);

    submit(session).await
}

/// Replace redacted placeholders with the loaded credentials
fn restore_credentials(mut draft: EncryptionDraft, loaded: &EncryptionDraft) -> Result<EncryptionDraft> {
    let unresolved = draft.restore_redacted(loaded);
    if !unresolved.is_empty() {
        anyhow::bail!(
            "Draft holds redacted placeholders with no current value for: {}",
            field_list(&unresolved)
        );
    }
    Ok(draft)
}

fn field_list(fields: &[FieldId]) -> String {
    fields.iter().map(FieldId::as_str).collect::<Vec<_>>().join(", ")
}

async fn disable_encryption(session: &ConfigurationSession, remove: &[String]) -> Result<()> {
    load_session(session).await?;
    remove_certificates(session, remove)?;
    session.set_enabled(false);

    submit(session).await
}

async fn submit(session: &ConfigurationSession) -> Result<()> {
    let tenant = session.tenant();
    match session.submit().await? {
        SubmitOutcome::Submitted { reloaded } => {
            println!("Encryption configuration for {} submitted", tenant);
            if !reloaded {
                println!("Warning: the configuration could not be reloaded after submit");
            }
            Ok(())
        }
        SubmitOutcome::Blocked(violations) => {
            print_violations(&violations, "table")?;
            anyhow::bail!("Draft has {} violation(s); nothing submitted", violations.len())
        }
        outcome => anyhow::bail!("Submit for {} did not complete: {:?}", tenant, outcome),
    }
}
