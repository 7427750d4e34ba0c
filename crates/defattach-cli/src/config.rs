use clap::{Args, Parser, Subcommand};

use defattach_core::{CreateDefaultAttachment, DefaultAttachment, DEFAULT_PAGE_SIZE};
use defattach_db::config::DEFAULT_CONNECTION_ENV;
use defattach_db::ConnectionResolver;

#[derive(Debug, Parser)]
#[command(name = "defattach", about = "Default attachment catalogue admin")]
pub struct Cli {
    /// Master database connection string (SQLite path or postgres:// URL)
    #[arg(long, global = true, env = DEFAULT_CONNECTION_ENV)]
    pub connection: Option<String>,

    /// Tenant database to operate on instead of the master
    #[arg(long, global = true)]
    pub tenant: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn resolver(&self) -> ConnectionResolver {
        ConnectionResolver::new(self.connection.clone())
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or upgrade the DefaultAttachments table in every tenant database
    Provision {
        /// Provision the master database itself instead of its tenants
        #[arg(long)]
        master: bool,
        /// Do not insert the default rows into empty tables
        #[arg(long)]
        no_seed: bool,
    },
    /// Search one page of attachments
    List {
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        page: i32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, allow_negative_numbers = true)]
        size: i32,
        /// Matches name, author or type; also applicant type and flags
        #[arg(long)]
        search: Option<String>,
        /// Sort key, e.g. Name, NameDesc, ApplicantType (default IdDesc)
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show one attachment
    Get {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Insert an attachment; unset flags take the column defaults
    Add(FieldArgs),
    /// Change fields of an existing attachment
    Update {
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an attachment
    Delete { id: i64 },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Provision { .. } => "provision",
            Command::List { .. } => "list",
            Command::Get { .. } => "get",
            Command::Add(_) => "add",
            Command::Update { .. } => "update",
            Command::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct FieldArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "type")]
    pub kind: Option<String>,
    #[arg(long)]
    pub created_by: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub applicant_type: Option<i32>,
    #[arg(long)]
    pub active: Option<bool>,
    #[arg(long)]
    pub required: Option<bool>,
}

impl FieldArgs {
    pub fn to_create(&self) -> CreateDefaultAttachment {
        CreateDefaultAttachment {
            name: self.name.clone(),
            created_by: self.created_by.clone(),
            kind: self.kind.clone(),
            active: self.active,
            is_required: self.required,
            applicant_type: self.applicant_type,
        }
    }

    /// Overlay the given flags onto an existing record. Flags left out keep
    /// the record's current value.
    pub fn apply(&self, record: &mut DefaultAttachment) {
        if let Some(name) = &self.name {
            record.name = Some(name.clone());
        }
        if let Some(kind) = &self.kind {
            record.kind = Some(kind.clone());
        }
        if let Some(created_by) = &self.created_by {
            record.created_by = Some(created_by.clone());
        }
        if self.applicant_type.is_some() {
            record.applicant_type = self.applicant_type;
        }
        if self.active.is_some() {
            record.active = self.active;
        }
        if self.required.is_some() {
            record.is_required = self.required;
        }
    }
}
