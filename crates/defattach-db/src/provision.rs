//! Creation and evolution of the `DefaultAttachments` table across tenant
//! databases.
//!
//! Provisioning one database walks `unknown -> {missing | complete |
//! incomplete} -> ready`. A ready table only costs the existence checks on
//! the next run.

use tracing::{error, info, warn};

use defattach_core::schema::{self, COLUMNS};

use crate::config::{redact, ConnectionResolver};
use crate::{Database, DbError};

/// What `ensure_table` found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableState {
    /// The table was missing and has been created.
    Created,
    /// The table already had every expected column.
    Complete,
    /// The table existed; the listed columns were missing and have been added.
    Evolved { added: Vec<&'static str> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub table: TableState,
    /// Seed rows inserted; 0 when seeding is off or the table had rows.
    pub seeded: u64,
}

/// Result of provisioning one target. `target` has any password masked.
#[derive(Debug)]
pub struct TenantOutcome {
    pub target: String,
    pub result: Result<Provisioned, DbError>,
}

impl TenantOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of a batch run. Never an error as a whole: failures are recorded
/// per target, and a failed registry lookup in `discovery_error`.
#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub discovery_error: Option<DbError>,
    pub outcomes: Vec<TenantOutcome>,
}

impl ProvisionReport {
    pub fn failures(&self) -> impl Iterator<Item = &TenantOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.discovery_error.is_none() && self.failures().next().is_none()
    }
}

/// Create the table if it is missing, otherwise add whichever expected
/// columns are absent.
pub async fn ensure_table(db: &dyn Database) -> Result<TableState, DbError> {
    if !db.table_exists().await? {
        db.create_table().await?;
        info!("{} table created", schema::TABLE_NAME);
        return Ok(TableState::Created);
    }

    let mut added = Vec::new();
    for column in &COLUMNS {
        if !db.column_exists(column.name).await? {
            db.add_column(column).await?;
            info!("added column {} to {}", column.name, schema::TABLE_NAME);
            added.push(column.name);
        }
    }

    if added.is_empty() {
        Ok(TableState::Complete)
    } else {
        Ok(TableState::Evolved { added })
    }
}

/// Insert the default rows when the table is empty. Returns rows inserted.
pub async fn seed_if_empty(db: &dyn Database) -> Result<u64, DbError> {
    if db.count_attachments().await? > 0 {
        return Ok(0);
    }
    let inserted = db.insert_seed_rows(&schema::seed_rows()).await?;
    info!("{} seed inserted: {inserted}", schema::TABLE_NAME);
    Ok(inserted)
}

/// Provisions the master database, or every tenant database registered in it.
#[derive(Debug, Clone)]
pub struct SchemaProvisioner {
    master_connection: String,
    enable_seeding: bool,
}

impl SchemaProvisioner {
    pub fn new(master_connection: impl Into<String>) -> Self {
        Self {
            master_connection: master_connection.into(),
            enable_seeding: true,
        }
    }

    /// Uses the resolver's default connection as the master.
    pub fn from_resolver(resolver: &ConnectionResolver) -> Result<Self, DbError> {
        Ok(Self::new(resolver.resolve(None)?))
    }

    pub fn with_seeding(mut self, enabled: bool) -> Self {
        self.enable_seeding = enabled;
        self
    }

    /// Provision a single existing database. The connection is dropped on
    /// return.
    pub async fn provision(&self, connection: &str) -> Result<Provisioned, DbError> {
        let db = crate::open(connection).await?;
        self.provision_db(db.as_ref()).await
    }

    async fn provision_db(&self, db: &dyn Database) -> Result<Provisioned, DbError> {
        let table = ensure_table(db).await?;
        let seeded = if self.enable_seeding {
            seed_if_empty(db).await?
        } else {
            0
        };
        Ok(Provisioned { table, seeded })
    }

    /// Provision the master database, creating a missing SQLite file.
    pub async fn provision_master(&self) -> TenantOutcome {
        let result = match crate::open_or_create(&self.master_connection).await {
            Ok(db) => self.provision_db(db.as_ref()).await,
            Err(e) => Err(e),
        };
        let outcome = TenantOutcome {
            target: redact(&self.master_connection),
            result,
        };
        match &outcome.result {
            Ok(_) => info!("{} table processed for master database", schema::TABLE_NAME),
            Err(e) => error!("error processing master database {}: {e}", outcome.target),
        }
        outcome
    }

    /// Provision every connection in order. One target failing does not stop
    /// the others.
    pub async fn provision_all(&self, connections: &[String]) -> ProvisionReport {
        let mut report = ProvisionReport::default();
        for connection in connections {
            let outcome = self.provision_one(connection).await;
            match &outcome.result {
                Ok(_) => info!(
                    "{} table processed for tenant database {}",
                    schema::TABLE_NAME,
                    outcome.target
                ),
                Err(e) => error!("error processing tenant database {}: {e}", outcome.target),
            }
            report.outcomes.push(outcome);
        }
        report
    }

    /// Look up tenants in the master's registry, then provision each of them.
    pub async fn provision_tenants(&self) -> ProvisionReport {
        match self.tenant_connections().await {
            Ok(connections) => {
                if connections.is_empty() {
                    warn!(
                        "no tenant databases registered in {}",
                        redact(&self.master_connection)
                    );
                } else {
                    info!("found {} tenant database(s)", connections.len());
                }
                self.provision_all(&connections).await
            }
            Err(e) => {
                error!(
                    "failed to read tenant registry from {}: {e}",
                    redact(&self.master_connection)
                );
                ProvisionReport {
                    discovery_error: Some(e),
                    outcomes: Vec::new(),
                }
            }
        }
    }

    pub async fn tenant_connections(&self) -> Result<Vec<String>, DbError> {
        let master = crate::open(&self.master_connection).await?;
        master.tenant_connection_strings().await
    }

    async fn provision_one(&self, connection: &str) -> TenantOutcome {
        TenantOutcome {
            target: redact(connection),
            result: self.provision(connection).await,
        }
    }
}
