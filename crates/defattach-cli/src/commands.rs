use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use tracing::warn;

use defattach_core::{ArticleSet, DefaultAttachment, PageRequest};
use defattach_db::{
    DbError, DefaultAttachmentRepository, Provisioned, SchemaProvisioner, TableState,
    TenantOutcome,
};

use crate::config::{Cli, Command};

/// Run the parsed command, writing its report to `out`.
pub async fn run(cli: &Cli, out: &mut impl Write) -> Result<ExitCode> {
    if execute(cli, out).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Returns `Ok(false)` when provisioning completed with failed targets.
pub async fn execute(cli: &Cli, out: &mut impl Write) -> Result<bool> {
    let tenant = cli.tenant.as_deref();

    match &cli.command {
        Command::Provision { master, no_seed } => {
            let provisioner = SchemaProvisioner::from_resolver(&cli.resolver())?
                .with_seeding(!no_seed);
            provision(&provisioner, *master, tenant, out).await
        }
        Command::List {
            page,
            size,
            search,
            sort,
            json,
        } => {
            let mut request = PageRequest::new(*page, *size);
            if let Some(search) = search {
                request = request.with_search(search.as_str());
            }
            if let Some(sort) = sort {
                request = request.with_sort(sort.as_str());
            }
            let set = repository(cli).search(&request, tenant).await?;
            if *json {
                serde_json::to_writer_pretty(&mut *out, &set)?;
                writeln!(out)?;
            } else {
                write_page(out, &request, &set)?;
            }
            Ok(true)
        }
        Command::Get { id, json } => {
            let found = require(repository(cli).get(*id, tenant).await?, *id)?;
            if *json {
                serde_json::to_writer_pretty(&mut *out, &found)?;
                writeln!(out)?;
            } else {
                write_header(out)?;
                write_row(out, &found)?;
            }
            Ok(true)
        }
        Command::Add(fields) => {
            let created = repository(cli).add(&fields.to_create(), tenant).await?;
            writeln!(out, "created {}", created.id)?;
            write_header(out)?;
            write_row(out, &created)?;
            Ok(true)
        }
        Command::Update { id, fields } => {
            let repo = repository(cli);
            let mut record = require(repo.get(*id, tenant).await?, *id)?;
            fields.apply(&mut record);
            if !repo.update(&record, tenant).await? {
                // Deleted between the read and the write.
                return Err(not_found(*id).into());
            }
            writeln!(out, "updated {id}")?;
            Ok(true)
        }
        Command::Delete { id } => {
            if !repository(cli).delete(*id, tenant).await? {
                return Err(not_found(*id).into());
            }
            writeln!(out, "deleted {id}")?;
            Ok(true)
        }
    }
}

fn repository(cli: &Cli) -> DefaultAttachmentRepository {
    DefaultAttachmentRepository::new(cli.resolver())
}

fn not_found(id: i64) -> DbError {
    DbError::NotFound(format!("default attachment {id}"))
}

fn require(found: Option<DefaultAttachment>, id: i64) -> Result<DefaultAttachment, DbError> {
    found.ok_or_else(|| not_found(id))
}

async fn provision(
    provisioner: &SchemaProvisioner,
    master: bool,
    tenant: Option<&str>,
    out: &mut impl Write,
) -> Result<bool> {
    if master {
        let outcome = provisioner.provision_master().await;
        write_outcome(out, &outcome)?;
        return Ok(outcome.is_ok());
    }

    let report = match tenant {
        Some(tenant) => provisioner.provision_all(&[tenant.to_string()]).await,
        None => provisioner.provision_tenants().await,
    };
    if let Some(e) = &report.discovery_error {
        writeln!(out, "FAILED  tenant registry: {e}")?;
    }
    for outcome in &report.outcomes {
        write_outcome(out, outcome)?;
    }
    writeln!(
        out,
        "{} of {} target(s) provisioned",
        report.succeeded(),
        report.outcomes.len()
    )?;
    if !report.all_succeeded() {
        warn!("provisioning finished with failures");
    }
    Ok(report.all_succeeded())
}

fn write_outcome(out: &mut impl Write, outcome: &TenantOutcome) -> std::io::Result<()> {
    match &outcome.result {
        Ok(provisioned) => writeln!(out, "ok      {}  {}", outcome.target, describe(provisioned)),
        Err(e) => writeln!(out, "FAILED  {}  {e}", outcome.target),
    }
}

fn describe(provisioned: &Provisioned) -> String {
    let table = match &provisioned.table {
        TableState::Created => "created".to_string(),
        TableState::Complete => "up to date".to_string(),
        TableState::Evolved { added } => format!("added {}", added.join(", ")),
    };
    if provisioned.seeded > 0 {
        format!("{table}, seeded {}", provisioned.seeded)
    } else {
        table
    }
}

fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

fn write_header(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>6}  {:<10}  {:<8}  {:<6}  {:<9}  {:<16}  NAME",
        "ID", "TYPE", "REQUIRED", "ACTIVE", "APPLICANT", "CREATED"
    )
}

fn write_row(out: &mut impl Write, a: &DefaultAttachment) -> std::io::Result<()> {
    let created = a
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into());
    let applicant = a
        .applicant_type
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".into());
    writeln!(
        out,
        "{:>6}  {:<10}  {:<8}  {:<6}  {:<9}  {:<16}  {}",
        a.id,
        a.kind.as_deref().unwrap_or("-"),
        flag(a.is_required),
        flag(a.active),
        applicant,
        created,
        a.name.as_deref().unwrap_or("")
    )
}

fn write_page(
    out: &mut impl Write,
    request: &PageRequest,
    set: &ArticleSet<DefaultAttachment>,
) -> std::io::Result<()> {
    if set.items.is_empty() {
        writeln!(out, "No attachments found.")?;
    } else {
        write_header(out)?;
        for a in &set.items {
            write_row(out, a)?;
        }
    }
    let size = i64::from(request.page_size());
    let pages = (set.total_count + size - 1) / size;
    writeln!(
        out,
        "page {} of {}, {} total, sorted by {}",
        request.page_index() + 1,
        pages.max(1),
        set.total_count,
        request.sort_key()
    )
}
