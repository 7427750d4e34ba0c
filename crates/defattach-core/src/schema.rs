//! Logical layout of the `DefaultAttachments` table.
//!
//! Backends render these definitions into their own DDL; the names, the
//! nullability and the defaults are fixed here.

use crate::attachment::CreateDefaultAttachment;

pub const TABLE_NAME: &str = "DefaultAttachments";
pub const ID_COLUMN: &str = "Id";

/// Registry table in the master database listing tenant databases.
pub const TENANTS_TABLE: &str = "Tenants";
pub const TENANT_CONNECTION_COLUMN: &str = "ConnectionString";

/// Author recorded on seeded rows.
pub const SYSTEM_AUTHOR: &str = "System";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Timestamp,
    /// Variable-length text with a maximum length in characters.
    BoundedText(u32),
    Text,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    True,
    Zero,
    /// Insertion time, with offset.
    CurrentTimestamp,
}

/// One nullable data column. `Id` is not listed; it is part of table creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub default: Option<ColumnDefault>,
}

impl ColumnDef {
    /// Name of the default constraint, e.g. `DF_DefaultAttachments_Active`.
    pub fn constraint_name(&self) -> Option<String> {
        self.default
            .map(|_| format!("DF_{TABLE_NAME}_{}", self.name))
    }
}

/// Data columns in table order.
pub const COLUMNS: [ColumnDef; 7] = [
    ColumnDef {
        name: "Active",
        kind: ColumnKind::Bool,
        default: Some(ColumnDefault::True),
    },
    ColumnDef {
        name: "CreatedAt",
        kind: ColumnKind::Timestamp,
        default: Some(ColumnDefault::CurrentTimestamp),
    },
    ColumnDef {
        name: "CreatedBy",
        kind: ColumnKind::BoundedText(255),
        default: None,
    },
    ColumnDef {
        name: "Name",
        kind: ColumnKind::Text,
        default: None,
    },
    ColumnDef {
        name: "ApplicantType",
        kind: ColumnKind::Int,
        default: Some(ColumnDefault::Zero),
    },
    ColumnDef {
        name: "Type",
        kind: ColumnKind::BoundedText(255),
        default: None,
    },
    ColumnDef {
        name: "IsRequired",
        kind: ColumnKind::Bool,
        default: Some(ColumnDefault::True),
    },
];

/// Column list for SELECTs, `Id` first, in the order row mappers read them.
pub const SELECT_COLUMNS: [&str; 8] = [
    ID_COLUMN,
    "Active",
    "CreatedAt",
    "CreatedBy",
    "Name",
    "ApplicantType",
    "Type",
    "IsRequired",
];

pub fn column(name: &str) -> Option<&'static ColumnDef> {
    COLUMNS.iter().find(|c| c.name == name)
}

/// Rows inserted into an empty table on first provisioning.
///
/// Applicant types: 0 = unspecified, 1 = business, 2 = individual.
pub fn seed_rows() -> [CreateDefaultAttachment; 3] {
    let row = |name: &str, applicant_type: i32, kind: &str, is_required: bool| {
        CreateDefaultAttachment {
            name: Some(name.to_string()),
            created_by: Some(SYSTEM_AUTHOR.to_string()),
            kind: Some(kind.to_string()),
            active: Some(true),
            is_required: Some(is_required),
            applicant_type: Some(applicant_type),
        }
    };
    [
        row("사업자등록증 사본", 1, "Document", true),
        row("신분증 사본", 2, "Document", true),
        row("기타 참고자료(선택)", 0, "Etc", false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bearing_columns_have_named_constraints() {
        let named: Vec<_> = COLUMNS
            .iter()
            .filter_map(|c| c.constraint_name())
            .collect();
        assert_eq!(
            named,
            vec![
                "DF_DefaultAttachments_Active",
                "DF_DefaultAttachments_CreatedAt",
                "DF_DefaultAttachments_ApplicantType",
                "DF_DefaultAttachments_IsRequired",
            ]
        );
        assert_eq!(column("Name").unwrap().constraint_name(), None);
    }

    #[test]
    fn select_columns_cover_every_data_column() {
        for c in &COLUMNS {
            assert!(SELECT_COLUMNS.contains(&c.name), "{}", c.name);
        }
        assert_eq!(SELECT_COLUMNS[0], ID_COLUMN);
    }

    #[test]
    fn seed_rows_are_fully_specified() {
        let rows = seed_rows();
        assert_eq!(rows.len(), 3);
        for r in &rows {
            assert_eq!(r.created_by.as_deref(), Some(SYSTEM_AUTHOR));
            assert_eq!(r.active, Some(true));
        }
        assert_eq!(rows[0].applicant_type, Some(1));
        assert_eq!(rows[1].applicant_type, Some(2));
        assert_eq!(rows[2].applicant_type, Some(0));
        assert_eq!(rows[2].kind.as_deref(), Some("Etc"));
        assert_eq!(rows[2].is_required, Some(false));
    }
}
