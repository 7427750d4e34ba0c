//! SQL text shared by both backends.
//!
//! Only identifiers from `defattach_core::schema` and fixed keywords are
//! written into statements; every caller-supplied value goes through a
//! numbered placeholder.

use defattach_core::schema::{
    ColumnDef, ColumnDefault, ColumnKind, COLUMNS, ID_COLUMN, SELECT_COLUMNS, TABLE_NAME,
};
use defattach_core::sort::{NullFill, SortKey};
use defattach_core::{CreateDefaultAttachment, DefaultAttachment, SearchTerm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Sqlite,
    Postgres,
}

/// A bind value. Nullable variants bind SQL NULL for `None`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SqlValue {
    Text(Option<String>),
    Bool(Option<bool>),
    Int(Option<i32>),
    BigInt(i64),
}

const SQLITE_NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ','now')";

impl Dialect {
    pub(crate) fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::Sqlite => format!("?{n}"),
            Dialect::Postgres => format!("${n}"),
        }
    }

    fn like_operator(self) -> &'static str {
        match self {
            Dialect::Sqlite => "LIKE",
            Dialect::Postgres => "ILIKE",
        }
    }

    fn bool_literal(self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::Sqlite, false) => "0",
            (Dialect::Sqlite, true) => "1",
            (Dialect::Postgres, false) => "FALSE",
            (Dialect::Postgres, true) => "TRUE",
        }
    }

    fn id_definition(self) -> &'static str {
        match self {
            Dialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
            Dialect::Postgres => "BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY",
        }
    }

    fn column_type(self, kind: ColumnKind) -> String {
        match (self, kind) {
            (_, ColumnKind::Bool) => "BOOLEAN".into(),
            (Dialect::Sqlite, ColumnKind::Timestamp) => "TEXT".into(),
            (Dialect::Postgres, ColumnKind::Timestamp) => "TIMESTAMPTZ".into(),
            (_, ColumnKind::BoundedText(len)) => format!("VARCHAR({len})"),
            (_, ColumnKind::Text) => "TEXT".into(),
            (_, ColumnKind::Int) => "INTEGER".into(),
        }
    }

    fn default_expr(self, default: ColumnDefault) -> String {
        match (self, default) {
            (_, ColumnDefault::True) => self.bool_literal(true).into(),
            (_, ColumnDefault::Zero) => "0".into(),
            (Dialect::Sqlite, ColumnDefault::CurrentTimestamp) => format!("({SQLITE_NOW})"),
            (Dialect::Postgres, ColumnDefault::CurrentTimestamp) => "now()".into(),
        }
    }

    /// SQLite rejects non-constant defaults in `ALTER TABLE ADD COLUMN`.
    fn can_add_default(self, default: ColumnDefault) -> bool {
        !(self == Dialect::Sqlite && default == ColumnDefault::CurrentTimestamp)
    }
}

pub(crate) fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

pub(crate) fn table() -> String {
    quote(TABLE_NAME)
}

pub(crate) fn select_list() -> String {
    SELECT_COLUMNS
        .iter()
        .map(|c| quote(c))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------------

fn column_clause(dialect: Dialect, column: &ColumnDef, with_default: bool) -> String {
    let mut clause = format!(
        "{} {} NULL",
        quote(column.name),
        dialect.column_type(column.kind)
    );
    if let (true, Some(default), Some(name)) =
        (with_default, column.default, column.constraint_name())
    {
        clause.push_str(&format!(
            " CONSTRAINT {} DEFAULT {}",
            quote(&name),
            dialect.default_expr(default)
        ));
    }
    clause
}

pub(crate) fn create_table(dialect: Dialect) -> String {
    let mut lines = vec![format!(
        "{} {}",
        quote(ID_COLUMN),
        dialect.id_definition()
    )];
    lines.extend(COLUMNS.iter().map(|c| column_clause(dialect, c, true)));
    format!(
        "CREATE TABLE {} (\n    {}\n)",
        table(),
        lines.join(",\n    ")
    )
}

/// Statements that add `column` to an existing table with the same type and
/// default as the create path.
pub(crate) fn add_column(dialect: Dialect, column: &ColumnDef) -> Vec<String> {
    let inline_default = column
        .default
        .map_or(true, |d| dialect.can_add_default(d));
    let mut statements = vec![format!(
        "ALTER TABLE {} ADD COLUMN {}",
        table(),
        column_clause(dialect, column, inline_default)
    )];
    if !inline_default {
        // Stamp the value after insert instead of through a column default.
        statements.push(format!(
            "CREATE TRIGGER IF NOT EXISTS {trigger} AFTER INSERT ON {table} \
             FOR EACH ROW WHEN NEW.{col} IS NULL \
             BEGIN UPDATE {table} SET {col} = {SQLITE_NOW} WHERE {id} = NEW.{id}; END",
            trigger = quote(&format!("TR_{TABLE_NAME}_{}", column.name)),
            table = table(),
            col = quote(column.name),
            id = quote(ID_COLUMN),
        ));
        // Existing rows get the value a default would have backfilled.
        statements.push(format!(
            "UPDATE {} SET {col} = {SQLITE_NOW} WHERE {col} IS NULL",
            table(),
            col = quote(column.name),
        ));
    }
    statements
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// WHERE clause plus its bind values, numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Filter {
    pub clause: String,
    pub params: Vec<SqlValue>,
}

impl Filter {
    /// Index of the next free placeholder.
    pub(crate) fn next_index(&self) -> usize {
        self.params.len() + 1
    }
}

pub(crate) fn build_filter(dialect: Dialect, term: Option<&SearchTerm>) -> Filter {
    let Some(term) = term else {
        return Filter {
            clause: String::new(),
            params: Vec::new(),
        };
    };

    let mut params = vec![SqlValue::Text(Some(term.like_pattern()))];
    let like = dialect.placeholder(1);
    let mut arms: Vec<String> = ["Name", "CreatedBy", "Type"]
        .iter()
        .map(|c| {
            let c = quote(c);
            format!(
                "({c} IS NOT NULL AND {c} {} {like} ESCAPE '\\')",
                dialect.like_operator()
            )
        })
        .collect();

    if let Some(b) = term.as_bool() {
        params.push(SqlValue::Bool(Some(b)));
        let p = dialect.placeholder(params.len());
        arms.push(format!("({} = {p})", quote("IsRequired")));
        arms.push(format!("({} = {p})", quote("Active")));
    }
    if let Some(i) = term.as_int() {
        params.push(SqlValue::Int(Some(i)));
        let p = dialect.placeholder(params.len());
        arms.push(format!("({} = {p})", quote("ApplicantType")));
    }

    Filter {
        clause: format!("WHERE ({})", arms.join(" OR ")),
        params,
    }
}

pub(crate) fn order_by(dialect: Dialect, key: SortKey) -> String {
    let terms: Vec<String> = key
        .terms()
        .iter()
        .map(|t| {
            let col = quote(t.column.column_name());
            let expr = match t.column.null_fill() {
                NullFill::Keep => col,
                NullFill::EmptyString => format!("COALESCE({col}, '')"),
                NullFill::False => format!("COALESCE({col}, {})", dialect.bool_literal(false)),
                NullFill::Zero => format!("COALESCE({col}, 0)"),
            };
            let dir = if t.descending { "DESC" } else { "ASC" };
            format!("{expr} {dir}")
        })
        .collect();
    format!("ORDER BY {}", terms.join(", "))
}

pub(crate) fn count_query(filter: &Filter) -> String {
    format!("SELECT COUNT(*) FROM {} {}", table(), filter.clause)
}

/// Page query; the two extra placeholders after the filter's are the limit
/// and the offset, in that order.
pub(crate) fn page_query(dialect: Dialect, filter: &Filter, key: SortKey) -> String {
    let limit = dialect.placeholder(filter.next_index());
    let offset = dialect.placeholder(filter.next_index() + 1);
    format!(
        "SELECT {} FROM {} {} {} LIMIT {limit} OFFSET {offset}",
        select_list(),
        table(),
        filter.clause,
        order_by(dialect, key)
    )
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Columns and values of one INSERT. Default-bearing columns the caller left
/// unset are absent so the store default fires.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InsertPlan {
    columns: Vec<&'static str>,
    values: Vec<SqlValue>,
}

impl InsertPlan {
    pub(crate) fn for_input(input: &CreateDefaultAttachment) -> Self {
        let mut plan = Self {
            columns: Vec::new(),
            values: Vec::new(),
        };
        plan.push("Name", SqlValue::Text(input.name.clone()));
        plan.push("CreatedBy", SqlValue::Text(input.created_by.clone()));
        plan.push("Type", SqlValue::Text(input.kind.clone()));
        if let Some(active) = input.active {
            plan.push("Active", SqlValue::Bool(Some(active)));
        }
        if let Some(is_required) = input.is_required {
            plan.push("IsRequired", SqlValue::Bool(Some(is_required)));
        }
        if let Some(applicant_type) = input.applicant_type {
            plan.push("ApplicantType", SqlValue::Int(Some(applicant_type)));
        }
        plan
    }

    fn push(&mut self, column: &'static str, value: SqlValue) {
        self.columns.push(column);
        self.values.push(value);
    }

    #[cfg(test)]
    pub(crate) fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub(crate) fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// `INSERT ... RETURNING "Id"`.
    pub(crate) fn sql(&self, dialect: Dialect) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| quote(c)).collect();
        let placeholders: Vec<String> = (1..=self.values.len())
            .map(|n| dialect.placeholder(n))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table(),
            columns.join(", "),
            placeholders.join(", "),
            quote(ID_COLUMN)
        )
    }
}

const UPDATE_COLUMNS: [&str; 6] = [
    "Active",
    "Name",
    "Type",
    "IsRequired",
    "CreatedBy",
    "ApplicantType",
];

/// Full-field update by id. `Id` and `CreatedAt` are never written.
pub(crate) fn update_query(dialect: Dialect) -> String {
    let sets: Vec<String> = UPDATE_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = {}", quote(c), dialect.placeholder(i + 1)))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = {}",
        table(),
        sets.join(", "),
        quote(ID_COLUMN),
        dialect.placeholder(UPDATE_COLUMNS.len() + 1)
    )
}

pub(crate) fn update_values(a: &DefaultAttachment) -> Vec<SqlValue> {
    vec![
        SqlValue::Bool(a.active),
        SqlValue::Text(a.name.clone()),
        SqlValue::Text(a.kind.clone()),
        SqlValue::Bool(a.is_required),
        SqlValue::Text(a.created_by.clone()),
        SqlValue::Int(a.applicant_type),
        SqlValue::BigInt(a.id),
    ]
}
