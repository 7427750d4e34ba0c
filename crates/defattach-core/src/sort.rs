use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of orderings a caller can ask for.
///
/// Callers pass a free-form token; it is only ever mapped through
/// [`SortKey::resolve`], never written into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    Id,
    #[default]
    IdDesc,
    Name,
    NameDesc,
    Type,
    TypeDesc,
    IsRequired,
    IsRequiredDesc,
    Active,
    ActiveDesc,
    ApplicantType,
    ApplicantTypeDesc,
    CreatedAt,
    CreatedAtDesc,
}

/// Sortable columns of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Name,
    Type,
    IsRequired,
    Active,
    ApplicantType,
    CreatedAt,
}

/// What a NULL sorts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullFill {
    /// Left as NULL; the store's own NULL ordering applies.
    Keep,
    EmptyString,
    False,
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortTerm {
    pub column: SortColumn,
    pub descending: bool,
}

impl SortTerm {
    const fn asc(column: SortColumn) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    const fn desc(column: SortColumn) -> Self {
        Self {
            column,
            descending: true,
        }
    }
}

impl SortColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            SortColumn::Id => "Id",
            SortColumn::Name => "Name",
            SortColumn::Type => "Type",
            SortColumn::IsRequired => "IsRequired",
            SortColumn::Active => "Active",
            SortColumn::ApplicantType => "ApplicantType",
            SortColumn::CreatedAt => "CreatedAt",
        }
    }

    pub fn null_fill(&self) -> NullFill {
        match self {
            SortColumn::Id | SortColumn::CreatedAt => NullFill::Keep,
            SortColumn::Name | SortColumn::Type => NullFill::EmptyString,
            SortColumn::IsRequired | SortColumn::Active => NullFill::False,
            SortColumn::ApplicantType => NullFill::Zero,
        }
    }
}

const ALL: [SortKey; 14] = [
    SortKey::Id,
    SortKey::IdDesc,
    SortKey::Name,
    SortKey::NameDesc,
    SortKey::Type,
    SortKey::TypeDesc,
    SortKey::IsRequired,
    SortKey::IsRequiredDesc,
    SortKey::Active,
    SortKey::ActiveDesc,
    SortKey::ApplicantType,
    SortKey::ApplicantTypeDesc,
    SortKey::CreatedAt,
    SortKey::CreatedAtDesc,
];

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "Id",
            SortKey::IdDesc => "IdDesc",
            SortKey::Name => "Name",
            SortKey::NameDesc => "NameDesc",
            SortKey::Type => "Type",
            SortKey::TypeDesc => "TypeDesc",
            SortKey::IsRequired => "IsRequired",
            SortKey::IsRequiredDesc => "IsRequiredDesc",
            SortKey::Active => "Active",
            SortKey::ActiveDesc => "ActiveDesc",
            SortKey::ApplicantType => "ApplicantType",
            SortKey::ApplicantTypeDesc => "ApplicantTypeDesc",
            SortKey::CreatedAt => "CreatedAt",
            SortKey::CreatedAtDesc => "CreatedAtDesc",
        }
    }

    /// Exact, case-sensitive match on the token.
    pub fn parse_str(s: &str) -> Option<Self> {
        ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// Map a caller token to a key. Surrounding whitespace is ignored;
    /// blank or unknown tokens fall back to [`SortKey::IdDesc`].
    pub fn resolve(token: &str) -> Self {
        Self::parse_str(token.trim()).unwrap_or_default()
    }

    /// The full ORDER BY term list, tie-break included.
    pub fn terms(&self) -> Vec<SortTerm> {
        use SortColumn as C;

        let (primary, descending) = match self {
            SortKey::Id => return vec![SortTerm::asc(C::Id)],
            SortKey::IdDesc => return vec![SortTerm::desc(C::Id)],
            SortKey::Name => (vec![C::Name], false),
            SortKey::NameDesc => (vec![C::Name], true),
            SortKey::Type => (vec![C::Type, C::IsRequired], false),
            SortKey::TypeDesc => (vec![C::Type, C::IsRequired], true),
            SortKey::IsRequired => (vec![C::IsRequired, C::Type], false),
            SortKey::IsRequiredDesc => (vec![C::IsRequired, C::Type], true),
            SortKey::Active => (vec![C::Active], false),
            SortKey::ActiveDesc => (vec![C::Active], true),
            SortKey::ApplicantType => (vec![C::ApplicantType], false),
            SortKey::ApplicantTypeDesc => (vec![C::ApplicantType], true),
            SortKey::CreatedAt => (vec![C::CreatedAt], false),
            SortKey::CreatedAtDesc => (vec![C::CreatedAt], true),
        };

        let mut terms: Vec<SortTerm> = primary
            .into_iter()
            .map(|column| SortTerm { column, descending })
            .collect();
        terms.push(SortTerm::desc(C::Id));
        terms
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
