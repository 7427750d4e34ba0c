// Backend-agnostic integration tests for the Database trait.
//
// Each public async function accepts `&dyn Database` holding a freshly
// provisioned, empty `DefaultAttachments` table so the same assertions can be
// run against both the SQLite and Postgres backends.

#![allow(dead_code)]

use std::cmp::Reverse;
use std::collections::HashSet;

use defattach_core::{CreateDefaultAttachment, DefaultAttachment, PageRequest};
use defattach_db::provision::{ensure_table, seed_if_empty, TableState};
use defattach_db::Database;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn named(name: &str) -> CreateDefaultAttachment {
    CreateDefaultAttachment {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

async fn add(db: &dyn Database, input: CreateDefaultAttachment) -> DefaultAttachment {
    db.add_attachment(&input).await.unwrap()
}

fn ids(items: &[DefaultAttachment]) -> Vec<i64> {
    items.iter().map(|a| a.id).collect()
}

// ---------------------------------------------------------------------------
// Insert / read
// ---------------------------------------------------------------------------

/// Unset default-bearing fields read back as the column defaults.
pub async fn test_insert_defaults(db: &dyn Database) {
    let a = add(db, named("Business license")).await;
    assert!(a.id > 0);
    assert_eq!(a.active, Some(true));
    assert_eq!(a.is_required, Some(true));
    assert_eq!(a.applicant_type, Some(0));
    assert_eq!(a.created_by, None);
    assert_eq!(a.kind, None);
    assert!(a.created_at.is_some());
}

/// Explicit falsy values are written as given, not replaced by defaults.
pub async fn test_insert_explicit_falsy_values(db: &dyn Database) {
    let a = add(
        db,
        CreateDefaultAttachment {
            name: Some("Optional memo".into()),
            active: Some(false),
            is_required: Some(false),
            applicant_type: Some(0),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(a.active, Some(false));
    assert_eq!(a.is_required, Some(false));
    assert_eq!(a.applicant_type, Some(0));

    let b = add(
        db,
        CreateDefaultAttachment {
            applicant_type: Some(2),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(b.applicant_type, Some(2));
    assert_eq!(b.name, None);
}

/// `created_at` is assigned by the store and never goes backwards.
pub async fn test_created_at_is_store_assigned(db: &dyn Database) {
    let before = chrono::Utc::now() - chrono::Duration::minutes(1);
    let mut stamps = Vec::new();
    for i in 0..3 {
        let a = add(db, named(&format!("stamp {i}"))).await;
        stamps.push(a.created_at.unwrap());
    }
    for pair in stamps.windows(2) {
        assert!(pair[0] <= pair[1], "{:?} > {:?}", pair[0], pair[1]);
    }
    let after = chrono::Utc::now() + chrono::Duration::minutes(1);
    for s in &stamps {
        let utc = s.with_timezone(&chrono::Utc);
        assert!(utc >= before && utc <= after, "{s} outside insertion window");
    }
}

/// Insert then fetch by id yields the same record.
pub async fn test_round_trip(db: &dyn Database) {
    let input = CreateDefaultAttachment {
        name: Some("신분증 사본".into()),
        created_by: Some("admin".into()),
        kind: Some("Document".into()),
        active: Some(true),
        is_required: Some(false),
        applicant_type: Some(2),
    };
    let created = add(db, input.clone()).await;
    assert_eq!(created.to_create(), input);

    let fetched = db.get_attachment(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    assert_eq!(db.get_attachment(created.id + 1000).await.unwrap(), None);
}

/// `list` returns every row, newest id first.
pub async fn test_list_order(db: &dyn Database) {
    let a = add(db, named("a")).await;
    let b = add(db, named("b")).await;
    let c = add(db, named("c")).await;
    let all = db.list_attachments().await.unwrap();
    assert_eq!(ids(&all), vec![c.id, b.id, a.id]);
    assert_eq!(db.count_attachments().await.unwrap(), 3);
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

/// Full-field update: all writable fields are overwritten, nulls included.
pub async fn test_update(db: &dyn Database) {
    let missing = DefaultAttachment {
        id: 999_999,
        name: Some("ghost".into()),
        ..Default::default()
    };
    assert!(!db.update_attachment(&missing).await.unwrap());

    let created = add(
        db,
        CreateDefaultAttachment {
            name: Some("Old".into()),
            created_by: Some("admin".into()),
            kind: Some("Document".into()),
            ..Default::default()
        },
    )
    .await;

    let changed = DefaultAttachment {
        id: created.id,
        active: Some(false),
        created_at: None,
        created_by: None,
        name: Some("New".into()),
        applicant_type: Some(1),
        kind: None,
        is_required: None,
    };
    assert!(db.update_attachment(&changed).await.unwrap());

    let fetched = db.get_attachment(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name.as_deref(), Some("New"));
    assert_eq!(fetched.active, Some(false));
    assert_eq!(fetched.applicant_type, Some(1));
    assert_eq!(fetched.created_by, None);
    assert_eq!(fetched.kind, None);
    assert_eq!(fetched.is_required, None);
    // Store-owned fields are untouched.
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.created_at, created.created_at);
}

/// Delete succeeds once, then reports nothing deleted.
pub async fn test_delete(db: &dyn Database) {
    let a = add(db, named("to delete")).await;
    let b = add(db, named("to keep")).await;
    assert!(db.delete_attachment(a.id).await.unwrap());
    assert!(!db.delete_attachment(a.id).await.unwrap());
    assert_eq!(db.get_attachment(a.id).await.unwrap(), None);
    assert_eq!(ids(&db.list_attachments().await.unwrap()), vec![b.id]);
}

// ---------------------------------------------------------------------------
// Paged search
// ---------------------------------------------------------------------------

/// 25 rows in pages of 10: 10, 10, 5 rows, disjoint, total 25 each time.
pub async fn test_paging(db: &dyn Database) {
    for i in 0..25 {
        add(db, named(&format!("row {i:02}"))).await;
    }

    let mut seen = HashSet::new();
    for (page, expected) in [(0, 10), (1, 10), (2, 5)] {
        let set = db
            .search_attachments(&PageRequest::new(page, 10))
            .await
            .unwrap();
        assert_eq!(set.total_count, 25);
        assert_eq!(set.items.len(), expected, "page {page}");
        for a in &set.items {
            assert!(seen.insert(a.id), "id {} on two pages", a.id);
        }
    }
    assert_eq!(seen.len(), 25);

    let past_end = db
        .search_attachments(&PageRequest::new(3, 10))
        .await
        .unwrap();
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total_count, 25);
}

/// Negative index and non-positive size are clamped to 0 and 10.
pub async fn test_paging_clamps(db: &dyn Database) {
    for i in 0..12 {
        add(db, named(&format!("clamp {i}"))).await;
    }
    let set = db
        .search_attachments(&PageRequest::new(-4, 0))
        .await
        .unwrap();
    assert_eq!(set.items.len(), 10);
    assert_eq!(set.total_count, 12);

    let first = db
        .search_attachments(&PageRequest::new(0, 10))
        .await
        .unwrap();
    assert_eq!(ids(&set.items), ids(&first.items));
}

/// `NameDesc` orders by name (NULL as empty) descending, ties by id
/// descending; an unknown key behaves like `IdDesc`.
pub async fn test_sort_name_desc(db: &dyn Database) {
    let mut created = Vec::new();
    for name in [Some("b"), None, Some("a"), Some("b"), Some(""), Some("c")] {
        let input = CreateDefaultAttachment {
            name: name.map(str::to_string),
            ..Default::default()
        };
        created.push(add(db, input).await);
    }

    let set = db
        .search_attachments(&PageRequest::new(0, 50).with_sort("NameDesc"))
        .await
        .unwrap();
    let mut expected = created.clone();
    expected.sort_by_key(|a| (Reverse(a.name.clone().unwrap_or_default()), Reverse(a.id)));
    assert_eq!(ids(&set.items), ids(&expected));

    let unknown = db
        .search_attachments(&PageRequest::new(0, 50).with_sort("Name; DROP TABLE x"))
        .await
        .unwrap();
    let id_desc = db
        .search_attachments(&PageRequest::new(0, 50).with_sort("IdDesc"))
        .await
        .unwrap();
    assert_eq!(ids(&unknown.items), ids(&id_desc.items));
    let mut by_id = ids(&created);
    by_id.sort_by_key(|id| Reverse(*id));
    assert_eq!(ids(&id_desc.items), by_id);
}

/// Compound and flag orderings, NULLs filled per column.
pub async fn test_sort_flags(db: &dyn Database) {
    let rows = [
        (Some("Etc"), Some(false), Some(0)),
        (Some("Document"), Some(true), Some(2)),
        (None, None, None),
        (Some("Document"), Some(false), Some(1)),
    ];
    let mut created = Vec::new();
    for (kind, is_required, applicant_type) in rows {
        let a = add(
            db,
            CreateDefaultAttachment {
                kind: kind.map(str::to_string),
                is_required,
                applicant_type,
                ..Default::default()
            },
        )
        .await;
        created.push(a);
    }
    // Unset flags took their defaults on insert; null them out so the
    // fill-in ordering is exercised.
    let mut blank = created[2].clone();
    blank.is_required = None;
    blank.applicant_type = None;
    assert!(db.update_attachment(&blank).await.unwrap());
    created[2] = blank;

    let search = move |key: &'static str| async move {
        ids(&db
            .search_attachments(&PageRequest::new(0, 50).with_sort(key))
            .await
            .unwrap()
            .items)
    };

    let mut expected = created.clone();
    expected.sort_by_key(|a| {
        (
            a.kind.clone().unwrap_or_default(),
            a.is_required.unwrap_or(false),
            Reverse(a.id),
        )
    });
    assert_eq!(search("Type").await, ids(&expected));

    let mut expected = created.clone();
    expected.sort_by_key(|a| {
        (
            Reverse(a.is_required.unwrap_or(false)),
            Reverse(a.kind.clone().unwrap_or_default()),
            Reverse(a.id),
        )
    });
    assert_eq!(search("IsRequiredDesc").await, ids(&expected));

    let mut expected = created.clone();
    expected.sort_by_key(|a| (a.applicant_type.unwrap_or(0), Reverse(a.id)));
    assert_eq!(search("ApplicantType").await, ids(&expected));

    let mut expected = created.clone();
    expected.sort_by_key(|a| a.id);
    assert_eq!(search("Id").await, ids(&expected));
}

/// A query that is both a name substring and an integer matches the union
/// of the two.
pub async fn test_search_union(db: &dyn Database) {
    let by_name = add(db, named("Form 2 copy")).await;
    let by_type = add(
        db,
        CreateDefaultAttachment {
            name: Some("Other".into()),
            applicant_type: Some(2),
            ..Default::default()
        },
    )
    .await;
    let _neither = add(
        db,
        CreateDefaultAttachment {
            name: Some("Misc".into()),
            applicant_type: Some(1),
            ..Default::default()
        },
    )
    .await;

    let set = db
        .search_attachments(&PageRequest::new(0, 10).with_search("2"))
        .await
        .unwrap();
    assert_eq!(set.total_count, 2);
    assert_eq!(ids(&set.items), vec![by_type.id, by_name.id]);
}

/// Substring search covers name, author and type, ignoring ASCII case.
pub async fn test_search_text_columns(db: &dyn Database) {
    let by_kind = add(
        db,
        CreateDefaultAttachment {
            kind: Some("Document".into()),
            ..Default::default()
        },
    )
    .await;
    let by_author = add(
        db,
        CreateDefaultAttachment {
            name: Some("memo".into()),
            created_by: Some("docs-team".into()),
            ..Default::default()
        },
    )
    .await;
    let _unrelated = add(db, named("photo")).await;

    let set = db
        .search_attachments(&PageRequest::new(0, 10).with_search("DOC"))
        .await
        .unwrap();
    assert_eq!(ids(&set.items), vec![by_author.id, by_kind.id]);
    assert_eq!(set.total_count, 2);

    let none = db
        .search_attachments(&PageRequest::new(0, 10).with_search("zzz"))
        .await
        .unwrap();
    assert!(none.items.is_empty());
    assert_eq!(none.total_count, 0);
}

/// Boolean literals also match `IsRequired` or `Active`.
pub async fn test_search_boolean(db: &dyn Database) {
    let optional = add(
        db,
        CreateDefaultAttachment {
            name: Some("optional".into()),
            is_required: Some(false),
            active: Some(true),
            ..Default::default()
        },
    )
    .await;
    let inactive = add(
        db,
        CreateDefaultAttachment {
            name: Some("retired".into()),
            is_required: Some(true),
            active: Some(false),
            ..Default::default()
        },
    )
    .await;
    let _required_active = add(db, named("required")).await;

    let set = db
        .search_attachments(&PageRequest::new(0, 10).with_search("false"))
        .await
        .unwrap();
    assert_eq!(ids(&set.items), vec![inactive.id, optional.id]);

    let set = db
        .search_attachments(&PageRequest::new(0, 10).with_search("TRUE"))
        .await
        .unwrap();
    assert_eq!(set.total_count, 3);
}

/// LIKE metacharacters in the query match literally.
pub async fn test_search_wildcards_are_literal(db: &dyn Database) {
    let literal = add(db, named("50% off")).await;
    let _other = add(db, named("500 items")).await;

    let set = db
        .search_attachments(&PageRequest::new(0, 10).with_search("0%"))
        .await
        .unwrap();
    assert_eq!(ids(&set.items), vec![literal.id]);

    let set = db
        .search_attachments(&PageRequest::new(0, 10).with_search("_"))
        .await
        .unwrap();
    assert!(set.items.is_empty());
}

/// Search, sort and paging compose; the total is the filtered count.
pub async fn test_search_sorted_page(db: &dyn Database) {
    for i in 0..7 {
        add(db, named(&format!("match {i}"))).await;
    }
    for i in 0..4 {
        add(db, named(&format!("skip {i}"))).await;
    }
    let set = db
        .search_attachments(
            &PageRequest::new(1, 3)
                .with_search("match")
                .with_sort("Name"),
        )
        .await
        .unwrap();
    assert_eq!(set.total_count, 7);
    let names: Vec<_> = set.items.iter().filter_map(|a| a.name.clone()).collect();
    assert_eq!(names, vec!["match 3", "match 4", "match 5"]);
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Provisioning an already provisioned table is a no-op; seeding only fills
/// an empty table.
pub async fn test_provisioning_idempotent(db: &dyn Database) {
    assert_eq!(ensure_table(db).await.unwrap(), TableState::Complete);
    assert_eq!(ensure_table(db).await.unwrap(), TableState::Complete);

    assert_eq!(seed_if_empty(db).await.unwrap(), 3);
    assert_eq!(seed_if_empty(db).await.unwrap(), 0);

    let rows = db.list_attachments().await.unwrap();
    assert_eq!(rows.len(), 3);
    for r in &rows {
        assert_eq!(r.created_by.as_deref(), Some("System"));
        assert_eq!(r.active, Some(true));
        assert!(r.created_at.is_some());
    }
    let etc = rows
        .iter()
        .find(|r| r.kind.as_deref() == Some("Etc"))
        .unwrap();
    assert_eq!(etc.is_required, Some(false));
    assert_eq!(etc.applicant_type, Some(0));
    assert_eq!(etc.name.as_deref(), Some("기타 참고자료(선택)"));

    let mut applicant_types: Vec<_> = rows.iter().filter_map(|r| r.applicant_type).collect();
    applicant_types.sort();
    assert_eq!(applicant_types, vec![0, 1, 2]);
}
