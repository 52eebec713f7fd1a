//! Filter/sort/paginate query construction for the item store.
//!
//! Translates a [`ResourceQuery`] into a single SELECT. Every user-supplied
//! value is bound as a parameter, never interpolated; the sort column comes
//! from the [`SortField`] enum so no caller string ever reaches SQL. Soft-
//! deleted rows are excluded unconditionally.

use sqlx::{QueryBuilder, Sqlite};

use crate::models::{ResourceQuery, SortField};

/// Column list of the `items` table, in [`crate::store::ItemRow`] order.
pub const ITEM_COLUMNS: &str = "id, user_id, source_url, title, link, first_seen, \
     categories, summary, full_content, ranking, removed, notes";

/// Build the filtered, sorted, paginated SELECT for one tenant.
///
/// Category membership tests the stored JSON array via `json_each`, ORed
/// across the requested set; the source filter is a bound `IN` list; the two
/// filters AND together. Every ordering ends with `id ASC` so the result is
/// a total order and pagination is stable: an unchanged dataset partitions
/// cleanly across pages with no duplicates or gaps.
pub fn build_resource_query<'a>(
    user_id: &'a str,
    query: &'a ResourceQuery,
) -> QueryBuilder<'a, Sqlite> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE removed = 0 AND user_id = "
    ));
    qb.push_bind(user_id);

    if let Some(categories) = &query.categories {
        if !categories.is_empty() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM json_each(items.categories) \
                 WHERE json_each.value IN (",
            );
            let mut sep = qb.separated(", ");
            for category in categories {
                sep.push_bind(category.as_str());
            }
            qb.push("))");
        }
    }

    if let Some(sources) = &query.sources {
        if !sources.is_empty() {
            qb.push(" AND source_url IN (");
            let mut sep = qb.separated(", ");
            for source in sources {
                sep.push_bind(source.as_str());
            }
            qb.push(")");
        }
    }

    let direction = if query.sort_desc { "DESC" } else { "ASC" };
    match query.sort_by {
        // Ranking ties break by recency so repeated queries page identically
        SortField::Ranking => {
            qb.push(format!(
                " ORDER BY ranking {direction}, first_seen DESC, id ASC"
            ));
        }
        SortField::Datetime => {
            qb.push(format!(" ORDER BY first_seen {direction}, id ASC"));
        }
    }

    match query.limit {
        Some(limit) => {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
            qb.push(" OFFSET ");
            qb.push_bind(query.offset);
        }
        // SQLite needs a LIMIT clause to accept OFFSET; -1 means unbounded
        None if query.offset > 0 => {
            qb.push(" LIMIT -1 OFFSET ");
            qb.push_bind(query.offset);
        }
        None => {}
    }

    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(values: &[&str]) -> Option<BTreeSet<String>> {
        Some(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_default_query_sql() {
        let query = ResourceQuery::default();
        let qb = build_resource_query("u1", &query);
        let sql = qb.sql();
        assert!(sql.contains("WHERE removed = 0 AND user_id = "));
        assert!(sql.contains("ORDER BY ranking DESC, first_seen DESC, id ASC"));
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("json_each"));
    }

    #[test]
    fn test_category_filter_binds_values() {
        let query = ResourceQuery {
            categories: set(&["AI", "Rust"]),
            ..Default::default()
        };
        let qb = build_resource_query("u1", &query);
        let sql = qb.sql();
        assert!(sql.contains("json_each(items.categories)"));
        // Values are bound, never spliced
        assert!(!sql.contains("AI"));
        assert!(!sql.contains("Rust"));
    }

    #[test]
    fn test_source_filter_ands_with_categories() {
        let query = ResourceQuery {
            categories: set(&["AI"]),
            sources: set(&["https://a.com/feed"]),
            ..Default::default()
        };
        let qb = build_resource_query("u1", &query);
        let sql = qb.sql();
        assert!(sql.contains("json_each"));
        assert!(sql.contains("AND source_url IN ("));
        assert!(!sql.contains("a.com"));
    }

    #[test]
    fn test_empty_filter_sets_are_no_filter() {
        let query = ResourceQuery {
            categories: Some(BTreeSet::new()),
            sources: Some(BTreeSet::new()),
            ..Default::default()
        };
        let qb = build_resource_query("u1", &query);
        let sql = qb.sql();
        assert!(!sql.contains("json_each"));
        assert!(!sql.contains("source_url IN"));
    }

    #[test]
    fn test_datetime_sort_ascending() {
        let query = ResourceQuery {
            sort_by: SortField::Datetime,
            sort_desc: false,
            ..Default::default()
        };
        let qb = build_resource_query("u1", &query);
        assert!(qb.sql().contains("ORDER BY first_seen ASC, id ASC"));
    }

    #[test]
    fn test_limit_and_offset_are_bound() {
        let query = ResourceQuery {
            limit: Some(10),
            offset: 20,
            ..Default::default()
        };
        let qb = build_resource_query("u1", &query);
        let sql = qb.sql();
        assert!(sql.contains("LIMIT"));
        assert!(sql.contains("OFFSET"));
        assert!(!sql.contains("10"));
        assert!(!sql.contains("20"));
    }

    #[test]
    fn test_offset_without_limit_uses_unbounded_limit() {
        let query = ResourceQuery {
            offset: 5,
            ..Default::default()
        };
        let qb = build_resource_query("u1", &query);
        assert!(qb.sql().contains("LIMIT -1 OFFSET "));
    }

    #[test]
    fn test_hostile_filter_values_never_reach_sql() {
        let query = ResourceQuery {
            categories: set(&["'; DROP TABLE items; --"]),
            sources: set(&["' OR 1=1 --"]),
            ..Default::default()
        };
        let qb = build_resource_query("u1'; --", &query);
        let sql = qb.sql();
        assert!(!sql.contains("DROP TABLE"));
        assert!(!sql.contains("OR 1=1"));
        assert!(!sql.contains("--"));
    }
}
