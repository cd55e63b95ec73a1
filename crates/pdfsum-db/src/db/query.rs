//! Shared SQL building for filtered, sorted and paginated listings

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use pdfsum_core::models::{DocumentListQuery, PageRequest, SortOrder, SummaryListQuery};
use sqlx::{Postgres, QueryBuilder};

/// `%term%` with LIKE metacharacters escaped
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Exclusive upper bound covering the whole of `date`.
pub(crate) fn end_of_day_exclusive(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1)
}

pub(crate) fn push_document_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &DocumentListQuery) {
    qb.push(" WHERE deleted_at IS NULL");

    if let Some(search) = &query.search {
        qb.push(" AND original_name ILIKE ")
            .push_bind(like_pattern(search));
    }

    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }

    if let Some(date_from) = query.date_from {
        qb.push(" AND uploaded_at >= ")
            .push_bind(start_of_day(date_from));
    }

    if let Some(date_to) = query.date_to {
        qb.push(" AND uploaded_at < ")
            .push_bind(end_of_day_exclusive(date_to));
    }
}

pub(crate) fn push_summary_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &SummaryListQuery) {
    qb.push(" WHERE deleted_at IS NULL AND pdf_id = ")
        .push_bind(query.pdf_id);

    if let Some(search) = &query.search {
        qb.push(" AND content ILIKE ").push_bind(like_pattern(search));
    }

    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }

    if let Some(language) = query.language {
        qb.push(" AND language = ").push_bind(language.to_string());
    }

    if let Some(style) = query.style {
        qb.push(" AND style = ").push_bind(style.to_string());
    }
}

/// `column` must come from a sort-field allow-list, never from user input.
pub(crate) fn push_order_and_page(
    qb: &mut QueryBuilder<'_, Postgres>,
    column: &'static str,
    order: SortOrder,
    page: PageRequest,
) {
    qb.push(format!(
        " ORDER BY {} {}, id {}",
        column,
        order.as_sql(),
        order.as_sql()
    ));
    qb.push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfsum_core::models::{DocumentSortField, DocumentStatus, Language};
    use uuid::Uuid;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("report"), "%report%");
        assert_eq!(like_pattern("100%_done"), "%100\\%\\_done%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_date_bounds_cover_whole_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(start_of_day(date).to_rfc3339(), "2024-03-15T00:00:00+00:00");
        assert_eq!(
            end_of_day_exclusive(date).to_rfc3339(),
            "2024-03-16T00:00:00+00:00"
        );
    }

    #[test]
    fn test_document_filters_are_conjunctive_and_parameterized() {
        let query = DocumentListQuery {
            search: Some("report".to_string()),
            status: Some(DocumentStatus::Completed),
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..Default::default()
        };

        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM pdf_documents");
        push_document_filters(&mut qb, &query);
        push_order_and_page(
            &mut qb,
            DocumentSortField::OriginalName.column(),
            SortOrder::Asc,
            PageRequest::new(2, 10),
        );

        assert_eq!(
            qb.sql(),
            "SELECT id FROM pdf_documents WHERE deleted_at IS NULL \
             AND original_name ILIKE $1 AND status = $2 \
             AND uploaded_at >= $3 AND uploaded_at < $4 \
             ORDER BY original_name ASC, id ASC LIMIT $5 OFFSET $6"
        );
    }

    #[test]
    fn test_document_filters_without_predicates() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM pdf_documents");
        push_document_filters(&mut qb, &DocumentListQuery::default());
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM pdf_documents WHERE deleted_at IS NULL"
        );
    }

    #[test]
    fn test_summary_filters_scope_to_document() {
        let mut query = SummaryListQuery::for_document(Uuid::new_v4());
        query.language = Some(Language::En);
        query.search = Some("climate".to_string());

        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM summaries");
        push_summary_filters(&mut qb, &query);

        assert_eq!(
            qb.sql(),
            "SELECT id FROM summaries WHERE deleted_at IS NULL AND pdf_id = $1 \
             AND content ILIKE $2 AND language = $3"
        );
    }
}
