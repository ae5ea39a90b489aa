//! Query-time review metrics for locations.
//!
//! `average_rating`, `review_count` and `popularity_score` are never stored;
//! they are computed in SQL for every location query so they can be used for
//! filtering and ordering as well as output.

pub const RATING_WEIGHT: f64 = 0.6;
pub const REVIEW_COUNT_WEIGHT: f64 = 0.3;
pub const VIEW_COUNT_WEIGHT: f64 = 0.1;

/// SQL expression computing the popularity score from a raw (nullable)
/// average, a review count and a view count column, rounded to two decimals.
/// Without any review the average is NULL and the score is 0 regardless of
/// views.
pub fn popularity_sql(avg: &str, count: &str, views: &str) -> String {
    format!(
        "COALESCE(ROUND(({RATING_WEIGHT} * {avg} + {REVIEW_COUNT_WEIGHT} * {count} + {VIEW_COUNT_WEIGHT} * {views})::numeric, 2), 0)::float8"
    )
}

/// Subquery yielding every location joined with its category and annotated
/// with review metrics. Callers select from it as `annotated`.
pub fn annotated_locations_sql() -> String {
    format!(
        r#"
        SELECT l.id, l.name, l.description, l.category_id, c.name AS category_name,
               l.latitude, l.longitude, l.address, l.is_active, l.view_count, l.created_at,
               COALESCE(r.avg_rating, 0)::float8 AS average_rating,
               COALESCE(r.review_count, 0)::bigint AS review_count,
               {popularity} AS popularity_score
        FROM locations l
        JOIN categories c ON c.id = l.category_id
        LEFT JOIN (
            SELECT location_id, AVG(rating)::float8 AS avg_rating, COUNT(*) AS review_count
            FROM reviews
            GROUP BY location_id
        ) r ON r.location_id = l.id
        "#,
        popularity = popularity_sql("r.avg_rating", "COALESCE(r.review_count, 0)", "l.view_count")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popularity_sql_uses_weights() {
        let sql = popularity_sql("a", "b", "c");
        assert_eq!(
            sql,
            "COALESCE(ROUND((0.6 * a + 0.3 * b + 0.1 * c)::numeric, 2), 0)::float8"
        );
        assert!(annotated_locations_sql().contains("AS popularity_score"));
    }
}
