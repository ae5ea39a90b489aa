//! Location domain methods on Repository

use rust_decimal::Decimal;
use uuid::Uuid;

use super::{map_write_error, popularity::annotated_locations_sql, Repository};
use crate::{
    error::{AppError, AppResult},
    models::location::{
        coordinate_to_decimal, CreateLocation, Location, LocationOrdering, LocationQuery,
        LocationRow, LocationSummary, UpdateLocation,
    },
};

/// `%term%` for ILIKE, with LIKE wildcards in the term escaped
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Non-empty, trimmed text filter
fn text_filter(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(contains_pattern)
}

impl Repository {
    /// List locations with filters, search, ordering and pagination.
    ///
    /// Returns the page and the total number of matching locations.
    pub async fn locations_list(
        &self,
        query: &LocationQuery,
        ordering: LocationOrdering,
        include_inactive: bool,
        per_page: i64,
        offset: i64,
    ) -> AppResult<(Vec<LocationSummary>, i64)> {
        let category_name = text_filter(&query.category_name);
        let search = text_filter(&query.search);

        let mut conditions = Vec::new();
        let mut idx = 1;

        if !include_inactive {
            conditions.push("is_active = TRUE".to_string());
        }
        if query.category.is_some() {
            conditions.push(format!("category_id = ${}", idx));
            idx += 1;
        }
        if category_name.is_some() {
            conditions.push(format!("category_name ILIKE ${}", idx));
            idx += 1;
        }
        if query.average_rating_min.is_some() {
            conditions.push(format!("average_rating >= ${}", idx));
            idx += 1;
        }
        if query.average_rating_max.is_some() {
            conditions.push(format!("average_rating <= ${}", idx));
            idx += 1;
        }
        if search.is_some() {
            conditions.push(format!("(name ILIKE ${i} OR description ILIKE ${i})", i = idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let annotated = annotated_locations_sql();

        macro_rules! bind_filters {
            ($builder:ident) => {
                if let Some(category) = query.category {
                    $builder = $builder.bind(category);
                }
                if let Some(ref name) = category_name {
                    $builder = $builder.bind(name);
                }
                if let Some(min) = query.average_rating_min {
                    $builder = $builder.bind(min);
                }
                if let Some(max) = query.average_rating_max {
                    $builder = $builder.bind(max);
                }
                if let Some(ref term) = search {
                    $builder = $builder.bind(term);
                }
            };
        }

        // Count total
        let count_q = format!("SELECT COUNT(*) FROM ({}) annotated {}", annotated, where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        bind_filters!(count_builder);
        let total = count_builder.fetch_one(&self.pool).await?;

        // Fetch rows
        let select_q = format!(
            r#"
            SELECT id, name, category_name, latitude, longitude, address, is_active,
                   view_count, average_rating, review_count, popularity_score
            FROM ({}) annotated
            {}
            ORDER BY {}
            LIMIT {} OFFSET {}
            "#,
            annotated,
            where_clause,
            ordering.to_sql(),
            per_page,
            offset
        );
        let mut builder = sqlx::query_as::<_, LocationSummary>(&select_q);
        bind_filters!(builder);

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    /// Get an annotated location by ID
    pub async fn locations_get_by_id(&self, id: Uuid, include_inactive: bool) -> AppResult<Location> {
        let query = format!(
            "SELECT * FROM ({}) annotated WHERE id = $1 AND (is_active OR $2)",
            annotated_locations_sql()
        );
        sqlx::query_as::<_, LocationRow>(&query)
            .bind(id)
            .bind(include_inactive)
            .fetch_optional(&self.pool)
            .await?
            .map(Location::from)
            .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))
    }

    /// Count one more view of a visible location
    pub async fn locations_increment_views(&self, id: Uuid, include_inactive: bool) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE locations SET view_count = view_count + 1 WHERE id = $1 AND (is_active OR $2)",
        )
        .bind(id)
        .bind(include_inactive)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Location {} not found", id)));
        }
        Ok(())
    }

    /// Create location
    pub async fn locations_create(&self, data: &CreateLocation) -> AppResult<Location> {
        let latitude = coordinate_to_decimal("latitude", data.latitude)?;
        let longitude = coordinate_to_decimal("longitude", data.longitude)?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO locations (id, name, description, category_id, latitude, longitude, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.category)
        .bind(latitude)
        .bind(longitude)
        .bind(&data.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Category not found"))?;

        self.locations_get_by_id(id, true).await
    }

    /// Update the provided fields of a location
    pub async fn locations_update(&self, id: Uuid, data: &UpdateLocation) -> AppResult<Location> {
        let latitude: Option<Decimal> = data
            .latitude
            .map(|v| coordinate_to_decimal("latitude", v))
            .transpose()?;
        let longitude: Option<Decimal> = data
            .longitude
            .map(|v| coordinate_to_decimal("longitude", v))
            .transpose()?;

        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.description, "description");
        add_field!(data.category, "category_id");
        add_field!(latitude, "latitude");
        add_field!(longitude, "longitude");
        add_field!(data.address, "address");

        let query = format!("UPDATE locations SET {} WHERE id = $1", sets.join(", "));

        let mut builder = sqlx::query(&query).bind(id);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.description);
        bind_field!(data.category);
        bind_field!(latitude);
        bind_field!(longitude);
        bind_field!(data.address);

        let result = builder
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Category not found"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Location {} not found", id)));
        }

        self.locations_get_by_id(id, true).await
    }

    /// Soft delete: the location and its reviews stay in storage
    pub async fn locations_deactivate(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE locations SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Location {} not found", id)));
        }
        Ok(())
    }

    /// Whether an active location exists (review scoping)
    pub async fn locations_exists(&self, id: Uuid, include_inactive: bool) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1 AND (is_active OR $2))",
        )
        .bind(id)
        .bind(include_inactive)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
