//! Location service: listing with weather, detail views and staff writes

use uuid::Uuid;
use validator::Validate;

use super::{
    list_cache::{ListCache, ListScope},
    weather::{Enriched, WeatherResolver},
};
use crate::{
    config::PaginationConfig,
    error::{AppError, AppResult},
    models::{
        location::{CreateLocation, Location, LocationOrdering, LocationQuery, LocationSummary, UpdateLocation},
        PaginatedResponse,
    },
    repository::Repository,
};

/// Page of locations, each with current weather
pub type LocationPage = PaginatedResponse<Enriched<LocationSummary>>;

/// Cache variant for a viewer: staff also see inactive locations
pub(crate) fn visibility(include_inactive: bool) -> &'static str {
    if include_inactive {
        "staff"
    } else {
        "public"
    }
}

/// Reject pages past the end, except the first page of an empty list
pub(crate) fn check_page(page: i64, offset: i64, total: i64) -> AppResult<()> {
    if page > 1 && offset >= total {
        return Err(AppError::NotFound("Invalid page".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct LocationsService {
    repository: Repository,
    weather: WeatherResolver,
    list_cache: ListCache,
    pagination: PaginationConfig,
}

impl LocationsService {
    pub fn new(
        repository: Repository,
        weather: WeatherResolver,
        list_cache: ListCache,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            repository,
            weather,
            list_cache,
            pagination,
        }
    }

    /// List locations with their current weather.
    ///
    /// Weather for the whole page is resolved concurrently; any fatal
    /// resolution error fails the request.
    pub async fn list(&self, query: &LocationQuery, include_inactive: bool) -> AppResult<LocationPage> {
        let ordering = LocationOrdering::parse(query.ordering.as_deref())?;
        let (page, per_page, offset) = self.pagination.window(query.page, query.page_size)?;

        let key = self
            .list_cache
            .key(ListScope::Locations, query, visibility(include_inactive));
        if let Some(cached) = self.list_cache.get::<LocationPage>(&key).await {
            return Ok(cached);
        }

        let (rows, total) = self
            .repository
            .locations_list(query, ordering, include_inactive, per_page, offset)
            .await?;
        check_page(page, offset, total)?;

        let results = self.weather.enrich(rows).await?;
        let response = PaginatedResponse {
            count: total,
            page,
            page_size: per_page,
            results,
        };

        self.list_cache.put(&key, &response).await;
        Ok(response)
    }

    /// Location detail. Every call counts as a view.
    pub async fn get(&self, id: Uuid, include_inactive: bool) -> AppResult<Enriched<Location>> {
        self.repository.locations_increment_views(id, include_inactive).await?;
        let location = self.repository.locations_get_by_id(id, include_inactive).await?;
        self.weather.enrich_one(location).await
    }

    pub async fn create(&self, data: &CreateLocation) -> AppResult<Location> {
        data.validate()?;
        self.ensure_category(data.category).await?;

        let location = self.repository.locations_create(data).await?;
        tracing::info!("Created location {} ({})", location.name, location.id);

        self.list_cache.invalidate().await;
        Ok(location)
    }

    /// Apply the provided fields. A full replacement passes every field.
    pub async fn update(&self, id: Uuid, data: &UpdateLocation) -> AppResult<Location> {
        data.validate()?;
        if let Some(category) = data.category {
            self.ensure_category(category).await?;
        }

        let location = self.repository.locations_update(id, data).await?;
        tracing::info!("Updated location {}", id);

        self.list_cache.invalidate().await;
        Ok(location)
    }

    /// Soft delete
    pub async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        self.repository.locations_deactivate(id).await?;
        tracing::info!("Deactivated location {}", id);

        self.list_cache.invalidate().await;
        Ok(())
    }

    async fn ensure_category(&self, id: Uuid) -> AppResult<()> {
        match self.repository.categories_get_by_id(id).await {
            Ok(_) => Ok(()),
            Err(AppError::NotFound(_)) => Err(AppError::field(
                "category",
                format!("Invalid category \"{}\": object does not exist", id),
            )),
            Err(e) => Err(e),
        }
    }
}
