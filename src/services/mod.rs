//! Business logic services

pub mod categories;
pub mod list_cache;
pub mod locations;
pub mod object_store;
pub mod redis;
pub mod reviews;
pub mod votes;
pub mod weather;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};
use weather::{DurableCache, FastCache, WeatherResolver, WeatherUpstream};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub categories: categories::CategoriesService,
    pub locations: locations::LocationsService,
    pub reviews: reviews::ReviewsService,
    pub votes: votes::VotesService,
    pub weather: WeatherResolver,
}

impl Services {
    /// Create all services with the given repository and cache / upstream
    /// clients. The fast cache backs both weather entries and list pages.
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        fast_cache: Arc<dyn FastCache>,
        durable_cache: Arc<dyn DurableCache>,
        upstream: Arc<dyn WeatherUpstream>,
    ) -> Self {
        let weather = WeatherResolver::new(
            fast_cache.clone(),
            durable_cache,
            upstream,
            config.cache.ttl(),
            config.weather.freshness(),
        );
        let list_cache = list_cache::ListCache::new(fast_cache, config.cache.ttl());

        Self {
            categories: categories::CategoriesService::new(repository.clone()),
            locations: locations::LocationsService::new(
                repository.clone(),
                weather.clone(),
                list_cache.clone(),
                config.pagination.clone(),
            ),
            reviews: reviews::ReviewsService::new(
                repository.clone(),
                list_cache.clone(),
                config.pagination.clone(),
            ),
            votes: votes::VotesService::new(repository.clone(), list_cache),
            weather,
            repository,
        }
    }
}
