//! Weather enrichment pipeline

pub mod cache;
pub mod enrich;
pub mod resolver;
pub mod upstream;

pub use cache::{DurableCache, DurableEntry, FastCache, MemoryCache, MemoryObjectStore};
pub use enrich::Enriched;
pub use resolver::WeatherResolver;
pub use upstream::{OpenWeatherClient, WeatherUpstream};
