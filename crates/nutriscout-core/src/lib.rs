// Core business logic lives here - the brain of the operation
pub mod config;
pub mod debounce;
pub mod error;
pub mod favorites;
pub mod gateway;
pub mod models;
pub mod normalize;
pub mod nutrition;
pub mod recommend;
pub mod repository;
pub mod search_state;

pub use config::Config;
pub use debounce::Debouncer;
pub use error::Error;
pub use favorites::{FavoriteStore, Hydration, FAVORITES_STORAGE_KEY};
pub use gateway::CatalogGateway;
pub use models::{Nutrient, Product};
pub use normalize::NormalizationError;
pub use recommend::{protein_ratio, recommend, ProteinScore};
pub use repository::ProductRepository;
pub use search_state::{CompletionOrdering, SearchSession, SearchSettings, SearchStore};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
