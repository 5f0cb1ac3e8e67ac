pub mod app;
pub mod config;
pub mod context;
pub mod email;
pub mod error;
pub mod graphql;
pub mod metrics;
pub mod orders;
pub mod output;
pub mod pagination;
pub mod payments;
pub mod pubsub;
pub mod restaurants;
pub mod uploads;
pub mod users;

pub use app::{build_router, AppState};
pub use config::{load_service_config, ServiceConfig};
pub use context::AppContext;
pub use graphql::{build_schema, EatsSchema};
