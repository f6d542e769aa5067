//! Job recommendation scoring: content-based, collaborative, popular and
//! hybrid rankings over in-memory job, application and interaction data.

pub mod config;
pub mod dataset;
pub mod explain;
pub mod lexicon;
pub mod model;
pub mod recommender;
pub mod similarity;
pub mod store;

pub use config::{RecommenderConfig, ScoringConfig};
pub use model::{
    Application, ApplicationStatus, Interaction, InteractionKind, JobId, JobPosting, JobStats, Location, Recommendation,
    RecommendationMethod, SalaryRange, UserId, UserProfile,
};
pub use recommender::{Readiness, Recommender};
pub use store::{BoundedProfileStore, MemoryProfileStore, ProfileStore, StoreConfig};
