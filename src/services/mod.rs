pub mod api;
pub mod normalize;
pub mod results;
pub mod status;
pub mod transport;
pub mod upload;
pub mod workflow;

pub use api::NutritionApiClient;
pub use status::{PollSettings, ProgressObserver};
pub use workflow::{AnalysisError, AnalysisOutcome};
