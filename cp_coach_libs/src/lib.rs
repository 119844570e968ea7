pub mod analytics;
pub mod catalog;
pub mod clock;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod models;
pub mod recommend;
pub mod store;
pub mod sync;

pub use analytics::{classifier::TagClassifier, plan::PlanBuilder};
pub use clock::{Clock, FixedClock, SystemClock};
pub use recommend::ProblemSelector;
pub use sync::PracticeSync;
