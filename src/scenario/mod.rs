//! End-to-end shop scenario
//!
//! One browser session is driven through an ordered list of steps that
//! share the shop's server-side state. Element lookups are synchronized
//! with the page through bounded polling, and a screenshot is saved after
//! every step.

pub mod artifacts;
pub mod config;
pub mod runner;
pub mod session;
pub mod steps;
pub mod wait;

pub use artifacts::ArtifactStore;
pub use config::ScenarioConfig;
pub use runner::{ScenarioReport, ScenarioRunner, StepOutcome, StepStatus};
pub use session::ShopSession;
pub use steps::StepKind;
pub use wait::{TextMatch, Waiter};
