//! A2P 10DLC onboarding — registration pipeline and approval monitor.
//!
//! Apply creates the customer profile, trust product, brand registration and
//! messaging service. The brand then sits in review for up to two days; the
//! monitor polls it and runs Complete (number association and campaign
//! creation) as soon as it is approved.

pub mod model;
pub mod monitor;
pub mod orchestrator;
pub mod pipeline;
pub mod routes;
pub mod state;

pub use model::{AuthorizedRepresentative, OnboardingRequest, OnboardingResult, SidSnapshot};
pub use monitor::{RegistrationMonitor, RegistrationStatus, TickOutcome, TickReport};
pub use orchestrator::Onboarding;
pub use pipeline::StageRunner;
pub use routes::{A2pRouteState, ProviderFactory, a2p_routes, twilio_factory};
pub use state::{Sid, Stage, WorkflowState};
