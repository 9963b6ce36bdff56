//! Pipeline state machine
//!
//! The game walks a learner through fixed steps. Each step records one typed
//! choice; the working dataset is always rebuilt from the raw table by
//! replaying those choices in step order.

mod choices;
mod session;
mod step;

pub use choices::{ChoiceSet, DepthHint, MaxDepth, StepChoice};
pub use session::GameSession;
pub use step::PipelineStep;
