//! Action orchestrator — turns connection events into action runs.
//!
//! Connection callbacks push [`ConnectionEvent`]s through an [`EventSender`].
//! [`Orchestrator::run`] consumes them in order, keeps the connection store
//! current, and starts one [`ActionRun`] per distinct connected address.

pub mod events;
pub mod machine;
pub mod sequence;
pub mod state;

pub use events::{channel, ConnectionEvent, EventReceiver, EventSender};
pub use machine::{Orchestrator, Task, TaskOutcome};
pub use sequence::send_amount;
pub use state::{
    ActionRun, ErrorInfo, ErrorKind, RunPhase, Step, StepBoard, StepStatus, TransitionError,
};
