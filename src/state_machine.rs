//! Request lifecycle state machine
//!
//! Pure transitions in the Elm Architecture style: given the current state
//! and an event, produce the next state and the effects to run. The runtime
//! executes the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::{Event, Submission};
pub use state::SessionState;
pub use transition::{
    failure_message, transition, TransitionError, TransitionResult, MIN_PROMPT_CHARS,
};
