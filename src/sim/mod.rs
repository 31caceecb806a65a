//! Session simulation module
//!
//! All interaction logic lives here. This module must stay pure:
//! - Time comes in as an argument, never read from a clock
//! - Side effects leave as queued `SessionEvent`s
//! - No rendering or platform dependencies

pub mod reduce;
pub mod state;
pub mod timer;

pub use reduce::{Action, advance, page_hidden, reduce, teardown};
pub use state::{Phase, Session, SessionEvent};
pub use timer::{TimerId, TimerKind, Timers};
