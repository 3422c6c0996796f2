//! Resume viewer library
//!
//! Loads a resume PDF, extracts its text and answers questions about it through a
//! chat-completion endpoint:
//! - `source`: which PDF is active (bundled default or user-selected file)
//! - `pdf`: engine boundary, text extraction, zoomable page surfaces
//! - `chat`: the single outbound request per question
//! - `viewer`: the state coordinator tying them together
//! - `terminal`: line-oriented front end over the coordinator

pub mod chat;
pub mod error;
pub mod locale;
pub mod pdf;
pub mod source;
pub mod terminal;
pub mod viewer;

pub use error::{Error, Result};
pub use locale::{Language, UiText};
pub use terminal::{run_session, run_viewer};
pub use viewer::{
    CompletedTurn, EnterAction, PendingTurn, Profile, SubmitRejected, ViewState, Viewer,
    ViewerConfig,
};
