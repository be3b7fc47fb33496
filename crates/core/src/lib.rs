pub mod coach;
pub mod completion;
pub mod feedback;
pub mod questions;
pub mod session_state;
pub mod validator;

pub use coach::{Coach, CoachClient};
pub use completion::{ChatMessage, CompletionClient, OpenAiClient, Role};
pub use questions::Difficulty;
pub use session_state::{
    Event, InterviewSession, InterviewSetup, InterviewState, Outcome, SessionError, SessionView,
};
