use crate::coach::Coach;
use crate::questions::Difficulty;
use std::fmt;

pub const MIN_QUESTIONS: u8 = 1;
pub const MAX_QUESTIONS: u8 = 10;
pub const DEFAULT_QUESTIONS: u8 = 3;

/// What the user filled in on the setup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSetup {
    pub position: String,
    pub difficulty: Difficulty,
    pub question_count: u8,
}

impl InterviewSetup {
    pub fn new(position: impl Into<String>, difficulty: Difficulty, question_count: u8) -> Self {
        Self {
            position: position.into().trim().to_string(),
            difficulty,
            question_count,
        }
    }

    fn validate(&self) -> Result<(), SessionError> {
        if self.position.is_empty() {
            return Err(SessionError::EmptyPosition);
        }
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&self.question_count) {
            return Err(SessionError::InvalidQuestionCount(self.question_count));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewState {
    NotStarted,
    InProgress,
    Finished,
}

impl fmt::Display for InterviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InterviewState::NotStarted => "not started",
            InterviewState::InProgress => "in progress",
            InterviewState::Finished => "finished",
        })
    }
}

/// A user action on the interview.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Submit(InterviewSetup),
    EditAnswer(String),
    Previous,
    Next,
    Finish,
    Redo,
}

/// Result of a successfully handled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Started { questions: usize },
    /// The position was judged not to be a real job. Carries the message to
    /// show the user.
    Rejected(String),
    AnswerSaved,
    Moved { index: usize },
    /// A navigation guard did not hold; nothing changed.
    Unchanged,
    Finished,
    Reset,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Please enter the position you're interviewing for.")]
    EmptyPosition,
    #[error("Question count must be between 1 and 10, got {0}")]
    InvalidQuestionCount(u8),
    #[error("No usable questions came back from the model. Please try again.")]
    NoQuestions,
    #[error("Cannot {event} while the interview is {state}")]
    InvalidTransition {
        state: InterviewState,
        event: &'static str,
    },
    #[error("Failed to {action}: {source:#}")]
    Upstream {
        action: &'static str,
        source: anyhow::Error,
    },
}

/// Read-only projection of the session for rendering. Recomputed from the
/// session after every event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView<'a> {
    Setup,
    Question {
        number: usize,
        total: usize,
        question: &'a str,
        answer: &'a str,
        can_go_back: bool,
        is_last: bool,
    },
    Feedback {
        feedback: &'a str,
    },
}

/// One interview attempt.
///
/// `answers` always has the same length as `questions`, and `current_index`
/// is a valid index into both while `started` is set. Upstream failures never
/// leave a half-applied transition behind: the session is only mutated after
/// every call for the event has succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterviewSession {
    questions: Vec<String>,
    answers: Vec<String>,
    current_index: usize,
    started: bool,
    feedback: Option<String>,
    setup: Option<InterviewSetup>,
}

impl InterviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn setup(&self) -> Option<&InterviewSetup> {
        self.setup.as_ref()
    }

    pub fn state(&self) -> InterviewState {
        match (self.started, &self.feedback) {
            (false, _) => InterviewState::NotStarted,
            (true, None) => InterviewState::InProgress,
            (true, Some(_)) => InterviewState::Finished,
        }
    }

    fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn view(&self) -> SessionView<'_> {
        match self.state() {
            InterviewState::NotStarted => SessionView::Setup,
            InterviewState::InProgress => SessionView::Question {
                number: self.current_index + 1,
                total: self.questions.len(),
                question: &self.questions[self.current_index],
                answer: &self.answers[self.current_index],
                can_go_back: self.current_index > 0,
                is_last: self.is_last_question(),
            },
            InterviewState::Finished => SessionView::Feedback {
                feedback: self.feedback.as_deref().unwrap_or_default(),
            },
        }
    }

    /// Handles one event. Coach calls are only made by `Submit` and `Finish`.
    pub async fn apply<C>(&mut self, coach: &C, event: Event) -> Result<Outcome, SessionError>
    where
        C: Coach + ?Sized,
    {
        let outcome = match event {
            Event::Submit(setup) => self.submit(coach, setup).await,
            Event::EditAnswer(text) => self.edit_answer(text),
            Event::Previous => self.previous(),
            Event::Next => self.next(),
            Event::Finish => self.finish(coach).await,
            Event::Redo => self.redo(),
        };
        match &outcome {
            Ok(outcome) => tracing::debug!(?outcome, state = %self.state(), "Event applied"),
            Err(e) => tracing::warn!(error = %e, state = %self.state(), "Event not applied"),
        }
        outcome
    }

    fn require(&self, expected: InterviewState, event: &'static str) -> Result<(), SessionError> {
        let state = self.state();
        if state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition { state, event })
        }
    }

    async fn submit<C>(&mut self, coach: &C, setup: InterviewSetup) -> Result<Outcome, SessionError>
    where
        C: Coach + ?Sized,
    {
        self.require(InterviewState::NotStarted, "start an interview")?;
        setup.validate()?;

        let valid = coach
            .is_valid_profession(&setup.position)
            .await
            .map_err(|source| SessionError::Upstream {
                action: "check the position",
                source,
            })?;
        if !valid {
            tracing::info!(position = %setup.position, "Position rejected");
            return Ok(Outcome::Rejected(format!(
                "Sorry, '{}' does not appear to be a valid profession. Please enter a real job title.",
                setup.position
            )));
        }

        let questions = coach
            .generate_questions(&setup.position, setup.difficulty, setup.question_count)
            .await
            .map_err(|source| SessionError::Upstream {
                action: "generate questions",
                source,
            })?;

        self.begin(setup, questions)
    }

    /// Populates the session in one step from freshly generated questions.
    fn begin(
        &mut self,
        setup: InterviewSetup,
        questions: Vec<String>,
    ) -> Result<Outcome, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        tracing::info!(
            position = %setup.position,
            difficulty = %setup.difficulty,
            questions = questions.len(),
            "Interview started"
        );
        self.answers = vec![String::new(); questions.len()];
        self.questions = questions;
        self.current_index = 0;
        self.started = true;
        self.feedback = None;
        self.setup = Some(setup);
        Ok(Outcome::Started {
            questions: self.questions.len(),
        })
    }

    pub fn edit_answer(&mut self, text: String) -> Result<Outcome, SessionError> {
        self.require(InterviewState::InProgress, "edit an answer")?;
        self.answers[self.current_index] = text;
        Ok(Outcome::AnswerSaved)
    }

    pub fn previous(&mut self) -> Result<Outcome, SessionError> {
        self.require(InterviewState::InProgress, "go to the previous question")?;
        if self.current_index == 0 {
            return Ok(Outcome::Unchanged);
        }
        self.current_index -= 1;
        Ok(Outcome::Moved {
            index: self.current_index,
        })
    }

    pub fn next(&mut self) -> Result<Outcome, SessionError> {
        self.require(InterviewState::InProgress, "go to the next question")?;
        if self.is_last_question() {
            return Ok(Outcome::Unchanged);
        }
        self.current_index += 1;
        Ok(Outcome::Moved {
            index: self.current_index,
        })
    }

    async fn finish<C>(&mut self, coach: &C) -> Result<Outcome, SessionError>
    where
        C: Coach + ?Sized,
    {
        self.require(InterviewState::InProgress, "finish the interview")?;
        if !self.is_last_question() {
            return Ok(Outcome::Unchanged);
        }

        let feedback = coach
            .get_feedback(&self.questions, &self.answers)
            .await
            .map_err(|source| SessionError::Upstream {
                action: "get feedback",
                source,
            })?;
        tracing::info!(questions = self.questions.len(), "Interview finished");
        self.feedback = Some(feedback);
        Ok(Outcome::Finished)
    }

    fn redo(&mut self) -> Result<Outcome, SessionError> {
        self.require(InterviewState::Finished, "re-do the interview")?;
        Ok(self.reset())
    }

    /// Clears everything and returns to the setup form. Valid from any state.
    pub fn reset(&mut self) -> Outcome {
        *self = Self::default();
        Outcome::Reset
    }
}
