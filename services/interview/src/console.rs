//! Line-oriented terminal front end.
//!
//! The console only translates input lines into session events and renders
//! `SessionView` after each one; all interview state lives in
//! `InterviewSession`.

use anyhow::{Context, Result};
use interview_core::session_state::{DEFAULT_QUESTIONS, MAX_QUESTIONS, MIN_QUESTIONS};
use interview_core::{
    Coach, Difficulty, Event, InterviewSession, InterviewSetup, InterviewState, Outcome,
    SessionView,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

const TITLE: &str = "Interview Practice App";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Previous,
    Next,
    Finish,
    Redo,
    Quit,
    /// Empties the current answer.
    Clear,
    /// Blank line: show the current view again.
    Show,
    Answer(String),
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    match trimmed {
        "" => Command::Show,
        ":prev" | ":p" => Command::Previous,
        ":next" | ":n" => Command::Next,
        ":finish" | ":f" => Command::Finish,
        ":redo" | ":r" => Command::Redo,
        ":quit" | ":q" => Command::Quit,
        ":clear" | ":c" => Command::Clear,
        // `::` escapes an answer that starts with a colon.
        _ if trimmed.starts_with("::") => Command::Answer(trimmed[1..].to_string()),
        _ if trimmed.starts_with(':') => Command::Unknown(trimmed.to_string()),
        _ => Command::Answer(trimmed.to_string()),
    }
}

pub fn render(view: &SessionView<'_>) -> String {
    match view {
        SessionView::Setup => "\n== Interview setup ==".to_string(),
        SessionView::Question {
            number,
            total,
            question,
            answer,
            can_go_back,
            is_last,
        } => {
            let answer = if answer.is_empty() {
                "(not answered yet)"
            } else {
                *answer
            };
            let mut controls = Vec::new();
            if *can_go_back {
                controls.push(":prev");
            }
            controls.push(if *is_last { ":finish" } else { ":next" });
            controls.push(":quit");
            format!(
                "\nQuestion {number} of {total}\n{question}\n\nYour answer: {answer}\n\
                 Type your answer to replace it (end a line with \\ to continue it), \
                 :clear to empty it, or {}",
                controls.join(" / ")
            )
        }
        SessionView::Feedback { feedback } => format!(
            "\n== Interview Feedback Summary ==\n{feedback}\n\n\
             Type :redo to start a new interview or :quit to exit."
        ),
    }
}

fn unchanged_hint(event: &Event) -> &'static str {
    match event {
        Event::Previous => "Already at the first question.",
        Event::Next => "This is the last question. Type :finish to get feedback.",
        Event::Finish => "Feedback is available from the last question. Type :next to continue.",
        _ => "Nothing changed.",
    }
}

pub struct Console<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    /// Prompts for one line. `None` means end of input or `:quit`.
    async fn ask(&mut self, label: &str) -> Result<Option<String>> {
        self.out.write_all(label.as_bytes()).await?;
        self.out.flush().await?;
        let line = self
            .lines
            .next_line()
            .await
            .context("Failed to read from input")?;
        Ok(line.filter(|l| parse_command(l) != Command::Quit))
    }

    /// Reads one entry at the `> ` prompt. Lines ending in `\` are joined with
    /// the next one.
    async fn read_entry(&mut self) -> Result<Option<String>> {
        let mut label = "> ";
        let mut entry = String::new();
        loop {
            let Some(line) = self.ask(label).await? else {
                return Ok(None);
            };
            match line.trim_end().strip_suffix('\\') {
                Some(head) => {
                    entry.push_str(head);
                    entry.push('\n');
                    label = ".. ";
                }
                None => {
                    entry.push_str(&line);
                    return Ok(Some(entry));
                }
            }
        }
    }

    async fn read_setup(&mut self) -> Result<Option<InterviewSetup>> {
        let Some(position) = self.ask("Position you're interviewing for: ").await? else {
            return Ok(None);
        };

        let levels = Difficulty::ALL.map(|d| d.as_str()).join("/");
        let label = format!(
            "Select difficulty level [{levels}] (default {}): ",
            Difficulty::default()
        );
        let difficulty = loop {
            let Some(input) = self.ask(&label).await? else {
                return Ok(None);
            };
            if input.trim().is_empty() {
                break Difficulty::default();
            }
            match input.parse::<Difficulty>() {
                Ok(difficulty) => break difficulty,
                Err(e) => self.say(&e).await?,
            }
        };

        let question_count = loop {
            let label = format!(
                "How many questions? [{MIN_QUESTIONS}-{MAX_QUESTIONS}] (default {DEFAULT_QUESTIONS}): "
            );
            let Some(input) = self.ask(&label).await? else {
                return Ok(None);
            };
            if input.trim().is_empty() {
                break DEFAULT_QUESTIONS;
            }
            match input.trim().parse::<u8>() {
                Ok(n) if (MIN_QUESTIONS..=MAX_QUESTIONS).contains(&n) => break n,
                _ => {
                    self.say(&format!(
                        "Please enter a number between {MIN_QUESTIONS} and {MAX_QUESTIONS}."
                    ))
                    .await?
                }
            }
        };

        Ok(Some(InterviewSetup::new(position, difficulty, question_count)))
    }

    /// Drives the session until the input ends or the user quits.
    pub async fn run<C>(&mut self, session: &mut InterviewSession, coach: &C) -> Result<()>
    where
        C: Coach + ?Sized,
    {
        self.say(TITLE).await?;
        let mut refresh = true;

        loop {
            if refresh {
                let text = render(&session.view());
                self.say(&text).await?;
            }
            refresh = true;

            let state = session.state();
            let event = if state == InterviewState::NotStarted {
                let Some(setup) = self.read_setup().await? else {
                    break;
                };
                self.say("Checking position validity...").await?;
                Event::Submit(setup)
            } else {
                let Some(line) = self.read_entry().await? else {
                    break;
                };
                match (state, parse_command(&line)) {
                    (_, Command::Show) => continue,
                    (InterviewState::InProgress, Command::Answer(text)) => Event::EditAnswer(text),
                    (InterviewState::InProgress, Command::Previous) => Event::Previous,
                    (InterviewState::InProgress, Command::Next) => Event::Next,
                    (InterviewState::InProgress, Command::Finish) => Event::Finish,
                    (InterviewState::InProgress, Command::Clear) => Event::EditAnswer(String::new()),
                    (InterviewState::InProgress, Command::Redo) => {
                        self.say("Finish the interview before starting a new one.")
                            .await?;
                        refresh = false;
                        continue;
                    }
                    (InterviewState::Finished, Command::Redo) => Event::Redo,
                    (InterviewState::Finished, _) => {
                        self.say("Type :redo to start a new interview or :quit to exit.")
                            .await?;
                        refresh = false;
                        continue;
                    }
                    (_, Command::Unknown(text)) => {
                        self.say(&format!(
                            "Unrecognised command '{text}'. Use :prev, :next, :finish, :redo or :quit."
                        ))
                        .await?;
                        refresh = false;
                        continue;
                    }
                    (_, Command::Quit) => break,
                    // Setup input is read by `read_setup`, never here.
                    (InterviewState::NotStarted, _) => continue,
                }
            };

            if event == Event::Finish && matches!(session.view(), SessionView::Question { is_last: true, .. }) {
                self.say("Generating feedback...").await?;
            }
            let hint = unchanged_hint(&event);

            match session.apply(coach, event).await {
                Ok(Outcome::AnswerSaved) => {
                    let saved = match session.view() {
                        SessionView::Question { answer: "", .. } => "Answer cleared.",
                        _ => "Answer saved.",
                    };
                    self.say(saved).await?;
                    refresh = false;
                }
                Ok(Outcome::Unchanged) => {
                    self.say(hint).await?;
                    refresh = false;
                }
                Ok(Outcome::Rejected(message)) => self.say(&message).await?,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Transition failed");
                    self.say(&format!("Error: {e}")).await?;
                }
            }
        }

        self.say("Goodbye!").await?;
        Ok(())
    }
}
