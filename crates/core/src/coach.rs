use crate::completion::CompletionClient;
use crate::questions::Difficulty;
use crate::{feedback, questions, validator};
use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// The three model-backed operations an interview needs. `InterviewSession`
/// depends only on this trait, which keeps the state machine testable with
/// `MockCoach`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Coach: Send + Sync {
    async fn is_valid_profession(&self, profession: &str) -> Result<bool>;

    async fn generate_questions(
        &self,
        position: &str,
        difficulty: Difficulty,
        count: u8,
    ) -> Result<Vec<String>>;

    async fn get_feedback(&self, questions: &[String], answers: &[String]) -> Result<String>;
}

pub struct CoachClient<C> {
    client: C,
}

impl<C: CompletionClient> CoachClient<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: CompletionClient> Coach for CoachClient<C> {
    async fn is_valid_profession(&self, profession: &str) -> Result<bool> {
        validator::is_valid_profession(&self.client, profession).await
    }

    async fn generate_questions(
        &self,
        position: &str,
        difficulty: Difficulty,
        count: u8,
    ) -> Result<Vec<String>> {
        questions::generate_questions(&self.client, position, difficulty, count).await
    }

    async fn get_feedback(&self, questions: &[String], answers: &[String]) -> Result<String> {
        feedback::get_feedback(&self.client, questions, answers).await
    }
}
