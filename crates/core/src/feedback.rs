use crate::completion::{ChatMessage, CompletionClient};
use anyhow::Result;

const FEEDBACK_TEMPERATURE: f32 = 0.7;
const COACH_PERSONA: &str = "You are an expert interview coach.";

/// A question with the answer given to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QaPair<'a> {
    pub question: &'a str,
    pub answer: &'a str,
}

pub fn pair_up<'a>(questions: &'a [String], answers: &'a [String]) -> Vec<QaPair<'a>> {
    questions
        .iter()
        .zip(answers)
        .map(|(question, answer)| QaPair { question, answer })
        .collect()
}

/// Renders the numbered transcript embedded in the feedback prompt.
pub fn format_transcript(pairs: &[QaPair<'_>]) -> String {
    pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| format!("{}. Q: {}\n   A: {}", i + 1, pair.question, pair.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn feedback_prompt(transcript: &str) -> String {
    format!(
        "You are an expert interview coach.\n\n\
         I will give you a list of interview questions and my answers.\n\
         Please provide:\n\
         1. An executive summary of my performance\n\
         2. Detailed feedback for each answer\n\
         3. Recommendations to improve future interviews\n\n\
         Questions and Answers:\n{transcript}"
    )
}

pub async fn get_feedback<C>(client: &C, questions: &[String], answers: &[String]) -> Result<String>
where
    C: CompletionClient + ?Sized,
{
    let transcript = format_transcript(&pair_up(questions, answers));
    let messages = vec![
        ChatMessage::system(COACH_PERSONA),
        ChatMessage::user(feedback_prompt(&transcript)),
    ];
    let feedback = client.complete(messages, FEEDBACK_TEMPERATURE).await?;
    Ok(feedback.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{MockCompletionClient, Role};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_transcript_format() {
        let questions = strings(&["Q1", "Q2"]);
        let answers = strings(&["A1", "A2"]);
        assert_eq!(
            format_transcript(&pair_up(&questions, &answers)),
            "1. Q: Q1\n   A: A1\n2. Q: Q2\n   A: A2"
        );
    }

    #[test]
    fn test_unanswered_items_keep_their_slot() {
        let questions = strings(&["Q1", "Q2", "Q3"]);
        let answers = strings(&["", "A2", ""]);
        assert_eq!(
            format_transcript(&pair_up(&questions, &answers)),
            "1. Q: Q1\n   A: \n2. Q: Q2\n   A: A2\n3. Q: Q3\n   A: "
        );
    }

    #[test]
    fn test_empty_transcript() {
        assert_eq!(format_transcript(&[]), "");
    }

    #[tokio::test]
    async fn test_get_feedback_embeds_transcript_and_trims_reply() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|messages, temperature| {
                messages.len() == 2
                    && messages[0].role == Role::System
                    && messages[0].content == COACH_PERSONA
                    && messages[1]
                        .content
                        .ends_with("Questions and Answers:\n1. Q: Q1\n   A: A1\n2. Q: Q2\n   A: A2")
                    && messages[1].content.contains("1. An executive summary of my performance")
                    && (*temperature - 0.7).abs() < f32::EPSILON
            })
            .returning(|_, _| Ok("\n## Summary\nSolid answers.\n\n".to_string()))
            .once();

        let feedback = get_feedback(&client, &strings(&["Q1", "Q2"]), &strings(&["A1", "A2"]))
            .await
            .unwrap();
        assert_eq!(feedback, "## Summary\nSolid answers.");
    }

    #[tokio::test]
    async fn test_get_feedback_failure_propagates() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .returning(|_, _| Err(anyhow::anyhow!("503 Service Unavailable")))
            .once();

        assert!(get_feedback(&client, &strings(&["Q1"]), &strings(&["A1"])).await.is_err());
    }
}
