use crate::completion::{ChatMessage, CompletionClient};
use anyhow::Result;
use std::fmt;
use std::str::FromStr;

const QUESTION_TEMPERATURE: f32 = 0.7;
const INTERVIEWER_PERSONA: &str = "You are a professional technical interviewer.";
const ITEM_DELIMITER: &str = ". ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}' (expected Easy, Medium or Hard)")),
        }
    }
}

pub fn question_prompt(position: &str, difficulty: Difficulty, count: u8) -> String {
    format!(
        "Generate {count} {} level interview questions for the position of {position}. \
         Only return the questions as a numbered list.",
        difficulty.as_str().to_lowercase()
    )
}

/// Extracts questions from a numbered list. Only lines containing ". " are
/// kept, and each keeps the text after the first occurrence. A reply numbered
/// as "1)" therefore yields fewer questions than requested.
pub fn parse_numbered_list(reply: &str) -> Vec<String> {
    reply
        .split('\n')
        .filter_map(|line| {
            line.split_once(ITEM_DELIMITER)
                .map(|(_, question)| question.to_string())
        })
        .collect()
}

pub async fn generate_questions<C>(
    client: &C,
    position: &str,
    difficulty: Difficulty,
    count: u8,
) -> Result<Vec<String>>
where
    C: CompletionClient + ?Sized,
{
    let messages = vec![
        ChatMessage::system(INTERVIEWER_PERSONA),
        ChatMessage::user(question_prompt(position, difficulty, count)),
    ];
    let reply = client.complete(messages, QUESTION_TEMPERATURE).await?;
    let questions = parse_numbered_list(reply.trim());

    if questions.len() != usize::from(count) {
        tracing::warn!(
            requested = count,
            parsed = questions.len(),
            "Question list length differs from the requested count"
        );
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{MockCompletionClient, Role};

    #[test]
    fn test_strict_numbering_yields_every_question_in_order() {
        for count in 1..=10u8 {
            let reply = (1..=count)
                .map(|i| format!("{i}. Question number {i}?"))
                .collect::<Vec<_>>()
                .join("\n");
            let questions = parse_numbered_list(&reply);
            assert_eq!(questions.len(), usize::from(count));
            for (i, q) in questions.iter().enumerate() {
                assert_eq!(q, &format!("Question number {}?", i + 1));
            }
        }
    }

    #[test]
    fn test_lines_without_delimiter_are_dropped() {
        let questions = parse_numbered_list("1. A\nnote\n2. B");
        assert_eq!(questions, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_only_first_delimiter_is_split() {
        let questions = parse_numbered_list("1. Define OOP. Give an example.");
        assert_eq!(questions, vec!["Define OOP. Give an example.".to_string()]);
    }

    #[test]
    fn test_parenthesised_numbering_is_not_recognised() {
        let questions = parse_numbered_list("1) What is Rust?\n2) What is Cargo?\n3. What is a crate?");
        assert_eq!(questions, vec!["What is a crate?".to_string()]);
    }

    #[test]
    fn test_difficulty_parsing_and_display() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(" MEDIUM ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("impossible".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Medium.to_string(), "Medium");
    }

    #[test]
    fn test_prompt_lowercases_difficulty() {
        assert_eq!(
            question_prompt("Data Analyst", Difficulty::Hard, 4),
            "Generate 4 hard level interview questions for the position of Data Analyst. \
             Only return the questions as a numbered list."
        );
    }

    #[tokio::test]
    async fn test_generate_questions_sends_persona_and_prompt() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|messages, temperature| {
                messages.len() == 2
                    && messages[0].role == Role::System
                    && messages[0].content == INTERVIEWER_PERSONA
                    && messages[1].role == Role::User
                    && messages[1].content.starts_with("Generate 2 easy level")
                    && (*temperature - 0.7).abs() < f32::EPSILON
            })
            .returning(|_, _| Ok("1. What is a variable?\n2. What is a loop?".to_string()))
            .once();

        let questions = generate_questions(&client, "Software Engineer", Difficulty::Easy, 2)
            .await
            .unwrap();
        assert_eq!(
            questions,
            vec!["What is a variable?".to_string(), "What is a loop?".to_string()]
        );
    }
}
