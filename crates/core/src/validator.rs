use crate::completion::{ChatMessage, CompletionClient};
use anyhow::Result;

const VALIDATION_TEMPERATURE: f32 = 0.0;

pub fn validation_prompt(profession: &str) -> String {
    format!("Is \"{profession}\" a real job or profession? Just answer with Yes or No.")
}

/// Anything that does not contain "yes" counts as a rejection, including an
/// empty or garbled reply.
pub fn is_affirmative(reply: &str) -> bool {
    reply.to_lowercase().contains("yes")
}

/// Asks the model whether `profession` names a real job. Request failures are
/// returned to the caller unchanged.
pub async fn is_valid_profession<C>(client: &C, profession: &str) -> Result<bool>
where
    C: CompletionClient + ?Sized,
{
    let messages = vec![ChatMessage::user(validation_prompt(profession))];
    let reply = client.complete(messages, VALIDATION_TEMPERATURE).await?;
    let valid = is_affirmative(&reply);
    tracing::debug!(profession, reply = %reply, valid, "Profession check completed");
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{MockCompletionClient, Role};

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("Yes"));
        assert!(is_affirmative("YES."));
        assert!(is_affirmative("yes, it is a real profession"));
        assert!(!is_affirmative("No"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("I cannot tell."));
    }

    #[tokio::test]
    async fn test_single_user_message_at_zero_temperature() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|messages, temperature| {
                messages.len() == 1
                    && messages[0].role == Role::User
                    && messages[0].content
                        == "Is \"Software Engineer\" a real job or profession? Just answer with Yes or No."
                    && *temperature == 0.0
            })
            .returning(|_, _| Ok("Yes".to_string()))
            .once();

        assert!(is_valid_profession(&client, "Software Engineer").await.unwrap());
    }

    #[tokio::test]
    async fn test_negative_reply_is_rejection() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .returning(|_, _| Ok("No.".to_string()))
            .once();

        assert!(!is_valid_profession(&client, "asdkjalksjd").await.unwrap());
    }

    #[tokio::test]
    async fn test_request_failure_propagates() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .returning(|_, _| Err(anyhow::anyhow!("connection reset")))
            .once();

        let err = is_valid_profession(&client, "Nurse").await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
