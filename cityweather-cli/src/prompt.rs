//! Interactive prompts.

use anyhow::Result;
use cityweather_core::{API_KEY_LEN, ApiKey};
use inquire::{InquireError, Text, validator::Validation};

/// Asks until a key of the right length is entered.
pub fn api_key() -> Result<ApiKey> {
    let raw = Text::new("Please enter your OpenWeather API key:")
        .with_validator(|input: &str| {
            Ok(match ApiKey::new(input) {
                Ok(_) => Validation::Valid,
                Err(_) => Validation::Invalid(
                    format!("The API key must be exactly {API_KEY_LEN} characters.").into(),
                ),
            })
        })
        .prompt()?;

    Ok(ApiKey::new(raw)?)
}

pub fn city_name() -> Result<String> {
    Ok(Text::new("Enter name of city:").prompt()?)
}

const fn is_cancellation(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}

/// True if the user backed out of a prompt (Esc or Ctrl+C).
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.downcast_ref::<InquireError>().is_some_and(is_cancellation)
}
