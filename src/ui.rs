use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::validator::Validation;
use inquire::{
    set_global_render_config, Confirm, CustomUserError, Password, PasswordDisplayMode, Text,
};

use crate::error::Error;
use crate::reconcile::Credentials;

/// Environment variable consulted before prompting for the password
pub const PASSWORD_ENV: &str = "TICKET_CHECK_PASSWORD";

/// Initialize the global render configuration for inquire prompts
pub fn init_render_config() {
    let mut style = RenderConfig::default_colored();
    style.prompt_prefix = Styled::new(">").with_fg(Color::LightGreen);
    set_global_render_config(style);
}

/// Collect tracker credentials, prompting only for what was not supplied
pub fn prompt_credentials(username: Option<String>) -> Result<Credentials, Error> {
    let username = match username.filter(|u| !u.trim().is_empty()) {
        Some(username) => username,
        None => prompt_username()?,
    };

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => prompt_password()?,
    };

    Ok(Credentials::new(username.trim(), password))
}

/// Prompt for the tracker username
pub fn prompt_username() -> Result<String, Error> {
    Text::new("username:")
        .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
            if input.trim().is_empty() {
                return Ok(Validation::Invalid("Username can't be empty".into()));
            }
            Ok(Validation::Valid)
        })
        .prompt()
        .map_err(map_inquire_error)
}

/// Prompt for the tracker password without echoing it
pub fn prompt_password() -> Result<String, Error> {
    let password = Password::new("password:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Hidden)
        .prompt()
        .map_err(map_inquire_error)?;

    if password.is_empty() {
        return Err(Error::InvalidInput("Password can't be empty".to_string()));
    }
    Ok(password)
}

/// Ask whether to run another pass
pub fn prompt_check_again() -> Result<bool, Error> {
    Confirm::new("Check again?")
        .with_default(false)
        .prompt()
        .map_err(map_inquire_error)
}

/// Map inquire errors to our error type
fn map_inquire_error(err: InquireError) -> Error {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => Error::Cancelled,
        _ => Error::Prompt(err.to_string()),
    }
}
