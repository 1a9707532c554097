use super::AppState;
use crate::services::chat_service;
use crate::utils::errors::AppError;
use crate::utils::Panel;

/// `chat <message...>`
pub async fn execute(state: &AppState, args: &[&str]) -> Result<(), AppError> {
    let reply = chat_service::ask(&state.client, &args.join(" ")).await?;
    Panel::new("🤖 Assistant").description(reply).print();
    Ok(())
}
