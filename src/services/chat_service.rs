use tracing::info;

use crate::api::market::MarketApiClient;
use crate::utils::errors::AppError;

/// Send a message to the assistant and return its reply
pub async fn ask(client: &MarketApiClient, message: &str) -> Result<String, AppError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::UserInput("Please type a message for the assistant".to_string()));
    }

    info!("Sending chat message ({} chars)", message.chars().count());
    let reply = client.chat(message).await?;
    Ok(reply.response)
}
