use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use tracing::debug;

use crate::config::Config;
use crate::errors::AppError;
use crate::notify::{EmailMessage, Notifier};

const CHARSET: &str = "UTF-8";

/// Sends email through Amazon SES v2 from a single verified sender address.
#[derive(Clone)]
pub struct SesNotifier {
    client: aws_sdk_sesv2::Client,
    sender: String,
}

impl SesNotifier {
    pub fn new(client: aws_sdk_sesv2::Client, sender: String) -> Self {
        Self { client, sender }
    }
}

/// Constructs an SES client from the default credential chain.
/// `SES_ENDPOINT` points it at a local emulator instead of AWS.
pub async fn build_ses_client(config: &Config) -> aws_sdk_sesv2::Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));
    if let Some(endpoint) = &config.ses_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let sdk_config = loader.load().await;

    aws_sdk_sesv2::Client::new(&sdk_config)
}

fn content(data: &str) -> Result<Content, AppError> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| AppError::Mail(format!("invalid email content: {e}")))
}

#[async_trait]
impl Notifier for SesNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<String, AppError> {
        let body = Body::builder()
            .text(content(&message.text_body)?)
            .html(content(&message.html_body)?)
            .build();
        let simple = Message::builder()
            .subject(content(&message.subject)?)
            .body(body)
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&self.sender)
            .destination(Destination::builder().to_addresses(&message.to).build())
            .content(EmailContent::builder().simple(simple).build())
            .send()
            .await
            .map_err(|e| AppError::Mail(format!("SES send failed: {}", DisplayErrorContext(&e))))?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        debug!(to = %message.to, message_id = %message_id, "SES accepted email");
        Ok(message_id)
    }
}
