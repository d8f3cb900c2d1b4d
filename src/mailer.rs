use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::info;

use crate::config::SmtpConfig;
use crate::error::MailError;

pub const REMINDER_SUBJECT: &str = "Task Reminder";

/// Delivers reminder notifications. Blocks until the message is accepted or fails.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_reminder(&self, to: &str, task_title: &str, start_time: &str) -> Result<(), MailError>;
}

pub fn reminder_body(task_title: &str, start_time: &str, lead_minutes: u64) -> String {
    format!(
        "Hello,\n\n\
         Your task is starting soon.\n\n\
         Task: {}\n\
         Start Time: {}\n\n\
         This is a {}-minute reminder.\n",
        task_title, start_time, lead_minutes
    )
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    lead_minutes: u64,
}

impl SmtpMailer {
    /// Implicit-TLS SMTP relay (port 465 by default).
    pub fn new(config: &SmtpConfig, lead_minutes: u64) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .build();

        Ok(SmtpMailer {
            transport,
            from: config.from.clone(),
            lead_minutes,
        })
    }

    fn build_message(&self, to: &str, task_title: &str, start_time: &str) -> Result<Message, MailError> {
        let message = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(REMINDER_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(reminder_body(task_title, start_time, self.lead_minutes))?;
        Ok(message)
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send_reminder(&self, to: &str, task_title: &str, start_time: &str) -> Result<(), MailError> {
        let message = self.build_message(to, task_title, start_time)?;
        self.transport.send(message).await?;
        info!("Sent reminder for '{}' to {}", task_title, to);
        Ok(())
    }
}
