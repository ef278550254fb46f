//! RabbitMQ connection handling
//!
//! The service holds a single process wide connection. Channels for
//! publishing are created from it during startup.
use anyhow::{Context, Result};
use tokio_executor_trait::Tokio as TokioExecutor;
use tokio_reactor_trait::Tokio as TokioReactor;

pub struct RabbitMqConnection {
    connection: lapin::Connection,
}

impl RabbitMqConnection {
    /// Connect to the given AMQP url, running lapin on the current tokio runtime
    #[tracing::instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self> {
        let connection = lapin::Connection::connect(
            url,
            lapin::ConnectionProperties::default()
                .with_executor(TokioExecutor::current())
                .with_reactor(TokioReactor),
        )
        .await
        .context("Failed to connect to RabbitMQ")?;

        Ok(Self { connection })
    }

    pub async fn create_channel(&self) -> Result<lapin::Channel> {
        let channel = self.connection.create_channel().await?;

        Ok(channel)
    }

    /// Close the connection with the given code and message
    pub async fn close(&self, reply_code: u16, reply_message: &str) -> Result<()> {
        self.connection.close(reply_code, reply_message).await?;

        Ok(())
    }
}
