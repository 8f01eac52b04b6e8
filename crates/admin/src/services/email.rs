//! Email service for order status updates and confirmation resends.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use verdant_core::OrderStatus;

use crate::config::EmailConfig;
use crate::models::{OrderItem, OrderWithCustomer};

/// One rendered line in an order email.
struct EmailLineView {
    name: String,
    color: String,
    quantity: i32,
    line_total: String,
}

/// HTML template for the status update email.
#[derive(Template)]
#[template(path = "email/status_update.html")]
struct StatusUpdateHtml<'a> {
    name: &'a str,
    order_number: &'a str,
    status: &'a str,
}

/// Plain text template for the status update email.
#[derive(Template)]
#[template(path = "email/status_update.txt")]
struct StatusUpdateText<'a> {
    name: &'a str,
    order_number: &'a str,
    status: &'a str,
}

/// HTML template for the re-sent order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    name: &'a str,
    order_number: &'a str,
    total: String,
    payment_method: &'a str,
    shipping_address: &'a str,
    lines: Vec<EmailLineView>,
}

/// Plain text template for the re-sent order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    name: &'a str,
    order_number: &'a str,
    total: String,
    payment_method: &'a str,
    shipping_address: &'a str,
    lines: Vec<EmailLineView>,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Tell the customer their order changed status.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_status_update(
        &self,
        order: &OrderWithCustomer,
        status: OrderStatus,
    ) -> Result<(), EmailError> {
        let html = StatusUpdateHtml {
            name: &order.customer_name,
            order_number: &order.order_number,
            status: status.label(),
        }
        .render()?;

        let text = StatusUpdateText {
            name: &order.customer_name,
            order_number: &order.order_number,
            status: status.label(),
        }
        .render()?;

        let subject = format!(
            "Your Verdant order {} is now {}",
            order.order_number,
            status.label().to_lowercase()
        );
        self.send_multipart_email(order.customer_email.as_str(), &subject, &text, &html)
            .await
    }

    /// Re-send the order confirmation email from the snapshot items.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn resend_order_confirmation(
        &self,
        order: &OrderWithCustomer,
        items: &[OrderItem],
    ) -> Result<(), EmailError> {
        let build_lines = || {
            items
                .iter()
                .map(|item| EmailLineView {
                    name: item.product_name.clone(),
                    color: item.color_name.clone().unwrap_or_default(),
                    quantity: item.quantity,
                    line_total: item.line_total().display(),
                })
                .collect::<Vec<_>>()
        };

        let html = OrderConfirmationHtml {
            name: &order.customer_name,
            order_number: &order.order_number,
            total: order.total_amount.display(),
            payment_method: order.payment_method.label(),
            shipping_address: &order.shipping_address,
            lines: build_lines(),
        }
        .render()?;

        let text = OrderConfirmationText {
            name: &order.customer_name,
            order_number: &order.order_number,
            total: order.total_amount.display(),
            payment_method: order.payment_method.label(),
            shipping_address: &order.shipping_address,
            lines: build_lines(),
        }
        .render()?;

        let subject = format!("Your Verdant order {}", order.order_number);
        self.send_multipart_email(order.customer_email.as_str(), &subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
