//! Contact form state and hand-off to an email delivery service.
//!
//! The crate does not speak HTTP. It builds the request payload, hands it to
//! a [`MailTransport`] supplied by the host, and turns the outcome into a
//! transient [`Notification`].

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

const SERVICE_ID_VAR: &str = "FOLIO_EMAILJS_SERVICE_ID";
const TEMPLATE_ID_VAR: &str = "FOLIO_EMAILJS_TEMPLATE_ID";
const PUBLIC_KEY_VAR: &str = "FOLIO_EMAILJS_PUBLIC_KEY";

const NOTIFICATION_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContactError {
    #[error("missing configuration variable {0}")]
    MissingConfig(&'static str),

    #[error("field `{0}` is required")]
    Required(&'static str),

    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),

    #[error("unknown form field `{0}`")]
    UnknownField(String),

    #[error("a submission is already in flight")]
    Busy,
}

/// Failure reported by a transport.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeliveryError {
    #[error("network error: {0}")]
    Network(String),

    #[error("service rejected credentials")]
    Unauthorized,

    #[error("service returned status {0}")]
    Status(u16),
}

/// Credentials for the delivery service.
#[derive(Debug, Clone, PartialEq)]
pub struct MailConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl MailConfig {
    pub fn from_env() -> Result<Self, ContactError> {
        let var = |name: &'static str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or(ContactError::MissingConfig(name))
        };
        Ok(Self {
            service_id: var(SERVICE_ID_VAR)?,
            template_id: var(TEMPLATE_ID_VAR)?,
            public_key: var(PUBLIC_KEY_VAR)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParams {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Request body for an EmailJS-style send endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailJsRequest {
    pub service_id: String,
    pub template_id: String,
    pub user_id: String,
    pub template_params: TemplateParams,
}

impl EmailJsRequest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Performs the actual API call. Implemented by the host.
pub trait MailTransport {
    fn send(&self, request: &EmailJsRequest) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: &'static str,
    pub description: &'static str,
    pub duration: Duration,
}

impl Notification {
    fn success() -> Self {
        Self {
            kind: NotificationKind::Success,
            title: "Message Sent!",
            description: "Thank you for your message! I'll get back to you soon.",
            duration: NOTIFICATION_DURATION,
        }
    }

    fn failure() -> Self {
        Self {
            kind: NotificationKind::Failure,
            title: "Failed to Send",
            description: "Oops! Something went wrong. Please try again later.",
            duration: NOTIFICATION_DURATION,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    is_loading: bool,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update a field by its input name.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> Result<(), ContactError> {
        let slot = match field {
            "name" => &mut self.name,
            "email" => &mut self.email,
            "subject" => &mut self.subject,
            "message" => &mut self.message,
            other => return Err(ContactError::UnknownField(other.to_string())),
        };
        *slot = value.into();
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn validate(&self) -> Result<(), ContactError> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ];
        for (label, value) in fields {
            if value.trim().is_empty() {
                return Err(ContactError::Required(label));
            }
        }
        if !looks_like_email(self.email.trim()) {
            return Err(ContactError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }

    fn request(&self, config: &MailConfig) -> EmailJsRequest {
        EmailJsRequest {
            service_id: config.service_id.clone(),
            template_id: config.template_id.clone(),
            user_id: config.public_key.clone(),
            template_params: TemplateParams {
                name: self.name.clone(),
                email: self.email.clone(),
                subject: self.subject.clone(),
                message: self.message.clone(),
            },
        }
    }

    fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.subject.clear();
        self.message.clear();
    }

    /// Validate and deliver the form.
    ///
    /// Validation errors come back as `Err` without contacting the service.
    /// Delivery failures are logged and reported as a failure notification;
    /// only a successful delivery clears the form.
    pub fn submit(
        &mut self,
        config: &MailConfig,
        transport: &dyn MailTransport,
    ) -> Result<Notification, ContactError> {
        if self.is_loading {
            return Err(ContactError::Busy);
        }
        self.validate()?;

        self.is_loading = true;
        let request = self.request(config);
        let outcome = transport.send(&request);
        self.is_loading = false;

        match outcome {
            Ok(()) => {
                log::info!("contact message from {} delivered", self.email);
                self.clear();
                Ok(Notification::success())
            }
            Err(err) => {
                log::error!("sending contact message failed: {}", err);
                Ok(Notification::failure())
            }
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
