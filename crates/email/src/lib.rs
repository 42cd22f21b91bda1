//! `forgekit-email` — transactional email boundary.
//!
//! [`Mailer`] is deliberately infallible: delivery failures come back inside
//! [`SendEmailResult`] so callers (and background tasks) branch on one shape
//! instead of juggling error channels.

pub mod mailer;
pub mod resend;
pub mod welcome;

pub use mailer::{EmailTag, Mailer, Recipients, SendEmailParams, SendEmailResult};
pub use resend::ResendMailer;
pub use welcome::welcome_html;
