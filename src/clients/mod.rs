pub mod mailman_client;

pub use mailman_client::{AdminSession, MailmanClient, MailmanError};
