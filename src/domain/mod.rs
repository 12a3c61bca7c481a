mod subscriber_email;
mod subscription_batch;
mod subscription_outcome;

pub use subscriber_email::SubscriberEmail;
pub use subscription_batch::{SubscriptionBatch, SubscriptionMode};
pub use subscription_outcome::{SubscriptionFailure, SubscriptionOutcome};
