/// Per-address results scraped from the admin panel's response page, in
/// document order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SubscriptionOutcome {
    pub subscribed: Vec<String>,
    pub failed: Vec<SubscriptionFailure>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SubscriptionFailure {
    pub address: String,
    pub reason: String,
}
