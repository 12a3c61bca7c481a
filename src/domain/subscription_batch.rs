use crate::domain::SubscriberEmail;

/// Whether the batch subscribes members outright or sends them an invitation
/// they have to accept first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionMode {
    Subscribe,
    Invite,
}

impl SubscriptionMode {
    // Mailman encodes the mode as the `subscribe_or_invite` form field.
    pub fn as_form_flag(&self) -> &'static str {
        match self {
            SubscriptionMode::Subscribe => "0",
            SubscriptionMode::Invite => "1",
        }
    }
}

/// One mass-subscription form submission: the candidate addresses plus the
/// toggles Mailman exposes on its "Mass Subscription" admin page.
#[derive(Debug, Clone)]
pub struct SubscriptionBatch {
    pub subscribees: Vec<SubscriberEmail>,
    pub mode: SubscriptionMode,
    pub send_welcome_message: bool,
    pub notify_list_owner: bool,
    pub invitation: String,
}

impl SubscriptionBatch {
    pub fn new(subscribees: Vec<SubscriberEmail>) -> Self {
        Self {
            subscribees,
            mode: SubscriptionMode::Subscribe,
            send_welcome_message: false,
            notify_list_owner: false,
            invitation: String::new(),
        }
    }

    // The admin form expects one address per line in a single textarea.
    pub fn subscribees_block(&self) -> String {
        self.subscribees
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join("\n")
    }
}
