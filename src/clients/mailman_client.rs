use crate::domain::{SubscriptionBatch, SubscriptionFailure, SubscriptionOutcome};
use crate::utils::error_chain_fmt;
use reqwest::multipart;
use scraper::{ElementRef, Html, Selector};
use secrecy::{ExposeSecret, Secret};

pub const DEFAULT_MAILMAN_INSTANCE: &str = "https://mailman.ic.ac.uk/mailman/";

// Mailman renders the login failure notice across a line break.
const AUTHORIZATION_FAILED_MARKER: &str = "Authorization\nfailed.";
const LOGIN_BUTTON_LABEL: &str = "Let me in...";
const SUBMIT_BUTTON_LABEL: &str = "Submit Your Changes";
const SUCCESS_HEADING: &str = "Successfully subscribed:";
const FAILURE_HEADING: &str = "Error subscribing:";
const FAILURE_REASON_SEPARATOR: &str = " -- ";

pub struct MailmanClient {
    pub mailing_list: String,
    pub instance_root: String,
    pub admin_password: Secret<String>,
    timeout: std::time::Duration,
}

/// An authenticated admin-panel session. Only `MailmanClient::login` hands
/// these out; the cookie jar inside is never re-validated, so a session that
/// outlives the server-side cookie will start failing.
///
/// Not meant to be shared across concurrent submissions.
#[derive(Debug)]
pub struct AdminSession {
    http_client: reqwest::Client,
}

impl MailmanClient {
    pub fn new(
        mailing_list: String,
        admin_password: Secret<String>,
        instance_root: String,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            mailing_list,
            admin_password,
            instance_root,
            timeout,
        }
    }

    pub fn admin_root_url(&self) -> String {
        format!("{}admin/{}/", self.instance_root, self.mailing_list)
    }

    pub fn mass_subscription_url(&self) -> String {
        format!("{}members/add/", self.admin_root_url())
    }

    #[tracing::instrument(
        name = "Log in to the Mailman admin panel",
        skip(self),
        fields(mailing_list = %self.mailing_list)
    )]
    pub async fn login(&self) -> Result<AdminSession, MailmanError> {
        let http_client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .build()?;

        let url = self.admin_root_url();
        // Prime the cookie jar before presenting credentials.
        http_client.get(&url).send().await?;

        let response = http_client
            .post(&url)
            .form(&[
                ("adminpw", self.admin_password.expose_secret().as_str()),
                ("admlogin", LOGIN_BUTTON_LABEL),
            ])
            .send()
            .await?
            .error_for_status()?;

        // The panel answers 200 whether or not the password was right; the
        // failure notice in the body is the only signal.
        let body = response.text().await?;
        if body.contains(AUTHORIZATION_FAILED_MARKER) {
            return Err(MailmanError::AuthorizationFailed);
        }

        Ok(AdminSession { http_client })
    }

    #[tracing::instrument(
        name = "Mass subscribe members",
        skip(self, session, batch),
        fields(
            mailing_list = %self.mailing_list,
            batch_size = batch.subscribees.len()
        )
    )]
    pub async fn add_members(
        &self,
        session: &AdminSession,
        batch: &SubscriptionBatch,
    ) -> Result<SubscriptionOutcome, MailmanError> {
        let response = session
            .http_client
            .post(self.mass_subscription_url())
            // The mass-subscription form only accepts multipart bodies.
            .multipart(subscription_form(batch))
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        parse_membership_response(&body)
    }
}

fn subscription_form(batch: &SubscriptionBatch) -> multipart::Form {
    multipart::Form::new()
        .text("subscribe_or_invite", batch.mode.as_form_flag())
        .text(
            "send_welcome_msg_to_this_batch",
            form_flag(batch.send_welcome_message),
        )
        .text(
            "send_notifications_to_list_owner",
            form_flag(batch.notify_list_owner),
        )
        .text("subscribees", batch.subscribees_block())
        .text("invitation", batch.invitation.clone())
        .text("setmemberopts_btn", SUBMIT_BUTTON_LABEL)
}

fn form_flag(enabled: bool) -> &'static str {
    if enabled { "1" } else { "0" }
}

// Mailman does not close its <li> or <ul> tags. html5ever's recovery gives us
// the flat list structure a browser would see; a strict XML-ish parser would
// nest each item inside the previous one.
fn parse_membership_response(body: &str) -> Result<SubscriptionOutcome, MailmanError> {
    let document = Html::parse_document(body);

    let subscribed = collect_result_items(&document, SUCCESS_HEADING)?.unwrap_or_default();
    let failed = collect_result_items(&document, FAILURE_HEADING)?
        .unwrap_or_default()
        .into_iter()
        .map(|item| {
            // "<address> -- <reason>"; an item without the separator is kept
            // with an empty reason rather than dropped.
            let (address, reason) = match item.split_once(FAILURE_REASON_SEPARATOR) {
                Some((address, reason)) => (address.to_string(), reason.to_string()),
                None => (item, String::new()),
            };
            SubscriptionFailure { address, reason }
        })
        .collect();

    Ok(SubscriptionOutcome { subscribed, failed })
}

/// Returns the text of every `<li>` in the `<ul>` following the `<h5>` whose
/// text matches `heading`, or `None` when the page has no such heading.
fn collect_result_items(
    document: &Html,
    heading: &str,
) -> Result<Option<Vec<String>>, MailmanError> {
    let heading_selector = Selector::parse("h5").unwrap();
    let item_selector = Selector::parse("li").unwrap();

    let Some(heading_element) = document
        .select(&heading_selector)
        .find(|element| element_text(element) == heading)
    else {
        return Ok(None);
    };

    let list = heading_element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "ul")
        .ok_or_else(|| {
            MailmanError::Parse(format!("no result list follows the {:?} heading", heading))
        })?;

    Ok(Some(
        list.select(&item_selector)
            .map(|item| element_text(&item))
            .collect(),
    ))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[derive(thiserror::Error)]
pub enum MailmanError {
    #[error("Authorization failed.")]
    AuthorizationFailed,
    #[error("Request to the Mailman admin panel failed")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse the membership results page: {0}")]
    Parse(String),
}

impl std::fmt::Debug for MailmanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
