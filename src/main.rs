use anyhow::{Context, bail};
use mailman_bulk::clients::MailmanClient;
use mailman_bulk::configuration::get_configuration;
use mailman_bulk::domain::{SubscriberEmail, SubscriptionBatch, SubscriptionMode};
use mailman_bulk::telemetry::{get_subscriber, init_subscriber};
use secrecy::Secret;
use std::io::BufRead;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();
    // Logs go to stderr; stdout carries the per-address results.
    let subscriber = get_subscriber("mailman_bulk".into(), "info".into(), std::io::stderr);
    init_subscriber(subscriber);

    let options = BatchOptions::from_args(std::env::args().skip(1))?;
    let configuration = get_configuration().expect("Failed to read configuration.");

    let admin_password = match configuration.mailman.admin_password.clone() {
        Some(password) => password,
        None => Secret::new(
            rpassword::prompt_password("Enter the list admin password: ")
                .context("Failed to read the admin password.")?,
        ),
    };

    let subscribees = read_subscribees().context("Failed to read addresses from stdin.")?;
    if subscribees.is_empty() {
        bail!("No addresses were provided on stdin.");
    }

    let mut batch = SubscriptionBatch::new(subscribees);
    batch.mode = if options.invite {
        SubscriptionMode::Invite
    } else {
        SubscriptionMode::Subscribe
    };
    batch.send_welcome_message = options.send_welcome_message;
    batch.notify_list_owner = options.notify_list_owner;
    batch.invitation = options.invitation;

    let client = MailmanClient::new(
        configuration.mailman.mailing_list.clone(),
        admin_password,
        configuration.mailman.instance_root.clone(),
        configuration.mailman.timeout(),
    );

    let session = client
        .login()
        .await
        .context("Failed to log in to the admin panel.")?;
    let outcome = client
        .add_members(&session, &batch)
        .await
        .context("Mass subscription request failed.")?;

    for address in &outcome.subscribed {
        println!("subscribed: {}", address);
    }
    for failure in &outcome.failed {
        println!("failed: {} -- {}", failure.address, failure.reason);
    }

    Ok(())
}

struct BatchOptions {
    invite: bool,
    send_welcome_message: bool,
    notify_list_owner: bool,
    invitation: String,
}

impl BatchOptions {
    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self, anyhow::Error> {
        let mut options = Self {
            invite: false,
            send_welcome_message: false,
            notify_list_owner: false,
            invitation: String::new(),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--invite" => options.invite = true,
                "--send-welcome-message" => options.send_welcome_message = true,
                "--notify-list-owner" => options.notify_list_owner = true,
                "--invitation" => {
                    options.invitation = args
                        .next()
                        .context("--invitation requires a message argument.")?;
                }
                other => bail!("Unrecognized argument: {}", other),
            }
        }

        Ok(options)
    }
}

fn read_subscribees() -> Result<Vec<SubscriberEmail>, anyhow::Error> {
    let mut subscribees = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read a line from stdin.")?;
        let address = line.trim();
        if address.is_empty() {
            continue;
        }
        let email = SubscriberEmail::parse(address.to_string())
            .map_err(|error| anyhow::anyhow!(error))?;
        subscribees.push(email);
    }

    Ok(subscribees)
}
