use crate::helpers::{ADMIN_PASSWORD, spawn_panel};
use claims::{assert_ok, assert_some};
use mailman_bulk::clients::MailmanError;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn login_primes_the_session_and_posts_the_admin_password() {
    // Arrange
    let panel = spawn_panel().await;

    Mock::given(method("GET"))
        .and(path(panel.admin_root_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&panel.server)
        .await;

    Mock::given(method("POST"))
        .and(path(panel.admin_root_path()))
        .and(body_string_contains(format!("adminpw={}", ADMIN_PASSWORD)))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&panel.server)
        .await;

    // Act
    let outcome = panel.client.login().await;

    // Assert
    assert_ok!(outcome);
}

#[tokio::test]
async fn login_with_a_rejected_password_is_an_authorization_failure() {
    // Arrange
    let panel = spawn_panel().await;
    panel.mount_failed_login().await;

    // No subscription attempt may follow a failed login.
    Mock::given(method("POST"))
        .and(path(panel.members_add_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&panel.server)
        .await;

    // Act
    let outcome = panel.client.login().await;

    // Assert
    assert!(matches!(outcome, Err(MailmanError::AuthorizationFailed)));
}

#[tokio::test]
async fn login_surfaces_a_panel_server_error() {
    // Arrange
    let panel = spawn_panel().await;

    Mock::given(method("GET"))
        .and(path(panel.admin_root_path()))
        .respond_with(ResponseTemplate::new(200))
        .mount(&panel.server)
        .await;

    Mock::given(method("POST"))
        .and(path(panel.admin_root_path()))
        .respond_with(ResponseTemplate::new(500))
        .mount(&panel.server)
        .await;

    // Act
    let outcome = panel.client.login().await;

    // Assert
    let error = match outcome {
        Err(MailmanError::Http(error)) => Some(error),
        _ => None,
    };
    assert_some!(error);
}
