use std::net::Ipv4Addr;

use atelier::intake::{QuoteClient, QuoteForm, SubmitStatus, NETWORK_FAILURE};
use atelier::mail::MemoryMailer;
use atelier::quote::{QuoteRelay, ServiceCategory};
use atelier::routing::api_router;
use tokio::net::TcpListener;

async fn spawn_site(relay: QuoteRelay) -> anyhow::Result<String> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, api_router(relay)).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(format!("http://{}", addr))
}

fn form() -> QuoteForm {
    QuoteForm::new(
        "Grace Hopper",
        "grace@example.com",
        ServiceCategory::WebsiteAndAppDesign,
        "A booking site for a small bakery.",
    )
}

#[tokio::test]
async fn submission_reaches_the_inbox() -> anyhow::Result<()> {
    let mailer = MemoryMailer::new();
    let base = spawn_site(QuoteRelay::new(mailer.clone(), "inbox@studio.example")).await?;
    let client = QuoteClient::for_site(&base);

    let mut form = form();
    assert_eq!(form.submit(&client).await, &SubmitStatus::Sent);

    // sent is terminal
    assert_eq!(form.submit(&client).await, &SubmitStatus::Sent);

    let sent = mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "New Quote Request — Website & App Design");
    Ok(())
}

#[tokio::test]
async fn server_error_message_is_surfaced() -> anyhow::Result<()> {
    let relay = QuoteRelay::unconfigured("SMTP_HOST", "inbox@studio.example");
    let base = spawn_site(relay).await?;
    let client = QuoteClient::for_site(&base);

    let mut form = form();
    let status = form.submit(&client).await.clone();
    assert_eq!(
        status,
        SubmitStatus::Error(
            "Email server is not configured. Missing SMTP environment variables.".into()
        )
    );
    assert!(form.can_send());
    Ok(())
}

#[tokio::test]
async fn unreachable_relay_is_a_network_error() -> anyhow::Result<()> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = QuoteClient::for_site(&format!("http://{}", addr));
    let mut form = form();

    assert_eq!(
        form.submit(&client).await,
        &SubmitStatus::Error(NETWORK_FAILURE.into())
    );
    Ok(())
}

#[tokio::test]
async fn resubmitting_after_an_error_can_succeed() -> anyhow::Result<()> {
    let mailer = MemoryMailer::new();
    let base = spawn_site(QuoteRelay::new(mailer.clone(), "inbox@studio.example")).await?;
    let client = QuoteClient::for_site(&base);

    let mut form = form();
    form.email = "grace.example.com".into();
    assert!(matches!(form.submit(&client).await, SubmitStatus::Error(_)));
    assert!(mailer.sent().await.is_empty());

    form.email = "grace@example.com".into();
    assert_eq!(form.submit(&client).await, &SubmitStatus::Sent);
    assert_eq!(mailer.sent().await.len(), 1);
    Ok(())
}
