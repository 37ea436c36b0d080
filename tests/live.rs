//! Smoke test against the real service. Run with `--ignored`.

use tenminutemail_client::Session;

#[tokio::test]
#[ignore = "contacts the live 10MinuteMail service"]
async fn live_session_round() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut session = Session::new().await.expect("session should open");
    assert!(!session.address().is_empty());
    assert!(!session.is_expired());

    assert!(session.renew().await.expect("renew request"), "fresh session should renew");

    session.messages().await.expect("fetch all messages");
    session.latest().await.expect("fetch latest messages");
}
