//! Watch a fresh 10MinuteMail inbox and print new mail as it arrives.
//!
//! ```text
//! RUST_LOG=info cargo run --example watch -- --forward me@example.com
//! ```

use clap::Parser;
use std::time::Duration;
use tenminutemail_client::Session;

#[derive(Debug, Parser)]
#[command(about = "Poll a temporary inbox and print incoming mail")]
struct Args {
    /// Forward every received message to this address.
    #[arg(long)]
    forward: Option<String>,

    /// Seconds between polls, at least 1.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut session = Session::new().await?;
    println!("Your address is: {}", session.address());
    println!("Waiting for new messages.");

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval));
    loop {
        ticker.tick().await;

        if session.is_expired() {
            println!("Renewing session..");
            if !session.renew().await? {
                eprintln!("Session permanently expired, exiting.");
                return Ok(());
            }
            println!("Successfully renewed session.");
        }

        for msg in session.latest().await? {
            println!("-----");
            println!("Sender: {}", msg.sender);
            println!("Subject: {}", msg.subject);
            println!("Body: {}", msg.plaintext);

            if let Some(recipient) = &args.forward {
                match session.forward(&msg.id, recipient).await {
                    Ok(true) => {}
                    Ok(false) => eprintln!("Server rejected message forward request."),
                    Err(err) => eprintln!("Error forwarding message: {err}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Args::try_parse_from(["watch", "--interval", "0"]).is_err());
    }

    #[test]
    fn interval_defaults_to_two_seconds() {
        let args = Args::try_parse_from(["watch"]).unwrap();
        assert_eq!(args.interval, 2);
        assert!(args.forward.is_none());
    }
}
