//! Chat commands.

use std::sync::Arc;

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::chat::{ChatSession, GREETING};
use crate::config::Settings;

/// Ask a single question, or start an interactive session.
pub async fn cmd_chat(settings: &Settings, message: Option<&str>) -> anyhow::Result<()> {
    let client = settings.make_client()?;
    let mut session = ChatSession::new(Arc::new(client)).with_attempt_timeout(settings.chat_timeout());

    if let Some(message) = message {
        let exchange = session.ask(message).await;
        println!("{}", exchange.text);
        return Ok(());
    }

    println!("{} {}", style("checky:").cyan().bold(), GREETING);
    println!("{}", style("(type 'exit' to quit)").dim());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        {
            use std::io::Write;
            print!("{} ", style("you:").bold());
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        let exchange = session.ask(line).await;
        println!("{} {}", style("checky:").cyan().bold(), exchange.text);
    }

    Ok(())
}
