//! Open a mailbox, print its rows, then follow signals until Ctrl-C.
//!
//! ```text
//! RUST_LOG=debug cargo run --example watch -- http://localhost:9000 swaks
//! ```

use mailbox_view::{Client, Dispatcher, Event, Settings, Signal, relative_date};

#[tokio::main]
async fn main() -> Result<(), mailbox_view::Error> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let base = args.next().unwrap_or_else(|| "http://localhost:9000".to_string());
    let name = args.next().unwrap_or_else(|| "swaks".to_string());

    let client = Client::builder()
        .api_url(format!("{base}/api/v1"))
        .serve_url(format!("{base}/serve"))
        .build()?;
    let mut handle = Dispatcher::spawn(client, name, None, Settings::default());
    let mut state = handle.state.clone();

    if state.wait_for(|m| m.list().is_some()).await.is_ok() {
        let mailbox = state.borrow();
        if let Some(list) = mailbox.list() {
            for header in list.visible() {
                let seen = if header.seen { ' ' } else { '*' };
                println!(
                    "{seen} {:<24} {:<40} {}",
                    header.from,
                    header.subject,
                    relative_date(mailbox.now, header.date)
                );
            }
            if let Some(newest) = list.visible().first() {
                handle.events.send(Event::ClickMessage(newest.id.clone())).ok();
            }
        }
    }

    loop {
        tokio::select! {
            signal = handle.signals.recv() => match signal {
                Some(Signal::Error(text)) => eprintln!("error: {text}"),
                Some(signal) => println!("{signal:?}"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    drop(handle.events);
    if let Ok(mailbox) = handle.task.await {
        println!("final state: {:?}", mailbox.state);
    }
    Ok(())
}
