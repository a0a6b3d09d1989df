use std::time::Duration;

use async_trait::async_trait;
use autoaway::config::IrcConfig;
use autoaway::prober::{LockProber, LockState};
use autoaway::settings::SettingsStore;
use autoaway::{AutoAway, Config};
use rstest::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};

mod common;

use common::TempDir;

struct Unlocked;

#[async_trait]
impl LockProber for Unlocked {
    async fn probe(&self) -> LockState {
        LockState::Unlocked
    }
}

#[fixture]
fn root() -> TempDir {
    TempDir::new()
}

async fn listen() -> (TcpListener, IrcConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let network = IrcConfig {
        hostname: "127.0.0.1".to_string(),
        port: Some(listener.local_addr().unwrap().port()),
        ..Default::default()
    };

    (listener, network)
}

/// Accepts a single client and returns the lines it sent, up to and including `QUIT`.
async fn record_until_quit(listener: TcpListener) -> Vec<String> {
    let (socket, _) = listener.accept().await.unwrap();
    let mut lines = BufReader::new(socket).lines();
    let mut received = vec![];

    while let Some(line) = lines.next_line().await.unwrap() {
        let quit = line.starts_with("QUIT");

        received.push(line);

        if quit {
            break;
        }
    }

    received
}

fn daemon(root: &TempDir, networks: Vec<IrcConfig>) -> AutoAway {
    let settings = SettingsStore::load(root.path()).expect("loading failed");
    let config = Config {
        networks,
        ..Default::default()
    };

    AutoAway::with_prober(config, settings, Box::new(Unlocked))
}

#[rstest]
#[tokio::test]
async fn it_should_register_and_quit_when_the_console_closes(root: TempDir) {
    let (listener, network) = listen().await;
    let server = tokio::spawn(record_until_quit(listener));
    let mut autoaway = daemon(&root, vec![network]);
    let console: &[u8] = b"";

    timeout(
        Duration::from_secs(10),
        autoaway.run(BufReader::new(console).lines()),
    )
    .await
    .expect("run did not finish")
    .expect("run failed");

    let received = server.await.unwrap();

    assert!(received.iter().any(|line| line == "NICK user"), "{received:?}");
    assert_eq!(
        received.last().map(String::as_str),
        Some("QUIT :autoaway shutting down")
    );
}

#[rstest]
#[tokio::test]
async fn it_should_keep_running_when_one_network_fails(root: TempDir) {
    let (failing, failing_network) = listen().await;
    let (healthy, healthy_network) = listen().await;
    let healthy_server = tokio::spawn(record_until_quit(healthy));
    let mut autoaway = daemon(&root, vec![failing_network, healthy_network]);
    let (mut input, console) = tokio::io::duplex(64);

    let user = async move {
        let (socket, _) = failing.accept().await.unwrap();

        // Closing with unread data makes the kernel reset the connection.
        sleep(Duration::from_millis(200)).await;
        drop(socket);
        sleep(Duration::from_millis(200)).await;

        input.write_all(b"/AwayMsg still here\n").await.unwrap();
        drop(input);
    };

    let (result, ()) = timeout(Duration::from_secs(10), async {
        tokio::join!(autoaway.run(BufReader::new(console).lines()), user)
    })
    .await
    .expect("run did not finish");

    result.expect("run failed");

    assert_eq!(
        autoaway.state().settings.settings().away_message,
        "still here"
    );

    let received = healthy_server.await.unwrap();

    assert_eq!(
        received.last().map(String::as_str),
        Some("QUIT :autoaway shutting down")
    );
}
