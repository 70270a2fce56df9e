use async_trait::async_trait;
use jogkit_communication::{
    ConnectionManager, ConnectionParams, MockLink, MockTransportFactory, RetryPrompt,
};
use jogkit_core::ConnectionError;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

struct ScriptedPrompt {
    answers: VecDeque<bool>,
    asked: u32,
}

impl ScriptedPrompt {
    fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: 0,
        }
    }
}

#[async_trait]
impl RetryPrompt for ScriptedPrompt {
    async fn confirm_retry(&mut self, error: &ConnectionError) -> bool {
        assert!(error.is_access_denied());
        self.asked += 1;
        self.answers.pop_front().unwrap_or(false)
    }
}

fn denied() -> ConnectionError {
    ConnectionError::AccessDenied {
        port: "COM3".to_string(),
        reason: "Access is denied.".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_denied_port_retried_until_open() {
    let link = MockLink::new();
    link.push_open_error(denied()).push_open_error(denied());
    let mut manager = ConnectionManager::new(MockTransportFactory::new(link.clone()))
        .with_backoff(Duration::from_millis(1000));
    let mut prompt = ScriptedPrompt::new(&[true, true]);

    let start = Instant::now();
    let conn = manager
        .open(&ConnectionParams::for_port("COM3"), &mut prompt)
        .await
        .unwrap();

    assert!(conn.is_open());
    assert_eq!(conn.port(), "COM3");
    assert_eq!(link.open_attempts(), 3);
    assert_eq!(prompt.asked, 2);
    assert!(start.elapsed() >= Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn test_declined_retry_gives_up() {
    let link = MockLink::new();
    link.push_open_error(denied());
    let mut manager = ConnectionManager::new(MockTransportFactory::new(link.clone()));
    let mut prompt = ScriptedPrompt::new(&[false]);

    let err = manager
        .open(&ConnectionParams::for_port("COM3"), &mut prompt)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ConnectionError::RetryDeclined {
            port: "COM3".to_string()
        }
    );
    assert_eq!(link.open_attempts(), 1);
    assert!(link.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_other_open_failure_is_fatal() {
    let link = MockLink::new();
    link.push_open_error(ConnectionError::FailedToOpen {
        port: "COM9".to_string(),
        reason: "The system cannot find the file specified.".to_string(),
    });
    let mut manager = ConnectionManager::new(MockTransportFactory::new(link.clone()));
    let mut prompt = ScriptedPrompt::new(&[true]);

    let err = manager
        .open(&ConnectionParams::for_port("COM9"), &mut prompt)
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectionError::FailedToOpen { .. }));
    assert_eq!(prompt.asked, 0);
    assert_eq!(link.open_attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_connection_closed_exactly_once() {
    let link = MockLink::new();
    let mut manager = ConnectionManager::new(MockTransportFactory::new(link.clone()));
    let mut prompt = ScriptedPrompt::new(&[]);

    let mut conn = manager
        .open(&ConnectionParams::for_port("COM3"), &mut prompt)
        .await
        .unwrap();
    conn.close();
    assert!(!conn.is_open());
    conn.close();
    drop(conn);

    assert_eq!(link.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_connection_is_closed() {
    let link = MockLink::new();
    let mut manager = ConnectionManager::new(MockTransportFactory::new(link.clone()));
    let mut prompt = ScriptedPrompt::new(&[]);

    {
        let _conn = manager
            .open(&ConnectionParams::for_port("/dev/ttyUSB0"), &mut prompt)
            .await
            .unwrap();
    }

    assert_eq!(link.close_count(), 1);
}
