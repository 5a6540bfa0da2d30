#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::{Request, Respond, ResponseTemplate};

use leakscout_github::net::{RecordingSleeper, RetryPolicy};
use leakscout_github::GithubClient;

/// Responds with each scripted template once, then sticks to the last one.
/// Keeps retry tests independent of wiremock's mock-ordering rules.
pub struct ScriptedResponder {
    steps: Vec<ResponseTemplate>,
    cursor: AtomicUsize,
}

impl ScriptedResponder {
    pub fn new(steps: Vec<ResponseTemplate>) -> Self {
        assert!(!steps.is_empty(), "a scripted responder needs at least one step");
        Self {
            steps,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl Respond for ScriptedResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.steps[index.min(self.steps.len() - 1)].clone()
    }
}

pub fn recording_client(base_url: &str) -> (GithubClient, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::new());
    let client = GithubClient::with_parts(None, base_url, RetryPolicy::default(), sleeper.clone())
        .expect("client builds");
    (client, sleeper)
}
