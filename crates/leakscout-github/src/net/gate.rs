use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting admission gate bounding in-flight blob fetches. A unit of work
/// holds its permit for the whole fetch-and-scan; the permit drops on
/// completion or failure alike.
#[derive(Clone)]
pub struct FetchGate {
    sem: Arc<Semaphore>,
}

impl FetchGate {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            sem: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        self.sem
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore closed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn never_admits_more_than_the_limit() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let gate = FetchGate::new(3);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let gate = gate.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                let _permit = gate.acquire().await;
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn zero_limit_still_admits_one() {
        let gate = FetchGate::new(0);
        let _permit = gate.acquire().await;
    }
}
