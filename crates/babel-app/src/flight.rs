use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

/// FIFO single-flight gate for take-shot and overlay close.
///
/// A place in line is taken synchronously with [`ShotQueue::enter`], so the
/// order is the order commands were read off the event loop. Only the holder of
/// the current [`FlightGuard`] runs; the next ticket proceeds when it drops.
#[derive(Default)]
pub struct ShotQueue {
    tail: Mutex<Option<oneshot::Receiver<()>>>,
}

pub struct Ticket {
    prev: Option<oneshot::Receiver<()>>,
    done: Option<oneshot::Sender<()>>,
}

pub struct FlightGuard {
    _ticket: Ticket,
}

impl ShotQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> Ticket {
        let (done, next) = oneshot::channel();
        let prev = self
            .tail
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(next);
        Ticket {
            prev,
            done: Some(done),
        }
    }
}

impl Ticket {
    /// Wait until every earlier ticket has finished.
    pub async fn wait(mut self) -> FlightGuard {
        if let Some(prev) = self.prev.as_mut() {
            // Err only means the previous holder is gone, which is the signal
            let _ = prev.await;
        }
        self.prev = None;
        FlightGuard { _ticket: self }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        // Abandoned before its turn: keep later tickets behind the earlier ones
        if let (Some(prev), Some(done)) = (self.prev.take(), self.done.take())
            && let Ok(handle) = tokio::runtime::Handle::try_current()
        {
            handle.spawn(async move {
                let _ = prev.await;
                drop(done);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn runs_in_ticket_order_one_at_a_time() {
        let queue = ShotQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let active = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..5u64 {
            let ticket = queue.enter();
            let order = order.clone();
            let active = active.clone();
            handles.push(tokio::spawn(async move {
                let _guard = ticket.wait().await;
                assert_eq!(active.fetch_add(1, Ordering::SeqCst), 0);
                // Later tickets sleep less; order must still hold
                tokio::time::sleep(Duration::from_millis(20 - i * 4)).await;
                order.lock().unwrap().push(i);
                active.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn abandoned_ticket_does_not_let_later_ones_jump_ahead() {
        let queue = ShotQueue::new();
        let first = queue.enter().wait().await;
        let abandoned = queue.enter();
        let third = queue.enter();

        drop(abandoned);
        assert!(
            timeout(Duration::from_millis(50), third.wait()).await.is_err(),
            "third ran while first still held the gate"
        );

        drop(first);
        let third = queue.enter();
        // Queue drains once the first guard is released
        timeout(Duration::from_secs(1), third.wait()).await.unwrap();
    }
}
