// ─── Ctrl-C Delivery ───
// Terminal interrupts are counted on a watch channel instead of killing the
// process, so the menu can unwind to its closing screen.

use std::cell::Cell;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

pub struct Interrupts {
    tx: Arc<watch::Sender<u64>>,
    seen: Cell<u64>,
}

impl Interrupts {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            tx: Arc::new(tx),
            seen: Cell::new(0),
        }
    }

    /// Task that records every Ctrl-C until the runtime shuts down.
    pub fn forward_ctrl_c(&self) -> impl Future<Output = ()> + Send + 'static {
        let tx = Arc::clone(&self.tx);
        async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                println!();
                debug!("Ctrl-C received");
                tx.send_modify(|count| *count += 1);
            }
        }
    }

    #[cfg(test)]
    fn raise(&self) {
        self.tx.send_modify(|count| *count += 1);
    }

    /// True once per batch of presses not yet consumed.
    pub fn take(&self) -> bool {
        let current = *self.tx.borrow();
        if current == self.seen.get() {
            return false;
        }
        self.seen.set(current);
        true
    }

    /// Resolves on the next unconsumed press, consuming it.
    pub async fn recv(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            if self.take() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn each_press_is_taken_once() {
        let interrupts = Interrupts::new();
        assert!(!interrupts.take());

        interrupts.raise();
        interrupts.raise();
        assert!(interrupts.take());
        assert!(!interrupts.take());
    }

    #[tokio::test]
    async fn pending_press_resolves_immediately() {
        let interrupts = Interrupts::new();
        interrupts.raise();

        tokio::time::timeout(Duration::from_secs(1), interrupts.recv())
            .await
            .unwrap();
        assert!(!interrupts.take());
    }

    #[tokio::test]
    async fn recv_wakes_on_a_later_press() {
        let interrupts = Interrupts::new();

        let waiter = tokio::time::timeout(Duration::from_secs(1), interrupts.recv());
        let presser = async {
            tokio::task::yield_now().await;
            interrupts.raise();
        };
        let (woken, ()) = tokio::join!(waiter, presser);

        assert!(woken.is_ok());
        assert!(!interrupts.take());
    }

    #[tokio::test]
    async fn racing_work_against_an_interrupt() {
        let interrupts = Interrupts::new();
        interrupts.raise();

        let finished = tokio::select! {
            () = tokio::time::sleep(Duration::from_secs(5)) => true,
            () = interrupts.recv() => false,
        };
        assert!(!finished);
    }
}
