//! Match Engine Module
//!
//! Asynchronous single-writer wrapper around the matching core. Producers
//! enqueue orders on an inbound queue; one worker thread drains it, applies
//! each order to the book in arrival order, and publishes one trade batch
//! per order that traded onto an outbound queue for consumers.

use crate::engine::entry::{EngineEvent, Order, Price};
use crate::engine::matchlogic::{EngineError, Matcher};
use crate::metrics;
use crate::queue::ConcurrentQueue;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// The book is mutated only by the worker; the mutex serializes the
/// best-price reads with it.
pub struct MatchEngine {
    matcher: Arc<Mutex<Matcher>>,
    inbound: Arc<ConcurrentQueue<Order>>,
    outbound: Arc<ConcurrentQueue<EngineEvent>>,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MatchEngine {
    pub fn new() -> Self {
        let matcher = Arc::new(Mutex::new(Matcher::new()));
        let inbound: Arc<ConcurrentQueue<Order>> = Arc::new(ConcurrentQueue::new());
        let outbound: Arc<ConcurrentQueue<EngineEvent>> = Arc::new(ConcurrentQueue::new());
        let running = Arc::new(AtomicBool::new(true));

        let worker = {
            let matcher = matcher.clone();
            let inbound = inbound.clone();
            let outbound = outbound.clone();
            std::thread::Builder::new()
                .name("match-worker".to_string())
                .spawn(move || Self::run(&matcher, &inbound, &outbound))
                .expect("failed to spawn match worker")
        };

        Self {
            matcher,
            inbound,
            outbound,
            running,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Worker loop: exits once the inbound queue is closed and drained, so
    /// every accepted submission is processed before shutdown completes.
    fn run(
        matcher: &Mutex<Matcher>,
        inbound: &ConcurrentQueue<Order>,
        outbound: &ConcurrentQueue<EngineEvent>,
    ) {
        while let Some(order) = inbound.pop() {
            let result = metrics::record("place_order", || {
                matcher.lock().unwrap().place_order(order)
            });
            match result {
                Ok(trades) => {
                    if !trades.is_empty() {
                        metrics::TRADE_COUNTER.inc_by(trades.len() as f64);
                        outbound.push(EngineEvent::TradeBatch { trades });
                    }
                }
                Err(e) => log::warn!("order rejected by matcher: {}", e),
            }
        }
        log::debug!("match worker drained and exiting");
    }

    /// Enqueue an order for the worker. Submissions racing shutdown are
    /// dropped by the closed inbound queue.
    pub fn submit(&self, order: Order) -> Result<(), EngineError> {
        Matcher::validate(&order)?;
        self.inbound.push(order);
        Ok(())
    }

    /// Non-blocking drain of the outbound event queue.
    pub fn poll_event(&self) -> Option<EngineEvent> {
        self.outbound.try_pop()
    }

    /// Blocking drain; returns `None` once the outbound queue is closed and
    /// fully delivered.
    pub fn wait_event(&self) -> Option<EngineEvent> {
        self.outbound.pop()
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.matcher.lock().unwrap().best_bid()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.matcher.lock().unwrap().best_ask()
    }

    pub fn print_book<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        self.matcher.lock().unwrap().print_book(out)
    }

    /// Stop accepting orders, process everything already accepted, then
    /// close the event stream. Exactly one caller performs the transition.
    pub fn shutdown(&self) {
        if self
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.inbound.close();
            if let Some(handle) = self.worker.lock().unwrap().take() {
                if handle.join().is_err() {
                    log::error!("match worker panicked");
                }
            }
            self.outbound.close();
        }
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MatchEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
