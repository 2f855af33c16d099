use crate::config;
use crate::engine::entry::{EngineEvent, Order, OrderSide};
use crate::engine::matchengine::MatchEngine;
use crate::metrics;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response};
use once_cell::sync::OnceCell;
use prometheus::{Encoder, TextEncoder};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;

static INSTANCE: OnceCell<Mutex<Server>> = OnceCell::new();
pub fn instance() -> &'static Mutex<Server> {
    INSTANCE.get_or_init(|| Mutex::new(Server::builder()))
}

pub struct Server {
    engine: Arc<MatchEngine>,
    consumer: Option<std::thread::JoinHandle<()>>,
}

impl Server {
    fn builder() -> Self {
        let engine = Arc::new(MatchEngine::new());
        let consumer = Self::start_event_consumer(engine.clone());
        Server {
            engine,
            consumer: Some(consumer),
        }
    }

    pub fn engine(&self) -> Arc<MatchEngine> {
        self.engine.clone()
    }

    pub async fn start(&mut self) {
        self.start_metrics_server().await;
        self.seed_orders();
    }

    pub fn stop(&mut self) {
        self.engine.shutdown();
        if let Some(handle) = self.consumer.take() {
            let _ = handle.join();
        }
        let mut dump = Vec::new();
        if self.engine.print_book(&mut dump).is_ok() {
            log::info!("final book:\n{}", String::from_utf8_lossy(&dump));
        }
        log::info!("server stop");
    }

    /// Drains the engine's event stream until shutdown closes it.
    fn start_event_consumer(engine: Arc<MatchEngine>) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            while let Some(event) = engine.wait_event() {
                match event {
                    EngineEvent::TradeBatch { trades } => {
                        for trade in trades {
                            log::info!(
                                "TRADE maker={} taker={} px={} qty={}",
                                trade.maker_order_id,
                                trade.taker_order_id,
                                trade.price,
                                trade.quantity
                            );
                        }
                    }
                }
            }
            log::debug!("event consumer exiting");
        })
    }

    async fn start_metrics_server(&mut self) {
        let addr = config::instance()
            .lock()
            .unwrap()
            .metrics_addr
            .as_str()
            .parse()
            .unwrap();
        let make_svc = make_service_fn(move |_| {
            let registry = metrics::REGISTRY_INSTANCE.clone();
            async move {
                Ok::<_, hyper::Error>(service_fn(move |_: Request<Body>| {
                    let registry = registry.clone();
                    async move {
                        let encoder = TextEncoder::new();
                        let metric_families = registry.gather();
                        let mut buffer = Vec::new();
                        encoder.encode(&metric_families, &mut buffer).unwrap();
                        Ok::<_, hyper::Error>(Response::new(Body::from(buffer)))
                    }
                }))
            }
        });
        metrics::init_registry();
        let server = hyper::Server::bind(&addr).serve(make_svc);
        tokio::spawn(async move {
            tokio::pin!(server);
            server.await.unwrap()
        });
        log::info!("metrics server started on {}", addr);
    }

    /// Feeds the engine a random order stream when configured to do so.
    fn seed_orders(&self) {
        let cfg = config::instance().lock().unwrap().clone();
        if !cfg.seed_orders {
            return;
        }

        let engine = self.engine.clone();
        tokio::spawn(async move {
            let mut next_id: u64 = 1;
            loop {
                let (side, price, qty) = {
                    let mut rng = rand::thread_rng();
                    let side = if rng.gen_bool(0.5) {
                        OrderSide::Buy
                    } else {
                        OrderSide::Sell
                    };
                    let price = rng.gen_range(cfg.seed_price_min..=cfg.seed_price_max);
                    let qty = rng.gen_range(1..=cfg.seed_max_qty);
                    (side, price, qty)
                };
                let order = Order::new(next_id, side, price, qty);
                log::info!("seeding order {} {:?} {} x {}", next_id, side, price, qty);
                next_id += 1;
                if let Err(e) = engine.submit(order) {
                    log::warn!("seeded order rejected: {}", e);
                }
                tokio::time::sleep(tokio::time::Duration::from_millis(cfg.seed_interval_ms))
                    .await;
            }
        });
        log::info!("order seeder started");
    }
}
