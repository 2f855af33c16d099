use clap::Parser;
use hdrhistogram::Histogram;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;
use xmatch::{EngineEvent, MatchEngine, Matcher, Order, OrderSide, Qty};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Orders for the synchronous matcher phase
    #[arg(short = 'n', long, default_value = "1000000")]
    orders: u64,

    /// Number of producer threads for the async phase
    #[arg(short = 'p', long, default_value = "4")]
    producers: u64,

    /// Orders per producer in the async phase
    #[arg(short = 'o', long, default_value = "250000")]
    per_producer: u64,

    /// Lowest order price in ticks
    #[arg(long, default_value = "90")]
    price_min: i64,

    /// Highest order price in ticks
    #[arg(long, default_value = "110")]
    price_max: i64,

    /// Largest order quantity
    #[arg(long, default_value = "20")]
    max_qty: i64,

    /// Workload seed
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn random_order(rng: &mut StdRng, id: u64, args: &Args) -> Order {
    let side = if rng.gen_bool(0.5) {
        OrderSide::Buy
    } else {
        OrderSide::Sell
    };
    let price = rng.gen_range(args.price_min..=args.price_max);
    let qty = rng.gen_range(1..=args.max_qty);
    Order::new(id, side, price, qty)
}

fn bench_sync(args: &Args) {
    let mut matcher = Matcher::new();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut hist = Histogram::<u64>::new(3).unwrap();
    let mut total_trades = 0u64;

    let started = Instant::now();
    for id in 1..=args.orders {
        let order = random_order(&mut rng, id, args);
        let start = Instant::now();
        let trades = matcher.place_order(order).unwrap();
        hist.record(start.elapsed().as_nanos() as u64).unwrap();
        total_trades += trades.len() as u64;
    }
    let elapsed = started.elapsed();

    println!("\nSynchronous Matcher Results:");
    println!("Total Orders: {}", args.orders);
    println!("Total Trades: {}", total_trades);
    println!(
        "Average TPS: {:.2}",
        args.orders as f64 / elapsed.as_secs_f64()
    );
    println!("\nLatency Distribution (nanoseconds):");
    println!("p50: {}", hist.value_at_percentile(50.0));
    println!("p90: {}", hist.value_at_percentile(90.0));
    println!("p95: {}", hist.value_at_percentile(95.0));
    println!("p99: {}", hist.value_at_percentile(99.0));
    println!("p99.9: {}", hist.value_at_percentile(99.9));
}

fn bench_async(args: &Args) {
    let engine = Arc::new(MatchEngine::new());

    let consumer = {
        let engine = engine.clone();
        std::thread::spawn(move || {
            let mut traded: Qty = 0;
            let mut batches = 0u64;
            while let Some(event) = engine.wait_event() {
                match event {
                    EngineEvent::TradeBatch { trades } => {
                        batches += 1;
                        traded += trades.iter().map(|t| t.quantity).sum::<Qty>();
                    }
                    _ => {}
                }
            }
            (batches, traded)
        })
    };

    let started = Instant::now();
    let producers: Vec<_> = (0..args.producers)
        .map(|p| {
            let engine = engine.clone();
            let args = args.clone();
            std::thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(args.seed + p + 1);
                for i in 0..args.per_producer {
                    let id = p * args.per_producer + i + 1;
                    let order = random_order(&mut rng, id, &args);
                    engine.submit(order).unwrap();
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    engine.shutdown();
    let elapsed = started.elapsed();
    let (batches, traded) = consumer.join().unwrap();

    let total_orders = args.producers * args.per_producer;
    println!("\nAsync Engine Results:");
    println!("Producers: {}", args.producers);
    println!("Total Orders: {}", total_orders);
    println!("Trade Batches: {}", batches);
    println!("Traded Quantity: {}", traded);
    println!(
        "Average TPS: {:.2}",
        total_orders as f64 / elapsed.as_secs_f64()
    );
}

fn main() {
    let args = Args::parse();

    println!(
        "Starting benchmark: {} sync orders, {} producers x {} async orders",
        args.orders, args.producers, args.per_producer
    );

    bench_sync(&args);
    bench_async(&args);
}
