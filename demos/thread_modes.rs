//! # Thread Modes Example
//!
//! One subscriber with a receiver per thread mode. Prints which thread ran
//! each delivery.
//!
//! ```text
//! send(on_post)        ─► inline on the caller
//! send(on_main)        ─► built-in UI thread
//! send_delayed(on_bg)  ─► background worker, after the delay
//! send(on_async)       ─► async pool
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example thread_modes
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use signalbus::{
    Address, Args, Config, HandlerError, ReceiverDescriptor, SignalBus, Subscriber, ThreadMode, args,
};

#[derive(Default)]
struct Scoreboard {
    delivered: AtomicU32,
}

impl Subscriber for Scoreboard {
    fn receivers(&self) -> Option<Vec<ReceiverDescriptor>> {
        Some(vec![
            ReceiverDescriptor::new("on_post", ThreadMode::Posting).param::<u32>(),
            ReceiverDescriptor::new("on_main", ThreadMode::Main).param::<u32>(),
            ReceiverDescriptor::new("on_bg", ThreadMode::Background).param::<u32>(),
            ReceiverDescriptor::new("on_async", ThreadMode::Async).param::<u32>(),
        ])
    }

    fn on_signal(&self, method: &str, args: &Args) -> Result<(), HandlerError> {
        let points = *args.get::<u32>(0)?;
        let current = thread::current();
        println!(
            " ├─► {method:<9} +{points:<3} on {}",
            current.name().unwrap_or("<unnamed>")
        );
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let bus = SignalBus::new(Config::default())?;
    let board = Arc::new(Scoreboard::default());
    bus.subscribe(board.clone())?;

    println!("Deliveries:");
    bus.send(&Address::of::<Scoreboard>("on_post"), args![1u32])?;
    bus.send(&Address::of::<Scoreboard>("on_main"), args![2u32])?;
    bus.send_delayed(&Address::of::<Scoreboard>("on_bg"), Duration::from_millis(200), args![3u32])?;
    bus.send(&Address::of::<Scoreboard>("on_async"), args![4u32])?;

    let deadline = Instant::now() + Duration::from_secs(2);
    while board.delivered.load(Ordering::SeqCst) < 4 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    println!(" └─► delivered {}/4", board.delivered.load(Ordering::SeqCst));

    bus.unsubscribe(board.as_ref())?;
    Ok(())
}
