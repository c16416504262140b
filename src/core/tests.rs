use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crate::error::{HandlerError, SignalError};
use crate::events::{Address, Args};
use crate::subscribers::{DescriptorProvider, ReceiverDescriptor, StaticIndex, Subscriber, ThreadMode};
use crate::ui::{ThreadDispatcher, UiDispatcher};
use crate::args;

use super::{Config, SignalBus};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn bus() -> Arc<SignalBus> {
    init_tracing();
    Arc::new(SignalBus::new(Config::default()).expect("bus starts"))
}

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// Records every delivery as (receiver, value, thread).
#[derive(Default)]
struct Recorder {
    log: Mutex<Vec<(String, u32, ThreadId)>>,
}

impl Recorder {
    fn record(&self, method: &str, value: u32) {
        self.log
            .lock()
            .expect("log")
            .push((method.to_string(), value, thread::current().id()));
    }

    fn entries(&self) -> Vec<(String, u32, ThreadId)> {
        self.log.lock().expect("log").clone()
    }

    fn values(&self, method: &str) -> Vec<u32> {
        self.entries()
            .into_iter()
            .filter(|(m, _, _)| m == method)
            .map(|(_, v, _)| v)
            .collect()
    }

    fn len(&self) -> usize {
        self.log.lock().expect("log").len()
    }
}

impl Subscriber for Recorder {
    fn receivers(&self) -> Option<Vec<ReceiverDescriptor>> {
        Some(vec![
            ReceiverDescriptor::new("posting", ThreadMode::Posting).param::<u32>(),
            ReceiverDescriptor::new("main", ThreadMode::Main).param::<u32>(),
            ReceiverDescriptor::new("background", ThreadMode::Background).param::<u32>(),
            ReceiverDescriptor::new("async", ThreadMode::Async).param::<u32>(),
            ReceiverDescriptor::new("fail", ThreadMode::Posting),
            ReceiverDescriptor::new("explode", ThreadMode::Posting),
            ReceiverDescriptor::new("async_explode", ThreadMode::Async).param::<u32>(),
            ReceiverDescriptor::new("ghost", ThreadMode::Posting),
        ])
    }

    fn on_signal(&self, method: &str, args: &Args) -> Result<(), HandlerError> {
        match method {
            "posting" | "main" | "background" | "async" => {
                self.record(method, *args.get::<u32>(0)?);
                Ok(())
            }
            "fail" => Err(HandlerError::fail("refused")),
            "explode" => panic!("exploded"),
            "async_explode" => {
                self.record(method, *args.get::<u32>(0)?);
                panic!("exploded off-thread");
            }
            other => Err(HandlerError::unknown(other)),
        }
    }
}

fn to(method: &'static str) -> Address {
    Address::of::<Recorder>(method)
}

/// Sends follow-up signals from inside its own receivers.
struct Relay {
    bus: Weak<SignalBus>,
    log: Mutex<Vec<&'static str>>,
}

impl Relay {
    fn forward(&self, method: &'static str) -> Result<(), HandlerError> {
        let bus = self.bus.upgrade().ok_or_else(|| HandlerError::fail("bus dropped"))?;
        bus.send(&Address::of::<Relay>(method), Args::new())
            .map_err(HandlerError::fail)
    }
}

impl Subscriber for Relay {
    fn receivers(&self) -> Option<Vec<ReceiverDescriptor>> {
        Some(
            ["first", "second", "third", "nested"]
                .into_iter()
                .map(|m| ReceiverDescriptor::new(m, ThreadMode::Posting))
                .collect(),
        )
    }

    fn on_signal(&self, method: &str, _args: &Args) -> Result<(), HandlerError> {
        let name = match method {
            "first" => "first",
            "second" => "second",
            "third" => "third",
            "nested" => "nested",
            other => return Err(HandlerError::unknown(other)),
        };
        self.log.lock().expect("log").push(name);

        match name {
            "first" => {
                self.forward("second")?;
                self.forward("third")
            }
            "second" => self.forward("nested"),
            _ => Ok(()),
        }
    }
}

/// Subscriber nobody can describe.
struct Opaque;

impl Subscriber for Opaque {
    fn on_signal(&self, method: &str, _args: &Args) -> Result<(), HandlerError> {
        Err(HandlerError::unknown(method))
    }
}

/// Signals the recorder from its own `Drop`.
struct Farewell {
    bus: Weak<SignalBus>,
}

impl Subscriber for Farewell {
    fn receivers(&self) -> Option<Vec<ReceiverDescriptor>> {
        Some(vec![ReceiverDescriptor::new("linger", ThreadMode::Async)])
    }

    fn on_signal(&self, method: &str, _args: &Args) -> Result<(), HandlerError> {
        match method {
            "linger" => Ok(()),
            other => Err(HandlerError::unknown(other)),
        }
    }
}

impl Drop for Farewell {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            let _ = bus.send(&to("async"), args![99u32]);
        }
    }
}

/// Extra provider that knows `Recorder` and `Relay`.
struct Catalog;

impl DescriptorProvider for Catalog {
    fn describe(&self, target: &dyn Subscriber) -> Option<Vec<ReceiverDescriptor>> {
        let type_name = target.type_name();
        if type_name == std::any::type_name::<Recorder>() {
            Some(vec![
                ReceiverDescriptor::new("posting", ThreadMode::Posting).param::<u32>(),
                ReceiverDescriptor::new("background", ThreadMode::Background).param::<u32>(),
            ])
        } else if type_name == std::any::type_name::<Relay>() {
            Some(vec![ReceiverDescriptor::new("first", ThreadMode::Posting)])
        } else {
            None
        }
    }
}

#[test]
fn test_subscribe_then_unsubscribe_restores_registry() {
    let bus = bus();
    let before = bus.registered_keys();
    let rec = Arc::new(Recorder::default());

    bus.subscribe(rec.clone()).expect("subscribe");
    assert_eq!(bus.registered_len(), 8);
    assert!(bus.is_registered(&to("background")));

    bus.unsubscribe(rec.as_ref()).expect("unsubscribe");
    assert_eq!(bus.registered_keys(), before);
    assert!(!bus.is_registered(&to("background")));
}

#[test]
fn test_duplicate_subscribe_keeps_first_registration() {
    let bus = bus();
    let first = Arc::new(Recorder::default());
    let second = Arc::new(Recorder::default());

    bus.subscribe(first.clone()).expect("first subscribe");
    let keys = bus.registered_keys();

    let err = bus.subscribe(second.clone()).expect_err("duplicate");
    assert!(matches!(err, SignalError::DuplicateSubscription { .. }));
    assert!(err.is_registration_error());
    assert_eq!(bus.registered_keys(), keys);

    bus.send(&to("posting"), args![1u32]).expect("send");
    assert_eq!(first.values("posting"), vec![1]);
    assert!(second.entries().is_empty());
}

#[test]
fn test_unsubscribe_unknown_subscriber_reports_not_registered() {
    let bus = bus();
    let rec = Recorder::default();
    let err = bus.unsubscribe(&rec).expect_err("not registered");
    assert!(matches!(err, SignalError::NotRegistered { ref method, .. } if method == "posting"));
}

#[test]
fn test_subscriber_without_receivers_is_rejected() {
    let bus = bus();
    let err = bus.subscribe(Arc::new(Opaque)).expect_err("no receivers");
    assert_eq!(err.as_label(), "signal_no_receivers");
    assert_eq!(bus.registered_len(), 0);
}

#[test]
fn test_send_to_unregistered_receiver_is_a_noop() {
    let bus = bus();
    let rec = Arc::new(Recorder::default());

    bus.send(&to("posting"), args![1u32]).expect("no subscriber is not an error");
    bus.subscribe(rec.clone()).expect("subscribe");
    bus.send(&Address::of::<Opaque>("posting"), args![2u32]).expect("other type");

    assert!(rec.entries().is_empty());
}

#[test]
fn test_posting_runs_inline_on_sender_thread() {
    let bus = bus();
    let rec = Arc::new(Recorder::default());
    bus.subscribe(rec.clone()).expect("subscribe");

    bus.send(&to("posting"), args![7u32]).expect("send");

    let entries = rec.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1, 7);
    assert_eq!(entries[0].2, thread::current().id());
}

#[test]
fn test_posting_rejects_delayed_send() {
    let bus = bus();
    let rec = Arc::new(Recorder::default());
    bus.subscribe(rec.clone()).expect("subscribe");

    let err = bus
        .send_delayed(&to("posting"), Duration::from_millis(10), args![1u32])
        .expect_err("delay unsupported");
    assert!(matches!(err, SignalError::DelayUnsupported { .. }));
    assert!(rec.entries().is_empty());

    bus.send(&to("posting"), args![2u32]).expect("bus still usable");
    assert_eq!(rec.values("posting"), vec![2]);
}

#[test]
fn test_argument_count_mismatch_fails_send() {
    let bus = bus();
    let rec = Arc::new(Recorder::default());
    bus.subscribe(rec.clone()).expect("subscribe");

    let err = bus
        .send(&to("posting"), args![1u32, 2u32])
        .expect_err("mismatch");
    assert!(matches!(
        err,
        SignalError::ParamMismatch { expected: 1, found: 2, .. }
    ));
    assert!(rec.entries().is_empty());

    bus.send(&to("posting"), args![3u32]).expect("next send drains normally");
    assert_eq!(rec.values("posting"), vec![3]);
}

#[test]
fn test_handler_failures_are_contained() {
    let bus = bus();
    let rec = Arc::new(Recorder::default());
    bus.subscribe(rec.clone()).expect("subscribe");

    bus.send(&to("fail"), Args::new()).expect("handler error is logged");
    bus.send(&to("explode"), Args::new()).expect("handler panic is logged");
    bus.send(&to("posting"), args![9u32]).expect("still delivering");

    assert_eq!(rec.values("posting"), vec![9]);
}

#[test]
fn test_uninvocable_receiver_is_an_internal_fault() {
    let bus = bus();
    let rec = Arc::new(Recorder::default());
    bus.subscribe(rec.clone()).expect("subscribe");

    let err = bus.send(&to("ghost"), Args::new()).expect_err("unreachable");
    assert!(matches!(err, SignalError::Unreachable { .. }));

    let err = bus.send(&to("posting"), args!["not a number"]).expect_err("wrong type");
    assert!(matches!(
        err,
        SignalError::Unreachable {
            source: HandlerError::ArgumentType { index: 0, .. },
            ..
        }
    ));
}

#[test]
fn test_reentrant_sends_are_flattened_in_fifo_order() {
    let bus = bus();
    let relay = Arc::new(Relay {
        bus: Arc::downgrade(&bus),
        log: Mutex::new(Vec::new()),
    });
    bus.subscribe(relay.clone()).expect("subscribe");

    bus.send(&Address::of::<Relay>("first"), Args::new()).expect("send");

    assert_eq!(
        *relay.log.lock().expect("log"),
        vec!["first", "second", "third", "nested"]
    );
}

#[test]
fn test_background_delivers_in_acceptance_order_across_threads() {
    let bus = bus();
    let rec = Arc::new(Recorder::default());
    bus.subscribe(rec.clone()).expect("subscribe");
    let (accepted_tx, accepted_rx) = mpsc::channel();

    let first = {
        let bus = Arc::clone(&bus);
        thread::spawn(move || {
            bus.send_delayed(&to("background"), Duration::from_millis(50), args![1u32])
                .expect("send e1");
            accepted_tx.send(()).expect("signal");
        })
    };
    let second = {
        let bus = Arc::clone(&bus);
        thread::spawn(move || {
            accepted_rx.recv().expect("e1 accepted");
            bus.send(&to("background"), args![2u32]).expect("send e2");
        })
    };
    first.join().expect("first sender");
    second.join().expect("second sender");

    assert!(wait_until(Duration::from_secs(5), || rec.len() == 2));
    assert_eq!(rec.values("background"), vec![1, 2]);

    let workers: Vec<ThreadId> = rec.entries().into_iter().map(|(_, _, t)| t).collect();
    assert_eq!(workers[0], workers[1]);
    assert_ne!(workers[0], thread::current().id());
}

#[test]
fn test_async_delivers_every_event_exactly_once() {
    let bus = bus();
    let rec = Arc::new(Recorder::default());
    bus.subscribe(rec.clone()).expect("subscribe");

    for i in 0..40u32 {
        bus.send_delayed(&to("async"), Duration::from_millis(u64::from(i % 3)), args![i])
            .expect("send");
    }

    assert!(wait_until(Duration::from_secs(10), || rec.len() >= 40));
    thread::sleep(Duration::from_millis(50));

    let mut seen = rec.values("async");
    seen.sort_unstable();
    assert_eq!(seen, (0..40).collect::<Vec<u32>>());
    assert!(wait_until(Duration::from_secs(5), || bus.pool().available() == bus.pool().capacity()));
}

#[test]
fn test_deferred_panic_still_releases_envelope() {
    let bus = bus();
    let rec = Arc::new(Recorder::default());
    bus.subscribe(rec.clone()).expect("subscribe");

    bus.send(&to("async_explode"), args![1u32]).expect("send");

    assert!(wait_until(Duration::from_secs(5), || rec.len() == 1));
    assert!(wait_until(Duration::from_secs(5), || bus.pool().available() == bus.pool().capacity()));

    bus.send(&to("async"), args![2u32]).expect("pool still serves");
    assert!(wait_until(Duration::from_secs(5), || rec.values("async") == vec![2]));
}

#[test]
fn test_main_mode_hands_off_or_runs_inline_on_ui_thread() {
    init_tracing();
    let ui = Arc::new(ThreadDispatcher::spawn("test-signal-ui").expect("ui thread"));
    let bus = Arc::new(
        SignalBus::builder(Config::default())
            .with_ui_dispatcher(ui.clone())
            .build()
            .expect("bus starts"),
    );
    let rec = Arc::new(Recorder::default());
    bus.subscribe(rec.clone()).expect("subscribe");

    // From a worker thread: queued for the UI thread.
    bus.send(&to("main"), args![1u32]).expect("send");
    assert!(wait_until(Duration::from_secs(5), || rec.len() == 1));
    assert_eq!(rec.entries()[0].2, ui.thread_id());

    // From the UI thread itself: delivered before send returns.
    let (tx, rx) = mpsc::channel();
    {
        let bus = Arc::clone(&bus);
        let rec = Arc::clone(&rec);
        ui.schedule(Box::new(move || {
            let sent = bus.send(&to("main"), args![2u32]).is_ok();
            let _ = tx.send((sent, rec.values("main")));
        }));
    }
    let (sent, seen) = rx.recv_timeout(Duration::from_secs(5)).expect("ui task ran");
    assert!(sent);
    assert_eq!(seen, vec![1, 2]);
}

#[test]
fn test_main_mode_ignores_delay() {
    let bus = bus();
    let rec = Arc::new(Recorder::default());
    bus.subscribe(rec.clone()).expect("subscribe");

    let started = Instant::now();
    bus.send_delayed(&to("main"), Duration::from_secs(30), args![5u32])
        .expect("main accepts delayed sends");

    assert!(wait_until(Duration::from_secs(5), || rec.len() == 1));
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[test]
fn test_static_index_takes_precedence() {
    init_tracing();
    let index = StaticIndex::new().with::<Recorder>(vec![
        ReceiverDescriptor::new("posting", ThreadMode::Posting).param::<u32>(),
    ]);
    let bus = SignalBus::builder(Config::default())
        .with_index(index)
        .build()
        .expect("bus starts");
    let rec = Arc::new(Recorder::default());

    bus.subscribe(rec.clone()).expect("subscribe");

    assert_eq!(bus.registered_len(), 1);
    assert_eq!(bus.receivers_of(rec.as_ref()).map(|d| d.len()), Some(1));
}

#[test]
fn test_isolated_buses_do_not_share_registrations() {
    let a = bus();
    let b = bus();
    let rec = Arc::new(Recorder::default());

    a.subscribe(rec.clone()).expect("subscribe on a");
    b.send(&to("posting"), args![1u32]).expect("send on b");
    assert!(rec.entries().is_empty());
    assert_eq!(b.registered_len(), 0);
}

#[test]
fn test_global_bus_is_created_once() {
    let first = SignalBus::global().expect("global bus");
    let second = SignalBus::global().expect("global bus");
    assert!(std::ptr::eq(first, second));
}

#[test]
fn test_provider_chain_order() {
    init_tracing();
    let index = StaticIndex::new().with::<Recorder>(vec![
        ReceiverDescriptor::new("posting", ThreadMode::Posting).param::<u32>(),
    ]);
    let bus = SignalBus::builder(Config::default())
        .with_index(index)
        .with_provider(Arc::new(Catalog))
        .build()
        .expect("bus starts");

    let indexed = bus.receivers_of(&Recorder::default()).expect("indexed");
    assert_eq!(indexed.len(), 1);

    let relay = Relay {
        bus: Weak::new(),
        log: Mutex::new(Vec::new()),
    };
    let cataloged = bus.receivers_of(&relay).expect("cataloged");
    assert_eq!(cataloged.len(), 1);
    assert_eq!(cataloged[0].method(), "first");

    let described = bus
        .receivers_of(&Farewell { bus: Weak::new() })
        .expect("self-described");
    assert_eq!(described[0].method(), "linger");

    assert!(bus.receivers_of(&Opaque).is_none());
}

#[test]
fn test_dropping_last_subscriber_reference_may_send_again() {
    let bus = bus();
    let rec = Arc::new(Recorder::default());
    bus.subscribe(rec.clone()).expect("subscribe recorder");

    let farewell = Arc::new(Farewell {
        bus: Arc::downgrade(&bus),
    });
    bus.subscribe(farewell.clone()).expect("subscribe farewell");
    bus.send_delayed(&Address::of::<Farewell>("linger"), Duration::from_millis(100), Args::new())
        .expect("send");
    bus.unsubscribe(farewell.as_ref()).expect("unsubscribe");
    // The in-flight envelope now holds the only reference.
    drop(farewell);

    assert!(wait_until(Duration::from_secs(5), || rec.values("async") == vec![99]));

    let (tx, rx) = mpsc::channel();
    let sender = {
        let bus = Arc::clone(&bus);
        thread::spawn(move || {
            let _ = tx.send(bus.send(&to("background"), args![1u32]).is_ok());
        })
    };
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(true));
    sender.join().expect("sender");
    assert!(wait_until(Duration::from_secs(5), || rec.values("background") == vec![1]));
}

#[test]
fn test_lookups_stay_consistent_while_subscriptions_churn() {
    const SENDERS: u32 = 4;
    const PER_SENDER: u32 = 200;

    let bus = bus();
    let rec = Arc::new(Recorder::default());
    let stop = Arc::new(AtomicBool::new(false));

    let churn = {
        let bus = Arc::clone(&bus);
        let rec = Arc::clone(&rec);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut rounds = 0u32;
            while rounds == 0 || !stop.load(Ordering::SeqCst) {
                bus.subscribe(rec.clone()).expect("subscribe");
                bus.unsubscribe(rec.as_ref()).expect("unsubscribe");
                rounds += 1;
            }
            rounds
        })
    };

    let senders: Vec<_> = (0..SENDERS)
        .map(|t| {
            let bus = Arc::clone(&bus);
            thread::spawn(move || {
                (0..PER_SENDER)
                    .map(|i| {
                        let method = if i % 2 == 0 { "posting" } else { "background" };
                        bus.send(&to(method), args![t * 1000 + i])
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for sender in senders {
        for outcome in sender.join().expect("sender") {
            assert!(outcome.is_ok(), "send failed: {outcome:?}");
        }
    }
    stop.store(true, Ordering::SeqCst);
    assert!(churn.join().expect("churn") > 0);

    assert_eq!(bus.registered_len(), 0);
    assert!(wait_until(Duration::from_secs(5), || bus.pool().available() == bus.pool().capacity()));

    let entries = rec.entries();
    let distinct: HashSet<u32> = entries.iter().map(|(_, v, _)| *v).collect();
    assert_eq!(distinct.len(), entries.len());
    for (method, value, _) in &entries {
        assert!(value / 1000 < SENDERS && value % 1000 < PER_SENDER, "unknown value {value}");
        let expected = if value % 2 == 0 { "posting" } else { "background" };
        assert_eq!(method, expected);
    }
}
