//! # Example: isolation
//!
//! Demonstrates taking custody of one event's listeners.
//!
//! Shows how to:
//! - Activate a [`Custodian`] over listeners that were registered earlier.
//! - Keep emitting while one listener fails and another panics.
//! - Receive failures on the `"error"` signal, the broadcast stream and a [`LogWriter`].
//! - Rely on the fallback reporter for a process-wide `unhandledRejection` event.
//! - Hand listeners back with [`Custodian::deactivate`].
//!
//! ## Flow
//! ```text
//! emitter.emit("order")
//!     └─► dispatch handler
//!           ├─► audit       ok
//!           ├─► inventory   Err  ──► report ──► "error" / FailureBus / LogWriter
//!           ├─► pricing     panic ─► report ──► "error" / FailureBus / LogWriter
//!           └─► email       ok
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example isolation --features logging
//! ```

use std::sync::Arc;

use listener_custodian::{
    Custodian, CustodianConfig, Emission, EventEmitter, FallbackPolicy, Listen, Listener, ListenerError,
    LogWriter, Subscribe, TracingSink,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listener_custodian=debug".into()),
        )
        .init();

    // === Listeners registered before custody ===
    let orders = Arc::new(EventEmitter::<String>::new());
    orders
        .add_listener("order", Listener::infallible(|e| println!("[audit] {}", e.args())))
        .add_listener(
            "order",
            Listener::new(|e| Err(ListenerError::fail(format!("inventory offline for {}", e.args())))),
        )
        .add_listener(
            "order",
            Listener::infallible(|e: &Emission<'_, String>| {
                if e.args().ends_with('7') {
                    panic!("no price for {}", e.args());
                }
                println!("[pricing] {}", e.args());
            }),
        )
        .add_listener("order", Listener::infallible(|e| println!("[email] {}", e.args())));

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let custodian = Custodian::builder(Arc::clone(&orders), "order")
        .with_subscribers(subs)
        .build();
    custodian
        .activate()
        .on("error", Listener::infallible(|e| eprintln!("[error] {}", e.args())));

    let mut failures = custodian.subscribe_failures();

    // === Emit: every listener runs, emit() never fails ===
    for id in ["#41", "#47"] {
        orders.emit("order", &id.to_string())?;
    }
    while let Ok(failure) = failures.try_recv() {
        println!("[stream] seq={} kind={}", failure.seq, failure.error.as_label());
    }

    // === Late registration goes through the custodian too ===
    orders.prepend_listener("order", Listener::infallible(|e| println!("[first] {}", e.args())));
    orders.emit("order", &"#50".to_string())?;

    custodian.shutdown_subscribers().await;
    custodian.deactivate();
    println!("native listeners after deactivate: {}", orders.listener_count("order"));

    // === Process-wide unhandledRejection: fallback reporter ===
    let process = Arc::new(EventEmitter::<String>::process_wide());
    let rejections = Custodian::builder(Arc::clone(&process), "unhandledRejection")
        .with_config(CustodianConfig {
            fallback: FallbackPolicy::UnhandledRejection,
            ..CustodianConfig::default()
        })
        .with_sink(Arc::new(TracingSink))
        .build();
    rejections.activate();
    process.add_listener(
        "unhandledRejection",
        Listener::new(|e| Err(ListenerError::fail(format!("rethrown: {}", e.args())))),
    );
    process.emit("unhandledRejection", &"socket closed".to_string())?;

    Ok(())
}
