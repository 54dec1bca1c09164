//! Background value producers and the conduits they publish into.
//!
//! Each producer is a long-lived task that generates one value at a time and
//! hands it over a capacity-1 channel. The send suspends until a consumer has
//! taken the previous value, so production is paced by consumption.
//!
//! A [`ValueConduit`] is the shared receiving end. Any number of assembler
//! tasks may draw from clones of the same conduit; each value is delivered to
//! exactly one of them.

use crate::error::GeneratorError;
use crate::generators::{AlphaString, FixedDecimal, ValueGenerator};
use bulk_core::ProducerConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Name of the string conduit, used in errors and logs.
pub const STRING_CONDUIT: &str = "string";

/// Name of the numeric conduit, used in errors and logs.
pub const NUMBER_CONDUIT: &str = "number";

/// Mixed into the numeric producer's seed so the two streams differ.
const NUMBER_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Shared receiving end of a producer.
#[derive(Clone, Debug)]
pub struct ValueConduit {
    name: &'static str,
    rx: Arc<Mutex<mpsc::Receiver<String>>>,
    drawn: Arc<AtomicU64>,
}

impl ValueConduit {
    /// Create a single-slot channel and the conduit reading from it.
    pub fn channel(name: &'static str) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(1);
        let conduit = Self {
            name,
            rx: Arc::new(Mutex::new(rx)),
            drawn: Arc::new(AtomicU64::new(0)),
        };
        (tx, conduit)
    }

    /// Take the next value.
    ///
    /// Fails with [`GeneratorError::ProducerExhausted`] once every sender is
    /// gone and the slot is empty.
    pub async fn recv(&self) -> Result<String, GeneratorError> {
        let value = self.rx.lock().await.recv().await;
        match value {
            Some(value) => {
                self.drawn.fetch_add(1, Ordering::Relaxed);
                Ok(value)
            }
            None => Err(GeneratorError::ProducerExhausted {
                conduit: self.name,
            }),
        }
    }

    /// Number of values taken from this conduit so far, across all clones.
    pub fn drawn(&self) -> u64 {
        self.drawn.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Publish values from `generator` into `tx` until cancelled or every
/// receiver is dropped.
pub async fn produce<G: ValueGenerator>(
    name: &'static str,
    generator: G,
    mut rng: StdRng,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
) {
    let mut published = 0u64;
    loop {
        let value = generator.generate(&mut rng);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = tx.send(value) => {
                if sent.is_err() {
                    break;
                }
                published += 1;
            }
        }
    }
    debug!("{} producer stopped after {} values", name, published);
}

/// Publish random alphabetic strings of `length` characters.
pub async fn produce_strings(
    tx: mpsc::Sender<String>,
    length: usize,
    rng: StdRng,
    cancel: CancellationToken,
) {
    produce(STRING_CONDUIT, AlphaString::new(length), rng, tx, cancel).await
}

/// Publish random decimals in `[0, max)` formatted with two fractional digits.
pub async fn produce_floats(
    tx: mpsc::Sender<String>,
    max: f64,
    rng: StdRng,
    cancel: CancellationToken,
) {
    produce(NUMBER_CONDUIT, FixedDecimal::new(max), rng, tx, cancel).await
}

/// The string and numeric producer pair of a run.
pub struct Producers {
    pub strings: ValueConduit,
    pub numbers: ValueConduit,
    handles: Vec<JoinHandle<()>>,
}

impl Producers {
    /// Spawn both producers on the current runtime.
    ///
    /// They run until `cancel` fires or every conduit clone is dropped.
    pub fn spawn(config: &ProducerConfig, cancel: CancellationToken) -> Self {
        let seed = config.seed.unwrap_or_else(clock_seed);
        debug!(
            "Spawning producers (string length {}, numeric max {}, seed {})",
            config.string_length, config.number_max, seed
        );

        let (string_tx, strings) = ValueConduit::channel(STRING_CONDUIT);
        let (number_tx, numbers) = ValueConduit::channel(NUMBER_CONDUIT);

        let handles = vec![
            tokio::spawn(produce_strings(
                string_tx,
                config.string_length,
                StdRng::seed_from_u64(seed),
                cancel.clone(),
            )),
            tokio::spawn(produce_floats(
                number_tx,
                config.number_max,
                StdRng::seed_from_u64(seed ^ NUMBER_SEED_SALT),
                cancel,
            )),
        ];

        Self {
            strings,
            numbers,
            handles,
        }
    }

    /// Wrap existing conduits, e.g. ones fed by a test.
    pub fn from_conduits(strings: ValueConduit, numbers: ValueConduit) -> Self {
        Self {
            strings,
            numbers,
            handles: Vec::new(),
        }
    }

    /// Total values drawn from both conduits.
    pub fn drawn(&self) -> u64 {
        self.strings.drawn() + self.numbers.drawn()
    }

    /// Wait for the producer tasks to finish after cancellation.
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_spawned_producers_emit_values() {
        let cancel = CancellationToken::new();
        let config = ProducerConfig {
            seed: Some(42),
            ..Default::default()
        };
        let producers = Producers::spawn(&config, cancel.clone());

        for _ in 0..20 {
            let s = producers.strings.recv().await.unwrap();
            assert_eq!(s.len(), 10);
            assert!(s.chars().all(|c| c.is_ascii_alphabetic()));

            let n: f64 = producers.numbers.recv().await.unwrap().parse().unwrap();
            assert!((0.0..100.0).contains(&n));
        }
        assert_eq!(producers.drawn(), 40);

        cancel.cancel();
        producers.join().await;
    }

    #[tokio::test]
    async fn test_closed_conduit_reports_exhausted() {
        let (tx, conduit) = ValueConduit::channel(STRING_CONDUIT);
        tx.send("last".to_string()).await.unwrap();
        drop(tx);

        assert_eq!(conduit.recv().await.unwrap(), "last");
        assert!(matches!(
            conduit.recv().await,
            Err(GeneratorError::ProducerExhausted { conduit: "string" })
        ));
        assert_eq!(conduit.drawn(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_consumers_receive_each_value_once() {
        const VALUES: usize = 400;
        const CONSUMERS: usize = 8;

        let (tx, conduit) = ValueConduit::channel(NUMBER_CONDUIT);
        let feeder = tokio::spawn(async move {
            for i in 0..VALUES {
                tx.send(i.to_string()).await.unwrap();
            }
        });

        let mut consumers = Vec::new();
        for _ in 0..CONSUMERS {
            let conduit = conduit.clone();
            consumers.push(tokio::spawn(async move {
                let mut got = Vec::new();
                for _ in 0..VALUES / CONSUMERS {
                    got.push(conduit.recv().await.unwrap());
                }
                got
            }));
        }

        let mut seen = HashSet::new();
        for consumer in consumers {
            for value in consumer.await.unwrap() {
                assert!(seen.insert(value), "value delivered twice");
            }
        }
        feeder.await.unwrap();

        assert_eq!(seen.len(), VALUES);
        assert_eq!(conduit.drawn(), VALUES as u64);
    }

    #[tokio::test]
    async fn test_cancel_stops_producer() {
        let cancel = CancellationToken::new();
        let (tx, conduit) = ValueConduit::channel(STRING_CONDUIT);
        let handle = tokio::spawn(produce_strings(
            tx,
            4,
            StdRng::seed_from_u64(1),
            cancel.clone(),
        ));

        conduit.recv().await.unwrap();
        cancel.cancel();
        handle.await.unwrap();

        // At most the one value already sitting in the slot remains.
        let _ = conduit.recv().await;
        assert!(conduit.recv().await.is_err());
    }
}
