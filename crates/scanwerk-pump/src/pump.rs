// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — The pump: drives a producer through one full scan sequence
// into a consumer, either inline or via two worker threads joined by the
// brigade.
//
// The acquirer worker reads from the producer, slices image data into
// buckets sized to the producer's buffer hint, and pushes them — plus a
// marker bucket at every boundary — into the brigade.  The processor
// worker pops buckets and delivers them to the consumer.  Worker start
// order is unspecified; the brigade provides all synchronization.
//
// Errors never escape a worker thread.  Whatever goes wrong inside a run
// is converted to a notification event, the consumer is force-marked
// CANCEL, and the cancel-complete signal fires.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, info, instrument, warn};

use scanwerk_core::config::PumpConfig;
use scanwerk_core::context::Context;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::marker::{Marker, StreamItem};
use scanwerk_options::descriptor::Descriptor;
use scanwerk_options::map::OptionMap;
use scanwerk_options::value::Value;
use scanwerk_stream::consumer::{Consumer, write_all};
use scanwerk_stream::producer::Producer;

use crate::brigade::Brigade;
use crate::bucket::Bucket;

/// Weight of a pump notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Default)]
struct Signals {
    notify: Option<Box<dyn FnMut(Severity, String) + Send>>,
    cancel_complete: Option<Box<dyn FnMut() + Send>>,
}

fn emit(signals: &Arc<Mutex<Signals>>, severity: Severity, message: String) {
    warn!(%severity, message, "pump notification");
    let mut signals = signals.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(notify) = signals.notify.as_mut() {
        notify(severity, message);
    }
}

fn emit_cancel_complete(signals: &Arc<Mutex<Signals>>) {
    debug!("cancellation complete");
    let mut signals = signals.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(done) = signals.cancel_complete.as_mut() {
        done();
    }
}

/// Drives one scan sequence at a time from a producer into a consumer.
///
/// The `acquire-async` toggle in [`Pump::options`] (default on) selects
/// between the inline loop and the two-thread brigade.  A pump can be
/// restarted after [`Pump::wait`] or after [`Pump::cancel`]; a cancelled
/// run still in flight is detached and left to wind down on its own.
pub struct Pump {
    producer: Arc<Mutex<Box<dyn Producer>>>,
    options: OptionMap,
    config: PumpConfig,
    signals: Arc<Mutex<Signals>>,
    acquirer: Option<JoinHandle<()>>,
    processor: Option<JoinHandle<Marker>>,
    final_marker: Option<Marker>,
    cancelling: bool,
}

impl Pump {
    pub fn new(producer: Box<dyn Producer>) -> Self {
        Self::with_config(producer, PumpConfig::default())
    }

    pub fn with_config(producer: Box<dyn Producer>, config: PumpConfig) -> Self {
        let mut options = OptionMap::new();
        // Building a fresh map with one well-formed key cannot fail.
        let _ = options.add_options().add(
            "acquire-async",
            true,
            None,
            Descriptor::new("Acquire asynchronously")
                .text("Run acquisition and delivery on separate threads")
                .level(scanwerk_options::descriptor::Level::Extended),
        );
        Self {
            producer: Arc::new(Mutex::new(producer)),
            options,
            config,
            signals: Arc::new(Mutex::new(Signals::default())),
            acquirer: None,
            processor: None,
            final_marker: None,
            cancelling: false,
        }
    }

    /// Handle on the pump's own options ("acquire-async").
    pub fn options(&self) -> OptionMap {
        self.options.clone()
    }

    /// Observe internal errors as `(severity, message)` events.
    pub fn connect_notification(&mut self, f: impl FnMut(Severity, String) + Send + 'static) {
        let mut signals = self.signals.lock().unwrap_or_else(|e| e.into_inner());
        signals.notify = Some(Box::new(f));
    }

    /// Observe the end of every run whose final marker is `CANCEL`.
    pub fn connect_cancel_complete(&mut self, f: impl FnMut() + Send + 'static) {
        let mut signals = self.signals.lock().unwrap_or_else(|e| e.into_inner());
        signals.cancel_complete = Some(Box::new(f));
    }

    /// Whether an asynchronous run is still in flight.
    pub fn is_pumping(&self) -> bool {
        self.processor.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Run one full scan sequence into `consumer`.
    ///
    /// Calling `start` while a run is still pumping (without cancelling
    /// first) is an error: it is logged and nothing happens.
    #[instrument(skip_all)]
    pub fn start(&mut self, consumer: Box<dyn Consumer>) -> Result<()> {
        if self.is_pumping() && !self.cancelling {
            warn!("start() while pumping; cancel first");
            return Ok(());
        }
        self.reap_previous_run();
        self.final_marker = None;

        let async_mode = matches!(
            self.options.option("acquire-async")?.value(),
            Value::Toggle(true)
        );
        if async_mode {
            self.start_workers(consumer)
        } else {
            let marker = run_inline(&self.producer, consumer, &self.signals);
            if marker == Marker::Cancel {
                emit_cancel_complete(&self.signals);
            }
            self.final_marker = Some(marker);
            Ok(())
        }
    }

    /// Request cancellation of the run in flight.
    ///
    /// Cancellation is cooperative: the producer reports `CANCEL` on a
    /// later read and the workers drain out on their own.  The next
    /// `start` ditches them instead of waiting.
    #[instrument(skip_all)]
    pub fn cancel(&mut self) {
        info!("cancelling scan sequence");
        self.producer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
        self.cancelling = true;
    }

    /// Block until the current run finishes and return its final marker.
    ///
    /// An idle pump reports the final marker of the previous run, or
    /// `END_OF_SEQUENCE` when nothing has run yet.
    pub fn wait(&mut self) -> Marker {
        if let Some(handle) = self.acquirer.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.processor.take() {
            // A panicked worker never reported a final marker; the run
            // counts as cancelled.
            let marker = handle.join().unwrap_or(Marker::Cancel);
            self.final_marker = Some(marker);
        }
        self.cancelling = false;
        self.final_marker.unwrap_or(Marker::EndOfSequence)
    }

    fn start_workers(&mut self, consumer: Box<dyn Consumer>) -> Result<()> {
        // Fresh brigade per run: a detached, cancelled run keeps draining
        // its own queue without touching ours.
        let brigade = Arc::new(Brigade::new(self.config.brigade_capacity));
        self.cancelling = false;

        let acquirer = {
            let producer = Arc::clone(&self.producer);
            let brigade = Arc::clone(&brigade);
            let signals = Arc::clone(&self.signals);
            std::thread::Builder::new()
                .name("scanwerk-acquirer".to_owned())
                .spawn(move || acquire(&producer, &brigade, &signals))
                .map_err(|e| ScanwerkError::Pump(format!("failed to spawn acquirer: {e}")))?
        };
        let processor = {
            let queue = Arc::clone(&brigade);
            let signals = Arc::clone(&self.signals);
            std::thread::Builder::new()
                .name("scanwerk-processor".to_owned())
                .spawn(move || process(consumer, &queue, &signals))
                .map_err(|e| {
                    // Unblock the acquirer we just spawned.
                    brigade.close();
                    ScanwerkError::Pump(format!("failed to spawn processor: {e}"))
                })?
        };
        self.acquirer = Some(acquirer);
        self.processor = Some(processor);
        debug!("workers started");
        Ok(())
    }

    /// Join finished workers; detach the ones a cancel left running.
    fn reap_previous_run(&mut self) {
        let detach = self.cancelling;
        if let Some(handle) = self.acquirer.take() {
            if detach && !handle.is_finished() {
                drop(handle);
            } else {
                let _ = handle.join();
            }
        }
        if let Some(handle) = self.processor.take() {
            if detach && !handle.is_finished() {
                drop(handle);
            } else if let Ok(marker) = handle.join() {
                self.final_marker = Some(marker);
            }
        }
        self.cancelling = false;
    }
}

// -- Worker loops --------------------------------------------------------------

/// Allocate a data bucket, yielding while outstanding buckets might free
/// memory.  Fails only when the brigade is already drained.
fn allocate(payload: &[u8], brigade: &Brigade) -> Result<Bucket> {
    loop {
        match Bucket::data(payload) {
            Ok(bucket) => return Ok(bucket),
            Err(err) => {
                if brigade.is_empty() {
                    return Err(err);
                }
                std::thread::yield_now();
            }
        }
    }
}

/// Wind a producer down after its run was abandoned mid-sequence, so the
/// next `start` begins with a fresh, well-formed marker sequence.
fn settle_producer(producer: &Arc<Mutex<Box<dyn Producer>>>, buf: &mut [u8]) {
    let mut producer = producer.lock().unwrap_or_else(|e| e.into_inner());
    producer.cancel();
    loop {
        match producer.read(buf) {
            Ok(StreamItem::Marker(Marker::Cancel | Marker::EndOfSequence)) => break,
            Ok(_) => {}
            Err(_) => break,
        }
    }
}

fn acquire(
    producer: &Arc<Mutex<Box<dyn Producer>>>,
    brigade: &Arc<Brigade>,
    signals: &Arc<Mutex<Signals>>,
) {
    let size = producer
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .buffer_size()
        .max(1);
    let mut buf = vec![0u8; size];

    loop {
        // Lock only around the read so a cancel request can get at the
        // producer while the brigade is full.
        let (item, ctx) = {
            let mut producer = producer.lock().unwrap_or_else(|e| e.into_inner());
            let item = producer.read(&mut buf);
            (item, producer.context())
        };
        match item {
            Ok(StreamItem::Data(n)) => {
                let bucket = match allocate(&buf[..n], brigade) {
                    Ok(bucket) => bucket,
                    Err(err) => {
                        emit(signals, Severity::Error, format!("bucket allocation: {err}"));
                        settle_producer(producer, &mut buf);
                        brigade.push(Bucket::Mark(Marker::Cancel, ctx));
                        break;
                    }
                };
                if !brigade.push(bucket) {
                    // Brigade closed under us: the processor abandoned the
                    // run.  The producer must not stay mid-image.
                    settle_producer(producer, &mut buf);
                    break;
                }
            }
            Ok(StreamItem::Marker(marker)) => {
                if marker == Marker::EndOfSequence || marker == Marker::Cancel {
                    brigade.push(Bucket::Mark(marker, ctx));
                    break;
                }
                if !brigade.push(Bucket::Mark(marker, ctx)) {
                    settle_producer(producer, &mut buf);
                    break;
                }
            }
            Err(err) => {
                emit(signals, Severity::Error, format!("acquisition failed: {err}"));
                brigade.push(Bucket::Mark(Marker::Cancel, ctx));
                break;
            }
        }
    }
    brigade.close();
}

fn process(
    mut consumer: Box<dyn Consumer>,
    brigade: &Arc<Brigade>,
    signals: &Arc<Mutex<Signals>>,
) -> Marker {
    let mut last_ctx = Context::default();
    let mut last_marker = Marker::EndOfSequence;

    while let Some(bucket) = brigade.pop() {
        let outcome = match bucket {
            Bucket::Data(chunk) => write_all(consumer.as_mut(), &chunk),
            Bucket::Mark(marker, ctx) => {
                last_ctx = ctx;
                last_marker = marker;
                consumer.mark(marker, &last_ctx)
            }
        };
        if let Err(err) = outcome {
            emit(signals, Severity::Error, format!("delivery failed: {err}"));
            let _ = consumer.mark(Marker::Cancel, &last_ctx);
            last_marker = Marker::Cancel;
            brigade.close();
            break;
        }
    }
    if last_marker == Marker::Cancel {
        emit_cancel_complete(signals);
    }
    last_marker
}

fn run_inline(
    producer: &Arc<Mutex<Box<dyn Producer>>>,
    mut consumer: Box<dyn Consumer>,
    signals: &Arc<Mutex<Signals>>,
) -> Marker {
    let mut producer = producer.lock().unwrap_or_else(|e| e.into_inner());
    let mut buf = vec![0u8; producer.buffer_size().max(1)];
    let mut last_ctx = Context::default();

    loop {
        let fail = |consumer: &mut dyn Consumer, ctx: &Context, err: ScanwerkError| {
            emit(signals, Severity::Error, format!("scan sequence failed: {err}"));
            let _ = consumer.mark(Marker::Cancel, ctx);
            Marker::Cancel
        };
        match producer.read(&mut buf) {
            Ok(StreamItem::Data(n)) => {
                if let Err(err) = write_all(consumer.as_mut(), &buf[..n]) {
                    return fail(consumer.as_mut(), &last_ctx, err);
                }
            }
            Ok(StreamItem::Marker(marker)) => {
                last_ctx = producer.context();
                if let Err(err) = consumer.mark(marker, &last_ctx) {
                    return fail(consumer.as_mut(), &last_ctx, err);
                }
                if marker == Marker::EndOfSequence || marker == Marker::Cancel {
                    return marker;
                }
            }
            Err(err) => return fail(consumer.as_mut(), &last_ctx, err),
        }
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use scanwerk_core::context::{Context, PixelType};
    use scanwerk_stream::device::{ScanDevice, ScanSource};
    use scanwerk_stream::sinks::VecSink;
    use scanwerk_stream::sources::MemorySource;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn device(image: Vec<u8>, images: usize, ctx: Context) -> Box<ScanDevice> {
        Box::new(ScanDevice::new(Box::new(MemorySource::new(
            image, images, ctx,
        ))))
    }

    fn set_async(pump: &Pump, on: bool) {
        pump.options()
            .option("acquire-async")
            .expect("option")
            .set(on)
            .expect("set");
    }

    /// Synchronous and asynchronous runs deliver identical sequences.
    #[test]
    fn sync_and_async_runs_are_equivalent() {
        init_tracing();
        let ctx = Context::new(64, 16, PixelType::Gray8);
        let image = (0..1024u32).map(|i| (i % 251) as u8).collect::<Vec<_>>();

        let run = |async_mode: bool| {
            let mut pump = Pump::new(device(image.clone(), 2, ctx.clone()));
            set_async(&pump, async_mode);
            let sink = VecSink::new();
            pump.start(Box::new(sink.clone())).expect("start");
            let marker = pump.wait();
            (marker, sink)
        };

        let (sync_marker, sync_sink) = run(false);
        let (async_marker, async_sink) = run(true);

        assert_eq!(sync_marker, Marker::EndOfSequence);
        assert_eq!(async_marker, Marker::EndOfSequence);
        assert_eq!(sync_sink.data(), async_sink.data());
        assert_eq!(sync_sink.data().len(), 2 * image.len());
        assert_eq!(sync_sink.images_completed(), 2);
        assert_eq!(async_sink.images_completed(), 2);
        assert_eq!(async_sink.sequences_completed(), 1);
    }

    /// A backpressuring consumer still receives every octet, in order.
    #[test]
    fn async_run_survives_consumer_backpressure() {
        init_tracing();
        let ctx = Context::new(32, 8, PixelType::Gray8);
        let image = (0..=255u8).collect::<Vec<_>>();
        let mut pump = Pump::new(device(image.clone(), 3, ctx));

        let sink = VecSink::with_max_chunk(7);
        pump.start(Box::new(sink.clone())).expect("start");
        assert_eq!(pump.wait(), Marker::EndOfSequence);
        assert_eq!(sink.data().len(), 3 * image.len());
        assert_eq!(&sink.data()[..image.len()], image.as_slice());
        assert_eq!(sink.images_completed(), 3);
    }

    /// `start` while a run is pumping is a logged no-op.
    #[test]
    fn start_while_pumping_is_a_no_op() {
        init_tracing();

        /// Source whose first produce blocks until the gate opens.
        struct Gated {
            gate: std::sync::mpsc::Receiver<()>,
            produced: bool,
        }
        impl ScanSource for Gated {
            fn produce(&mut self, buf: &mut [u8]) -> Result<usize> {
                if self.produced {
                    return Ok(0);
                }
                let _ = self.gate.recv();
                self.produced = true;
                buf[0] = 0xAB;
                Ok(1)
            }
        }

        let (open, gate) = std::sync::mpsc::channel();
        let mut pump = Pump::new(Box::new(ScanDevice::new(Box::new(Gated {
            gate,
            produced: false,
        }))));
        let first = VecSink::new();
        let second = VecSink::new();

        pump.start(Box::new(first.clone())).expect("start");
        assert!(pump.is_pumping());
        pump.start(Box::new(second.clone())).expect("second start");

        open.send(()).expect("open gate");
        assert_eq!(pump.wait(), Marker::EndOfSequence);
        assert_eq!(first.data(), vec![0xAB]);
        assert!(second.data().is_empty(), "ignored start must not deliver");
        assert_eq!(second.sequences_completed(), 0);
    }

    /// Cancelling mid-run ends with CANCEL, the consumer's cancel hook,
    /// and the cancel-complete signal.
    #[test]
    fn cancel_ends_run_with_cancel_marker() {
        init_tracing();

        /// Endless source; only cancellation can end the sequence.
        struct Endless;
        impl ScanSource for Endless {
            fn produce(&mut self, buf: &mut [u8]) -> Result<usize> {
                std::thread::sleep(Duration::from_millis(1));
                buf.fill(0x55);
                Ok(buf.len())
            }
            fn buffer_size(&self) -> usize {
                64
            }
        }

        let mut pump = Pump::new(Box::new(ScanDevice::new(Box::new(Endless))));
        let completed = Arc::new(AtomicBool::new(false));
        {
            let completed = Arc::clone(&completed);
            pump.connect_cancel_complete(move || completed.store(true, Ordering::SeqCst));
        }
        let sink = VecSink::new();

        pump.start(Box::new(sink.clone())).expect("start");
        std::thread::sleep(Duration::from_millis(20));
        pump.cancel();

        assert_eq!(pump.wait(), Marker::Cancel);
        assert!(sink.cancelled());
        assert!(completed.load(Ordering::SeqCst));
        assert_eq!(sink.sequences_completed(), 0);
    }

    /// A pump restarts cleanly after a completed run.
    #[test]
    fn restart_after_completed_run() {
        init_tracing();

        /// Source serving exactly one image per sequence, indefinitely.
        struct PerSequence {
            served: bool,
            produced: usize,
        }
        impl ScanSource for PerSequence {
            fn set_up_sequence(&mut self) -> Result<()> {
                self.served = false;
                Ok(())
            }
            fn obtain_media(&mut self) -> bool {
                !std::mem::replace(&mut self.served, true)
            }
            fn set_up_image(&mut self) -> bool {
                self.produced = 0;
                true
            }
            fn produce(&mut self, buf: &mut [u8]) -> Result<usize> {
                let n = (16 - self.produced).min(buf.len());
                buf[..n].fill(0x11);
                self.produced += n;
                Ok(n)
            }
        }

        let mut pump = Pump::new(Box::new(ScanDevice::new(Box::new(PerSequence {
            served: false,
            produced: 0,
        }))));
        let sink = VecSink::new();

        pump.start(Box::new(sink.clone())).expect("first run");
        assert_eq!(pump.wait(), Marker::EndOfSequence);
        pump.start(Box::new(sink.clone())).expect("second run");
        assert_eq!(pump.wait(), Marker::EndOfSequence);

        assert_eq!(sink.sequences_completed(), 2);
        assert_eq!(sink.data().len(), 32);
    }

    /// A producer failure becomes a notification, a forced CANCEL on the
    /// consumer, and a CANCEL final marker.
    #[test]
    fn producer_failure_is_contained_and_notified() {
        init_tracing();

        struct Flaky {
            calls: u32,
        }
        impl ScanSource for Flaky {
            fn produce(&mut self, buf: &mut [u8]) -> Result<usize> {
                self.calls += 1;
                if self.calls == 1 {
                    buf[0] = 0x01;
                    Ok(1)
                } else {
                    Err(ScanwerkError::DataSource("carriage jammed".into()))
                }
            }
        }

        let mut pump = Pump::new(Box::new(ScanDevice::new(Box::new(Flaky { calls: 0 }))));
        let notices = Arc::new(Mutex::new(Vec::new()));
        {
            let notices = Arc::clone(&notices);
            pump.connect_notification(move |severity, message| {
                notices
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push((severity, message));
            });
        }
        let sink = VecSink::new();

        pump.start(Box::new(sink.clone())).expect("start");
        assert_eq!(pump.wait(), Marker::Cancel);
        assert!(sink.cancelled());

        let notices = notices.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].0, Severity::Error);
        assert!(notices[0].1.contains("carriage jammed"));
    }

    /// A delivery failure must not leave the producer mid-image: the next
    /// run starts a fresh sequence, markers before data.
    #[test]
    fn restart_after_delivery_failure_begins_fresh_sequence() {
        init_tracing();

        /// Sink that fails partway into the first image.
        struct Failing {
            writes: u32,
        }
        impl Consumer for Failing {
            fn write(&mut self, data: &[u8]) -> Result<usize> {
                self.writes += 1;
                if self.writes > 2 {
                    return Err(ScanwerkError::Io(std::io::Error::other("sink full")));
                }
                Ok(data.len())
            }
        }

        /// Sink recording whether any data arrived before BEGIN_OF_SEQUENCE.
        #[derive(Clone, Default)]
        struct Ordered {
            state: Arc<Mutex<(bool, bool)>>, // (begun, data before begin)
        }
        impl Consumer for Ordered {
            fn write(&mut self, data: &[u8]) -> Result<usize> {
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                if !state.0 {
                    state.1 = true;
                }
                Ok(data.len())
            }
            fn begin_sequence(&mut self, _ctx: &Context) -> Result<()> {
                self.state.lock().unwrap_or_else(|e| e.into_inner()).0 = true;
                Ok(())
            }
        }

        // Two images of several reads each, so the failure lands mid-image.
        let ctx = Context::new(200, 200, PixelType::Gray8);
        let mut pump = Pump::new(device(vec![0x5A; 40_000], 2, ctx));

        pump.start(Box::new(Failing { writes: 0 })).expect("first run");
        assert_eq!(pump.wait(), Marker::Cancel);

        let probe = Ordered::default();
        pump.start(Box::new(probe.clone())).expect("second run");
        assert_eq!(pump.wait(), Marker::EndOfSequence);

        let state = probe.state.lock().unwrap_or_else(|e| e.into_inner());
        assert!(state.0, "second run must open with BEGIN_OF_SEQUENCE");
        assert!(!state.1, "no image data may precede BEGIN_OF_SEQUENCE");
    }

    /// The inline mode contains failures the same way.
    #[test]
    fn sync_failure_is_contained_and_notified() {
        init_tracing();

        struct Broken;
        impl ScanSource for Broken {
            fn produce(&mut self, _buf: &mut [u8]) -> Result<usize> {
                Err(ScanwerkError::DataSource("lamp cold".into()))
            }
        }

        let mut pump = Pump::new(Box::new(ScanDevice::new(Box::new(Broken))));
        set_async(&pump, false);
        let completed = Arc::new(AtomicBool::new(false));
        {
            let completed = Arc::clone(&completed);
            pump.connect_cancel_complete(move || completed.store(true, Ordering::SeqCst));
        }
        let sink = VecSink::new();

        pump.start(Box::new(sink.clone())).expect("start");
        assert_eq!(pump.wait(), Marker::Cancel);
        assert!(sink.cancelled());
        assert!(completed.load(Ordering::SeqCst));
    }

    /// Cancelling an idle pump does not disturb the following run.
    #[test]
    fn idle_cancel_is_a_no_op() {
        init_tracing();
        let ctx = Context::new(16, 4, PixelType::Gray8);
        let mut pump = Pump::new(device(vec![9; 64], 1, ctx));
        let sink = VecSink::new();

        pump.cancel();
        pump.start(Box::new(sink.clone())).expect("start");
        assert_eq!(pump.wait(), Marker::EndOfSequence);
        assert_eq!(sink.data().len(), 64);
        assert_eq!(sink.sequences_completed(), 1);
    }

    /// An idle pump's wait reports end-of-sequence.
    #[test]
    fn wait_on_idle_pump() {
        let mut pump = Pump::new(device(vec![0; 4], 1, Context::new(4, 1, PixelType::Gray8)));
        assert_eq!(pump.wait(), Marker::EndOfSequence);
    }
}
