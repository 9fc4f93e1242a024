//! Lock-free event queue bridging the MQTT client task to the main loop.
//!
//! Events are produced by the MQTT client task alone (message arrival,
//! connection state changes) and consumed one at a time by the
//! single-threaded main loop. The control and telemetry cadence is
//! generated inside the main loop itself and never passes through the
//! queue — that keeps the producer side a single task, which the SPSC
//! discipline below depends on. Message payloads do not travel through
//! this queue either; they land in the MQTT adapter's inbox, the queue
//! only signals that something is pending.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ MQTT task    │────▶│  Event Queue │────▶│  Main Loop   │
//! │ (producer)   │     │  (lock-free) │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 32;

/// System event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// A status message arrived and is waiting in the MQTT inbox.
    StatusMessage = 0,
    /// The broker connection was established or lost.
    ConnectivityChanged = 1,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// The MQTT task writes (produce), main loop reads (consume).
// Uses atomic head/tail indices. The buffer is intentionally
// kept in a static so the client callback can access it.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: EVENT_BUFFER is accessed exclusively through the SPSC discipline
// below. Producer (push_event): the MQTT client task — one writer.
// Consumer (pop_event): main-loop task — one reader. The atomics enforce
// ordering between the two.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from the MQTT client task (lock-free). Must not be called
/// from any other context — the queue is single-producer.
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop event.
    }

    // SAFETY: single producer; slot `head` is not visible to the consumer
    // until the Release store below.
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending events into a callback, FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0 => Some(Event::StatusMessage),
        1 => Some(Event::ConnectivityChanged),
        _ => None,
    }
}
