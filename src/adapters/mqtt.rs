//! MQTT client adapter — the telemetry transport.
//!
//! Connects to the printer's broker (TLS, port 8883), subscribes to the
//! configured wildcard status topic, and funnels received messages into a
//! bounded inbox that the single-threaded main loop drains. The ESP-IDF
//! client delivers messages on its own task; the inbox mutex is the only
//! synchronisation point, and the fan controller itself is never touched
//! from the client task.
//!
//! ```text
//!  broker ──▶ client task ──▶ Inbox (mutex) ──▶ take_message() ──▶ AppService
//!                    │
//!                    └──▶ push_event(StatusMessage)
//! ```
//!
//! ## Reconnection policy
//!
//! Fixed interval (`reconnect_interval_secs`, no backoff), unbounded
//! attempts. The subscription is re-issued on every successful
//! (re)connect — broker-side session state is never assumed.

use core::sync::atomic::{AtomicBool, Ordering};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use log::{info, warn};

use crate::config::SystemConfig;
use crate::events::{push_event, Event};

/// Maximum messages buffered between main-loop passes. A full printer
/// report is ~5 KiB and arrives every few seconds; the loop runs at 1 Hz,
/// so a small inbox suffices. Overflow drops the oldest message.
const INBOX_CAP: usize = 8;

// ───────────────────────────────────────────────────────────────
// Inbound message
// ───────────────────────────────────────────────────────────────

/// One raw message as delivered by the transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

// ───────────────────────────────────────────────────────────────
// Shared inbox (client task → main loop)
// ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct InboxInner {
    queue: VecDeque<InboundMessage>,
    dropped: u64,
}

#[derive(Clone, Default)]
struct Inbox(Arc<Mutex<InboxInner>>);

impl Inbox {
    fn push(&self, msg: InboundMessage) {
        // A poisoned mutex means the other side panicked mid-access;
        // dropping one message beats taking the client task down too.
        let Ok(mut inner) = self.0.lock() else {
            warn!("mqtt: inbox unavailable, message dropped");
            return;
        };
        if inner.queue.len() >= INBOX_CAP {
            inner.queue.pop_front();
            inner.dropped += 1;
            warn!("mqtt: inbox full, oldest message dropped ({} total)", inner.dropped);
        }
        inner.queue.push_back(msg);
    }

    fn pop(&self) -> Option<InboundMessage> {
        self.0.lock().ok().and_then(|mut inner| inner.queue.pop_front())
    }

    fn dropped(&self) -> u64 {
        self.0.lock().map_or(0, |inner| inner.dropped)
    }
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MqttState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32 },
}

pub struct MqttAdapter {
    state: MqttState,
    broker_uri: heapless::String<96>,
    username: heapless::String<32>,
    password: heapless::String<64>,
    topic: heapless::String<32>,
    retry_interval_ms: u64,
    last_attempt_ms: u64,
    inbox: Inbox,
    /// Set from the client task on CONNACK / disconnect.
    connected_flag: Arc<AtomicBool>,
    /// Whether the current connection has an active subscription.
    subscribed: bool,
    #[cfg(target_os = "espidf")]
    client: Option<esp_idf_svc::mqtt::client::EspMqttClient<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim_subscribe_count: u32,
}

impl MqttAdapter {
    /// Build the adapter from the immutable startup configuration.
    pub fn new(config: &SystemConfig) -> Self {
        let mut broker_uri = heapless::String::new();
        // The printer only accepts TLS; `mqtts://` selects it in ESP-IDF.
        let _ = core::fmt::write(
            &mut broker_uri,
            format_args!("mqtts://{}:{}", config.mqtt_broker, config.mqtt_port),
        );
        Self {
            state: MqttState::Disconnected,
            broker_uri,
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            topic: config.status_topic.clone(),
            retry_interval_ms: u64::from(config.reconnect_interval_secs) * 1000,
            last_attempt_ms: 0,
            inbox: Inbox::default(),
            connected_flag: Arc::new(AtomicBool::new(false)),
            subscribed: false,
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            sim_subscribe_count: 0,
        }
    }

    /// Start the client. Connection establishment is asynchronous; `poll`
    /// completes the handshake by subscribing once the broker accepts us.
    pub fn start(&mut self, now_ms: u64) {
        info!("mqtt: connecting to {} as '{}'", self.broker_uri, self.username);
        self.last_attempt_ms = now_ms;
        if let Err(e) = self.platform_start() {
            warn!("mqtt: client start failed ({}), will retry", e);
            self.state = MqttState::Reconnecting { attempt: 0 };
        }
    }

    /// Drive connection upkeep. Call on every main-loop pass.
    pub fn poll(&mut self, now_ms: u64) {
        let connected = self.connected_flag.load(Ordering::Acquire);

        match (self.state, connected) {
            // Broker accepted us (first time or after an auto-reconnect):
            // re-issue the subscription.
            (_, true) if !self.subscribed => {
                match self.platform_subscribe() {
                    Ok(()) => {
                        info!("mqtt: subscribed to '{}'", self.topic);
                        self.subscribed = true;
                        self.state = MqttState::Connected;
                    }
                    Err(e) => {
                        // Leave `subscribed` false; retried next pass.
                        warn!("mqtt: subscribe failed ({}), retrying", e);
                    }
                }
            }
            (MqttState::Connected, false) => {
                warn!("mqtt: connection lost, retrying every {}ms", self.retry_interval_ms);
                self.subscribed = false;
                self.state = MqttState::Reconnecting { attempt: 0 };
                self.last_attempt_ms = now_ms;
            }
            (MqttState::Reconnecting { attempt }, false) => {
                if now_ms.saturating_sub(self.last_attempt_ms) >= self.retry_interval_ms {
                    self.last_attempt_ms = now_ms;
                    self.state = MqttState::Reconnecting { attempt: attempt + 1 };
                    self.platform_reconnect(attempt + 1);
                }
            }
            _ => {}
        }
    }

    /// Pull the next buffered message, if any.
    pub fn take_message(&mut self) -> Option<InboundMessage> {
        self.inbox.pop()
    }

    /// Messages discarded due to inbox overflow.
    pub fn dropped_messages(&self) -> u64 {
        self.inbox.dropped()
    }

    pub fn state(&self) -> MqttState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.connected_flag.load(Ordering::Acquire)
    }

    // ── ESP-IDF backend ───────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), &'static str> {
        use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};

        let conf = MqttClientConfiguration {
            client_id: Some("nozzlefan"),
            username: Some(self.username.as_str()),
            password: Some(self.password.as_str()),
            // Fixed-interval auto-reconnect inside the IDF client; `poll`
            // only has to re-subscribe when the flag flips back on.
            reconnect_timeout: Some(core::time::Duration::from_millis(self.retry_interval_ms)),
            // The printer presents a self-signed certificate.
            skip_cert_common_name_check: true,
            ..Default::default()
        };

        let inbox = self.inbox.clone();
        let connected = Arc::clone(&self.connected_flag);

        let client = EspMqttClient::new_cb(self.broker_uri.as_str(), &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => {
                    connected.store(true, Ordering::Release);
                    push_event(Event::ConnectivityChanged);
                }
                EventPayload::Disconnected => {
                    connected.store(false, Ordering::Release);
                    push_event(Event::ConnectivityChanged);
                }
                EventPayload::Received { topic, data, .. } => {
                    inbox.push(InboundMessage {
                        topic: topic.unwrap_or_default().to_string(),
                        payload: data.to_vec(),
                    });
                    push_event(Event::StatusMessage);
                }
                EventPayload::Error(e) => {
                    warn!("mqtt: transport error: {:?}", e);
                }
                _ => {}
            }
        })
        .map_err(|_| "EspMqttClient init failed")?;

        self.client = Some(client);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_subscribe(&mut self) -> Result<(), &'static str> {
        use esp_idf_svc::mqtt::client::QoS;
        let client = self.client.as_mut().ok_or("client not started")?;
        client
            .subscribe(self.topic.as_str(), QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|_| "subscribe rejected")
    }

    #[cfg(target_os = "espidf")]
    fn platform_reconnect(&mut self, attempt: u32) {
        // The IDF client reconnects on its own timer; this is just the
        // operator-visible heartbeat.
        info!("mqtt: waiting for reconnect (attempt {})", attempt);
    }

    // ── Host simulation backend ───────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), &'static str> {
        if self.password.is_empty() {
            return Err("no broker password configured");
        }
        self.connected_flag.store(true, Ordering::Release);
        info!("mqtt(sim): connected to {}", self.broker_uri);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_subscribe(&mut self) -> Result<(), &'static str> {
        self.sim_subscribe_count += 1;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_reconnect(&mut self, attempt: u32) {
        // Simulated broker accepts every second attempt.
        if attempt % 2 == 0 {
            self.connected_flag.store(true, Ordering::Release);
            info!("mqtt(sim): reconnected (attempt {})", attempt);
        }
    }

    // ── Test hooks (host only) ────────────────────────────────

    /// Deliver a message as if it arrived from the broker.
    #[cfg(not(target_os = "espidf"))]
    pub fn inject_message(&self, topic: &str, payload: &[u8]) {
        self.inbox.push(InboundMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
        push_event(Event::StatusMessage);
    }

    /// Simulate a broker-side disconnect.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_connection(&mut self) {
        self.connected_flag.store(false, Ordering::Release);
        self.subscribed = false;
    }

    /// How many times the subscription has been issued.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_subscribe_count(&self) -> u32 {
        self.sim_subscribe_count
    }
}
