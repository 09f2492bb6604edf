//! # sauna-link
//!
//! Reconnecting WebSocket console for the sauna heater controller.
//!
//! Operator lines typed on standard input are framed (optionally signed
//! with a pre-shared HMAC-SHA256 key) and sent to the controller; every
//! message the controller pushes back is printed. Network failures never
//! end the process: the link backs off for a fixed delay and reconnects.
//!
//! ## Architecture
//!
//! ```text
//! stdin ──► Input Pump ──► Framer ──► CommandSink ──┐
//!                                                   ├─ Connection (transport/)
//! stdout ◄── Console ◄── Output Pump ◄── Telemetry ─┘
//!                 ▲
//!                 │ one Session at a time (session/)
//!                 │
//!           ReconnectLoop: Connecting → Active → Backoff (reconnect.rs)
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod framing;
pub mod reconnect;
pub mod session;
pub mod transport;
