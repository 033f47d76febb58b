//! Chaos delivery for rigstream ingestion
//!
//! Simulates a hostile producer link:
//! - Packet loss
//! - Garbage datagrams
//! - Truncated datagrams
//! - Reordering (one datagram held back behind the next)
//! - Duplication

use std::net::SocketAddr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rigstream_core::{PoseFrame, RigResult};
use rigstream_transport::PoseTransmitter;
use rigstream_wire::encode_frame;

/// Link chaos configuration
#[derive(Clone, Debug)]
pub struct ChaosConfig {
    /// Packet loss rate (0.0 - 1.0)
    pub loss_rate: f64,
    /// Probability a datagram is replaced by random bytes
    pub garbage_rate: f64,
    /// Probability a datagram is cut short
    pub truncation_rate: f64,
    /// Probability a datagram is held back behind the next one
    pub reorder_prob: f64,
    /// Duplicate probability
    pub duplicate_prob: f64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        ChaosConfig {
            loss_rate: 0.01,
            garbage_rate: 0.01,
            truncation_rate: 0.01,
            reorder_prob: 0.02,
            duplicate_prob: 0.01,
        }
    }
}

impl ChaosConfig {
    /// Clean link
    pub fn none() -> Self {
        ChaosConfig {
            loss_rate: 0.0,
            garbage_rate: 0.0,
            truncation_rate: 0.0,
            reorder_prob: 0.0,
            duplicate_prob: 0.0,
        }
    }

    /// Busy wifi
    pub fn poor() -> Self {
        ChaosConfig {
            loss_rate: 0.05,
            garbage_rate: 0.02,
            truncation_rate: 0.02,
            reorder_prob: 0.1,
            duplicate_prob: 0.02,
        }
    }

    /// Mostly broken link
    pub fn hostile() -> Self {
        ChaosConfig {
            loss_rate: 0.2,
            garbage_rate: 0.15,
            truncation_rate: 0.15,
            reorder_prob: 0.2,
            duplicate_prob: 0.05,
        }
    }
}

/// Chaos link statistics
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChaosStats {
    pub frames_offered: u64,
    pub datagrams_sent: u64,
    /// Datagrams that left the link unmodified, duplicates included
    pub intact: u64,
    pub dropped: u64,
    pub garbage: u64,
    pub truncated: u64,
    pub reordered: u64,
    pub duplicated: u64,
}

impl ChaosStats {
    pub fn loss_rate(&self) -> f64 {
        if self.frames_offered == 0 {
            0.0
        } else {
            self.dropped as f64 / self.frames_offered as f64
        }
    }
}

/// A datagram on its way out, and whether it still matches the payload
struct Outgoing {
    bytes: Vec<u8>,
    intact: bool,
}

/// Socket-free chaos stage: turns one payload into the datagrams to send
pub struct ChaosLink {
    config: ChaosConfig,
    rng: StdRng,
    held: Option<Outgoing>,
    stats: ChaosStats,
}

impl ChaosLink {
    pub fn new(config: ChaosConfig, seed: u64) -> Self {
        ChaosLink {
            config,
            rng: StdRng::seed_from_u64(seed),
            held: None,
            stats: ChaosStats::default(),
        }
    }

    /// Push one payload through the link, in send order
    pub fn pass(&mut self, payload: Vec<u8>) -> Vec<Vec<u8>> {
        self.stats.frames_offered += 1;
        let mut out = Vec::with_capacity(3);

        if self.rng.gen_bool(self.config.loss_rate) {
            self.stats.dropped += 1;
        } else {
            let datagram = self.corrupt(payload);

            if self.held.is_none() && self.rng.gen_bool(self.config.reorder_prob) {
                self.stats.reordered += 1;
                self.held = Some(datagram);
                return out;
            }

            if self.rng.gen_bool(self.config.duplicate_prob) {
                self.stats.duplicated += 1;
                out.push(self.emit(Outgoing {
                    bytes: datagram.bytes.clone(),
                    intact: datagram.intact,
                }));
            }
            out.push(self.emit(datagram));
        }

        // A held datagram goes out after whatever followed it
        if let Some(held) = self.held.take() {
            out.push(self.emit(held));
        }

        out
    }

    /// Release a datagram still held for reordering
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        self.held.take().map(|held| self.emit(held))
    }

    pub fn stats(&self) -> &ChaosStats {
        &self.stats
    }

    fn emit(&mut self, datagram: Outgoing) -> Vec<u8> {
        self.stats.datagrams_sent += 1;
        if datagram.intact {
            self.stats.intact += 1;
        }
        datagram.bytes
    }

    fn corrupt(&mut self, payload: Vec<u8>) -> Outgoing {
        if self.rng.gen_bool(self.config.garbage_rate) {
            self.stats.garbage += 1;
            let len = self.rng.gen_range(1..=payload.len().max(1));
            return Outgoing {
                bytes: (0..len).map(|_| self.rng.gen()).collect(),
                intact: false,
            };
        }

        if payload.len() > 1 && self.rng.gen_bool(self.config.truncation_rate) {
            self.stats.truncated += 1;
            let cut = self.rng.gen_range(1..payload.len());
            return Outgoing {
                bytes: payload[..cut].to_vec(),
                intact: false,
            };
        }

        Outgoing {
            bytes: payload,
            intact: true,
        }
    }
}

/// Transmitter with a chaos link in front of the socket
pub struct ChaosSender {
    transmitter: PoseTransmitter,
    link: ChaosLink,
}

impl ChaosSender {
    pub async fn connect(destination: SocketAddr, config: ChaosConfig, seed: u64) -> RigResult<Self> {
        Ok(ChaosSender {
            transmitter: PoseTransmitter::connect(destination).await?,
            link: ChaosLink::new(config, seed),
        })
    }

    /// Encode and send a frame through the link.
    ///
    /// Returns the number of datagrams that actually left the socket.
    pub async fn send_frame(&mut self, frame: &PoseFrame) -> RigResult<usize> {
        let payload = encode_frame(frame)?;
        let datagrams = self.link.pass(payload);
        for datagram in &datagrams {
            self.transmitter.send_bytes(datagram).await?;
        }
        Ok(datagrams.len())
    }

    /// Send any datagram held back for reordering
    pub async fn flush(&mut self) -> RigResult<()> {
        if let Some(datagram) = self.link.flush() {
            self.transmitter.send_bytes(&datagram).await?;
        }
        Ok(())
    }

    pub fn stats(&self) -> &ChaosStats {
        self.link.stats()
    }
}
