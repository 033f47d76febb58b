//! Engine configuration
//!
//! All knobs are plain scalars fixed at startup. The smoothing factor and the
//! coordinate scales are empirical, which is why they live here rather than
//! as constants.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::{GroupKind, RigError, RigResult};

/// Default UDP port the producer sends to
pub const DEFAULT_PORT: u16 = 5005;

/// What a tick does when no new frame arrived since the previous tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Leave every joint where it is
    #[default]
    Hold,
    /// Keep easing toward the last published frame
    Converge,
}

/// One-Euro landmark filter parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneEuroConfig {
    /// Cutoff (Hz) while a landmark is still; lower removes more jitter
    pub min_cutoff: f32,
    /// Cutoff gain per unit of speed; higher reduces lag on fast motion
    pub beta: f32,
    /// Cutoff (Hz) for the speed estimate
    pub d_cutoff: f32,
}

impl Default for OneEuroConfig {
    fn default() -> Self {
        OneEuroConfig {
            min_cutoff: 0.5,
            beta: 0.01,
            d_cutoff: 1.0,
        }
    }
}

impl OneEuroConfig {
    pub fn validate(&self) -> RigResult<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.min_cutoff) || !positive(self.d_cutoff) {
            return Err(RigError::ConfigurationError(format!(
                "filter cutoffs must be finite and positive, got min_cutoff={} d_cutoff={}",
                self.min_cutoff, self.d_cutoff
            )));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(RigError::ConfigurationError(format!(
                "filter beta must be finite and non-negative, got {}",
                self.beta
            )));
        }
        Ok(())
    }
}

/// Rigstream engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Local address the receiver binds to
    pub bind_address: IpAddr,
    /// Local UDP port
    pub port: u16,
    /// Permit port 0 (OS-assigned)
    pub allow_ephemeral_port: bool,
    /// Convergence rate per second; higher converges faster
    pub smoothing_factor: f32,
    /// Sensor-to-world scale on x/y
    pub lateral_scale: f32,
    /// Sensor-to-world scale on z
    pub depth_scale: f32,
    /// Host joint slots for the pose group
    pub pose_slots: usize,
    /// Host joint slots for the left hand
    pub left_hand_slots: usize,
    /// Host joint slots for the right hand
    pub right_hand_slots: usize,
    pub stale_policy: StalePolicy,
    /// One-Euro pre-filter over incoming landmarks; off when absent
    pub landmark_filter: Option<OneEuroConfig>,
}

impl Default for RigConfig {
    fn default() -> Self {
        RigConfig {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            allow_ephemeral_port: false,
            smoothing_factor: 15.0,
            lateral_scale: 2.0,
            depth_scale: 1.5,
            pose_slots: GroupKind::Pose.nominal_len(),
            left_hand_slots: GroupKind::LeftHand.nominal_len(),
            right_hand_slots: GroupKind::RightHand.nominal_len(),
            stale_policy: StalePolicy::Hold,
            landmark_filter: None,
        }
    }
}

impl RigConfig {
    /// Fast convergence, more visible jitter
    pub fn responsive() -> Self {
        RigConfig {
            smoothing_factor: 25.0,
            ..Default::default()
        }
    }

    /// Slow, heavily damped motion over filtered landmarks
    pub fn cinematic() -> Self {
        RigConfig {
            smoothing_factor: 6.0,
            landmark_filter: Some(OneEuroConfig::default()),
            ..Default::default()
        }
    }

    /// Loopback-only with an OS-assigned port
    pub fn loopback() -> Self {
        RigConfig {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            allow_ephemeral_port: true,
            ..Default::default()
        }
    }

    /// Parse a JSON document; missing keys take their defaults
    pub fn from_json(text: &str) -> RigResult<Self> {
        let config: RigConfig = serde_json::from_str(text)
            .map_err(|e| RigError::ConfigurationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Address the receiver binds to
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Joint slots configured for a group
    pub fn slot_count(&self, kind: GroupKind) -> usize {
        match kind {
            GroupKind::Pose => self.pose_slots,
            GroupKind::LeftHand => self.left_hand_slots,
            GroupKind::RightHand => self.right_hand_slots,
        }
    }

    /// Check the configuration before anything is bound
    pub fn validate(&self) -> RigResult<()> {
        if self.port == 0 && !self.allow_ephemeral_port {
            return Err(RigError::ConfigurationError(
                "port 0 requires allow_ephemeral_port".into(),
            ));
        }

        if !self.smoothing_factor.is_finite() || self.smoothing_factor <= 0.0 {
            return Err(RigError::ConfigurationError(format!(
                "smoothing_factor must be finite and positive, got {}",
                self.smoothing_factor
            )));
        }

        if !self.lateral_scale.is_finite() || !self.depth_scale.is_finite() {
            return Err(RigError::ConfigurationError(format!(
                "scales must be finite, got lateral={} depth={}",
                self.lateral_scale, self.depth_scale
            )));
        }

        if let Some(filter) = &self.landmark_filter {
            filter.validate()?;
        }

        let total: usize = GroupKind::all().iter().map(|&k| self.slot_count(k)).sum();
        if total == 0 {
            return Err(RigError::ConfigurationError(
                "no joint slots configured".into(),
            ));
        }

        Ok(())
    }
}
