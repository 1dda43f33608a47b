use serde::Deserialize;

use crate::error::Result;

/// Spring between the two ends of every edge.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkForce {
	/// Rest length of a link.
	pub distance: f64,
	/// `None` uses `1 / min(degree(source), degree(target))`.
	pub strength: Option<f64>,
}

impl Default for LinkForce {
	fn default() -> Self {
		Self {
			distance: 30.0,
			strength: None,
		}
	}
}

/// Node-node repulsion. Negative strength repels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManyBodyForce {
	/// Negative repels, positive attracts.
	pub strength: f64,
	/// Shorter distances are clamped to this.
	pub distance_min: f64,
	/// Pairs further apart than this ignore each other.
	pub distance_max: Option<f64>,
	/// Barnes-Hut opening criterion; `None` computes every pair exactly.
	pub theta: Option<f64>,
}

impl Default for ManyBodyForce {
	fn default() -> Self {
		Self {
			strength: -30.0,
			distance_min: 1.0,
			distance_max: None,
			theta: Some(0.9),
		}
	}
}

/// Pull toward (`x`, `y`) on each axis independently.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CenterForce {
	/// Target x.
	pub x: f64,
	/// Target y.
	pub y: f64,
	/// Fraction of the offset applied per tick, before alpha.
	pub strength: f64,
}

impl Default for CenterForce {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			strength: 0.1,
		}
	}
}

/// Forces and cooling schedule for a [`Simulation`](super::Simulation).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Spring along each edge.
	pub link: LinkForce,
	/// Repulsion between every node pair.
	pub charge: ManyBodyForce,
	/// Pull toward the centre.
	pub center: CenterForce,
	/// Starting temperature.
	pub alpha: f64,
	/// Scheduled ticking stops below this.
	pub alpha_min: f64,
	/// Fraction of the gap to `alpha_target` closed per tick.
	pub alpha_decay: f64,
	/// Resting temperature.
	pub alpha_target: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Alpha target while a node is being dragged.
	pub drag_alpha_target: f64,
	/// Seed for the jiggle applied to coincident nodes.
	pub seed: u32,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			link: LinkForce::default(),
			charge: ManyBodyForce::default(),
			center: CenterForce::default(),
			alpha: 1.0,
			alpha_min,
			// reaches alpha_min from 1 in 300 ticks
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
			drag_alpha_target: 0.4,
			seed: 1,
		}
	}
}

impl LayoutConfig {
	/// Defaults overridden by whatever fields `json` sets.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

/// Pan and zoom limits.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
	/// Minimum and maximum zoom.
	pub scale_extent: [f64; 2],
	/// Pannable region in graph coordinates as `[[x0, y0], [x1, y1]]`.
	/// `None` uses the canvas bounds centred on the origin.
	pub translate_extent: Option<[[f64; 2]; 2]>,
	/// Zoom factor per wheel notch.
	pub wheel_factor: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			scale_extent: [1.0, 8.0],
			translate_extent: None,
			wheel_factor: 1.1,
		}
	}
}
