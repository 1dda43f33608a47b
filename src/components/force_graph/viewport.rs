//! Scene-wide pan and zoom.

use super::config::ViewportConfig;

/// Scene-wide pan and zoom: screen = graph * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
	/// Horizontal offset in pixels.
	pub x: f64,
	/// Vertical offset in pixels.
	pub y: f64,
	/// Scale factor.
	pub k: f64,
}

impl ZoomTransform {
	/// No pan, unit scale.
	pub const IDENTITY: Self = Self {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	/// Graph point to screen point.
	pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
		(x * self.k + self.x, y * self.k + self.y)
	}

	/// Screen point to graph point.
	pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Shift by (`dx`, `dy`) graph units.
	fn translate(self, dx: f64, dy: f64) -> Self {
		Self {
			x: self.x + self.k * dx,
			y: self.y + self.k * dy,
			k: self.k,
		}
	}
}

impl Default for ZoomTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

/// The visible window onto the graph. Only ever changes the transform;
/// node coordinates are never touched.
#[derive(Clone, Debug)]
pub struct Viewport {
	transform: ZoomTransform,
	width: f64,
	height: f64,
	config: ViewportConfig,
}

impl Viewport {
	/// Starts at 1x with the graph origin in the middle of the canvas.
	pub fn new(width: f64, height: f64, config: ViewportConfig) -> Self {
		let mut viewport = Self {
			transform: ZoomTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			width,
			height,
			config,
		};
		viewport.set_transform(viewport.transform);
		viewport
	}

	/// Current transform.
	pub fn transform(&self) -> ZoomTransform {
		self.transform
	}

	/// Pannable region in graph coordinates.
	pub fn translate_extent(&self) -> [[f64; 2]; 2] {
		self.config.translate_extent.unwrap_or([
			[-self.width / 2.0, -self.height / 2.0],
			[self.width / 2.0, self.height / 2.0],
		])
	}

	/// Follow a canvas size change, re-applying the extents.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.set_transform(self.transform);
	}

	/// Clamp the scale, then keep the translate extent covering the canvas.
	pub fn set_transform(&mut self, t: ZoomTransform) {
		let [k0, k1] = self.config.scale_extent;
		let k = t.k.clamp(k0, k1);
		self.transform = self.constrain(ZoomTransform { k, ..t });
	}

	/// Pan by a screen-space offset.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		let t = self.transform;
		self.set_transform(ZoomTransform {
			x: t.x + dx,
			y: t.y + dy,
			k: t.k,
		});
	}

	/// Scale by `factor` keeping the graph point under (`sx`, `sy`) fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let t = self.transform;
		let [k0, k1] = self.config.scale_extent;
		let k = (t.k * factor).clamp(k0, k1);
		let ratio = k / t.k;
		self.set_transform(ZoomTransform {
			x: sx - (sx - t.x) * ratio,
			y: sy - (sy - t.y) * ratio,
			k,
		});
	}

	/// One wheel notch; positive `delta_y` zooms out. A purely horizontal
	/// scroll (`delta_y == 0`) leaves the zoom alone.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if delta_y == 0.0 {
			return;
		}
		let factor = if delta_y > 0.0 {
			1.0 / self.config.wheel_factor
		} else {
			self.config.wheel_factor
		};
		self.zoom_at(sx, sy, factor);
	}

	/// Screen point to graph point.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.transform.invert(sx, sy)
	}

	/// Graph point to screen point.
	pub fn graph_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
		self.transform.apply(x, y)
	}

	fn constrain(&self, t: ZoomTransform) -> ZoomTransform {
		let [[ex0, ey0], [ex1, ey1]] = self.translate_extent();
		let (vx0, vy0) = t.invert(0.0, 0.0);
		let (vx1, vy1) = t.invert(self.width, self.height);
		let shift = |d0: f64, d1: f64| {
			if d1 > d0 {
				// Extent smaller than the view: centre it.
				(d0 + d1) / 2.0
			} else if d0 < 0.0 {
				d0
			} else {
				d1.max(0.0)
			}
		};
		t.translate(shift(vx0 - ex0, vx1 - ex1), shift(vy0 - ey0, vy1 - ey1))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn viewport() -> Viewport {
		Viewport::new(800.0, 600.0, ViewportConfig::default())
	}

	#[test]
	fn starts_centred_at_unit_scale() {
		let v = viewport();
		assert_eq!(v.transform(), ZoomTransform { x: 400.0, y: 300.0, k: 1.0 });
		assert_eq!(v.graph_to_screen(0.0, 0.0), (400.0, 300.0));
		assert_eq!(v.screen_to_graph(0.0, 0.0), (-400.0, -300.0));
	}

	#[test]
	fn scale_is_clamped_to_extent() {
		let mut v = viewport();
		v.zoom_at(400.0, 300.0, 100.0);
		assert_eq!(v.transform().k, 8.0);
		v.zoom_at(400.0, 300.0, 0.001);
		assert_eq!(v.transform().k, 1.0);
		for _ in 0..40 {
			v.wheel(10.0, 10.0, -1.0);
		}
		assert_eq!(v.transform().k, 8.0);
	}

	#[test]
	fn pan_is_blocked_at_unit_scale() {
		let mut v = viewport();
		v.pan_by(50.0, -30.0);
		assert_eq!(v.transform(), ZoomTransform { x: 400.0, y: 300.0, k: 1.0 });
	}

	#[test]
	fn pan_stops_at_the_canvas_edge_when_zoomed() {
		let mut v = viewport();
		v.zoom_at(400.0, 300.0, 2.0);
		assert_eq!(v.transform(), ZoomTransform { x: 400.0, y: 300.0, k: 2.0 });

		v.pan_by(100.0, 0.0);
		assert_eq!(v.transform().x, 500.0);

		v.pan_by(10_000.0, 10_000.0);
		// The extent's top-left corner sits on the canvas's top-left corner.
		assert_eq!(v.graph_to_screen(-400.0, -300.0), (0.0, 0.0));
	}

	#[test]
	fn zoom_keeps_the_pointer_anchored() {
		let mut v = viewport();
		let anchor = v.screen_to_graph(500.0, 350.0);
		v.zoom_at(500.0, 350.0, 3.0);
		let (x, y) = v.screen_to_graph(500.0, 350.0);
		assert!((x - anchor.0).abs() < 1e-9 && (y - anchor.1).abs() < 1e-9);
	}

	#[test]
	fn horizontal_scroll_does_not_zoom() {
		let mut v = viewport();
		v.wheel(400.0, 300.0, 0.0);
		assert_eq!(v.transform(), ZoomTransform { x: 400.0, y: 300.0, k: 1.0 });
		v.wheel(400.0, 300.0, 3.0);
		assert_eq!(v.transform().k, 1.0);
	}

	#[test]
	fn resize_moves_the_extent_with_the_canvas() {
		let mut v = viewport();
		v.resize(1000.0, 700.0);
		assert_eq!(v.transform(), ZoomTransform { x: 500.0, y: 350.0, k: 1.0 });
		assert_eq!(v.translate_extent(), [[-500.0, -350.0], [500.0, 350.0]]);

		v.zoom_at(500.0, 350.0, 2.0);
		v.pan_by(-10_000.0, -10_000.0);
		assert_eq!(v.screen_to_graph(1000.0, 700.0), (500.0, 350.0));
	}

	#[test]
	fn custom_translate_extent() {
		let cfg = ViewportConfig {
			translate_extent: Some([[-1000.0, -1000.0], [1000.0, 1000.0]]),
			..Default::default()
		};
		let mut v = Viewport::new(800.0, 600.0, cfg);
		v.pan_by(200.0, 0.0);
		assert_eq!(v.transform().x, 600.0);
		v.pan_by(1000.0, 0.0);
		assert_eq!(v.screen_to_graph(0.0, 0.0).0, -1000.0);
	}
}
