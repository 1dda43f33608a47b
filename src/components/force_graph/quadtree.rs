//! Barnes-Hut approximation of the many-body force.

use super::simulation::Lcg;

/// Below this cell size points are stacked in one leaf instead of splitting.
const MAX_DEPTH: usize = 48;

#[derive(Clone, Debug, Default)]
struct Cell {
	children: [Option<usize>; 4],
	/// Only leaves hold points.
	points: Vec<usize>,
	cx: f64,
	cy: f64,
	value: f64,
}

impl Cell {
	fn is_leaf(&self) -> bool {
		self.children.iter().all(Option::is_none)
	}
}

/// Strength parameters shared by every node.
pub(super) struct Charge {
	pub strength: f64,
	pub alpha: f64,
	pub theta2: f64,
	pub distance_min2: f64,
	pub distance_max2: f64,
}

pub(super) struct QuadTree<'a> {
	cells: Vec<Cell>,
	positions: &'a [(f64, f64)],
	size: f64,
}

impl<'a> QuadTree<'a> {
	pub fn build(positions: &'a [(f64, f64)], strength: f64) -> Self {
		let (mut x0, mut y0, mut x1, mut y1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
		for &(x, y) in positions {
			x0 = x0.min(x);
			y0 = y0.min(y);
			x1 = x1.max(x);
			y1 = y1.max(y);
		}
		// Padded so points on the max edge still fall inside the root.
		let size = (x1 - x0).max(y1 - y0).max(1.0) * (1.0 + 1e-9);
		let mut tree = Self {
			cells: vec![Cell::default()],
			positions,
			size,
		};
		for i in 0..positions.len() {
			tree.insert(i, x0, y0);
		}
		tree.accumulate(strength);
		tree
	}

	fn child(&mut self, cell: usize, quadrant: usize) -> usize {
		if let Some(c) = self.cells[cell].children[quadrant] {
			return c;
		}
		let c = self.cells.len();
		self.cells.push(Cell::default());
		self.cells[cell].children[quadrant] = Some(c);
		c
	}

	fn insert(&mut self, i: usize, mut x0: f64, mut y0: f64) {
		let p = self.positions[i];
		let (mut cell, mut size, mut depth) = (0, self.size, 0);
		loop {
			if self.cells[cell].is_leaf() {
				let coincident = self.cells[cell]
					.points
					.first()
					.map_or(true, |&q| self.positions[q] == p);
				if coincident || depth >= MAX_DEPTH {
					self.cells[cell].points.push(i);
					return;
				}
				// Leaf points share one position, so they move down together.
				let existing = std::mem::take(&mut self.cells[cell].points);
				let (q, _, _) = quadrant(self.positions[existing[0]], x0, y0, size / 2.0);
				let c = self.child(cell, q);
				self.cells[c].points = existing;
			}
			let half = size / 2.0;
			let (q, cx0, cy0) = quadrant(p, x0, y0, half);
			cell = self.child(cell, q);
			(x0, y0, size) = (cx0, cy0, half);
			depth += 1;
		}
	}

	fn accumulate(&mut self, strength: f64) {
		let positions = self.positions;
		// Children are always pushed after their parent.
		for c in (0..self.cells.len()).rev() {
			if self.cells[c].is_leaf() {
				let cell = &mut self.cells[c];
				let n = cell.points.len() as f64;
				let (sx, sy) = cell
					.points
					.iter()
					.fold((0.0, 0.0), |(sx, sy), &i| (sx + positions[i].0, sy + positions[i].1));
				if n > 0.0 {
					(cell.cx, cell.cy) = (sx / n, sy / n);
				}
				cell.value = strength * n;
				continue;
			}
			let (mut value, mut weight, mut x, mut y) = (0.0, 0.0, 0.0, 0.0);
			for child in self.cells[c].children.into_iter().flatten() {
				let child = &self.cells[child];
				let w = child.value.abs();
				if w > 0.0 {
					value += child.value;
					weight += w;
					x += w * child.cx;
					y += w * child.cy;
				}
			}
			let cell = &mut self.cells[c];
			if weight > 0.0 {
				(cell.cx, cell.cy) = (x / weight, y / weight);
			}
			cell.value = value;
		}
	}

	/// Velocity change on node `i` from every other node.
	pub fn force_on(&self, i: usize, charge: &Charge, random: &mut Lcg) -> (f64, f64) {
		let (px, py) = self.positions[i];
		let (mut vx, mut vy) = (0.0, 0.0);
		let mut stack = vec![(0usize, self.size)];
		while let Some((c, w)) = stack.pop() {
			let cell = &self.cells[c];
			if cell.value == 0.0 {
				continue;
			}
			let (x, y) = (cell.cx - px, cell.cy - py);
			let l = x * x + y * y;

			if w * w / charge.theta2 < l {
				if l < charge.distance_max2 {
					let (dx, dy) = pull(x, y, l, cell.value, charge, random);
					vx += dx;
					vy += dy;
				}
				continue;
			}
			if !cell.is_leaf() || l >= charge.distance_max2 {
				stack.extend(cell.children.iter().flatten().map(|&child| (child, w / 2.0)));
				continue;
			}
			for &j in cell.points.iter().filter(|&&j| j != i) {
				let (x, y) = (self.positions[j].0 - px, self.positions[j].1 - py);
				let (dx, dy) = pull(x, y, x * x + y * y, charge.strength, charge, random);
				vx += dx;
				vy += dy;
			}
		}
		(vx, vy)
	}
}

/// Single-body interaction along (`x`, `y`) at squared distance `l`.
pub(super) fn pull(
	mut x: f64,
	mut y: f64,
	mut l: f64,
	value: f64,
	charge: &Charge,
	random: &mut Lcg,
) -> (f64, f64) {
	if x == 0.0 {
		x = random.jiggle();
		l += x * x;
	}
	if y == 0.0 {
		y = random.jiggle();
		l += y * y;
	}
	if l < charge.distance_min2 {
		l = (charge.distance_min2 * l).sqrt();
	}
	let w = value * charge.alpha / l;
	(x * w, y * w)
}

fn quadrant((x, y): (f64, f64), x0: f64, y0: f64, half: f64) -> (usize, f64, f64) {
	let right = x >= x0 + half;
	let below = y >= y0 + half;
	(
		right as usize | (below as usize) << 1,
		if right { x0 + half } else { x0 },
		if below { y0 + half } else { y0 },
	)
}
