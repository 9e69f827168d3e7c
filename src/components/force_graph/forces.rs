//! Forces composed by the [`Simulation`](super::simulation::Simulation).
//!
//! Each force nudges particle velocities (or, for centering, positions) once
//! per tick, scaled by the current alpha.

use super::simulation::{Lcg, Particle};

pub trait Force {
	/// Called once when the force is attached, with the final particle set.
	fn initialize(&mut self, _particles: &[Particle]) {}

	fn apply(&mut self, particles: &mut [Particle], alpha: f64, rng: &mut Lcg);

	/// The viewport centre moved.
	fn recenter(&mut self, _x: f64, _y: f64) {}
}

/// Tiny random offset used to separate coincident particles.
fn jiggle(rng: &mut Lcg) -> f64 {
	(rng.next_f64() - 0.5) * 1e-6
}

/// Spring between linked particles with a rest length of `distance`.
pub struct LinkForce {
	links: Vec<(usize, usize)>,
	bias: Vec<f64>,
	distance: f64,
	strength: f64,
}

impl LinkForce {
	pub fn new(links: Vec<(usize, usize)>, distance: f64, strength: f64) -> Self {
		Self {
			links,
			bias: Vec::new(),
			distance,
			strength,
		}
	}
}

impl Force for LinkForce {
	fn initialize(&mut self, particles: &[Particle]) {
		let n = particles.len();
		self.links.retain(|&(s, t)| s < n && t < n && s != t);
		let mut degree = vec![0usize; n];
		for &(s, t) in &self.links {
			degree[s] += 1;
			degree[t] += 1;
		}
		// Low-degree endpoints absorb more of the correction.
		self.bias = self
			.links
			.iter()
			.map(|&(s, t)| degree[s] as f64 / (degree[s] + degree[t]) as f64)
			.collect();
	}

	fn apply(&mut self, particles: &mut [Particle], alpha: f64, rng: &mut Lcg) {
		for (&(s, t), &bias) in self.links.iter().zip(&self.bias) {
			let (src, tgt) = (&particles[s], &particles[t]);
			let mut x = tgt.x + tgt.vx - src.x - src.vx;
			let mut y = tgt.y + tgt.vy - src.y - src.vy;
			if x == 0.0 {
				x = jiggle(rng);
			}
			if y == 0.0 {
				y = jiggle(rng);
			}
			let len = (x * x + y * y).sqrt();
			let scale = (len - self.distance) / len * alpha * self.strength;
			let (x, y) = (x * scale, y * scale);

			let tgt = &mut particles[t];
			tgt.vx -= x * bias;
			tgt.vy -= y * bias;
			let src = &mut particles[s];
			src.vx += x * (1.0 - bias);
			src.vy += y * (1.0 - bias);
		}
	}
}

/// Pairwise charge; negative strength repels.
pub struct ManyBodyForce {
	strength: f64,
	distance_min2: f64,
}

impl ManyBodyForce {
	pub fn new(strength: f64) -> Self {
		Self {
			strength,
			distance_min2: 1.0,
		}
	}
}

impl Force for ManyBodyForce {
	fn apply(&mut self, particles: &mut [Particle], alpha: f64, rng: &mut Lcg) {
		let n = particles.len();
		for i in 0..n {
			let (xi, yi) = (particles[i].x, particles[i].y);
			let (mut dvx, mut dvy) = (0.0, 0.0);
			for (j, other) in particles.iter().enumerate() {
				if i == j {
					continue;
				}
				let mut x = other.x - xi;
				let mut y = other.y - yi;
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = jiggle(rng);
					l += x * x;
				}
				if y == 0.0 {
					y = jiggle(rng);
					l += y * y;
				}
				if l < self.distance_min2 {
					l = (self.distance_min2 * l).sqrt();
				}
				dvx += x * self.strength * alpha / l;
				dvy += y * self.strength * alpha / l;
			}
			particles[i].vx += dvx;
			particles[i].vy += dvy;
		}
	}
}

/// Translates the whole layout so its centroid sits on `(x, y)`.
pub struct CenterForce {
	x: f64,
	y: f64,
}

impl CenterForce {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

impl Force for CenterForce {
	fn recenter(&mut self, x: f64, y: f64) {
		self.x = x;
		self.y = y;
	}

	fn apply(&mut self, particles: &mut [Particle], _alpha: f64, _rng: &mut Lcg) {
		if particles.is_empty() {
			return;
		}
		let n = particles.len() as f64;
		let (sx, sy) = particles
			.iter()
			.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
		let (dx, dy) = (sx / n - self.x, sy / n - self.y);
		for p in particles {
			p.x -= dx;
			p.y -= dy;
		}
	}
}

/// Keeps circles of the given radii from overlapping.
pub struct CollideForce {
	radii: Vec<f64>,
	strength: f64,
}

impl CollideForce {
	pub fn new(radii: Vec<f64>) -> Self {
		Self {
			radii,
			strength: 1.0,
		}
	}

	fn radius(&self, i: usize) -> f64 {
		self.radii.get(i).copied().unwrap_or(0.0)
	}
}

impl Force for CollideForce {
	fn apply(&mut self, particles: &mut [Particle], _alpha: f64, rng: &mut Lcg) {
		let n = particles.len();
		for i in 0..n {
			let ri = self.radius(i);
			let ri2 = ri * ri;
			for j in (i + 1)..n {
				let rj = self.radius(j);
				let r = ri + rj;
				let (a, b) = (&particles[i], &particles[j]);
				let mut x = a.x + a.vx - b.x - b.vx;
				let mut y = a.y + a.vy - b.y - b.vy;
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = jiggle(rng);
					l += x * x;
				}
				if y == 0.0 {
					y = jiggle(rng);
					l += y * y;
				}
				let dist = l.sqrt();
				let push = (r - dist) / dist * self.strength;
				let (x, y) = (x * push, y * push);
				let share = rj * rj / (ri2 + rj * rj);

				particles[i].vx += x * share;
				particles[i].vy += y * share;
				particles[j].vx -= x * (1.0 - share);
				particles[j].vy -= y * (1.0 - share);
			}
		}
	}
}
