use std::f64::consts::PI;

use crate::config::SimulationConfig;

use super::forces::Force;

const INITIAL_RADIUS: f64 = 10.0;

/// Deterministic linear congruential generator, so layouts are reproducible
/// for the same input.
#[derive(Clone, Debug)]
pub struct Lcg(u64);

impl Default for Lcg {
	fn default() -> Self {
		Self(1)
	}
}

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	/// Uniform value in `[0, 1)`.
	pub fn next_f64(&mut self) -> f64 {
		self.0 = (Self::A.wrapping_mul(self.0).wrapping_add(Self::C)) % Self::M;
		self.0 as f64 / Self::M as f64
	}
}

/// Per-node layout state.
#[derive(Clone, Debug, Default)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
	placed: bool,
}

impl Particle {
	/// A particle that still has to be placed by the first tick.
	pub fn unplaced() -> Self {
		Self::default()
	}

	pub fn at(x: f64, y: f64) -> Self {
		Self {
			x,
			y,
			placed: true,
			..Self::default()
		}
	}

	pub fn is_placed(&self) -> bool {
		self.placed
	}

	pub fn pin(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
	}

	pub fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}

	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	/// Copy for a rebuilt layout: position and velocity survive, pins do not.
	/// An unplaced particle stays unplaced.
	pub fn carried(&self) -> Self {
		Self {
			fx: None,
			fy: None,
			..self.clone()
		}
	}
}

/// Velocity-Verlet style force simulation with an exponentially cooling
/// alpha. Forces run in insertion order every tick.
pub struct Simulation {
	particles: Vec<Particle>,
	forces: Vec<Box<dyn Force>>,
	origin: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	alpha_min: f64,
	alpha_decay: f64,
	velocity_decay: f64,
	running: bool,
	rng: Lcg,
}

impl Simulation {
	pub fn new(particles: Vec<Particle>, origin: (f64, f64), config: &SimulationConfig) -> Self {
		Self {
			particles,
			forces: Vec::new(),
			origin,
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_min: config.alpha_min,
			alpha_decay: 1.0 - config.alpha_min.powf(1.0 / config.cooling_ticks),
			velocity_decay: 1.0 - config.velocity_decay,
			running: true,
			rng: Lcg::default(),
		}
	}

	pub fn with_force(mut self, mut force: impl Force + 'static) -> Self {
		force.initialize(&self.particles);
		self.forces.push(Box::new(force));
		self
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	pub fn particle(&self, idx: usize) -> Option<&Particle> {
		self.particles.get(idx)
	}

	pub fn particle_mut(&mut self, idx: usize) -> Option<&mut Particle> {
		self.particles.get_mut(idx)
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Resume ticking after the simulation cooled down.
	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Continue at the temperature `previous` had reached.
	pub fn resume(&mut self, previous: &Simulation) {
		self.alpha = previous.alpha;
		self.running = previous.running;
	}

	/// Move the point unplaced particles spread out from and let every force
	/// that holds a centre follow it.
	pub fn recenter(&mut self, x: f64, y: f64) {
		self.origin = (x, y);
		for force in &mut self.forces {
			force.recenter(x, y);
		}
	}

	/// Phyllotaxis placement around the origin for particles without a
	/// position yet.
	fn place_unplaced(&mut self) {
		let angle_step = PI * (3.0 - 5f64.sqrt());
		let (ox, oy) = self.origin;
		for (i, p) in self.particles.iter_mut().enumerate() {
			if p.placed {
				continue;
			}
			let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
			let angle = i as f64 * angle_step;
			p.x = p.fx.unwrap_or(ox + radius * angle.cos());
			p.y = p.fy.unwrap_or(oy + radius * angle.sin());
			p.placed = true;
		}
	}

	/// One integration step. Returns whether the simulation is still hot.
	pub fn tick(&mut self) -> bool {
		self.place_unplaced();
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

		for force in &mut self.forces {
			force.apply(&mut self.particles, self.alpha, &mut self.rng);
		}

		for p in &mut self.particles {
			match p.fx {
				Some(fx) => {
					p.x = fx;
					p.vx = 0.0;
				}
				None => {
					p.vx *= self.velocity_decay;
					p.x += p.vx;
				}
			}
			match p.fy {
				Some(fy) => {
					p.y = fy;
					p.vy = 0.0;
				}
				None => {
					p.vy *= self.velocity_decay;
					p.y += p.vy;
				}
			}
		}

		if self.alpha < self.alpha_min {
			self.running = false;
		}
		self.running
	}
}
