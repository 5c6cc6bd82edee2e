use nalgebra::{DMatrix, DVector, Vector3, Vector6};
use tracing::{debug, info};

use crate::body::{BodyId, RigidBody};
use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::error::{CoreError, CoreResult};
use crate::force::{ForceContext, ForceProvider};
use crate::integrator::integrate;
use crate::trace::Sample;

/// Forces evaluated for one tick.
#[derive(Debug, Clone)]
struct ForceCache {
    tick: u64,
    /// Gravity, gyroscopic terms and provider loads.
    total: DVector<f64>,
    /// Provider loads only.
    external: DVector<f64>,
}

/// The top-level rigid-body system.
///
/// Owns the bodies, clock and registered force providers, and advances them
/// with a fixed step. Each step solves `(M + A)·a = F` for all bodies at
/// once, where `A` is the summed added mass of the providers.
pub struct BodySystem {
    config: SimConfig,
    clock: SimClock,
    bodies: Vec<RigidBody>,
    providers: Vec<Box<dyn ForceProvider>>,
    added_mass: Option<DMatrix<f64>>,
    cache: Option<ForceCache>,
    initialized: bool,
}

impl std::fmt::Debug for BodySystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodySystem")
            .field("tick", &self.clock.tick())
            .field("time", &self.clock.time())
            .field("bodies", &self.bodies.len())
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl BodySystem {
    /// Create an empty system. Fails if the configuration is invalid.
    pub fn new(config: SimConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            clock: SimClock::new(config.timestep),
            config,
            bodies: Vec::new(),
            providers: Vec::new(),
            added_mass: None,
            cache: None,
            initialized: false,
        })
    }

    /// Register a body. Names must be unique.
    pub fn add_body(&mut self, body: RigidBody) -> CoreResult<BodyId> {
        if self.initialized {
            return Err(CoreError::AlreadyInitialized);
        }
        if self.bodies.iter().any(|b| b.name == body.name) {
            return Err(CoreError::DuplicateBody(body.name));
        }
        body.check().map_err(|reason| CoreError::InvalidBody {
            name: body.name.clone(),
            reason,
        })?;
        let id = BodyId(self.bodies.len());
        debug!(body = %body.name, mass = body.mass, "added body");
        self.bodies.push(body);
        self.cache = None;
        Ok(id)
    }

    /// Register a force provider. Providers are evaluated in registration order.
    ///
    /// Providers are initialized once, so registration closes with [`init`](Self::init).
    pub fn add_force<P: ForceProvider + 'static>(&mut self, provider: P) -> CoreResult<()> {
        if self.initialized {
            return Err(CoreError::AlreadyInitialized);
        }
        self.providers.push(Box::new(provider));
        self.cache = None;
        Ok(())
    }

    /// Initialize all providers and assemble their added mass.
    pub fn init(&mut self) -> CoreResult<()> {
        if self.initialized {
            return Ok(());
        }
        let n = self.bodies.len();
        let dofs = 6 * n;
        let mut added: Option<DMatrix<f64>> = None;
        for provider in &mut self.providers {
            provider.init(&self.bodies, self.config.timestep)?;
            if let Some(a) = provider.added_mass(n) {
                if a.nrows() != dofs || a.ncols() != dofs {
                    return Err(CoreError::ForceDimension {
                        provider: provider.name().to_string(),
                        expected: dofs * dofs,
                        found: a.nrows() * a.ncols(),
                    });
                }
                added = Some(match added {
                    Some(sum) => sum + a,
                    None => a,
                });
            }
        }
        self.added_mass = added;
        self.initialized = true;
        info!(
            bodies = n,
            providers = self.providers.len(),
            timestep = self.config.timestep,
            "body system initialized"
        );
        Ok(())
    }

    /// Total generalized force on every body at the current state.
    ///
    /// Evaluated at most once per tick; later calls return the cached result.
    pub fn generalized_forces(&mut self) -> CoreResult<DVector<f64>> {
        Ok(self.evaluate()?.total.clone())
    }

    /// Summed provider force and moment on one body at the current state.
    pub fn provider_force(&mut self, id: BodyId) -> CoreResult<Vector6<f64>> {
        let body_count = self.bodies.len();
        if id.0 >= body_count {
            return Err(CoreError::BodyNotFound(id.to_string()));
        }
        let external = &self.evaluate()?.external;
        Ok(Vector6::from_fn(|i, _| external[id.dof_offset() + i]))
    }

    /// Snapshot of one body for trace output.
    pub fn sample(&mut self, id: BodyId) -> CoreResult<Sample> {
        let heave_force = self.provider_force(id)?[2];
        let body = &self.bodies[id.0];
        Ok(Sample {
            time: self.clock.time(),
            position: body.position,
            velocity: body.linear_velocity,
            heave_force,
        })
    }

    /// Advance the system by one fixed step.
    pub fn step(&mut self) -> CoreResult<()> {
        if !self.initialized {
            self.init()?;
        }
        let dofs = 6 * self.bodies.len();
        if dofs > 0 {
            let force = self.evaluate()?.total.clone();
            let mut mass = self.rigid_mass_matrix();
            if let Some(added) = &self.added_mass {
                mass += added;
            }
            let accel = mass
                .lu()
                .solve(&force)
                .ok_or(CoreError::SingularMassMatrix {
                    time: self.clock.time(),
                })?;
            let dt = self.config.timestep;
            let method = self.config.integrator;
            for (b, body) in self.bodies.iter_mut().enumerate() {
                let o = 6 * b;
                let lin = Vector3::new(accel[o], accel[o + 1], accel[o + 2]);
                let ang = Vector3::new(accel[o + 3], accel[o + 4], accel[o + 5]);
                integrate(method, body, lin, ang, dt);
            }
        }
        self.clock.advance();
        self.cache = None;
        Ok(())
    }

    /// Run the sampling loop: call `on_sample` then step, while `time <= end_time`.
    ///
    /// Returns the number of samples taken.
    pub fn run_sampled<F>(&mut self, mut on_sample: F) -> CoreResult<u64>
    where
        F: FnMut(&mut Self) -> CoreResult<()>,
    {
        self.init()?;
        let mut samples = 0;
        while self.clock.time() <= self.config.end_time {
            on_sample(self)?;
            samples += 1;
            self.step()?;
        }
        Ok(samples)
    }

    /// Current simulated time (s).
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Current tick.
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// The configuration this system was built with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// All bodies in registration order.
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    /// Look up a body by id.
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.0)
    }

    /// Mutable access to a body. Discards forces cached for this tick, both
    /// here and in every provider.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.cache = None;
        for provider in &mut self.providers {
            provider.invalidate();
        }
        self.bodies.get_mut(id.0)
    }

    /// Look up a body id by name.
    pub fn body_by_name(&self, name: &str) -> CoreResult<BodyId> {
        self.bodies
            .iter()
            .position(|b| b.name == name)
            .map(BodyId)
            .ok_or_else(|| CoreError::BodyNotFound(name.to_string()))
    }

    /// Access a force provider by downcasting to a concrete type.
    pub fn get_force<T: ForceProvider + 'static>(&self) -> Option<&T> {
        self.providers
            .iter()
            .find_map(|p| p.as_any().downcast_ref::<T>())
    }

    /// Access a force provider mutably by downcasting to a concrete type.
    pub fn get_force_mut<T: ForceProvider + 'static>(&mut self) -> Option<&mut T> {
        self.providers
            .iter_mut()
            .find_map(|p| p.as_any_mut().downcast_mut::<T>())
    }

    /// Evaluate forces for the current tick, reusing the cache when valid.
    fn evaluate(&mut self) -> CoreResult<&ForceCache> {
        if !self.initialized {
            self.init()?;
        }
        let tick = self.clock.tick();
        let fresh = match &self.cache {
            Some(cache) => cache.tick != tick,
            None => true,
        };
        if fresh {
            let cache = self.compute_forces()?;
            self.cache = Some(cache);
        }
        self.cache.as_ref().ok_or(CoreError::Provider {
            provider: "system".into(),
            message: "force cache missing after evaluation".into(),
        })
    }

    fn compute_forces(&mut self) -> CoreResult<ForceCache> {
        let dofs = 6 * self.bodies.len();
        let ctx = ForceContext {
            bodies: &self.bodies,
            time: self.clock.time(),
            tick: self.clock.tick(),
            timestep: self.config.timestep,
        };

        let mut external = DVector::zeros(dofs);
        for provider in &mut self.providers {
            let f = provider.generalized_forces(&ctx)?;
            if f.len() != dofs {
                return Err(CoreError::ForceDimension {
                    provider: provider.name().to_string(),
                    expected: dofs,
                    found: f.len(),
                });
            }
            external += f;
        }

        let mut total = external.clone();
        for (b, body) in self.bodies.iter().enumerate() {
            let o = 6 * b;
            let weight = self.config.gravity * body.mass;
            let w = body.angular_velocity;
            let gyro = -w.cross(&(body.world_inertia() * w));
            for i in 0..3 {
                total[o + i] += weight[i];
                total[o + 3 + i] += gyro[i];
            }
        }

        Ok(ForceCache {
            tick: self.clock.tick(),
            total,
            external,
        })
    }

    fn rigid_mass_matrix(&self) -> DMatrix<f64> {
        let dofs = 6 * self.bodies.len();
        let mut m = DMatrix::zeros(dofs, dofs);
        for (b, body) in self.bodies.iter().enumerate() {
            let o = 6 * b;
            for i in 0..3 {
                m[(o + i, o + i)] = body.mass;
            }
            m.view_mut((o + 3, o + 3), (3, 3))
                .copy_from(&body.world_inertia());
        }
        m
    }
}
