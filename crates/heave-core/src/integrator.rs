//! Fixed-step time integration of rigid-body state.
//!
//! ```text
//! semi-implicit:  v(t+dt) = v(t) + a·dt ;  x(t+dt) = x(t) + v(t+dt)·dt
//! explicit:       x(t+dt) = x(t) + v(t)·dt ;  v(t+dt) = v(t) + a·dt
//! ```

use nalgebra::{UnitQuaternion, Vector3};

use crate::body::RigidBody;

/// Time integration scheme used by [`crate::BodySystem::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationMethod {
    /// Symplectic Euler. Stable for the oscillatory heave problem.
    #[default]
    SemiImplicitEuler,
    /// Forward Euler. Gains energy on oscillators; kept for comparison runs.
    ExplicitEuler,
}

/// Advance one body by `dt` under the given accelerations.
pub fn integrate(
    method: IntegrationMethod,
    body: &mut RigidBody,
    linear_accel: Vector3<f64>,
    angular_accel: Vector3<f64>,
    dt: f64,
) {
    match method {
        IntegrationMethod::SemiImplicitEuler => {
            body.linear_velocity += linear_accel * dt;
            body.angular_velocity += angular_accel * dt;
            body.position += body.linear_velocity * dt;
            let w = body.angular_velocity;
            integrate_rotation(&mut body.rotation, &w, dt);
        }
        IntegrationMethod::ExplicitEuler => {
            let v = body.linear_velocity;
            let w = body.angular_velocity;
            body.position += v * dt;
            integrate_rotation(&mut body.rotation, &w, dt);
            body.linear_velocity += linear_accel * dt;
            body.angular_velocity += angular_accel * dt;
        }
    }
}

/// Rotate `rotation` by the world-frame angular velocity `omega` over `dt`.
fn integrate_rotation(rotation: &mut UnitQuaternion<f64>, omega: &Vector3<f64>, dt: f64) {
    let angle = omega.norm() * dt;
    if angle < 1e-12 {
        return;
    }
    let delta = UnitQuaternion::from_scaled_axis(omega * dt);
    *rotation = delta * *rotation;
}
