use std::f64::consts::PI;

use nalgebra::{Matrix3, UnitQuaternion, Vector3, Vector6};

/// Index of a body within a [`crate::BodySystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl BodyId {
    /// Offset of this body's first degree of freedom in a 6N generalized vector.
    pub fn dof_offset(self) -> usize {
        6 * self.0
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Collision-free geometry attached to a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// A solid sphere centred on the body origin.
    Sphere {
        /// Sphere radius (m).
        radius: f64,
    },
}

/// A rigid body with six degrees of freedom.
///
/// Positions and velocities are expressed in the world frame. The inertia
/// tensor is stored in the body frame and rotated on demand.
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// Unique name; hydrodynamic data is looked up by it.
    pub name: String,
    /// Mass (kg).
    pub mass: f64,
    /// Body-frame inertia tensor about the centre of mass (kg·m²).
    pub inertia: Matrix3<f64>,
    /// Centre-of-mass position (m).
    pub position: Vector3<f64>,
    /// Orientation of the body frame.
    pub rotation: UnitQuaternion<f64>,
    /// Linear velocity (m/s).
    pub linear_velocity: Vector3<f64>,
    /// Angular velocity (rad/s).
    pub angular_velocity: Vector3<f64>,
    /// Optional geometry.
    pub shape: Option<Shape>,
}

impl RigidBody {
    /// Create a body at rest at the origin with unit inertia.
    pub fn new(name: impl Into<String>, mass: f64) -> Self {
        Self {
            name: name.into(),
            mass,
            inertia: Matrix3::identity(),
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            shape: None,
        }
    }

    /// Create a solid sphere whose mass and inertia follow from its density.
    pub fn sphere(name: impl Into<String>, radius: f64, density: f64) -> Self {
        let mass = density * 4.0 / 3.0 * PI * radius.powi(3);
        let i = 0.4 * mass * radius * radius;
        Self {
            inertia: Matrix3::from_diagonal_element(i),
            shape: Some(Shape::Sphere { radius }),
            ..Self::new(name, mass)
        }
    }

    /// Replace the mass. The inertia tensor is left as constructed.
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Set the body-frame inertia tensor.
    pub fn with_inertia(mut self, inertia: Matrix3<f64>) -> Self {
        self.inertia = inertia;
        self
    }

    /// Set the centre-of-mass position.
    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    /// Set the orientation.
    pub fn with_rotation(mut self, rotation: UnitQuaternion<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the initial linear velocity.
    pub fn with_linear_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Vertical position of the centre of mass.
    pub fn heave(&self) -> f64 {
        self.position.z
    }

    /// Inertia tensor rotated into the world frame.
    pub fn world_inertia(&self) -> Matrix3<f64> {
        let r = self.rotation.to_rotation_matrix();
        r.matrix() * self.inertia * r.matrix().transpose()
    }

    /// XYZ Euler angles (roll, pitch, yaw) of the current orientation.
    pub fn euler_angles(&self) -> Vector3<f64> {
        let (roll, pitch, yaw) = self.rotation.euler_angles();
        Vector3::new(roll, pitch, yaw)
    }

    /// Position followed by Euler angles.
    pub fn generalized_position(&self) -> Vector6<f64> {
        let e = self.euler_angles();
        Vector6::new(
            self.position.x,
            self.position.y,
            self.position.z,
            e.x,
            e.y,
            e.z,
        )
    }

    /// Linear velocity followed by angular velocity.
    pub fn generalized_velocity(&self) -> Vector6<f64> {
        let v = self.linear_velocity;
        let w = self.angular_velocity;
        Vector6::new(v.x, v.y, v.z, w.x, w.y, w.z)
    }

    /// Check invariants the stepper relies on. Returns a reason on failure.
    pub(crate) fn check(&self) -> Result<(), String> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(format!("mass must be positive, got {}", self.mass));
        }
        if self.inertia.iter().any(|v| !v.is_finite()) {
            return Err("inertia must be finite".into());
        }
        if self.position.iter().any(|v| !v.is_finite()) {
            return Err("position must be finite".into());
        }
        match self.shape {
            Some(Shape::Sphere { radius }) if !radius.is_finite() || radius <= 0.0 => {
                Err(format!("sphere radius must be positive, got {radius}"))
            }
            _ => Ok(()),
        }
    }
}
