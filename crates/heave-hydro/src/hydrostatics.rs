use heave_core::RigidBody;
use nalgebra::{DVector, Vector6};

use crate::data::BodyHydroData;

/// Linear restoring force plus buoyancy on one body.
///
/// The displacement is measured from the equilibrium pose `[cg, 0, 0, 0]`.
/// Buoyancy `ρ·g·V` acts upward through the centre of buoyancy, so an offset
/// between `cb` and `cg` adds a roll and pitch moment.
pub fn hydrostatic_force(body: &RigidBody, data: &BodyHydroData) -> Vector6<f64> {
    let cg = data.cg();
    let equilibrium = Vector6::new(cg.x, cg.y, cg.z, 0.0, 0.0, 0.0);
    let displacement = body.generalized_position() - equilibrium;
    let displacement = DVector::from_column_slice(displacement.as_slice());
    let restoring = -(data.hydrostatic_stiffness() * displacement);

    let mut force = Vector6::from_column_slice(restoring.as_slice());
    let buoyancy = data.rho() * data.g() * data.disp_vol();
    let arm = data.cb() - cg;
    force[2] += buoyancy;
    force[3] -= buoyancy * arm.y;
    force[4] += buoyancy * arm.x;
    force
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HydroData;
    use crate::data::tests::sphere_json;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn sphere_data() -> HydroData {
        HydroData::from_json_str(&sphere_json(3, 0.1).to_string()).unwrap()
    }

    #[test]
    fn buoyancy_at_equilibrium() {
        let data = sphere_data();
        let body = RigidBody::new("body1", 1.0);
        let f = hydrostatic_force(&body, data.body("body1").unwrap());
        assert_relative_eq!(f[2], 1000.0 * 9.81 * 261.799, epsilon = 1e-6);
        // cb sits directly below cg
        assert_relative_eq!(f[3], 0.0);
        assert_relative_eq!(f[4], 0.0);
    }

    #[test]
    fn restoring_force_opposes_heave() {
        let data = sphere_data();
        let body = RigidBody::new("body1", 1.0).with_position(Vector3::new(0.0, 0.0, -1.0));
        let f = hydrostatic_force(&body, data.body("body1").unwrap());
        let buoyancy = 1000.0 * 9.81 * 261.799;
        assert_relative_eq!(f[2] - buoyancy, 78.54 * 9810.0, epsilon = 1e-6);
    }

    #[test]
    fn offset_buoyancy_centre_adds_moments() {
        let mut doc = sphere_json(3, 0.1);
        doc["body1"]["properties"]["cb"] = serde_json::json!([0.5, 0.25, -1.0]);
        let data = HydroData::from_json_str(&doc.to_string()).unwrap();
        let body = RigidBody::new("body1", 1.0);
        let f = hydrostatic_force(&body, data.body("body1").unwrap());
        let b = 1000.0 * 9.81 * 261.799;
        assert_relative_eq!(f[3], -b * 0.25, epsilon = 1e-6);
        assert_relative_eq!(f[4], b * 0.5, epsilon = 1e-6);
    }
}
