use glam::Vec3A;
use vehiclesim::sim::*;

#[test]
fn properties_through_json() {
    let mut props = VehicleProperties::new(VehicleType::Sailboat);
    props
        .table
        .set(ParamSetting::Vector(VectorParam::AngularMotorDirection, Vec3A::new(0.0, 0.0, 0.8)));
    props.dynamics.linear_decay = ExponentialTimer::new(0.4);
    props.dynamics.last_access = 1_700_000_000.5;

    let json = serde_json::to_string(&props).unwrap();
    let back: VehicleProperties = serde_json::from_str(&json).unwrap();
    assert_eq!(back, props);

    // missing fields take their defaults
    let empty: VehicleProperties = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, VehicleProperties::default());
}
