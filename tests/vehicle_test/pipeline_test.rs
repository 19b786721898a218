use std::f32::consts::PI;
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use glam::{Quat, Vec2, Vec3A};
use vehiclesim::consts::{DEFAULT_SLEEP_THRESHOLD, decay, limits::MAX_HOVER_TIMESCALE};
use vehiclesim::sim::*;

use crate::common::*;

fn motors_only() -> SimulationConfig {
    config_with(StageEnables {
        motors: true,
        ..StageEnables::NONE
    })
}

#[test]
fn config_defaults() {
    let config = SimulationConfig::default();
    assert_eq!(config.enable, StageEnables::DEFAULT);
    assert!(config.enable.motors && config.enable.spike_detection);
    assert_eq!(config.debug, DebugSwitches::default());
    assert_eq!(config.gravity, -9.8);
    assert_eq!(config.default_sleep_threshold, DEFAULT_SLEEP_THRESHOLD);
}

#[test]
fn motor_command_through_the_store() {
    let mut rig = Rig::new(VehicleType::Car, motors_only());
    let store = rig.store();

    store.set_vector(VectorParam::LinearMotorDirection, Vec3A::new(3.0, 0.0, 0.0));
    store.set_vector(VectorParam::AngularMotorDirection, Vec3A::new(0.0, 0.0, 1.0));
    assert_eq!(rig.dynamics.state().linear_direction, Vec3A::ZERO);

    rig.apply();
    let state = rig.dynamics.state();
    assert_eq!(state.linear_direction, Vec3A::new(3.0, 0.0, 0.0));
    assert_eq!(state.angular_direction, Vec3A::new(0.0, 0.0, 1.0));
    assert_eq!(state.last_access, rig.clock.now());
    assert_eq!(
        rig.dynamics.params().vector(VectorParam::LinearMotorDirection),
        Vec3A::new(3.0, 0.0, 0.0)
    );
    assert!(!store.has_pending_changes());
}

#[test]
fn direct_motor_calls() {
    let mut rig = Rig::new(VehicleType::Boat, motors_only());
    rig.dynamics.move_linear(&mut rig.body, Vec3A::new(1.0, 0.0, 0.0));
    rig.dynamics.move_angular(&mut rig.body, Vec3A::new(0.0, 0.0, -0.5));

    assert_eq!(rig.dynamics.state().linear_direction, Vec3A::new(1.0, 0.0, 0.0));
    assert_eq!(rig.dynamics.state().angular_direction, Vec3A::new(0.0, 0.0, -0.5));
    assert!(rig.body.wake_count >= 2);
}

#[test]
fn none_type_ignores_everything() {
    let mut rig = Rig::new(VehicleType::None, SimulationConfig::DEFAULT);
    rig.body.linear_velocity = Vec3A::new(5.0, 0.0, 0.0);
    rig.store()
        .set_vector(VectorParam::LinearMotorDirection, Vec3A::new(2.0, 0.0, 0.0));

    rig.run_for(0.5);

    assert_eq!(rig.dynamics.state().linear_direction, Vec3A::ZERO);
    assert!(rig.body.forces.is_empty());
    assert!(rig.body.torques.is_empty());
    assert_eq!(rig.body.linear_velocity, Vec3A::new(5.0, 0.0, 0.0));
}

#[test]
fn grabbed_body_is_left_alone() {
    let mut rig = Rig::new(VehicleType::Car, SimulationConfig::DEFAULT);
    rig.body.grabbed = true;
    rig.body.linear_velocity = Vec3A::new(4.0, 1.0, 0.0);
    rig.store()
        .set_vector(VectorParam::LinearMotorDirection, Vec3A::new(2.0, 0.0, 0.0));

    for _ in 0..10 {
        rig.tick();
        assert!(rig.body.forces.is_empty());
        assert!(rig.body.torques.is_empty());
    }

    // the command itself is still taken
    assert_eq!(rig.dynamics.state().linear_direction, Vec3A::new(2.0, 0.0, 0.0));
}

#[test]
fn buoyancy_is_relative_to_gravity() {
    let body = MockBody::new().with_gravity_multiplier(0.5);
    let mut rig = Rig::with_body(VehicleType::Airplane, SimulationConfig::DEFAULT, body);
    let store = rig.store();

    assert_eq!(store.set_float(FloatParam::Buoyancy, 0.9), 0.9);
    rig.apply();

    assert_eq!(rig.dynamics.params().float(FloatParam::Buoyancy), 0.5);
    assert_eq!(store.float(FloatParam::Buoyancy), 0.5);
    assert_eq!(rig.body.buoyancy, 0.5);

    store.set_float(FloatParam::Buoyancy, -3.0);
    rig.apply();
    assert_eq!(rig.body.buoyancy, -0.5);
}

#[test]
fn type_change_installs_and_removes_hover() {
    let mut rig = Rig::new(VehicleType::Car, SimulationConfig::DEFAULT);
    assert_eq!(rig.body.hover, None);
    let store = rig.store();

    store.set_vehicle_type(VehicleType::Boat);
    rig.apply();

    let hover = rig.body.hover.expect("boats hover on water");
    assert_eq!(hover.flags, HoverFlags::WATER | HoverFlags::VEHICLE);
    assert_eq!(hover.height, 0.5);
    assert_eq!(hover.timescale, 0.2);
    assert_eq!(rig.body.look_at_stops, 1);
    assert_eq!(rig.body.move_to_target_stops, 1);
    assert_eq!(rig.dynamics.params().vehicle_type, VehicleType::Boat);

    store.set_vehicle_type(VehicleType::Car);
    rig.apply();

    assert_eq!(rig.body.hover, None);
    assert_eq!(rig.dynamics.params().float(FloatParam::HoverTimescale), MAX_HOVER_TIMESCALE);
    assert_eq!(store.float(FloatParam::HoverTimescale), MAX_HOVER_TIMESCALE);
}

#[test]
fn hover_flags_follow_vehicle_flags() {
    let mut rig = Rig::new(VehicleType::Balloon, SimulationConfig::DEFAULT);
    let hover = rig.body.hover.expect("balloons hover");
    assert_eq!(hover.flags, HoverFlags::WATER | HoverFlags::GROUND | HoverFlags::VEHICLE);

    let store = rig.store();
    store.insert_flags(VehicleFlags::HOVER_GLOBAL_HEIGHT | VehicleFlags::HOVER_UP_ONLY);
    rig.apply();
    let hover = rig.body.hover.expect("still hovering");
    assert_eq!(
        hover.flags,
        HoverFlags::GLOBAL | HoverFlags::UP_ONLY | HoverFlags::VEHICLE
    );

    // both limits at once cancel out
    store.set_flags(VehicleFlags::HOVER_WATER_ONLY | VehicleFlags::HOVER_TERRAIN_ONLY);
    rig.apply();
    let hover = rig.body.hover.expect("still hovering");
    assert_eq!(hover.flags, HoverFlags::WATER | HoverFlags::GROUND | HoverFlags::VEHICLE);

    // legacy off switch
    store.set_float(FloatParam::HoverHeight, 0.0);
    store.set_float(FloatParam::HoverEfficiency, 0.0);
    rig.apply();
    assert_eq!(rig.body.hover, None);
}

#[test]
fn tracking_flags_keep_the_body_awake() {
    let mut rig = Rig::new(VehicleType::Car, SimulationConfig::DEFAULT);
    assert_eq!(rig.body.sleep_threshold, DEFAULT_SLEEP_THRESHOLD);

    let store = rig.store();
    store.insert_flags(VehicleFlags::MOUSELOOK_STEER);
    rig.apply();
    assert_eq!(rig.body.sleep_threshold, 0.0);

    store.remove_flags(VehicleFlags::MOUSELOOK_STEER);
    rig.apply();
    assert_eq!(rig.body.sleep_threshold, DEFAULT_SLEEP_THRESHOLD);

    let balloon = Rig::new(VehicleType::Balloon, SimulationConfig::DEFAULT);
    assert_eq!(balloon.body.sleep_threshold, 0.0);
}

#[test]
fn sled_runs_on_frictionless_material() {
    let rig = Rig::new(VehicleType::Sled, SimulationConfig::DEFAULT);
    assert_eq!(rig.body.material_friction, Some((0.0, 0.0)));

    let car = Rig::new(VehicleType::Car, SimulationConfig::DEFAULT);
    assert_eq!(car.body.material_friction, None);
}

#[test]
fn missing_parameters_are_reloaded() {
    let store = Arc::new(ParameterStore::from_table(ParameterTable::uninitialized(
        VehicleType::Car,
    )));
    let mut rig = Rig::with_store(store, SimulationConfig::DEFAULT, MockBody::new());
    assert!(rig.dynamics.params().is_uninitialized());

    rig.tick();

    assert!(!rig.dynamics.params().is_uninitialized());
    assert_eq!(
        rig.dynamics.params().flags,
        ArchetypePreset::for_type(VehicleType::Car).flags
    );
}

#[test]
fn bounding_box_is_requested_until_known() {
    let mut body = MockBody::new();
    body.bounding_box = None;
    let mut rig = Rig::with_body(VehicleType::Car, SimulationConfig::DEFAULT, body);

    rig.tick();
    rig.tick();
    assert_eq!(rig.body.bounding_box_requests, 2);
}

#[test]
fn long_gap_resets_the_motors() {
    let mut rig = Rig::new(VehicleType::Car, motors_only());
    rig.store()
        .set_vector(VectorParam::LinearMotorDirection, Vec3A::new(2.0, 0.0, 0.0));
    rig.run_for(0.5);
    assert!(rig.dynamics.state().linear_decay.index() < 1.0);

    rig.clock.advance(30.0);
    rig.tick();

    let state = rig.dynamics.state();
    assert!(state.linear_decay.index() >= decay::IDLE_INDEX);
    // a reset keeps the command, the next move restarts it
    assert_eq!(state.linear_direction, Vec3A::new(2.0, 0.0, 0.0));
}

#[test]
fn region_crossing_is_not_a_gap() {
    let mut rig = Rig::new(VehicleType::Car, motors_only());
    rig.store()
        .set_vector(VectorParam::LinearMotorDirection, Vec3A::new(2.0, 0.0, 0.0));
    rig.run_for(0.5);

    // the new host's clock is far ahead
    rig.dynamics.on_physics_suspended();
    rig.clock.advance(3600.0);
    rig.scene.region_id = 2;
    rig.dynamics.on_physics_resumed(&mut rig.body, &rig.scene);
    assert_eq!(rig.dynamics.state().last_access, rig.clock.now());

    let before = rig.dynamics.state().linear_decay.index();
    rig.tick();
    let after = rig.dynamics.state().linear_decay.index();

    assert!(after < decay::IDLE_INDEX);
    assert_abs_diff_eq!(after, before + rig.dt, epsilon = 1e-4);
}

#[test]
fn region_change_seen_by_tick_is_not_a_gap() {
    let mut rig = Rig::new(VehicleType::Car, motors_only());
    rig.store()
        .set_vector(VectorParam::LinearMotorDirection, Vec3A::new(2.0, 0.0, 0.0));
    rig.run_for(0.5);

    rig.clock.advance(3600.0);
    rig.scene.region_id = 9;
    rig.tick();

    assert!(rig.dynamics.state().linear_decay.index() < decay::IDLE_INDEX);
}

#[test]
fn mouselook_steers_toward_the_camera() {
    let mut rig = Rig::new(VehicleType::Car, motors_only());
    let store = rig.store();
    store.insert_flags(VehicleFlags::MOUSELOOK_STEER);
    store.set_vector(VectorParam::AngularMotorDirection, Vec3A::new(1.0, 1.0, 2.0));

    // looking 45 degrees to the left
    rig.camera = MockCamera::mouselook(Quat::from_rotation_z(PI / 4.0));
    rig.tick();

    assert!(rig.dynamics.camera().valid);
    assert_vec_near(rig.dynamics.state().angular_direction, Vec3A::new(0.0, 0.0, 2.0), 1e-5);
}

#[test]
fn camera_dead_zone() {
    let mut rig = Rig::new(VehicleType::Car, motors_only());
    let store = rig.store();
    store.insert_flags(VehicleFlags::MOUSEPOINT_STEER);
    store.set_vector(VectorParam::AngularMotorDirection, Vec3A::new(0.0, 0.0, 2.0));

    rig.camera = MockCamera::mouselook(Quat::from_rotation_z(0.01));
    rig.tick();

    // the command from the store stands
    assert_eq!(rig.dynamics.state().angular_direction, Vec3A::new(0.0, 0.0, 2.0));
}

#[test]
fn wind_layers() {
    let wind = WindField::uniform(Vec2::new(2.0, 0.0), Vec2::new(5.0, 0.0), Vec2::new(0.0, 1.0));
    let config = config_with(StageEnables::NONE);

    let cases = [
        (Vec3A::new(8.0, 8.0, 5.0), Vec3A::new(2.0, 0.0, 0.0)),
        (Vec3A::new(8.0, 8.0, 50.0), Vec3A::new(5.0, 0.0, 0.0)),
        (Vec3A::new(8.0, 8.0, -1.0), Vec3A::new(0.0, 1.0, 0.0)),
    ];

    for (position, expected) in cases {
        let body = MockBody::new().with_position(position);
        let mut rig = Rig::with_body(VehicleType::Balloon, config, body);
        rig.scene = MockScene::new().with_wind(wind.clone()).with_water_height(0.0);

        rig.tick();
        assert_vec_near(rig.dynamics.state().wind_direction, expected, 1e-5);
    }
}

#[test]
fn wind_pushes_reacting_vehicles() {
    let wind = WindField::uniform(Vec2::new(2.0, 0.0), Vec2::ZERO, Vec2::ZERO);
    let config = config_with(StageEnables::NONE);

    let body = MockBody::new().with_position(Vec3A::new(8.0, 8.0, 5.0));
    let mut rig = Rig::with_body(VehicleType::Balloon, config, body);
    rig.scene = MockScene::new().with_wind(wind.clone()).with_water_height(0.0);
    rig.tick();
    assert!(rig.body.linear_velocity.x > 0.0);
    assert_eq!(rig.body.linear_velocity.y, 0.0);

    // a car does not react to wind
    let body = MockBody::new().with_position(Vec3A::new(8.0, 8.0, 5.0));
    let mut car = Rig::with_body(VehicleType::Car, config, body);
    car.scene = MockScene::new().with_wind(wind).with_water_height(0.0);
    car.tick();
    assert_eq!(car.dynamics.state().wind_direction, Vec3A::ZERO);
    assert_eq!(car.body.linear_velocity, Vec3A::ZERO);
}

#[test]
fn timestep_slippage_is_tracked_when_traced() {
    let debug = DebugSwitches {
        timestep: true,
        ..DebugSwitches::DEFAULT
    };
    let mut rig = Rig::new(VehicleType::Car, motors_only().with_debug(debug));

    for _ in 0..10 {
        rig.tick();
    }

    let stats = rig.dynamics.timestep_stats();
    assert_eq!(stats.count(), 10);
    assert!(stats.mean().abs() < 1e-3);
}

#[test]
fn sunk_vehicle_pops_back_up() {
    let body = MockBody::new().with_position(Vec3A::new(8.0, 8.0, -2.0));
    let mut rig = Rig::with_body(VehicleType::Car, config_with(StageEnables::NONE), body);

    rig.tick();
    assert!(rig.body.linear_velocity.z >= 1.0);
}
