use approx::assert_relative_eq;
use xpbd_engine::{forces, Attachment, Body, Constraint, ConstraintKind, Friction, Scene, Simulation, Vec2};

#[test]
fn pendulum_keeps_its_length() {
    let mut scene = Scene::new();
    let pivot = scene.add_body(Body::fixed());
    let bob = scene.add_body(Body::at(1.0, 0.0).with_inverse_inertia(0.0));
    scene
        .add_constraint(Constraint::distance(
            Attachment::central(pivot),
            Attachment::central(bob),
            1.0,
        ))
        .unwrap();
    scene.add_external_force(forces::gravity(Vec2::new(0.0, -9.81)));

    for _ in 0..240 {
        scene.update(1.0 / 60.0);
        let length = scene.body(bob).unwrap().position.length();
        assert_relative_eq!(length, 1.0, epsilon = 1e-9);
    }
    assert!(scene.body(bob).unwrap().position.y < 0.0);
}

#[test]
fn more_solver_iterations_tighten_a_chain() {
    let run = |iterations: u32| {
        let mut scene = Scene::new();
        scene.set_solver_iterations(iterations);
        let mut previous = scene.add_body(Body::fixed());
        for i in 1..=8 {
            let link = scene.add_body(Body::at(i as f64, 0.0).with_inverse_inertia(0.0));
            scene
                .add_constraint(Constraint::distance(
                    Attachment::central(previous),
                    Attachment::central(link),
                    1.0,
                ))
                .unwrap();
            previous = link;
        }
        scene.add_external_force(forces::gravity(Vec2::new(0.0, -9.81)));
        for _ in 0..30 {
            scene.update(1.0 / 60.0);
        }

        scene
            .constraints()
            .iter()
            .map(|c| match c.kind() {
                ConstraintKind::Distance(d) => (d.current_distance(scene.bodies()).unwrap() - 1.0).abs(),
                _ => 0.0,
            })
            .sum::<f64>()
    };

    assert!(run(8) <= run(1));
}

#[test]
fn rolling_wheel_spins_up_from_a_slide() {
    let mut scene = Scene::new();
    let mut wheel = Body::at(0.0, 0.5).with_friction(Friction::wheel(0.5, 0.8, 10.0));
    wheel.velocity = Vec2::new(3.0, 0.0);
    let wheel = scene.add_body(wheel);

    for _ in 0..60 {
        scene.update(1.0 / 60.0);
    }

    let body = scene.body(wheel).unwrap();
    assert!(body.position.x > 0.0);
    assert!(body.angular_velocity < 0.0, "wheel should roll clockwise");
    assert!(body.velocity.x < 3.0);
}

#[test]
fn simulation_facade_drives_a_crank() {
    let mut sim = Simulation::new();
    let crank = sim.add_body(0.0, 0.0, 0.0, 1.0);
    let piston = sim.add_body(3.0, 0.0, 1.0, 0.0);
    sim.add_distance_constraint(crank, 1.0, 0.0, piston, 0.0, 0.0, 2.0, 0.0)
        .unwrap();
    sim.add_axis_constraint(piston, 0.0, 0.0, 1.0, 0.0, 0.0).unwrap();
    sim.add_drive_torque(crank, 5.0).unwrap();

    // Oversized frames are clamped rather than exploding.
    sim.update(10.0);
    for _ in 0..60 {
        sim.update(1.0 / 60.0);
    }

    assert_eq!(sim.frame(), 61);
    assert!(sim.body_rotation(crank).unwrap().abs() > 0.0);
    assert!(sim.body_y(piston).unwrap().abs() < 1e-9);
    assert!(sim.body_x(99).is_none());

    let json = sim.debug_json();
    assert!(json.contains(r#""type":"axis""#));
    assert!(json.contains(r#""type":"distance""#));
}

#[test]
fn grabbing_drags_a_body_to_the_pointer() {
    let mut sim = Simulation::new();
    let body = sim.add_body(2.0, 2.0, 1.0, 0.0);
    let drag = sim.add_pin_constraint(body, 0.0, 0.0, 0.0, 0.0, 0.0).unwrap();
    sim.set_constraint_enabled(drag, false).unwrap();

    let grabbed = sim.grab(drag, 2.1, 2.0, 0.5).unwrap();
    assert_eq!(grabbed, Some(body));

    sim.set_pin_origin(drag, 5.0, 2.0).unwrap();
    sim.update(1.0 / 60.0);
    assert_relative_eq!(sim.body_x(body).unwrap(), 4.9, epsilon = 1e-9);
    assert_relative_eq!(sim.body_y(body).unwrap(), 2.0, epsilon = 1e-9);

    sim.release(drag).unwrap();
    assert!(!sim.scene().constraints()[drag as usize].enabled);
}
