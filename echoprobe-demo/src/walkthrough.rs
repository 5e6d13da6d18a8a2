use crate::cli::DemoOptions;
use anyhow::Result;
use echoprobe::scene::SceneGeometry;
use echoprobe::*;
use std::collections::HashMap;

const WALLS: u8 = 0;
const FURNITURE: u8 = 1;

/// Furnished 14m x 4m x 10m hall. The listener starts near the radio, walks
/// across the hall and ends up in the yard outside.
fn build_scene() -> SceneGeometry {
    let mut scene = SceneGeometry::new();
    scene.add_box(Vec3::new(-7.0, 0.0, -5.0), Vec3::new(7.0, 4.0, 5.0), WALLS);
    // Shelves, a table and a column.
    scene.add_box(Vec3::new(-6.5, 0.0, -4.8), Vec3::new(-2.5, 2.2, -4.2), FURNITURE);
    scene.add_box(Vec3::new(1.0, 0.0, -1.0), Vec3::new(3.0, 0.8, 1.0), FURNITURE);
    scene.add_box(Vec3::new(-0.4, 0.0, 2.0), Vec3::new(0.4, 4.0, 2.8), WALLS);
    scene.add_sphere(Vec3::new(-4.0, 0.5, 3.0), 0.5, FURNITURE);
    scene
}

fn listener_path(t: f32) -> Vec3 {
    // Inside the hall for the first 70%, then jump to the yard.
    if t < 0.7 {
        let u = t / 0.7;
        Vec3::new(-5.0 + 10.0 * u, 1.7, -2.0 + 5.0 * u)
    } else {
        Vec3::new(12.0, 1.7, 0.0)
    }
}

pub fn run(options: &DemoOptions) -> Result<()> {
    let scene = build_scene();
    log::info!("Scene built with {} colliders", scene.len());

    let mut probe_desc = ProbeDesc::new();
    if let Some(seed) = options.seed {
        probe_desc = probe_desc.seed(seed);
    }
    let world_desc = EchoProbeWorldDesc {
        probe: probe_desc,
        probe_position: Vec3::new(0.0, 2.0, 0.0),
        ..Default::default()
    };
    world_desc.probe.validate()?;
    let mut world = EchoProbeWorld::new(world_desc);

    let emitters = [
        ("radio", Vec3::new(-5.5, 1.0, -3.0)),
        ("fan", Vec3::new(5.0, 3.0, 4.0)),
    ];
    let mut names = HashMap::new();
    for (index, (name, position)) in emitters.iter().enumerate() {
        let mut desc = PropagatorDesc::new().max_bounces(4);
        if let Some(seed) = options.seed {
            desc = desc.seed(seed.wrapping_add(index as u64 + 1));
        }
        desc.validate()?;
        let id = world.add_emitter(*position, desc)?;
        names.insert(id, *name);
    }

    // Stand-in for an audio thread: keep the latest parameters per emitter.
    let (mut sink, updates) = ChannelFilterSink::unbounded();
    let mut latest: HashMap<EmitterId, FilterParameters> = HashMap::new();

    let dt = 1.0 / options.tick_rate;
    let total_ticks = (options.seconds * options.tick_rate).ceil() as u32;
    let report_every = options.tick_rate as u32 / 2;

    for tick in 0..total_ticks {
        let t = tick as f32 / total_ticks as f32;
        world.set_listener_position(listener_path(t));
        world.tick(dt, &scene, &mut sink);

        for update in updates.try_iter() {
            latest.insert(update.emitter, update.params);
        }

        for event in world.poll_events() {
            match event {
                EchoProbeEvent::ContextUpdated { context } => log::debug!(
                    "context: muffling {:.2}, reverb {:.2}, outdoor {:.2}",
                    context.muffling,
                    context.reverb_level,
                    context.outdoor_factor
                ),
                EchoProbeEvent::PathSampled { emitter, sample } => log::debug!(
                    "{}: heard {}/{} rays, {} surfaces",
                    names.get(&emitter).copied().unwrap_or("?"),
                    sample.rays_heard,
                    sample.rays_cast,
                    sample.unique_surfaces
                ),
                EchoProbeEvent::SampleSkipped { emitter, reason } => {
                    log::warn!("{:?} skipped a pass: {}", emitter, reason)
                }
            }
        }

        if report_every > 0 && tick % report_every == 0 {
            report(&world, &names, &latest, tick as f32 * dt);
        }
    }

    report(&world, &names, &latest, options.seconds);
    Ok(())
}

fn report(
    world: &EchoProbeWorld,
    names: &HashMap<EmitterId, &str>,
    latest: &HashMap<EmitterId, FilterParameters>,
    time: f32,
) {
    let context = world.context();
    let listener = world.listener_position().unwrap_or(Vec3::ZERO);
    log::info!(
        "t={:5.2}s listener ({:5.1}, {:4.1}, {:5.1}) | muffling {:.2} reverb {:.2} outdoor {:.2}",
        time,
        listener.x,
        listener.y,
        listener.z,
        context.muffling,
        context.reverb_level,
        context.outdoor_factor
    );

    for id in world.emitter_ids() {
        let (Some(params), Some(sample)) = (latest.get(&id), world.path_sample(id)) else {
            continue;
        };
        log::info!(
            "  {:<6} heard {:4.2} | lowpass {:7.0} Hz | reverb {:4.2}s {:6.0} dB | echo {:5.1} ms x{:.2} wet {:.2}",
            names.get(&id).copied().unwrap_or("?"),
            sample.ratio_heard,
            params.low_pass_cutoff_hz,
            params.reverb_decay_seconds,
            params.reverb_level_db,
            params.echo_delay_ms,
            params.echo_decay_ratio,
            params.echo_wet_mix
        );
    }
}
