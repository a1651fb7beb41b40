use criterion::Criterion;
use light_curve_microlensing::{LensScale, LightCurve, PhysicalParameters};
use std::hint::black_box;

fn parameters() -> PhysicalParameters {
    PhysicalParameters {
        source_distance: 8.0,
        baseline_flux: 1.0,
        source_velocity: 200.0,
        lens_mass: 0.5,
        lens_distance: 4.0,
        impact_parameter: 0.1,
        peak_time: 0.0,
    }
}

pub fn bench_light_curve(c: &mut Criterion) {
    const COUNTS: [usize; 3] = [100, 2000, 100_000];

    let params = parameters();
    let scale = LensScale::from_parameters(&params).unwrap();
    for &n in COUNTS.iter() {
        c.bench_function(format!("LightCurve<f64> {n}").as_str(), |b| {
            b.iter(|| LightCurve::<f64>::from_scale(black_box(&params), &scale, 8.0, n).unwrap())
        });
        c.bench_function(format!("LightCurve<f32> {n}").as_str(), |b| {
            b.iter(|| LightCurve::<f32>::from_scale(black_box(&params), &scale, 8.0, n).unwrap())
        });
    }
}
