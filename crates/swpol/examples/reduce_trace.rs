use std::error::Error;
use std::f64::consts::PI;

use swpol::{reduce_trace, synthesize_trace, ReduceConfig, StokesVector, SynthConfig};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    let n_rotations: usize = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(5);
    let noise_level: f64 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(0.01);

    // Elliptical, partially polarized test state.
    let state = StokesVector::new(1.0, 0.4, -0.15, 0.3);

    // One sample per time unit; rotations start on multiples of the period.
    let samples_per_rotation = 1000usize;
    let w0 = 2.0 * PI / samples_per_rotation as f64;
    let total = n_rotations * samples_per_rotation + 8;
    let times: Vec<f64> = (0..total).map(|i| i as f64).collect();

    let synth = SynthConfig {
        noise_level,
        quantization_mv: 0.5,
        seed: 7,
        ..SynthConfig::default()
    };
    let signal = synthesize_trace(&state, w0, &times, &synth);

    let mut reference = vec![0.0; total];
    for k in 0..=n_rotations {
        for j in 1..=4 {
            if let Some(v) = reference.get_mut(k * samples_per_rotation + j) {
                *v = 2.0;
            }
        }
    }

    let reduction = reduce_trace(&signal, &reference, &ReduceConfig::default())?;

    println!(
        "Reduced {} rotation(s) from {} trigger(s).",
        reduction.rotations.len(),
        reduction.triggers.len()
    );
    for (i, rotation) in reduction.rotations.iter().enumerate() {
        let s = &rotation.estimate.stokes;
        println!(
            "rotation {i}: S = [{:+.4}, {:+.4}, {:+.4}, {:+.4}]  DOP = {:.4}  warnings = {}",
            s.0[0],
            s.0[1],
            s.0[2],
            s.0[3],
            s.degree_of_polarization(),
            rotation.estimate.warnings.len()
        );
    }

    if let Some(out_path) = args.get(3) {
        let json = serde_json::to_string_pretty(&reduction)?;
        std::fs::write(out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
