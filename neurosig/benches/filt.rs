use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dasp_signal::{rate, Signal};
use ndarray::{Array1, Array2};
use neurosig::kernel::KernelLifecycle;
use neurosig::signal::filter::design::{FilterBandType, FilterMethod};
use neurosig::signal::filter::{
    FiltConfig, FiltFiltConfig, FiltFiltKernel, FiltFiltPad, FiltKernel, FilterDirection,
};
use neurosig::signal::traits::FiltFilt1D;
use rand::rngs::ThreadRng;
use std::num::NonZeroUsize;

/// Get a randomized signal from instance of `rng`.
fn randomized_signal(
    mut rng: ThreadRng,
    num_freqs: NonZeroUsize,
    num_data_points: NonZeroUsize,
    time_seconds: f64,
) -> Array1<f64> {
    use rand::Rng;

    let nf: usize = num_freqs.into();
    let n: usize = num_data_points.into();
    let nyq_freq: f64 = 0.5 * n as f64 / time_seconds;

    let t: Array1<f64> = Array1::linspace(0.0, time_seconds, n);
    let mut result = t.mapv(|ti| 7.0 * (-ti / 2.0).exp()); // slow electrode drift

    let mut freq = 1.2;
    for i in 0..nf {
        let ampl = rng.random_range(0.5..1.5) / 1.1f64.powi(i as i32);
        let phase = rng.random_range(0.0..std::f64::consts::PI);
        result += &t.mapv(|ti| ampl * (freq * ti + phase).sin());
        freq = (freq * rng.random_range(1.01..2.01)) % nyq_freq;
    }

    result
}

/// Alpha bandpass over ten minutes of 512 Hz data, both directions.
fn filt_alpha_band(c: &mut Criterion) {
    let sf = 512.0;
    let signal = randomized_signal(
        rand::rng(),
        NonZeroUsize::new(14).unwrap(),
        NonZeroUsize::new(600 * 512).unwrap(),
        600.,
    );

    for way in [FilterDirection::FiltFilt, FilterDirection::LFilter] {
        let kernel = FiltKernel::try_new(FiltConfig {
            sf,
            f: vec![8.0, 12.0],
            btype: FilterBandType::Bandpass,
            way,
            ..Default::default()
        })
        .expect("filt kernel config should be valid");

        c.bench_with_input(BenchmarkId::new("filt_alpha", way), &signal, |b, sig| {
            b.iter(|| {
                black_box(
                    kernel
                        .run(black_box(sig))
                        .expect("benchmark input should satisfy filt preconditions"),
                )
            })
        });
    }
}

/// 64 channels of 256 Hz data filtered along the time axis.
fn filt_multichannel(c: &mut Criterion) {
    let sf = 256.0;
    let mut signal = rate(sf).const_hz(25.).sine();
    let x = Array2::from_shape_fn((64, 60 * 256), |_| signal.next());

    for method in [FilterMethod::Butterworth, FilterMethod::Bessel] {
        let kernel = FiltKernel::try_new(FiltConfig {
            sf,
            f: vec![1.0, 40.0],
            btype: FilterBandType::Bandpass,
            order: 4,
            method,
            axis: Some(-1),
            ..Default::default()
        })
        .expect("filt kernel config should be valid");

        c.bench_function(&format!("filt_64ch_{method}"), |b| {
            b.iter(|| black_box(kernel.run(&x).expect("valid multichannel input")))
        });
    }
}

fn filtfilt_kernel(c: &mut Criterion) {
    let kernel = FiltKernel::try_new(FiltConfig {
        sf: 1666.0,
        f: vec![10.0, 50.0],
        btype: FilterBandType::Bandpass,
        order: 4,
        ..Default::default()
    })
    .expect("filt kernel config should be valid");
    let ba = kernel.design().expect("stable bandpass design");
    let kernel = FiltFiltKernel::try_new(FiltFiltConfig {
        b: ba.b,
        a: ba.a,
        padding: Some(FiltFiltPad::default()),
    })
    .expect("valid filtfilt config");

    let sample_hz = 1666.;
    let seconds = 10;
    let mut signal = rate(sample_hz).const_hz(25.).sine();
    let sin_wave: Vec<f64> = (0..seconds * sample_hz as usize)
        .map(|_| signal.next())
        .collect::<Vec<_>>();

    c.bench_function("filtfilt_10s_1666hz", |b| {
        b.iter(|| {
            black_box(
                kernel
                    .run_alloc(sin_wave.as_slice())
                    .expect("benchmark input should satisfy filtfilt preconditions"),
            );
        });
    });
}

criterion_group!(benches, filt_alpha_band, filt_multichannel, filtfilt_kernel);
criterion_main!(benches);
