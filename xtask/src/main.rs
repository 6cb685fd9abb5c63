use anyhow::{anyhow, bail, Context, Result};
use ndarray::Array1;
use neurosig::kernel::KernelLifecycle;
use neurosig::signal::band_power::{
    morlet_power as morlet_power_baseline, welch_power as welch_power_baseline,
    MorletPowerConfig, MorletPowerKernel, WelchPowerConfig, WelchPowerKernel,
};
use neurosig::signal::filter::design::{
    iir_design as iir_design_baseline, FilterBandType, FilterMethod, IirDesignConfig,
    IirDesignKernel,
};
use neurosig::signal::filter::{
    filt as filt_baseline, filtfilt_checked_slice as filtfilt_baseline,
    lfilter_checked_slice as lfilter_baseline, FiltConfig, FiltFiltConfig, FiltFiltKernel,
    FiltFiltPad, FiltKernel, FilterDirection, LFilterConfig, LFilterKernel,
};
use neurosig::signal::spectral::{welch as welch_baseline, Scaling, WelchConfig, WelchKernel};
use neurosig::signal::traits::{
    BandPower, FiltFilt1D, IirDesign, LFilter1D, Morlet1D, WelchPsd1D,
};
use neurosig::signal::wavelet::{
    morlet as morlet_baseline, ndmorlet as ndmorlet_baseline, MorletConfig, MorletKernel,
    MorletOutput, NdMorletConfig, NdMorletKernel,
};
use neurosig::na::Complex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const DEFAULT_PYTHON_BIN: &str = "python";

const PY_SIGNAL_SCRIPT: &str = r#"
import json
import sys
import time
import numpy as np
import scipy.signal

env = json.loads(sys.stdin.read())
op = env["op"]
iters = int(env["iters"])
p = env["payload"]

def _as_array(key):
    return np.asarray(p[key], dtype=float)

def _flat(v):
    v = np.asarray(v)
    if np.iscomplexobj(v):
        return np.concatenate([v.real.reshape(-1), v.imag.reshape(-1)])
    return v.astype(float).reshape(-1)

def _morlet_wlt(sf, f, width):
    dt = 1 / sf
    st = 1. / (2 * np.pi * (f / width))
    t = np.arange(-width * st / 2, width * st / 2, dt)
    a = 1 / np.sqrt(st * np.sqrt(np.pi))
    return a * np.exp(-t ** 2 / (2 * st ** 2)) * np.exp(2j * np.pi * f * t)

def _morlet(x, sf, f, width):
    m = _morlet_wlt(sf, f, width)
    y = np.convolve(x, m)
    return y[int(np.ceil(len(m) / 2.)) - 1:int(len(y) - np.floor(len(m) / 2.))]

def _design(order, wn, btype, method):
    if method == "butterworth":
        return scipy.signal.butter(order, wn, btype=btype)
    return scipy.signal.bessel(order, wn, btype=btype, norm="phase")

def _welch_power(x, fmin, fmax, sf, window_s, norm):
    sf = int(sf)
    step = int(window_s * sf)
    nperseg = sf * 10
    imin, imax = int(round(fmin * 10)), int(round(fmax * 10))
    out = []
    for i in range(0, len(x), step):
        chunk = x[i:i + step]
        _, pxx = scipy.signal.welch(chunk, sf, "hann", nperseg=min(nperseg, len(chunk)),
                                    nfft=nperseg, scaling="spectrum")
        band = pxx[imin:imax + 1]
        if norm:
            total = pxx.sum()
            out.append(band.sum() / total if total > 0 else 0.)
        else:
            out.append(band.mean())
    return np.asarray(out)

def _compute():
    if op == "iir_design":
        b, a = _design(int(p["order"]), _as_array("wn"), p["btype"], p["method"])
        return np.concatenate([b, a])
    if op == "lfilter":
        return scipy.signal.lfilter(_as_array("b"), _as_array("a"), _as_array("x"))
    if op == "filtfilt":
        return scipy.signal.filtfilt(_as_array("b"), _as_array("a"), _as_array("x"))
    if op == "filt":
        cfg = p["config"]
        sf, f = float(cfg["sf"]), np.asarray(cfg["f"], dtype=float)
        fnorm = f / (sf / 2)
        if cfg["btype"] == "lowpass":
            fnorm = fnorm[-1]
        elif cfg["btype"] == "highpass":
            fnorm = fnorm[0]
        b, a = _design(int(cfg["order"]), fnorm, cfg["btype"], cfg["method"])
        if cfg["way"] == "filtfilt":
            return scipy.signal.filtfilt(b, a, _as_array("x"))
        return scipy.signal.lfilter(b, a, _as_array("x"))
    if op == "morlet":
        cfg = p["config"]
        return _morlet(_as_array("x"), float(cfg["sf"]), float(cfg["f"]), float(cfg["width"]))
    if op == "ndmorlet_power":
        cfg = p["config"]["morlet"]
        x = _as_array("x").reshape(p["shape"])
        y = np.apply_along_axis(
            _morlet, 1, x, float(cfg["sf"]), float(cfg["f"]), float(cfg["width"]))
        return np.abs(y) ** 2
    if op == "morlet_power":
        cfg = p["config"]
        freqs = np.asarray(cfg["freqs"], dtype=float)
        x = _as_array("x")
        mids = [(freqs[i] + freqs[i + 1]) / 2 for i in range(len(freqs) - 1)]
        pw = np.vstack([np.abs(_morlet(x, float(cfg["sf"]), f, float(cfg["width"]))) ** 2
                        for f in mids])
        if cfg["norm"]:
            pw = pw / pw.sum(0)
        return pw
    if op == "welch":
        cfg = p["config"]
        return scipy.signal.welch(
            _as_array("x"), float(cfg["fs"]), "hann", nperseg=int(cfg["nperseg"]),
            scaling=cfg["scaling"])[1]
    if op == "welch_power":
        cfg = p["config"]
        return _welch_power(_as_array("x"), float(cfg["fmin"]), float(cfg["fmax"]),
                            float(cfg["sf"]), float(cfg["window_s"]), bool(cfg["norm"]))

    raise RuntimeError(f"unsupported op: {op}")

y = _flat(_compute())

t0 = time.perf_counter_ns()
for _ in range(iters):
    _compute()
t1 = time.perf_counter_ns()

print(json.dumps({
    "output": y.tolist(),
    "avg_ns": (t1 - t0) / max(iters, 1),
    "python_version": sys.version.split()[0],
    "numpy_version": np.__version__,
    "scipy_version": scipy.__version__,
}))
"#;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct PythonEval {
    output: Vec<f64>,
    avg_ns: f64,
    python_version: String,
    numpy_version: String,
    scipy_version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ContractRow {
    case_id: String,
    pearson_r: f64,
    mae: f64,
    rmse: f64,
    max_abs: f64,
    rust_candidate_ns: f64,
    rust_baseline_ns: f64,
    python_ns: f64,
    speedup_vs_baseline: f64,
    speedup_vs_python: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContractBundle {
    generated_epoch_seconds: u64,
    python_executable: String,
    python_version: String,
    numpy_version: String,
    scipy_version: String,
    rows: Vec<ContractRow>,
}

/// One operation run three ways: through its kernel, through its free function and in Python.
struct Case<'a> {
    id: &'a str,
    op: &'a str,
    payload: serde_json::Value,
    iters: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("contracts") => run_contracts(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- contracts");
            Ok(())
        }
    }
}

fn run_contracts() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/contracts/{ts}"));
    fs::create_dir_all(&out_dir).context("creating contract output directory")?;

    let python_bin = detect_python_bin();
    let mut rows = Vec::new();

    // Shared synthetic EEG-like trace: alpha, slow drift and line noise at 256 Hz.
    let sf = 256.0;
    let signal: Vec<f64> = (0..4096)
        .map(|i| {
            let t = i as f64 / sf;
            let tau = 2.0 * std::f64::consts::PI;
            (tau * 10.0 * t).sin() + 0.6 * (tau * 1.5 * t).cos() + 0.2 * (tau * 50.0 * t).sin()
        })
        .collect();
    let short: Vec<f64> = signal.iter().copied().take(1000).collect();

    // Filter design
    for (method, btype, wn) in [
        (FilterMethod::Butterworth, FilterBandType::Bandpass, vec![0.0625, 0.09375]),
        (FilterMethod::Butterworth, FilterBandType::Highpass, vec![0.2]),
        (FilterMethod::Bessel, FilterBandType::Lowpass, vec![0.3]),
        (FilterMethod::Bessel, FilterBandType::Bandstop, vec![0.35, 0.45]),
    ] {
        let config = IirDesignConfig {
            order: 3,
            wn: wn.clone(),
            btype,
            method,
        };
        let kernel = IirDesignKernel::try_new(config.clone())?;
        let flatten = |b: Vec<f64>, a: Vec<f64>| b.into_iter().chain(a).collect::<Vec<_>>();
        let case_id = format!("iir_design_{method}_{btype}");
        rows.push(run_case(
            &python_bin,
            Case {
                id: &case_id,
                op: "iir_design",
                payload: serde_json::to_value(&config)?,
                iters: 100,
            },
            || {
                let ba = kernel
                    .run_alloc()
                    .map_err(|e| anyhow!("iir design candidate failed: {e}"))?;
                Ok(flatten(ba.b, ba.a))
            },
            || {
                let ba = iir_design_baseline(3, &wn, btype, method)?;
                Ok(flatten(ba.b, ba.a))
            },
        )?);
    }

    // Filter application
    let ba = iir_design_baseline(
        3,
        &[0.0625, 0.09375],
        FilterBandType::Bandpass,
        FilterMethod::Butterworth,
    )?;
    {
        let kernel = LFilterKernel::try_new(LFilterConfig {
            b: ba.b.clone(),
            a: ba.a.clone(),
        })?;
        rows.push(run_case(
            &python_bin,
            Case {
                id: "lfilter_butter_bandpass_f64",
                op: "lfilter",
                payload: json!({ "b": ba.b, "a": ba.a, "x": short }),
                iters: 100,
            },
            || {
                kernel
                    .run_alloc(short.as_slice())
                    .map_err(|e| anyhow!("lfilter candidate failed: {e}"))
            },
            || Ok(lfilter_baseline(&ba.b, &ba.a, &short, None)?.0),
        )?);
    }
    {
        let kernel = FiltFiltKernel::try_new(FiltFiltConfig {
            b: ba.b.clone(),
            a: ba.a.clone(),
            padding: Some(FiltFiltPad::default()),
        })?;
        rows.push(run_case(
            &python_bin,
            Case {
                id: "filtfilt_butter_bandpass_f64",
                op: "filtfilt",
                payload: json!({ "b": ba.b, "a": ba.a, "x": short }),
                iters: 100,
            },
            || {
                kernel
                    .run_alloc(short.as_slice())
                    .map_err(|e| anyhow!("filtfilt candidate failed: {e}"))
            },
            || {
                filtfilt_baseline(&ba.b, &ba.a, &short, Some(FiltFiltPad::default()))
                    .map_err(anyhow::Error::from)
            },
        )?);
    }
    for (btype, method, way) in [
        (FilterBandType::Bandpass, FilterMethod::Butterworth, FilterDirection::FiltFilt),
        (FilterBandType::Bandstop, FilterMethod::Butterworth, FilterDirection::LFilter),
        (FilterBandType::Lowpass, FilterMethod::Bessel, FilterDirection::FiltFilt),
        (FilterBandType::Highpass, FilterMethod::Bessel, FilterDirection::LFilter),
    ] {
        let config = FiltConfig {
            sf,
            f: vec![8.0, 12.0],
            btype,
            method,
            way,
            ..Default::default()
        };
        let kernel = FiltKernel::try_new(config.clone())?;
        let x = Array1::from(short.clone());
        let case_id = format!("filt_{btype}_{method}_{way}");
        rows.push(run_case(
            &python_bin,
            Case {
                id: &case_id,
                op: "filt",
                payload: json!({ "config": config, "x": short }),
                iters: 50,
            },
            || Ok(kernel.run(&x)?.to_vec()),
            || Ok(filt_baseline(sf, &[8.0, 12.0], &x, btype, 3, method, way, Some(0))?.to_vec()),
        )?);
    }

    // Wavelets
    {
        let config = MorletConfig {
            sf,
            f: 10.0,
            width: 7.0,
        };
        let kernel = MorletKernel::try_new(config)?;
        rows.push(run_case(
            &python_bin,
            Case {
                id: "morlet_10hz_complex",
                op: "morlet",
                payload: json!({ "config": config, "x": short }),
                iters: 50,
            },
            || {
                let y = kernel
                    .run_alloc(short.as_slice())
                    .map_err(|e| anyhow!("morlet candidate failed: {e}"))?;
                Ok(split_complex(&y))
            },
            || Ok(split_complex(&morlet_baseline(&short, sf, 10.0, 7.0)?)),
        )?);
    }
    {
        let config = NdMorletConfig {
            morlet: MorletConfig {
                sf,
                f: 6.0,
                width: 5.0,
            },
            axis: Some(1),
            get: MorletOutput::Power,
        };
        let kernel = NdMorletKernel::try_new(config)?;
        let x = ndarray::Array2::from_shape_vec((4, 1024), signal.clone())?;
        let real = |out: neurosig::signal::wavelet::MorletArray<ndarray::Ix2>| {
            out.into_real()
                .map(|a| a.iter().copied().collect::<Vec<_>>())
                .context("expected a real morlet view")
        };
        rows.push(run_case(
            &python_bin,
            Case {
                id: "ndmorlet_6hz_power_axis1",
                op: "ndmorlet_power",
                payload: json!({ "config": config, "x": signal, "shape": [4, 1024] }),
                iters: 10,
            },
            || real(kernel.run(&x)?),
            || real(ndmorlet_baseline(&x, sf, 6.0, Some(1), MorletOutput::Power, 5.0)?),
        )?);
    }

    // Spectra and band power
    {
        let config = WelchConfig {
            fs: sf,
            nperseg: 512,
            scaling: Scaling::Spectrum,
            ..Default::default()
        };
        let kernel = WelchKernel::try_new(config)?;
        rows.push(run_case(
            &python_bin,
            Case {
                id: "welch_spectrum_512",
                op: "welch",
                payload: json!({ "config": config, "x": signal }),
                iters: 50,
            },
            || {
                kernel
                    .run_alloc(signal.as_slice())
                    .map(|(_, pxx)| pxx)
                    .map_err(|e| anyhow!("welch candidate failed: {e}"))
            },
            || Ok(welch_baseline(&signal, config)?.1),
        )?);
    }
    {
        let config = MorletPowerConfig {
            sf,
            freqs: vec![1.0, 4.0, 8.0, 12.0, 30.0],
            norm: true,
            width: 7.0,
        };
        let kernel = MorletPowerKernel::try_new(config.clone())?;
        rows.push(run_case(
            &python_bin,
            Case {
                id: "morlet_power_norm",
                op: "morlet_power",
                payload: json!({ "config": config, "x": short }),
                iters: 10,
            },
            || {
                kernel
                    .run_alloc(short.as_slice())
                    .map(|p| p.iter().copied().collect())
                    .map_err(|e| anyhow!("morlet power candidate failed: {e}"))
            },
            || {
                let p = morlet_power_baseline(&short, &config.freqs, sf, true)?;
                Ok(p.iter().copied().collect())
            },
        )?);
    }
    for norm in [false, true] {
        let config = WelchPowerConfig {
            sf: 50.0,
            fmin: 8.0,
            fmax: 12.0,
            window_s: 12.0,
            norm,
        };
        let kernel = WelchPowerKernel::try_new(config)?;
        let case_id = format!("welch_power_norm_{norm}");
        rows.push(run_case(
            &python_bin,
            Case {
                id: &case_id,
                op: "welch_power",
                payload: json!({ "config": config, "x": signal }),
                iters: 10,
            },
            || {
                kernel
                    .run_alloc(signal.as_slice())
                    .map(|p| p.to_vec())
                    .map_err(|e| anyhow!("welch power candidate failed: {e}"))
            },
            || Ok(welch_power_baseline(&signal, 8.0, 12.0, 50.0, 12.0, norm)?.to_vec()),
        )?);
    }

    let version_probe = python_versions(&python_bin)?;
    let bundle = ContractBundle {
        generated_epoch_seconds: ts,
        python_executable: python_bin.to_string_lossy().into_owned(),
        python_version: version_probe.python_version,
        numpy_version: version_probe.numpy_version,
        scipy_version: version_probe
            .scipy_version
            .unwrap_or_else(|| "unknown".to_string()),
        rows,
    };

    write_summary_csv(&out_dir.join("summary.csv"), &bundle.rows)?;
    fs::write(
        out_dir.join("summary.json"),
        serde_json::to_vec_pretty(&bundle).context("serializing summary bundle")?,
    )
    .context("writing summary.json")?;

    println!("Contract artifacts generated in: {}", out_dir.display());
    println!("  - {}", out_dir.join("summary.csv").display());
    println!("  - {}", out_dir.join("summary.json").display());
    println!("  - cases: {}", bundle.rows.len());

    Ok(())
}

fn run_case<C, B>(
    python_bin: &Path,
    case: Case<'_>,
    mut candidate: C,
    mut baseline: B,
) -> Result<ContractRow>
where
    C: FnMut() -> Result<Vec<f64>>,
    B: FnMut() -> Result<Vec<f64>>,
{
    log::info!("contract case {}", case.id);
    let candidate_out = candidate()?;
    let baseline_out = baseline()?;
    let py = python_signal_eval(python_bin, case.op, case.payload, case.iters)?;
    ensure_same_length(case.id, &candidate_out, &baseline_out)?;
    ensure_same_length(case.id, &candidate_out, &py.output)?;

    let candidate_ns = benchmark_avg_ns(case.iters, || candidate().map(|_| ()))?;
    let baseline_ns = benchmark_avg_ns(case.iters, || baseline().map(|_| ()))?;

    let row = build_row(RowBuildInput {
        case_id: case.id,
        rust_candidate: &candidate_out,
        python_reference: &py.output,
        rust_candidate_ns: candidate_ns,
        rust_baseline_ns: baseline_ns,
        python_ns: py.avg_ns,
    });
    log::debug!(
        "{}: pearson {:.9}, max abs {:.3e}",
        row.case_id,
        row.pearson_r,
        row.max_abs
    );
    Ok(row)
}

fn split_complex(y: &[Complex<f64>]) -> Vec<f64> {
    y.iter().map(|c| c.re).chain(y.iter().map(|c| c.im)).collect()
}

fn detect_python_bin() -> PathBuf {
    std::env::var_os("PYTHON")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_BIN))
}

fn python_versions(python_bin: &Path) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        r#"
import json, sys
import numpy
import scipy
payload = json.loads(sys.stdin.read())
print(json.dumps({
    "output": [],
    "avg_ns": 0.0,
    "python_version": sys.version.split()[0],
    "numpy_version": numpy.__version__,
    "scipy_version": scipy.__version__,
}))
"#,
        json!({}),
    )
}

fn python_signal_eval(
    python_bin: &Path,
    op: &str,
    payload: serde_json::Value,
    iters: usize,
) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        PY_SIGNAL_SCRIPT,
        json!({
            "op": op,
            "iters": iters,
            "payload": payload
        }),
    )
}

fn run_python_eval(
    python_bin: &Path,
    script: &str,
    payload: serde_json::Value,
) -> Result<PythonEval> {
    let mut child = Command::new(python_bin)
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning python interpreter at {}", python_bin.display()))?;

    {
        let stdin = child.stdin.as_mut().context("opening python stdin")?;
        let payload_bytes = serde_json::to_vec(&payload).context("serializing python payload")?;
        stdin
            .write_all(&payload_bytes)
            .context("writing payload to python stdin")?;
    }

    let output = child
        .wait_with_output()
        .context("waiting for python process")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("python execution failed: {stderr}");
    }
    let stdout = String::from_utf8(output.stdout).context("parsing python stdout utf8")?;
    let parsed: PythonEval = serde_json::from_str(stdout.trim()).context("parsing python json")?;
    Ok(parsed)
}

fn ensure_same_length(case_id: &str, a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        bail!(
            "case {case_id} has mismatched output lengths: left={}, right={}",
            a.len(),
            b.len()
        );
    }
    Ok(())
}

fn benchmark_avg_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let iters = iters.max(1);
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_nanos() as f64 / iters as f64)
}

struct RowBuildInput<'a> {
    case_id: &'a str,
    rust_candidate: &'a [f64],
    python_reference: &'a [f64],
    rust_candidate_ns: f64,
    rust_baseline_ns: f64,
    python_ns: f64,
}

fn build_row(args: RowBuildInput<'_>) -> ContractRow {
    ContractRow {
        case_id: args.case_id.to_string(),
        pearson_r: pearson(args.rust_candidate, args.python_reference),
        mae: mean_abs_error(args.rust_candidate, args.python_reference),
        rmse: root_mean_squared_error(args.rust_candidate, args.python_reference),
        max_abs: max_abs_error(args.rust_candidate, args.python_reference),
        rust_candidate_ns: args.rust_candidate_ns,
        rust_baseline_ns: args.rust_baseline_ns,
        python_ns: args.python_ns,
        speedup_vs_baseline: args.rust_baseline_ns / args.rust_candidate_ns,
        speedup_vs_python: args.python_ns / args.rust_candidate_ns,
    }
}

fn mean_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .sum::<f64>()
        / a.len() as f64
}

fn root_mean_squared_error(a: &[f64], b: &[f64]) -> f64 {
    (a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        / a.len() as f64)
        .sqrt()
}

fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = *x - mean_a;
        let db = *y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        if a == b {
            1.0
        } else {
            0.0
        }
    } else {
        cov / (var_a.sqrt() * var_b.sqrt())
    }
}

fn write_summary_csv(path: &Path, rows: &[ContractRow]) -> Result<()> {
    let mut out = String::new();
    out.push_str(
        "case_id,pearson_r,mae,rmse,max_abs,rust_candidate_ns,rust_baseline_ns,python_ns,\
         speedup_vs_baseline,speedup_vs_python\n",
    );
    for row in rows {
        out.push_str(&format!(
            "{},{:.12},{:.12},{:.12},{:.12},{:.3},{:.3},{:.3},{:.6},{:.6}\n",
            row.case_id,
            row.pearson_r,
            row.mae,
            row.rmse,
            row.max_abs,
            row.rust_candidate_ns,
            row.rust_baseline_ns,
            row.python_ns,
            row.speedup_vs_baseline,
            row.speedup_vs_python,
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}
