mod raw;
mod source;
mod still;
mod synthetic;

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use frame_quality_common::config::{Config, SourceConfig};
use frame_quality_scorer::{
    annotate, build_gate, build_scorers, FrameGate, FrameScorer, QualityReport,
};
use serde::Serialize;
use source::{FrameSource, SourceError};
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("config error: {0}")]
    Config(#[from] frame_quality_common::config::ConfigError),
    #[error("setup error: {0}")]
    Build(#[from] frame_quality_scorer::BuildError),
    #[error("frame source error: {0}")]
    Source(#[from] SourceError),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line of probe output.
#[derive(Debug, Serialize)]
struct ProbeLine<'a> {
    #[serde(flatten)]
    report: &'a QualityReport,
    kept: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ProbeStats {
    frames: u64,
    kept: u64,
    skipped: u64,
}

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    // stdout carries the JSON reports, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        mode = config.source.mode,
        metrics = ?config.scoring.metrics,
        gate = config.gate.kind,
        gate_metric = config.gate.metric,
        "starting frame-quality probe"
    );

    if let Err(e) = run(&config) {
        error!(error = %e, "probe failed");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), ProbeError> {
    let scorers = build_scorers(&config.scoring)?;
    let mut gate = build_gate(&config.gate)?;
    let mut source = open_source(&config.source)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_probe(
        source.as_mut(),
        &scorers,
        gate.as_mut(),
        &config.gate.metric,
        &mut out,
    )?;
    Ok(())
}

fn open_source(config: &SourceConfig) -> Result<Box<dyn FrameSource>, SourceError> {
    let require_path = || {
        config
            .path
            .clone()
            .ok_or_else(|| {
                SourceError::Config(format!("source mode {} needs a path", config.mode))
            })
    };
    let require_dims = || {
        config.dimensions().ok_or_else(|| {
            SourceError::Config(format!(
                "source mode {} needs width/height or frame_size",
                config.mode
            ))
        })
    };

    match config.mode.as_str() {
        "raw" => {
            let path = require_path()?;
            let (width, height) = require_dims()?;
            Ok(Box::new(raw::RawFileSource::open(
                &path,
                width,
                height,
                config.format,
            )?))
        }
        "image" => Ok(Box::new(still::ImageFileSource::open(&require_path()?)?)),
        "synthetic" => {
            let (width, height) = require_dims()?;
            Ok(Box::new(synthetic::SyntheticSource::new(
                &config.pattern,
                width,
                height,
                config.frames,
            )?))
        }
        other => Err(SourceError::Config(format!(
            "unknown source mode '{other}', expected 'raw', 'image' or 'synthetic'"
        ))),
    }
}

/// Score every frame from `source`, write one JSON line per frame to `out`
/// and return the keep/skip tally.
fn run_probe<W: Write>(
    source: &mut dyn FrameSource,
    scorers: &[Box<dyn FrameScorer>],
    gate: &mut dyn FrameGate,
    gate_metric: &str,
    out: &mut W,
) -> Result<ProbeStats, ProbeError> {
    let mut stats = ProbeStats::default();
    let started = Instant::now();

    info!(source = source.name(), gate = gate.name(), "entering probe loop");

    while let Some(frame) = source.next_frame()? {
        let frame_start = Instant::now();
        let report = annotate(&frame, scorers);

        // A frame the gate metric could not score is never dropped.
        let kept = match report.score(gate_metric) {
            Some(score) => gate.should_keep(score),
            None => true,
        };

        let line = ProbeLine {
            report: &report,
            kept,
        };
        serde_json::to_writer(&mut *out, &line)?;
        out.write_all(b"\n")?;

        stats.frames += 1;
        if kept {
            stats.kept += 1;
        } else {
            stats.skipped += 1;
        }

        let frame_ms = frame_start.elapsed().as_secs_f64() * 1000.0;
        let fps = if frame_ms > 0.0 { 1000.0 / frame_ms } else { 0.0 };
        debug!(
            seq = frame.seq,
            bytes = frame.payload_size(),
            frame_ms = format!("{frame_ms:.2}"),
            fps = format!("{fps:.1}"),
            kept,
            "frame scored"
        );

        source.release(frame);
    }

    out.flush()?;
    info!(
        frames = stats.frames,
        kept = stats.kept,
        skipped = stats.skipped,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "probe finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_quality_common::config::{GateConfig, ScoringConfig};
    use synthetic::SyntheticSource;

    fn lines(out: &[u8]) -> Vec<serde_json::Value> {
        std::str::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn writes_one_line_per_frame() {
        let mut source = SyntheticSource::new("step", 60, 48, 5).unwrap();
        let scorers = build_scorers(&ScoringConfig::default()).unwrap();
        let mut gate = build_gate(&GateConfig::default()).unwrap();
        let mut out = Vec::new();

        let stats =
            run_probe(&mut source, &scorers, gate.as_mut(), "sharpness", &mut out).unwrap();
        assert_eq!(
            stats,
            ProbeStats {
                frames: 5,
                kept: 5,
                skipped: 0
            }
        );

        let lines = lines(&out);
        assert_eq!(lines.len(), 5);
        for line in &lines {
            assert_eq!(line["width"], 60);
            assert_eq!(line["kept"], true);
            assert!(line["scores"]["text_sharpness"].as_f64().unwrap() > 0.0);
        }
    }

    #[test]
    fn threshold_gate_drops_blurred_frames() {
        let mut source = SyntheticSource::new("step", 60, 48, 8).unwrap();
        let scorers = build_scorers(&ScoringConfig::default()).unwrap();
        let scores: Vec<f32> = {
            let mut probe_source = SyntheticSource::new("step", 60, 48, 8).unwrap();
            let mut scores = Vec::new();
            while let Some(frame) = probe_source.next_frame().unwrap() {
                scores.push(annotate(&frame, &scorers).score("text_sharpness").unwrap());
            }
            scores
        };
        // Frames 4 and 8 are blurred and score lower than the sharp ones.
        assert!(scores[3] < scores[0]);
        let midpoint = (scores[0] + scores[3]) / 2.0;

        let mut gate = build_gate(&GateConfig {
            kind: "threshold".into(),
            metric: "text_sharpness".into(),
            min_score: midpoint,
            ..GateConfig::default()
        })
        .unwrap();
        let mut out = Vec::new();
        let stats =
            run_probe(&mut source, &scorers, gate.as_mut(), "text_sharpness", &mut out).unwrap();

        assert_eq!(
            stats,
            ProbeStats {
                frames: 8,
                kept: 6,
                skipped: 2
            }
        );
        let lines = lines(&out);
        assert_eq!(lines[3]["kept"], false);
        assert_eq!(lines[7]["kept"], false);
    }

    #[test]
    fn unscored_gate_metric_keeps_frame() {
        // 5x5 is below the text sharpness minimum, so the gate never sees a score.
        let mut source = SyntheticSource::new("checker", 5, 5, 2).unwrap();
        let scorers = build_scorers(&ScoringConfig::default()).unwrap();
        let mut gate = build_gate(&GateConfig {
            kind: "threshold".into(),
            metric: "text_sharpness".into(),
            min_score: 1.0e9,
            ..GateConfig::default()
        })
        .unwrap();
        let mut out = Vec::new();

        let stats =
            run_probe(&mut source, &scorers, gate.as_mut(), "text_sharpness", &mut out).unwrap();
        assert_eq!(stats.kept, 2);
        assert!(lines(&out)[0]["scores"]["text_sharpness"].is_null());
    }

    #[test]
    fn open_source_checks_required_fields() {
        let config: SourceConfig = toml::from_str("mode = \"raw\"\nwidth = 4\nheight = 4").unwrap();
        assert!(matches!(open_source(&config), Err(SourceError::Config(_))));

        let config: SourceConfig = toml::from_str("mode = \"synthetic\"").unwrap();
        assert!(matches!(open_source(&config), Err(SourceError::Config(_))));

        let config: SourceConfig = toml::from_str("mode = \"rtsp\"").unwrap();
        assert!(matches!(open_source(&config), Err(SourceError::Config(_))));

        let config: SourceConfig =
            toml::from_str("mode = \"synthetic\"\nframe_size = \"qvga\"\nframes = 1").unwrap();
        let mut source = open_source(&config).unwrap();
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!((frame.width, frame.height), (320, 240));
    }
}
