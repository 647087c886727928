use std::{
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

use image::{Rgb, RgbImage};
use medix_library::{
    ChartConfigBuilder, MedixConfig, MedixConfigBuilder, chart, report::read_csv, run,
};

fn write_wav(path: &Path, rate: u32, frames: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut w = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        w.write_sample(((i % 100) as i16 - 50) * 100).unwrap();
    }
    w.finalize().unwrap();
}

/// Collects formatted log output so a test can count the lines it emitted.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn lines_with(&self, needle: &str) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .filter(|l| l.contains(needle))
            .map(String::from)
            .collect()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn config_for(root: &Path, media: &Path) -> MedixConfig {
    MedixConfigBuilder::default()
        .input_dir(media)
        .report_path(root.join("reporte_multimedia.csv"))
        .chart_dir(root.join("charts"))
        .sort_by_name(true)
        .charts(ChartConfigBuilder::default().show(false).build().unwrap())
        .build()
        .unwrap()
}

#[test]
fn png_wav_and_txt() {
    let tmp = tempfile::tempdir().unwrap();
    let media = tmp.path().join("fotos_audios");
    std::fs::create_dir(&media).unwrap();

    RgbImage::from_pixel(100, 50, Rgb([255, 0, 0]))
        .save(media.join("a.png"))
        .unwrap();
    write_wav(&media.join("b.wav"), 44_100, 88_200);
    std::fs::write(media.join("c.txt"), "ignored").unwrap();

    let cfg = config_for(tmp.path(), &media);
    let out = run(&cfg).unwrap();

    assert!(out.failures.is_empty());
    assert!(out.chart_error.is_none());
    assert_eq!(out.table.len(), 2);

    let rows = read_csv(&cfg.report_path).unwrap();
    assert_eq!(rows.len(), 2);

    let image = &rows.rows()[0];
    assert_eq!(image.get_str("type"), Some("image"));
    assert_eq!(image.get_str("name"), Some("a.png"));
    assert_eq!(image.get_f64("width"), Some(100.0));
    assert_eq!(image.get_f64("height"), Some(50.0));
    assert_eq!(image.get_str("resolution"), Some("100x50"));
    assert_eq!(image.get_f64("color_r"), Some(255.0));
    assert_eq!(image.get_f64("color_g"), Some(0.0));
    assert_eq!(image.get_f64("color_b"), Some(0.0));
    assert!(image.get("duration_seconds").is_none());

    let size = std::fs::metadata(media.join("a.png")).unwrap().len() as f64 / 1024.0;
    assert!((image.get_f64("size_kb").unwrap() - size).abs() <= 0.005);

    let audio = &rows.rows()[1];
    assert_eq!(audio.get_str("type"), Some("audio"));
    assert_eq!(audio.get_str("name"), Some("b.wav"));
    assert!((audio.get_f64("duration_seconds").unwrap() - 2.0).abs() < 1e-3);
    assert_eq!(audio.get_f64("sample_rate"), Some(44_100.0));
    assert!(audio.get("width").is_none());

    assert!(rows.rows().iter().all(|r| r.get_str("name") != Some("c.txt")));

    let charts: Vec<_> = out.charts.iter().filter_map(|p| p.file_name()?.to_str()).collect();
    assert_eq!(
        charts,
        vec![
            chart::WIDTH_VS_HEIGHT,
            chart::SIZE_PER_FILE,
            chart::AUDIO_DURATION,
            chart::IMAGE_RESOLUTIONS
        ]
    );
    assert!(out.charts.iter().all(|p| p.exists()));
}

#[test]
fn empty_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let media = tmp.path().join("vacio");
    std::fs::create_dir(&media).unwrap();

    let cfg = config_for(tmp.path(), &media);
    let out = run(&cfg).unwrap();

    assert!(out.table.is_empty());
    assert_eq!(std::fs::metadata(&cfg.report_path).unwrap().len(), 0);
    assert_eq!(out.charts.len(), 2);
    assert!(out.chart_error.is_none());
}

#[test]
fn one_corrupt_image_among_valid_files() {
    let tmp = tempfile::tempdir().unwrap();
    let media = tmp.path().join("media");
    std::fs::create_dir(&media).unwrap();

    for (i, name) in ["uno.png", "dos.bmp", "tres.jpeg"].iter().enumerate() {
        let img = RgbImage::from_pixel(10 + i as u32, 10, Rgb([0, 0, 200]));
        let format = image::ImageFormat::from_path(name).unwrap();
        img.save_with_format(media.join(name), format).unwrap();
    }
    std::fs::write(media.join("roto.png"), b"\x89PNG\r\n\x1a\n garbage").unwrap();

    let mut cfg = config_for(tmp.path(), &media);
    cfg.charts.enabled = false;

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, || run(&cfg)).unwrap();

    assert_eq!(out.table.len(), 3);
    assert_eq!(out.failures.len(), 1);
    assert_eq!(out.failures[0].name, "roto.png");
    assert!(out.charts.is_empty());

    let warnings = logs.lines_with(" WARN ");
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("roto.png"));
}

#[test]
fn unwritable_report_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let media = tmp.path().join("media");
    std::fs::create_dir(&media).unwrap();

    let mut cfg = config_for(tmp.path(), &media);
    cfg.report_path = tmp.path().join("no_such_dir").join("report.csv");

    assert!(run(&cfg).is_err());
}

#[test]
fn missing_directory_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config_for(tmp.path(), &tmp.path().join("missing"));

    assert!(run(&cfg).is_err());
    assert!(!cfg.report_path.exists());
}
