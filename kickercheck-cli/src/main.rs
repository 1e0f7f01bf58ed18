use clap::Parser;
use kickercheck::image::pgm;
use kickercheck::{
    BatchItem, DirSource, GateConfig, ImageSource, Label, LabelTable, MatchDomain, Pipeline,
    PipelineConfig, Region, RegionSpec, TemplateSet, TemplateSource,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Kicker presence/orientation check (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output (stage events and timings).
    #[arg(long)]
    trace: bool,
    /// Write the configured ROI of this image (relative to image_root) as a
    /// PGM template instead of classifying.
    #[arg(long, value_name = "ID")]
    extract_template: Option<String>,
    /// Destination for --extract-template.
    #[arg(long, value_name = "FILE", requires = "extract_template")]
    template_out: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LabelConfig {
    Valid,
    Invalid,
}

impl From<LabelConfig> for Label {
    fn from(value: LabelConfig) -> Self {
        match value {
            LabelConfig::Valid => Label::Valid,
            LabelConfig::Invalid => Label::Invalid,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TemplateEntry {
    path: String,
    label: LabelConfig,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RegionConfig {
    Full,
    #[default]
    UpperHalf,
    Rect {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

impl From<RegionConfig> for RegionSpec {
    fn from(value: RegionConfig) -> Self {
        match value {
            RegionConfig::Full => RegionSpec::Full,
            RegionConfig::UpperHalf => RegionSpec::UpperHalf,
            RegionConfig::Rect {
                x,
                y,
                width,
                height,
            } => RegionSpec::Rect(Region::new(x, y, width, height)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
enum GateJson {
    Coverage {
        #[serde(default)]
        region: RegionConfig,
        threshold_percent: f64,
    },
    Disabled,
}

impl From<GateJson> for GateConfig {
    fn from(value: GateJson) -> Self {
        match value {
            GateJson::Coverage {
                region,
                threshold_percent,
            } => GateConfig::Coverage {
                region: region.into(),
                threshold_percent,
            },
            GateJson::Disabled => GateConfig::Disabled,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MatchDomainConfig {
    Grayscale,
    Binary,
}

impl From<MatchDomainConfig> for MatchDomain {
    fn from(value: MatchDomainConfig) -> Self {
        match value {
            MatchDomainConfig::Grayscale => MatchDomain::Grayscale,
            MatchDomainConfig::Binary => MatchDomain::Binary,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PipelineJson {
    canonical_size: Option<[usize; 2]>,
    binarize_threshold: f32,
    gate: GateJson,
    roi: RegionConfig,
    match_domain: MatchDomainConfig,
}

/// Embedded deployment defaults (`PipelineConfig::embedded`).
impl Default for PipelineJson {
    fn default() -> Self {
        Self {
            canonical_size: Some([128, 128]),
            binarize_threshold: 0.8,
            gate: GateJson::Coverage {
                region: RegionConfig::UpperHalf,
                threshold_percent: 2.0,
            },
            roi: RegionConfig::Full,
            match_domain: MatchDomainConfig::Grayscale,
        }
    }
}

impl From<PipelineJson> for PipelineConfig {
    fn from(value: PipelineJson) -> Self {
        PipelineConfig {
            canonical_size: value.canonical_size.map(|[w, h]| (w, h)),
            binarize_threshold: value.binarize_threshold,
            gate: value.gate.into(),
            roi: value.roi.into(),
            match_domain: value.match_domain.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    image_root: PathBuf,
    images: Vec<String>,
    image_pattern: Option<String>,
    index_range: Option<[usize; 2]>,
    templates: Vec<TemplateEntry>,
    pipeline: PipelineJson,
    output_path: Option<String>,
}

impl Config {
    /// Explicit images followed by the pattern expanded over the index range.
    fn image_ids(&self) -> Vec<String> {
        let mut ids = self.images.clone();
        if let (Some(pattern), Some([first, last])) = (&self.image_pattern, self.index_range) {
            ids.extend((first..=last).map(|i| pattern.replace("{}", &i.to_string())));
        }
        ids
    }
}

#[derive(Debug, Serialize)]
struct Record {
    id: String,
    status: &'static str,
    coverage_percent: Option<f64>,
    label: Option<&'static str>,
    best_template: Option<String>,
    best_distance: Option<f32>,
    distances: Option<Vec<f32>>,
    error: Option<String>,
    timings_us: BTreeMap<&'static str, u64>,
}

impl Record {
    fn from_item(item: BatchItem, templates: &TemplateSet) -> Self {
        let timings_us = item
            .timings
            .stages
            .iter()
            .map(|timing| (timing.stage, timing.micros))
            .collect();
        let mut record = Record {
            id: item.id,
            status: "skipped",
            coverage_percent: None,
            label: None,
            best_template: None,
            best_distance: None,
            distances: None,
            error: None,
            timings_us,
        };
        match item.outcome {
            Ok(result) => {
                record.status = if result.present { "classified" } else { "absent" };
                record.coverage_percent = result.coverage_percent;
                record.label = result.label.map(|label| label.as_str());
                if let Some(matched) = result.matched {
                    record.best_template = templates
                        .get(matched.best_index)
                        .map(|tpl| tpl.name().to_owned());
                    record.best_distance = Some(matched.best_distance);
                    record.distances = Some(matched.distances);
                }
            }
            Err(err) => record.error = Some(err.to_string()),
        }
        record
    }
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    total: usize,
    valid: usize,
    invalid: usize,
    absent: usize,
    skipped: usize,
}

#[derive(Debug, Serialize)]
struct Output {
    summary: Summary,
    results: Vec<Record>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("kickercheck=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    let ids = config.image_ids();
    let source = DirSource::new(&config.image_root);
    let pipeline_config = PipelineConfig::from(config.pipeline);
    pipeline_config.validate()?;

    if let Some(id) = cli.extract_template {
        let out = cli
            .template_out
            .ok_or("--template-out is required with --extract-template")?;
        let image = source.get(&id)?;
        let roi = pipeline_config.extract_roi(&image)?;
        fs::write(&out, pgm::encode_image(&roi)?)?;
        tracing::info!(
            id = id.as_str(),
            width = roi.width(),
            height = roi.height(),
            "template written"
        );
        return Ok(());
    }

    if config.templates.is_empty() {
        return Err("at least one template must be configured".into());
    }
    let template_ids: Vec<&str> = config.templates.iter().map(|t| t.path.as_str()).collect();
    let templates = source.load(&template_ids)?;
    let labels = LabelTable::new(
        config
            .templates
            .into_iter()
            .map(|t| Label::from(t.label))
            .collect(),
    )?;
    let pipeline = Pipeline::new(pipeline_config, templates, labels)?;

    if ids.is_empty() {
        return Err("no images configured (set images or image_pattern + index_range)".into());
    }
    let items = pipeline.classify_batch(&source, &ids)?;

    let mut summary = Summary::default();
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let record = Record::from_item(item, pipeline.templates());
        summary.total += 1;
        match (record.status, record.label) {
            ("absent", _) => summary.absent += 1,
            ("skipped", _) => summary.skipped += 1,
            (_, Some("valid")) => summary.valid += 1,
            _ => summary.invalid += 1,
        }
        results.push(record);
    }

    let output = Output { summary, results };
    let json = serde_json::to_string_pretty(&output)?;
    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Config, EXAMPLE_JSON};
    use kickercheck::{GateConfig, PipelineConfig, Region, RegionSpec};

    #[test]
    fn example_config_expands_pattern_and_matches_embedded_preset() {
        let config: Config = serde_json::from_str(EXAMPLE_JSON).unwrap();
        let ids = config.image_ids();
        assert_eq!(ids.len(), 8);
        assert_eq!(ids[0], "images/1.pgm");
        assert_eq!(ids[7], "images/8.pgm");
        assert_eq!(config.templates.len(), 4);
        assert_eq!(
            PipelineConfig::from(config.pipeline),
            PipelineConfig::embedded()
        );
    }

    #[test]
    fn explicit_images_come_before_the_pattern() {
        let config: Config = serde_json::from_str(
            r#"{
                "images": ["calib.pgm"],
                "image_pattern": "run/{}.pgm",
                "index_range": [3, 4],
                "pipeline": {
                    "canonical_size": null,
                    "gate": { "mode": "disabled" },
                    "roi": { "rect": { "x": 1, "y": 2, "width": 3, "height": 4 } }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.image_ids(), ["calib.pgm", "run/3.pgm", "run/4.pgm"]);
        let pipeline = PipelineConfig::from(config.pipeline);
        assert_eq!(pipeline.canonical_size, None);
        assert_eq!(pipeline.gate, GateConfig::Disabled);
        assert_eq!(pipeline.roi, RegionSpec::Rect(Region::new(1, 2, 3, 4)));
    }
}
