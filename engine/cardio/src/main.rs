mod config;
mod error;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use cardio_infer::{
    render_contributions, render_error, render_summary, render_verdict, top_contributions,
    FeatureContribution, Pipeline, PipelineError, Verdict, VerdictReport,
};
use cardio_model::load_artifact;
use cardio_schema::{build, defaults, fields, RawFields, ValidationOptions};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use crate::config::{Config, OutputFormat};
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "cardio",
    version,
    about = "Heart disease risk prediction from clinical measurements",
    long_about = "cardio validates 13 clinical measurements, runs them through a trained\n\
        binary classifier and reports a risk verdict with its confidence.\n\n\
        EXAMPLES:\n\
        \n  cardio predict --model heart.json --input patient.json\n\
        \n  cardio predict -m heart.json --defaults --field age=63 --field sex=1\n\
        \n  cat patient.json | cardio predict -m heart.json --input - --format json\n\
        \n  cardio schema\n\
        \n  cardio check-model --model heart.json",
    after_help = "Settings not given on the command line are read from cardio.toml."
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: ./cardio.toml if present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Predict heart disease risk for one patient
    Predict(PredictArgs),
    /// Print the input fields, their domains and defaults
    Schema(SchemaArgs),
    /// Load a model artifact and check it against the input schema
    CheckModel(CheckModelArgs),
}

#[derive(Debug, Args, Clone, Default)]
struct PredictArgs {
    /// Model artifact (JSON)
    #[arg(short, long, value_name = "FILE")]
    model: Option<PathBuf>,

    /// JSON object of field values, `-` for stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// A single field value, overriding --input (repeatable)
    #[arg(short, long = "field", value_name = "KEY=VALUE")]
    fields: Vec<String>,

    /// Fill missing fields with the form defaults
    #[arg(long)]
    defaults: bool,

    /// Reject fields that are not part of the schema
    #[arg(long)]
    strict: bool,

    #[arg(long, value_enum, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Report the N features that contributed most (linear models only)
    #[arg(long, value_name = "N")]
    explain: Option<usize>,
}

#[derive(Debug, Args, Clone)]
struct SchemaArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Args, Clone)]
struct CheckModelArgs {
    /// Model artifact (JSON); falls back to `model` in cardio.toml
    #[arg(short, long, value_name = "FILE")]
    model: Option<PathBuf>,
}

/// `predict` settings after merging flags over the config file.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    model: Option<PathBuf>,
    format: OutputFormat,
    fill_defaults: bool,
    options: ValidationOptions,
    explain: usize,
}

impl Settings {
    fn resolve(config: &Config, args: &PredictArgs) -> Settings {
        Settings {
            model: args.model.clone().or_else(|| config.model.clone()),
            format: args.format.unwrap_or(config.format),
            fill_defaults: args.defaults || config.fill_defaults,
            options: ValidationOptions {
                reject_unknown_fields: args.strict || config.strict_fields,
            },
            explain: args.explain.unwrap_or(config.explain),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG, when set, takes precedence over -v.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(CliError::Stdin)?;
        Ok(buf)
    } else {
        fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Input file first, then `--field` overrides, then defaults for what is left.
fn collect_input(args: &PredictArgs, fill_defaults: bool) -> Result<RawFields, CliError> {
    let mut raw = match &args.input {
        Some(path) => RawFields::from_json_str(&read_input(path)?)?,
        None => RawFields::new(),
    };
    raw.extend(RawFields::from_pairs(&args.fields)?);
    if fill_defaults {
        let filled = raw.fill_missing(&defaults());
        if !filled.is_empty() {
            log::info!("using defaults for {}", filled.join(", "));
        }
    }
    Ok(raw)
}

fn load_pipeline(model: Option<PathBuf>) -> Result<Pipeline, CliError> {
    let path = model.ok_or(CliError::NoModel)?;
    let model = load_artifact(&path).map_err(|source| CliError::Model { path, source })?;
    Ok(Pipeline::new(model)?)
}

fn render_text(verdict: &Verdict, contributions: &[FeatureContribution]) -> String {
    let mut out = render_verdict(verdict);
    out.push_str("\n\nInput summary\n");
    out.push_str(&render_summary(verdict.record()));
    if !contributions.is_empty() {
        out.push_str("\nTop contributing factors\n");
        out.push_str(&render_contributions(contributions));
    }
    out
}

fn predict(config: &Config, args: &PredictArgs) -> Result<String, CliError> {
    let settings = Settings::resolve(config, args);
    log::debug!("predict settings: {settings:?}");
    let pipeline = load_pipeline(settings.model)?.with_options(settings.options);
    let raw = collect_input(args, settings.fill_defaults)?;
    let verdict = pipeline.run(&raw)?;

    let contributions = if settings.explain > 0 {
        let vector = build(verdict.record());
        top_contributions(pipeline.model(), &vector, settings.explain)
            .map_err(PipelineError::from)?
    } else {
        Vec::new()
    };

    match settings.format {
        OutputFormat::Text => Ok(render_text(&verdict, &contributions)),
        OutputFormat::Json => {
            let report = VerdictReport::new(&verdict).with_contributions(contributions);
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

fn schema(args: &SchemaArgs) -> Result<String, CliError> {
    match args.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(fields())?),
        OutputFormat::Text => {
            let mut out = format!(
                "{:<3} {:<9} {:<12} {:<14} {:<8} {}\n",
                "#", "KEY", "TYPE", "DOMAIN", "DEFAULT", "LABEL"
            );
            for spec in fields() {
                out.push_str(&format!(
                    "{:<3} {:<9} {:<12} {:<14} {:<8} {}\n",
                    spec.index(),
                    spec.key(),
                    spec.semantic.as_str(),
                    spec.domain.to_string(),
                    spec.default.to_string(),
                    spec.label
                ));
            }
            Ok(out)
        }
    }
}

fn check_model(config: &Config, args: &CheckModelArgs) -> Result<String, CliError> {
    let pipeline = load_pipeline(args.model.clone().or_else(|| config.model.clone()))?;
    let model = pipeline.model();
    let described = match model.metadata() {
        Some(meta) => format!("model `{}` v{}", meta.id, meta.version),
        None => "model".to_string(),
    };
    Ok(format!(
        "{described} ({}) is compatible with the {}-field input schema\n",
        model.backend_name(),
        fields().len()
    ))
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let config = Config::load(cli.config.as_deref())?;
    match &cli.command {
        Command::Predict(args) => predict(&config, args),
        Command::Schema(args) => schema(args),
        Command::CheckModel(args) => check_model(&config, args),
    }
}

fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(&cli) {
        Ok(out) => {
            print!("{out}");
            if !out.ends_with('\n') {
                println!();
            }
            0
        }
        Err(CliError::Pipeline(e)) => {
            log::debug!("pipeline stopped after stage: {}", e.reached());
            eprintln!("error: {}", render_error(&e));
            1
        }
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

fn main() {
    std::process::exit(run_cli());
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardio_model::{
        LogisticParameters, ModelArtifact, ModelMetadata, ModelType, ModelVersion,
    };
    use cardio_schema::{field_order, Field, FEATURE_COUNT};
    use pretty_assertions::assert_eq;

    fn write_model(dir: &Path, names: Vec<String>) -> PathBuf {
        let mut w = vec![0.0; FEATURE_COUNT];
        w[Field::Age.index()] = 0.08;
        w[Field::MajorVessels.index()] = 1.1;
        let meta = ModelMetadata::new(
            "heart-lr",
            "Heart disease logistic regression",
            ModelVersion::new(1, 2, 0),
            ModelType::Logistic,
        )
        .with_feature_names(names);
        let path = dir.join("heart.json");
        ModelArtifact::logistic(meta, &LogisticParameters::new(w, -5.0))
            .unwrap()
            .write(&path)
            .unwrap();
        path
    }

    fn schema_names() -> Vec<String> {
        field_order().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_predict_flags() {
        let cli = Cli::try_parse_from([
            "cardio", "-vv", "predict", "-m", "m.json", "--field", "age=63", "-f", "sex=1",
            "--defaults", "--format", "json", "--explain", "3",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.model, Some(PathBuf::from("m.json")));
        assert_eq!(args.fields, vec!["age=63".to_string(), "sex=1".to_string()]);
        assert!(args.defaults);
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.explain, Some(3));
    }

    #[test]
    fn parses_check_model() {
        let cli = Cli::try_parse_from(["cardio", "check-model", "--model", "m.json"]).unwrap();
        assert!(matches!(cli.command, Command::CheckModel(_)));
        assert!(Cli::try_parse_from(["cardio", "predict", "--format", "yaml"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let config = Config {
            model: Some(PathBuf::from("from-config.json")),
            format: OutputFormat::Json,
            fill_defaults: true,
            strict_fields: false,
            explain: 2,
        };
        let args = PredictArgs {
            model: Some(PathBuf::from("from-flag.json")),
            strict: true,
            explain: Some(0),
            ..PredictArgs::default()
        };
        let settings = Settings::resolve(&config, &args);
        assert_eq!(settings.model, Some(PathBuf::from("from-flag.json")));
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(settings.fill_defaults);
        assert!(settings.options.reject_unknown_fields);
        assert_eq!(settings.explain, 0);
    }

    #[test]
    fn fields_override_input_file_and_defaults_fill_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("patient.json");
        fs::write(&input, r#"{"age": 40, "chol": 250}"#).unwrap();
        let args = PredictArgs {
            input: Some(input),
            fields: vec!["age=63".into()],
            ..PredictArgs::default()
        };

        let raw = collect_input(&args, false).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.get("age"), Some(&cardio_schema::RawValue::Int(63)));

        let raw = collect_input(&args, true).unwrap();
        assert_eq!(raw.len(), FEATURE_COUNT);
        assert_eq!(raw.get("chol"), Some(&cardio_schema::RawValue::Int(250)));
    }

    #[test]
    fn predict_text_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(dir.path(), schema_names());
        let args = PredictArgs {
            model: Some(model),
            fields: vec!["age=50".into()],
            defaults: true,
            ..PredictArgs::default()
        };
        // logit = 0.08 * 50 - 5 = -1, so P(disease) ≈ 0.2689
        let text = predict(&Config::default(), &args).unwrap();
        assert!(text.starts_with("Low Risk of Heart Disease (73.11% confidence)"));
        assert!(text.contains("Input summary"));

        let args = PredictArgs {
            format: Some(OutputFormat::Json),
            explain: Some(2),
            ..args
        };
        let json: serde_json::Value =
            serde_json::from_str(&predict(&Config::default(), &args).unwrap()).unwrap();
        assert_eq!(json["risk"], "LOW");
        assert_eq!(json["confidence_percent"], 73.11);
        assert_eq!(json["contributions"][0]["field"], "age");
        assert_eq!(json["contributions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn predict_failures_map_to_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(dir.path(), schema_names());
        let missing = PredictArgs {
            model: Some(model.clone()),
            fields: vec!["age=50".into()],
            ..PredictArgs::default()
        };
        let err = predict(&Config::default(), &missing).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        let CliError::Pipeline(e) = err else {
            panic!("expected a pipeline error");
        };
        assert_eq!(render_error(&e), "Please check Sex (sex): a value is required.");

        let no_model = PredictArgs::default();
        assert!(matches!(
            predict(&Config::default(), &no_model),
            Err(CliError::NoModel)
        ));

        let bad_pair = PredictArgs {
            model: Some(model),
            fields: vec!["age".into()],
            ..PredictArgs::default()
        };
        assert_eq!(predict(&Config::default(), &bad_pair).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn check_model_reports_reordered_features() {
        let dir = tempfile::tempdir().unwrap();
        let ok = write_model(dir.path(), schema_names());
        let out = check_model(&Config::default(), &CheckModelArgs { model: Some(ok) }).unwrap();
        assert!(out.starts_with("model `heart-lr` v1.2.0 (logistic) is compatible"));

        let mut names = schema_names();
        names.swap(0, 1);
        let swapped = write_model(dir.path(), names);
        let err = check_model(&Config::default(), &CheckModelArgs { model: Some(swapped) })
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Pipeline(PipelineError::SchemaMismatch(_))
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn schema_lists_every_field() {
        let text = schema(&SchemaArgs {
            format: OutputFormat::Text,
        })
        .unwrap();
        assert_eq!(text.lines().count(), FEATURE_COUNT + 1);
        assert!(text.contains("trestbps"));

        let json: serde_json::Value = serde_json::from_str(
            &schema(&SchemaArgs {
                format: OutputFormat::Json,
            })
            .unwrap(),
        )
        .unwrap();
        assert_eq!(json.as_array().unwrap().len(), FEATURE_COUNT);
        assert_eq!(json[12]["field"], "thal");
    }
}
