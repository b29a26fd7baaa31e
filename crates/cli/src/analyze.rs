use jarscope_core::remap::{Remapper, SimpleRemapper};
use jarscope_core::{JarModel, PipelineConfig};
use jarscope_java::{JarReader, PipelineReport};
use std::path::PathBuf;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::info;

pub struct AnalyzeArgs {
    pub jar: PathBuf,
    pub classpath: Option<PathBuf>,
    pub no_join: bool,
    pub mappings: Option<PathBuf>,
    pub json: bool,
}

#[derive(Tabled)]
struct AnomalyRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

pub fn run(args: AnalyzeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::default();
    if let Some(dir) = args.classpath {
        config = config.with_classpath(dir);
    }
    if args.no_join {
        config = config.without_joining();
    }

    let remapper = match &args.mappings {
        Some(path) => {
            info!("Loading mappings from {}...", path.display());
            let remapper = SimpleRemapper::from_tsv(&std::fs::read_to_string(path)?)?;
            info!("Loaded {} mappings.", remapper.len());
            Some(remapper)
        }
        None => None,
    };

    let reader = JarReader::new(args.jar, config);
    let (model, report) = reader.apply(remapper.as_ref().map(|r| r as &dyn Remapper))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&model, &report);
    }
    Ok(())
}

fn print_summary(model: &JarModel, report: &PipelineReport) {
    let records = model
        .classes
        .class_ids()
        .filter(|&id| model.arena.class(id).is_record())
        .count();

    println!("Classes read:       {}", report.classes_read);
    println!("Records:            {}", records);
    println!("Classpath classes:  {}", report.classpath_classes);
    println!("Promoted getters:   {}", report.promoted_getters);
    println!("Joined methods:     {}", report.joined_methods);
    println!("Propagated flags:   {}", report.propagated_flags);
    println!("Traversed classes:  {}", report.traversed_classes);

    if report.anomalies.is_empty() {
        println!("\nNo anomalies.");
        return;
    }
    let rows: Vec<AnomalyRow> = report
        .anomalies
        .iter()
        .map(|a| AnomalyRow {
            kind: a.kind(),
            detail: a.to_string(),
        })
        .collect();
    println!("\n{}", Table::new(rows).with(Style::psql()));
}
