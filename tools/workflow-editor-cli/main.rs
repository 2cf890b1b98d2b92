use clap::{Parser, ValueEnum};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use url::Url;
use workflow_editor::definitions::diagnose_definitions;
use workflow_editor::prelude::*;

/// Which definitions representation to validate the document as.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantCli {
    Catalog,
    OperatorList,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VersionCli {
    V1,
    V2,
}

/// Loads a workflow editor definitions document and validates it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// URL (http, https, file) or local path of the definitions document
    source: String,

    /// Document representation
    #[arg(short, long, value_enum, default_value_t = VariantCli::Catalog)]
    variant: VariantCli,

    /// Operator list revision, only used with `--variant operator-list`
    #[arg(long, value_enum, default_value_t = VersionCli::V2)]
    schema_version: VersionCli,

    /// Editor config JSON; its `definitions` setting is overridden by `--variant`
    #[arg(short, long)]
    config: Option<String>,

    /// Print the synchronized state after a successful load
    #[arg(long)]
    print_state: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let schema_version = match cli.schema_version {
        VersionCli::V1 => SchemaVersion::V1,
        VersionCli::V2 => SchemaVersion::V2,
    };
    let variant = match cli.variant {
        VariantCli::Catalog => DefinitionsVariant::Catalog,
        VariantCli::OperatorList => DefinitionsVariant::OperatorList { schema_version },
    };

    // --- 1. Configuration ---
    let config = match &cli.config {
        Some(path) => EditorConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EditorConfig::new("", ""),
    }
    .with_definitions(variant);
    let loader = HttpDocumentLoader::new(&config.loader)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to create loader: {}", e)));
    let state = EditorState::with_loader(&config, Arc::new(loader.clone()));

    let url = to_url(&cli.source);
    println!("Loading {} from: {}", variant.wire_field(), url);

    // --- 2. Load and validate ---
    // Fetched once, so the report describes the same document that was rejected.
    let load_start = Instant::now();
    let raw = loader
        .fetch(&url)
        .await
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    let fetch_duration = load_start.elapsed();
    let result = state.set_definitions(raw.clone());
    let load_duration = load_start.elapsed();

    if let Err(e) = result {
        eprintln!("\nValidation failed {}", e);
        for alternative in &e.alternatives {
            eprintln!("  or {}", alternative);
        }
        let report = diagnose_definitions(variant, &raw);
        eprintln!("\n--- Validation Summary ({} errors) ---", report.error_count());
        eprint!("{}", report);
        std::process::exit(1);
    }

    // --- 3. Summary ---
    let definitions = state.definitions();
    println!(
        "\nValidation Successful! Fetched in {:?}, total {:?}",
        fetch_duration, load_duration
    );
    if let Some(schema) = definitions.as_catalog() {
        println!("Operators: {}", schema.definitions.operators().count());
        for (id, operator) in schema.definitions.operators() {
            println!("  -> {} ({}): {}", id, operator.id(), operator.title());
        }
        println!("Datatypes: {}", schema.definitions.datatypes().count());
        for (id, datatype) in schema.definitions.datatypes() {
            let variants: Vec<_> = datatype.variant_names().collect();
            println!("  -> {} = {}", id, variants.join(" | "));
        }
    }
    if let Some(list) = definitions.as_operator_list() {
        println!("Operators ({}): {}", list.version(), list.len());
        for operator in list.iter() {
            println!("  -> {} -> {}", operator.title, operator.output_type.as_str());
        }
    }

    if cli.print_state {
        match serde_json::to_string_pretty(&state.snapshot().to_wire()) {
            Ok(json) => println!("\n{}", json),
            Err(e) => exit_with_error(&format!("Failed to render state: {}", e)),
        }
    }
    println!();
}

/// Turns a bare path into a `file://` URL; anything with a scheme is kept.
fn to_url(source: &str) -> String {
    if Url::parse(source).is_ok() {
        return source.to_string();
    }
    let path = Path::new(source);
    let absolute = path
        .canonicalize()
        .unwrap_or_else(|e| exit_with_error(&format!("Cannot resolve '{}': {}", source, e)));
    Url::from_file_path(&absolute)
        .map(String::from)
        .unwrap_or_else(|()| exit_with_error(&format!("Cannot turn '{}' into a URL", source)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
