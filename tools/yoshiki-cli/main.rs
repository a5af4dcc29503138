use clap::Parser;
use indexmap::IndexMap;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use yoshiki::engine::TraceFormatter;
use yoshiki::prelude::*;

/// Validate a form definition and evaluate its conditional visibility
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the form definition JSON file
    form_path: Option<String>,
    /// Optional path to a JSON object of field values keyed by field id
    values_path: Option<String>,
    /// Optional path to a JSON object of variables
    variables_path: Option<String>,

    /// Only report identifier and dependency problems
    #[arg(long)]
    validate_only: bool,

    /// Do not warn when a reference names both a field and a variable
    #[arg(long)]
    no_collision_warnings: bool,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

struct RunOptions {
    form_path: String,
    values_path: Option<String>,
    variables_path: Option<String>,
    validate_only: bool,
    collision_warnings: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.human {
        run_interactive();
    } else {
        run_non_interactive(cli);
    }
}

fn run_evaluation(options: RunOptions) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let load_start = Instant::now();
    let form = Form::from_file(&options.form_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load form '{}': {}",
            &options.form_path, e
        ))
    });

    let values: IndexMap<String, Value> = match &options.values_path {
        Some(path) => read_json(path, "values"),
        None => {
            println!("No values file provided. Every field counts as empty.");
            IndexMap::new()
        }
    };
    let variables: VariableRegistry = match &options.variables_path {
        Some(path) => read_json(path, "variables"),
        None => VariableRegistry::new(),
    };
    let load_duration = load_start.elapsed();

    println!(
        "\nLoaded form '{}': {} page(s), {} field(s)",
        form.name,
        form.pages.len(),
        form.fields().len()
    );

    // --- 2. Identifier Validation ---
    if let Err(e) = form.validate_ids() {
        exit_with_error(&format!("Identifier validation failed: {}", e));
    }
    println!("Identifiers are unique.");

    // --- 3. Dependency Analysis ---
    let graph_start = Instant::now();
    let graph = DependencyGraph::build(&form);
    let graph_duration = graph_start.elapsed();

    println!(
        "Dependency graph: {} node(s), {} edge(s)",
        graph.node_count(),
        graph.edge_count()
    );
    if graph.errors().is_empty() {
        println!("  -> No dependency errors");
    } else {
        for error in graph.errors() {
            println!("  -> {}", error);
        }
    }

    if options.validate_only {
        println!("\nTotal Execution:      {:?}", total_start.elapsed());
        return;
    }

    // --- 4. Evaluation ---
    let engine = VisibilityEngine::builder()
        .with_collision_warnings(options.collision_warnings)
        .with_traces(true)
        .build();

    let eval_start = Instant::now();
    let report = engine.evaluate_with_graph(&form, &values, &variables, &graph);
    let eval_duration = eval_start.elapsed();

    // --- 5. Results ---
    println!("\nVisibility Report:");
    for (index, page) in form.pages.iter().enumerate() {
        let target = Target::Page(index);
        println!(
            "\n[{}] Page '{}' ({})",
            mark(report.is_visible(&target)),
            page.name,
            page.id
        );
        print_reason(&report, &target, "    ");

        for (page_index, field) in form.fields() {
            if page_index != index {
                continue;
            }
            let target = Target::field(field.id.as_str());
            println!(
                "  [{}] {} '{}' ({})",
                mark(report.is_visible(&target)),
                field.kind.type_name(),
                field.label,
                field.id
            );
            print_reason(&report, &target, "        ");
        }

        for target in [Target::next_button(index), Target::submit_button(index)] {
            println!("  [{}] {}", mark(report.is_visible(&target)), target);
            print_reason(&report, &target, "        ");
        }
    }

    if !report.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &report.warnings {
            println!("  -> {}", warning);
        }
    }

    let total_duration = total_start.elapsed();
    println!("\n--- Summary ---");
    println!("Visible Fields: {}", report.visible_fields().count());
    println!("Hidden Fields:  {}", report.hidden_fields().count());
    println!("Dependency Errors: {}", report.errors.len());

    println!("\n--- Performance Summary ---");
    println!("File Loading:         {:?}", load_duration);
    println!("Dependency Analysis:  {:?}", graph_duration);
    println!("Evaluation:           {:?}", eval_duration);
    println!("-----------------------------");
    println!("Total Execution:      {:?}", total_duration);
    println!();
}

fn print_reason(report: &VisibilityReport, target: &Target, indent: &str) {
    let Some(trace) = report.trace(target) else {
        return;
    };
    let restricted = trace.group.enabled && !trace.group.rules.is_empty();
    if restricted || trace.hidden_by.is_some() {
        println!("{}{}", indent, TraceFormatter::format_target(trace));
    }
}

fn mark(visible: bool) -> &'static str {
    if visible { "shown " } else { "hidden" }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str, what: &str) -> T {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read {} file '{}': {}", what, path, e))
    });
    serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse {} JSON: {}", what, e)))
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let form_path = cli.form_path.unwrap_or_else(|| {
        exit_with_error("Form path is required in non-interactive mode.");
    });

    run_evaluation(RunOptions {
        form_path,
        values_path: cli.values_path,
        variables_path: cli.variables_path,
        validate_only: cli.validate_only,
        collision_warnings: !cli.no_collision_warnings,
    });
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive() {
    println!("--- Yoshiki Interactive Mode ---");

    let form_path = prompt_for_input("Enter form definition path", Some("data/form.json"));
    let values_path = optional(prompt_for_input("Enter field values path (optional)", None));
    let variables_path = optional(prompt_for_input("Enter variables path (optional)", None));

    let validate_only = loop {
        println!("\nWhat should be run?");
        println!("  1: Validate and evaluate visibility");
        println!("  2: Validate only");
        let choice_str = prompt_for_input("Enter choice", Some("1"));

        match choice_str.trim() {
            "1" => break false,
            "2" => break true,
            _ => println!("Invalid choice. Please enter 1 or 2."),
        }
    };

    run_evaluation(RunOptions {
        form_path,
        values_path,
        variables_path,
        validate_only,
        collision_warnings: true,
    });
}

fn optional(input: String) -> Option<String> {
    if input.is_empty() { None } else { Some(input) }
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    if let Err(e) = io::stdout().flush() {
        exit_with_error(&format!("Failed to write prompt: {}", e));
    }

    if let Err(e) = io::stdin().read_line(&mut line) {
        exit_with_error(&format!("Failed to read line: {}", e));
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
