use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use yoshiki::form::{ChoiceConfig, ChoiceOption, NumberConfig, TextareaConfig};
use yoshiki::prelude::*;

/// A CLI tool to generate random form definitions for Yoshiki
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_form.json")]
    output: String,

    /// Number of pages to generate
    #[arg(long, default_value_t = 3)]
    pages: usize,

    /// The minimum number of top-level fields per page
    #[arg(long, default_value_t = 2)]
    min: usize,

    /// The maximum number of top-level fields per page
    #[arg(long, default_value_t = 8)]
    max: usize,

    /// Probability that a field, page or button gets a visibility rule
    #[arg(long, default_value_t = 0.3)]
    rule_chance: f64,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

/// A field created so far, with the page it lives on.
struct Generated {
    id: String,
    page: usize,
    kind: &'static str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.min > cli.max {
        eprintln!(
            "Error: --min ({}) cannot be greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }
    if cli.pages == 0 {
        eprintln!("Error: --pages must be at least 1");
        std::process::exit(1);
    }
    if !(0.0..=1.0).contains(&cli.rule_chance) {
        eprintln!("Error: --rule-chance must be between 0 and 1");
        std::process::exit(1);
    }

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);

    println!(
        "Generating a {}-page form (fields per page: {} to {}, seed {})...",
        cli.pages, cli.min, cli.max, seed
    );

    let mut editor = FormEditor::new("Generated Form");
    let mut generated = Vec::new();

    for page in 0..cli.pages {
        if page > 0 {
            editor.add_page(format!("Step {}", page + 1));
        }
        editor.set_current_page(page)?;
        let count = rng.random_range(cli.min..=cli.max);
        for _ in 0..count {
            generate_field(&mut editor, &mut rng, &mut generated, page, cli.rule_chance)?;
        }
        generate_page_rules(&mut editor, &mut rng, &generated, page, cli.rule_chance)?;
        println!(
            "-> Generated page {} with {} field(s).",
            page + 1,
            generated.iter().filter(|g| g.page == page).count()
        );
    }

    let form = editor.into_form();
    let json_output = form.to_json_pretty()?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved form ({} fields, {} rule groups) to '{}'",
        generated.len(),
        form.rule_groups()
            .iter()
            .filter(|(_, group)| group.is_active())
            .count(),
        cli.output
    );

    Ok(())
}

/// Adds one top-level field to the current page. Containers get a few
/// children of their own.
fn generate_field(
    editor: &mut FormEditor,
    rng: &mut StdRng,
    generated: &mut Vec<Generated>,
    page: usize,
    rule_chance: f64,
) -> Result<()> {
    let roll = rng.random_range(0..10);
    if roll == 0 {
        let id = editor.add_field(FieldKind::section())?;
        record(editor, rng, generated, id.clone(), page, "section", rule_chance)?;
        let slot = ContainerSlot::section(id);
        for _ in 0..rng.random_range(1..=3) {
            add_leaf(editor, rng, generated, &slot, page, rule_chance)?;
        }
    } else if roll == 1 {
        let columns = rng.random_range(2..=3);
        let id = editor.add_field(FieldKind::columns(columns))?;
        record(editor, rng, generated, id.clone(), page, "columns", rule_chance)?;
        for column in 0..columns {
            let slot = ContainerSlot::column(id.clone(), column);
            for _ in 0..rng.random_range(0..=2) {
                add_leaf(editor, rng, generated, &slot, page, rule_chance)?;
            }
        }
    } else {
        add_leaf(editor, rng, generated, &ContainerSlot::Root, page, rule_chance)?;
    }
    Ok(())
}

fn add_leaf(
    editor: &mut FormEditor,
    rng: &mut StdRng,
    generated: &mut Vec<Generated>,
    slot: &ContainerSlot,
    page: usize,
    rule_chance: f64,
) -> Result<()> {
    let kind = random_leaf_kind(rng);
    let name = kind.type_name();
    let id = editor.add_field_to_container(kind, slot, None)?;
    record(editor, rng, generated, id, page, name, rule_chance)
}

/// Remembers the new field and sometimes makes it depend on an earlier one.
fn record(
    editor: &mut FormEditor,
    rng: &mut StdRng,
    generated: &mut Vec<Generated>,
    id: String,
    page: usize,
    kind: &'static str,
    rule_chance: f64,
) -> Result<()> {
    if rng.random_bool(rule_chance) {
        let candidates: Vec<&Generated> = generated.iter().filter(|g| g.page <= page).collect();
        if let Some(group) = random_group(rng, &candidates) {
            editor.update_field(&id, FieldPatch::visibility(group))?;
        }
    }
    generated.push(Generated { id, page, kind });
    Ok(())
}

/// Page and button rules may only look at earlier pages.
fn generate_page_rules(
    editor: &mut FormEditor,
    rng: &mut StdRng,
    generated: &[Generated],
    page: usize,
    rule_chance: f64,
) -> Result<()> {
    let earlier: Vec<&Generated> = generated.iter().filter(|g| g.page < page).collect();
    let mut patch = PagePatch::default();

    if page > 0 && rng.random_bool(rule_chance) {
        patch.conditional_visibility = random_group(rng, &earlier);
    }
    if rng.random_bool(rule_chance) {
        patch.next_button = random_group(rng, &earlier);
    }
    if rng.random_bool(rule_chance / 2.0) {
        patch.submit_button = Some(RuleGroup::all(vec![Rule::new(
            "isLoggedIn",
            Operator::Equals,
            "true",
        )]));
    }

    if patch != PagePatch::default() {
        editor.update_page(page, patch)?;
    }
    Ok(())
}

fn random_group(rng: &mut StdRng, candidates: &[&Generated]) -> Option<RuleGroup> {
    let leaves: Vec<&&Generated> = candidates
        .iter()
        .filter(|g| g.kind != "section" && g.kind != "columns")
        .collect();
    if leaves.is_empty() {
        return None;
    }
    let rules = (0..rng.random_range(1..=2))
        .map(|_| {
            let source = leaves[rng.random_range(0..leaves.len())];
            random_rule(rng, source)
        })
        .collect();
    let logic = if rng.random_bool(0.5) {
        Logic::And
    } else {
        Logic::Or
    };
    Some(RuleGroup::new(logic, rules))
}

fn random_rule(rng: &mut StdRng, source: &Generated) -> Rule {
    match source.kind {
        "number" => {
            let operators = [
                Operator::GreaterThan,
                Operator::LessThan,
                Operator::GreaterEqual,
                Operator::LessEqual,
                Operator::Equals,
            ];
            let operator = operators[rng.random_range(0..operators.len())];
            Rule::new(
                source.id.as_str(),
                operator,
                rng.random_range(0..100).to_string(),
            )
        }
        "select" | "radio" => Rule::new(
            source.id.as_str(),
            Operator::Equals,
            format!("option_{}", rng.random_range(1..=3)),
        ),
        "checkbox" => Rule::new(
            source.id.as_str(),
            Operator::Contains,
            format!("option_{}", rng.random_range(1..=3)),
        ),
        _ => {
            if rng.random_bool(0.5) {
                Rule::unary(source.id.as_str(), Operator::IsNotEmpty)
            } else {
                Rule::new(source.id.as_str(), Operator::Contains, "yes")
            }
        }
    }
}

fn random_leaf_kind(rng: &mut StdRng) -> FieldKind {
    match rng.random_range(0..8) {
        0 => FieldKind::Text,
        1 => FieldKind::Email,
        2 => FieldKind::Number(NumberConfig {
            min: Some(0.0),
            max: Some(100.0),
            step: None,
        }),
        3 => FieldKind::Date,
        4 => FieldKind::Textarea(TextareaConfig { rows: Some(4) }),
        5 => FieldKind::Select(choices(false)),
        6 => FieldKind::Checkbox(choices(true)),
        _ => FieldKind::Radio(choices(false)),
    }
}

fn choices(multiple: bool) -> ChoiceConfig {
    ChoiceConfig {
        options: (1..=3)
            .map(|n| ChoiceOption::new(format!("Option {}", n), format!("option_{}", n)))
            .collect(),
        multiple,
    }
}
