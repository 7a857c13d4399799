use std::{env, path::PathBuf, process::ExitCode};

use skin_expr::{
    dump::render_tree,
    evaluate, generate,
    expr::{lexer::tokenize, render_tokens},
    inputs::groups_from_json_str,
    parse_expression, register_inputs, Arena, Limits, LogDiagnostics,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct SessionOptions {
    inputs: Option<PathBuf>,
    limits: Option<PathBuf>,
    sets: Vec<(String, Vec<f32>)>,
    values: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skin_expr=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    if args.len() < 3 {
        return Err("not enough arguments".to_string());
    }

    let command = args[1].as_str();
    let expression = args[2].as_str();
    let options = parse_session_options(&args[3..])?;
    let mut arena = build_arena(&options)?;

    match command {
        "tokens" => {
            let tokens = tokenize(expression, arena.limits()).map_err(|e| e.to_string())?;
            println!("{}", render_tokens(&tokens));
        }
        "canon" => {
            let root = parse_expression(&mut arena, expression).map_err(|e| e.to_string())?;
            println!("{}", generate(&arena, root).map_err(|e| e.to_string())?);
        }
        "tree" => {
            let root = parse_expression(&mut arena, expression).map_err(|e| e.to_string())?;
            if options.values {
                evaluate(&mut arena, root, &mut LogDiagnostics).map_err(|e| e.to_string())?;
            }
            print!(
                "{}",
                render_tree(&arena, root, options.values).map_err(|e| e.to_string())?
            );
        }
        "eval" => {
            let root = parse_expression(&mut arena, expression).map_err(|e| e.to_string())?;
            let values =
                evaluate(&mut arena, root, &mut LogDiagnostics).map_err(|e| e.to_string())?;
            let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            println!("[{}]", rendered.join(", "));
        }
        _ => return Err(format!("unknown command '{command}'")),
    }
    Ok(())
}

fn build_arena(options: &SessionOptions) -> Result<Arena, String> {
    let limits = match &options.limits {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
            Limits::from_json_str(&text).map_err(|e| e.to_string())?
        }
        None => Limits::default(),
    };
    let mut arena = Arena::new(limits);

    if let Some(path) = &options.inputs {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
        let groups = groups_from_json_str(&text).map_err(|e| e.to_string())?;
        register_inputs(&mut arena, &groups).map_err(|e| e.to_string())?;
    }

    for (name, values) in &options.sets {
        let id = match arena.find_named(name) {
            Some(id) => id,
            None => arena.bind(name).map_err(|e| e.to_string())?,
        };
        arena.set_values(id, values).map_err(|e| e.to_string())?;
    }
    Ok(arena)
}

fn parse_session_options(args: &[String]) -> Result<SessionOptions, String> {
    let mut options = SessionOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--inputs" => {
                if i + 1 >= args.len() {
                    return Err("missing value for --inputs".to_string());
                }
                options.inputs = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--limits" => {
                if i + 1 >= args.len() {
                    return Err("missing value for --limits".to_string());
                }
                options.limits = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--set" => {
                if i + 1 >= args.len() {
                    return Err("missing value for --set (expected NAME=V1,V2,...)".to_string());
                }
                options.sets.push(parse_set_value(&args[i + 1])?);
                i += 2;
            }
            "--values" => {
                options.values = true;
                i += 1;
            }
            other => return Err(format!("unknown option '{other}'")),
        }
    }
    Ok(options)
}

fn parse_set_value(raw: &str) -> Result<(String, Vec<f32>), String> {
    let (name, list) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid --set value '{raw}' (expected NAME=V1,V2,...)"))?;
    if name.is_empty() {
        return Err(format!("invalid --set value '{raw}': empty name"));
    }
    let mut values = Vec::new();
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let value: f32 = item
            .parse()
            .map_err(|e| format!("invalid number '{item}' in --set {name}: {e}"))?;
        values.push(value);
    }
    Ok((name.to_string(), values))
}

fn print_usage() {
    eprintln!("usage:");
    eprintln!("  skin-expr tokens <expression>");
    eprintln!("  skin-expr canon <expression> [options]");
    eprintln!("  skin-expr tree <expression> [--values] [options]");
    eprintln!("  skin-expr eval <expression> [options]");
    eprintln!();
    eprintln!("options:");
    eprintln!("  --inputs <file.json>   register input groups ([{{\"name\", \"fields\": [{{\"name\"}}]}}])");
    eprintln!("  --set NAME=V1,V2,...   bind or overwrite a named input (repeatable)");
    eprintln!("  --limits <file.json>   override tokenizer and arena limits");
    eprintln!("  --values               evaluate before printing the tree and show node values");
    eprintln!();
    eprintln!("set RUST_LOG=skin_expr=debug to trace tokenization and parsing.");
}
