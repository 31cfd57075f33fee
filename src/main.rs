// ABOUTME: Binary driver, script runner and REPL

mod builtins;
mod env;
mod error;
mod eval;
mod expr;
mod parser;
mod reader;
mod syntax;
mod tables;
mod value;

use clap::Parser as ClapParser;
use env::Environment;
use error::RuntimeError;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::rc::Rc;
use value::Value;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const WELCOME_MESSAGE: &str = "lisp-core interactive evaluator";

/// A small applicative-order Lisp interpreter.
#[derive(ClapParser, Debug)]
#[command(name = "lisp-core")]
#[command(version = VERSION)]
#[command(about = "A small applicative-order Lisp interpreter")]
struct CliArgs {
    /// Script file to execute (omit to start the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    match args.script {
        Some(path) => run_script(&path),
        None => run_repl(),
    }
}

/// Evaluates one line of source against `env`, printing its result per the
/// display contract unless it's `Void`. Returns `false` when evaluation
/// produced `Value::Terminate`, signalling the caller to stop.
fn eval_and_print(src: &str, env: &Rc<Environment>) -> Result<bool, String> {
    let forms = reader::read_all(src).map_err(|e| format!("SyntaxError: {e}"))?;
    for stx in forms {
        let expr = parser::parse(&stx, env).map_err(|e| render_error(&e))?;
        let value = eval::eval(&expr, env).map_err(|e| render_error(&e))?;
        if matches!(value, Value::Terminate) {
            return Ok(false);
        }
        if !matches!(value, Value::Void) {
            println!("{value}");
        }
    }
    Ok(true)
}

fn render_error(e: &RuntimeError) -> String {
    format!("{}: {}", e.kind(), e)
}

fn run_script(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read script file {}: {e}", path.display()))?;
    let env = Environment::new();

    let forms = reader::read_all(&contents).map_err(|e| format!("SyntaxError: {e}"))?;
    for stx in forms {
        let expr = match parser::parse(&stx, &env) {
            Ok(expr) => expr,
            Err(e) => {
                eprintln!("{}", render_error(&e));
                continue;
            }
        };
        match eval::eval(&expr, &env) {
            Ok(Value::Terminate) => return Ok(()),
            Ok(value) => {
                if !matches!(value, Value::Void) {
                    println!("{value}");
                }
            }
            Err(e) => eprintln!("{}", render_error(&e)),
        }
    }
    Ok(())
}

fn run_repl() -> Result<(), Box<dyn std::error::Error>> {
    let env = Environment::new();
    let mut rl = DefaultEditor::new()?;

    println!("{WELCOME_MESSAGE}");

    let mut pending = String::new();
    loop {
        let prompt = if pending.is_empty() { "lisp> " } else { "...  > " };
        match rl.readline(prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if line.trim().is_empty() && pending.is_empty() {
                    continue;
                }
                pending.push_str(&line);
                pending.push('\n');

                if !balanced(&pending) {
                    continue;
                }
                let src = std::mem::take(&mut pending);
                match eval_and_print(&src, &env) {
                    Ok(true) => {}
                    Ok(false) => {
                        println!("Goodbye!");
                        break;
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                pending.clear();
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }
    Ok(())
}

/// True once every paren is matched outside of a string literal: the
/// signal the REPL uses to decide a multi-line form is ready to evaluate.
fn balanced(src: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    for c in src.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}
