/**
 * Wasaby Compiler CLI - wmlc
 *
 * Compiles WML/TMPL templates and reports diagnostics
 */
use clap::{Arg, ArgAction, Command};
use std::process;

use wasaby_compiler_cli::perform_compile::{collect_files, compile_files, load_config};

fn main() {
    let matches = Command::new("wmlc")
        .version(wasaby_compiler_cli::version())
        .about("Wasaby template compiler")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to a JSON compiler config"),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .action(ArgAction::SetTrue)
                .help("Print the AST of every file as JSON"),
        )
        .arg(
            Arg::new("deps")
                .long("deps")
                .action(ArgAction::SetTrue)
                .help("Print the dependencies of every file"),
        )
        .arg(
            Arg::new("files")
                .value_name("FILES")
                .required(true)
                .num_args(1..)
                .help("Template files or glob patterns"),
        )
        .get_matches();

    let config = match load_config(matches.get_one::<String>("config").map(String::as_str)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(2);
        }
    };
    let patterns: Vec<String> = matches
        .get_many::<String>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let files = match collect_files(&patterns) {
        Ok(files) => files,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(2);
        }
    };

    let print_ast = matches.get_flag("ast");
    let print_deps = matches.get_flag("deps");
    let mut failed = false;

    for (path, result) in compile_files(&files, &config) {
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                eprintln!("Error: {:#}", err);
                failed = true;
                continue;
            }
        };
        for diagnostic in &result.diagnostics {
            eprintln!("{}", diagnostic);
        }
        failed |= result.failed;

        if print_deps {
            println!("{}:", path.display());
            for dependency in &result.dependencies {
                println!("  {}", dependency);
            }
        }
        if print_ast {
            match serde_json::to_string_pretty(&result.nodes) {
                Ok(json) => println!("{}", json),
                Err(err) => {
                    eprintln!("Error: {}: {}", path.display(), err);
                    failed = true;
                }
            }
        }
    }

    if failed {
        process::exit(1);
    }
}
