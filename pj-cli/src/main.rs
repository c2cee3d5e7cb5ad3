//! Entrypoint for CLI
use std::{env, error::Error, fs, time::Instant};

use frisc::prelude::*;
use log::{error, info};
use pj_compiler::{
    build_tree, check_tree,
    compile::{CompileError, CompilerConf},
    compile_str, parse_str,
    parsing::DerivationTree,
};

static USAGE: &str = r#"
usage: pjc CMD FILE [CONF]

commands:
    parse     Parse a token stream into a derivation tree
    check     Resolve the identifiers of a derivation tree
    build     Generate FRISC code from a derivation tree
    compile   Generate FRISC code from a token stream
    run       Execute a FRISC listing and print R6

Generated listings are written to a.frisc. CONF is an
optional YAML file with compiler options.

examples:
    pjc parse program.lex > program.tree
    pjc build program.tree
    pjc run a.frisc
"#;

const OUTPUT_FILE: &str = "a.frisc";

/// Number of instructions after which a running program is stopped.
const STEP_LIMIT: usize = 100_000_000;

fn load_conf(filepath: Option<&str>) -> Result<CompilerConf, Box<dyn Error>> {
    match filepath {
        Some(filepath) => {
            let text = fs::read_to_string(filepath)?;
            Ok(serde_yaml::from_str(&text)?)
        }
        None => Ok(CompilerConf::default()),
    }
}

fn run_parse(filepath: &str) -> Result<(), Box<dyn Error>> {
    let tokens = fs::read_to_string(filepath)?;
    let tree = parse_str(&tokens)?;
    print!("{}", tree.encode());
    Ok(())
}

fn run_check(filepath: &str, conf: &CompilerConf) -> Result<(), Box<dyn Error>> {
    let tree = DerivationTree::decode(&fs::read_to_string(filepath)?)?;
    let program = check_tree(&tree, conf)?;
    print!("{}", program.reference_report());
    Ok(())
}

fn run_build(filepath: &str, conf: &CompilerConf) -> Result<(), Box<dyn Error>> {
    let tree = DerivationTree::decode(&fs::read_to_string(filepath)?)?;
    let listing = build_tree(&tree, conf)?;
    write_listing(&listing)
}

fn run_compile(filepath: &str, conf: &CompilerConf) -> Result<(), Box<dyn Error>> {
    let tokens = fs::read_to_string(filepath)?;
    let listing = compile_str(&tokens, conf)?;
    write_listing(&listing)
}

fn write_listing(listing: &str) -> Result<(), Box<dyn Error>> {
    fs::write(OUTPUT_FILE, listing)?;
    info!("wrote {OUTPUT_FILE}");
    print!("{listing}");
    Ok(())
}

fn run_listing(filepath: &str) -> FriscResult<()> {
    info!("running FRISC simulator");

    let program = frisc::load_file(filepath)?;

    let mut vm = FriscVm::new(FriscConf::default());
    vm.load_program(&program)?;

    let start = Instant::now();
    let result = vm.run(STEP_LIMIT);
    let end = Instant::now();

    info!(
        "time taken: {}ms",
        end.duration_since(start).as_nanos() as f64 / 1000000.0
    ); // to millis

    let steps = result?;
    info!("halted after {steps} steps");
    println!("{}", vm.register(6));

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    let result = match parse_args() {
        Some(Cmd::Parse { filepath }) => run_parse(&filepath),
        Some(Cmd::Check { filepath, conf }) => load_conf(conf.as_deref()).and_then(|c| run_check(&filepath, &c)),
        Some(Cmd::Build { filepath, conf }) => load_conf(conf.as_deref()).and_then(|c| run_build(&filepath, &c)),
        Some(Cmd::Compile { filepath, conf }) => {
            load_conf(conf.as_deref()).and_then(|c| run_compile(&filepath, &c))
        }
        Some(Cmd::Run { filepath }) => run_listing(&filepath).map_err(Into::into),
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    if let Err(err) = result {
        // Pipeline errors have a one line diagnostic for fixture diffs.
        match err.downcast_ref::<CompileError>().and_then(CompileError::diagnostic) {
            Some(diagnostic) => println!("{diagnostic}"),
            None => error!("{err}"),
        }
        std::process::exit(1)
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    let cmd = args.next()?;
    let filepath = args.next()?;
    let conf = args.next();

    match cmd.as_str() {
        "parse" => Some(Cmd::Parse { filepath }),
        "check" => Some(Cmd::Check { filepath, conf }),
        "build" => Some(Cmd::Build { filepath, conf }),
        "compile" => Some(Cmd::Compile { filepath, conf }),
        "run" => Some(Cmd::Run { filepath }),
        _ => None,
    }
}

fn print_usage() {
    println!("pjc v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}

enum Cmd {
    /// Token stream to derivation tree
    Parse { filepath: String },
    /// Derivation tree to reference report
    Check { filepath: String, conf: Option<String> },
    /// Derivation tree to listing
    Build { filepath: String, conf: Option<String> },
    /// Token stream to listing
    Compile { filepath: String, conf: Option<String> },
    /// Execute a listing
    Run { filepath: String },
}
