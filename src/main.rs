use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::{fs::read_to_string, process::ExitCode};

const EXIT_DATA_ERROR: u8 = 65;
const EXIT_SOFTWARE_ERROR: u8 = 70;
const EXIT_IO_ERROR: u8 = 74;

#[derive(Debug, Parser)]
#[clap(name = "nice-expr", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: NiceExprCommand,
}

#[derive(Debug, Subcommand)]
pub enum NiceExprCommand {
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "source")]
        format: ExpressionFormat,
    },
    Check {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: DiagnosticFormat,
    },
    Run {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: DiagnosticFormat,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ExpressionFormat {
    Debug,
    Source,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum DiagnosticFormat {
    Basic,
    Pretty,
}

static TRACING: Once = Once::new();

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    TRACING.call_once(|| {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    });
}

fn main() -> ExitCode {
    nice_expr_main().expect("Encountered an error!")
}

fn nice_expr_main() -> Result<ExitCode> {
    color_eyre::install().expect("Can't fail at first call!");
    init_tracing();
    let args = CLArgs::parse();
    let succeeded = match args.routine {
        NiceExprCommand::Tokenize { path, format } => {
            eprintln!("Tokenizing {:?}...", path);
            let src = read_to_string(path)?;
            tokenize(&src, &format)
        }
        NiceExprCommand::Parse { path, format } => {
            eprintln!("Parsing {:?}...", path);
            let src = read_to_string(&path)?;
            parse(&src, &path, &format)
        }
        NiceExprCommand::Check { path, format } => {
            eprintln!("Checking {:?}...", path);
            let src = read_to_string(&path)?;
            check(&src, &path, &format)
        }
        NiceExprCommand::Run { path, format } => {
            eprintln!("Running {:?}...", path);
            let src = read_to_string(&path)?;
            run(&src, &path, &format)
        }
    };
    Ok(match succeeded {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    })
}

fn tokenize(src: &str, format: &TokenFormat) -> Result<(), u8> {
    use nice_expr::lexer::formatter::{BasicFormatter, DebugFormatter, ToFormatter, TokenFormatter};
    use nice_expr::lexer::{Lexer, TokenKind};

    let mut scanner = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter + '_> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&scanner)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&scanner)),
    };
    let mut succeeded = true;
    loop {
        match scanner.next_token() {
            Ok(token) => {
                println!("{}", formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    break;
                }
            }
            Err(error) => {
                eprintln!("{}", formatter.format_lexical_error(&error));
                succeeded = false;
            }
        }
    }
    if succeeded {
        Ok(())
    } else {
        Err(EXIT_DATA_ERROR)
    }
}

fn parse_program(
    src: &str,
    path: &Path,
    format: &DiagnosticFormat,
) -> Result<nice_expr::parser::Program, u8> {
    use nice_expr::parser::formatter::{
        ExpressionFormatter, PrettyExpressionFormatter, SourceFormatter,
    };
    use nice_expr::parser::Parser;

    let mut parser = Parser::new(src);
    parser.parse().map_err(|error| {
        let formatter: Box<dyn ExpressionFormatter + '_> = match format {
            DiagnosticFormat::Basic => Box::new(SourceFormatter::new(src)),
            DiagnosticFormat::Pretty => Box::new(PrettyExpressionFormatter::new(src, path)),
        };
        eprintln!("{}", formatter.format_error(&error));
        EXIT_DATA_ERROR
    })
}

fn parse(src: &str, path: &Path, format: &ExpressionFormat) -> Result<(), u8> {
    use nice_expr::parser::formatter::{
        DebugExpressionFormatter, ExpressionFormatter, SourceFormatter,
    };

    let program = parse_program(src, path, &DiagnosticFormat::Basic)?;
    let formatter: Box<dyn ExpressionFormatter + '_> = match format {
        ExpressionFormat::Debug => Box::new(DebugExpressionFormatter),
        ExpressionFormat::Source => Box::new(SourceFormatter::new(src)),
    };
    print!("{}", formatter.format_program(&program));
    Ok(())
}

fn check(src: &str, path: &Path, format: &DiagnosticFormat) -> Result<(), u8> {
    let program = parse_program(src, path, format)?;
    type_check(src, path, &program, format)
}

fn type_check(
    src: &str,
    path: &Path,
    program: &nice_expr::parser::Program,
    format: &DiagnosticFormat,
) -> Result<(), u8> {
    use nice_expr::checker::formatter::{
        BasicTypeErrorFormatter, PrettyTypeErrorFormatter, TypeErrorFormatter,
    };
    use nice_expr::checker::TypeChecker;

    let mut checker = TypeChecker::new();
    checker.check_program(program);
    if !checker.has_errors() {
        return Ok(());
    }
    let formatter: Box<dyn TypeErrorFormatter + '_> = match format {
        DiagnosticFormat::Basic => Box::new(BasicTypeErrorFormatter::new(src)),
        DiagnosticFormat::Pretty => Box::new(PrettyTypeErrorFormatter::new(src, path)),
    };
    eprint!("{}", formatter.format_errors(checker.errors()));
    Err(EXIT_DATA_ERROR)
}

fn run(src: &str, path: &Path, format: &DiagnosticFormat) -> Result<(), u8> {
    use nice_expr::interpreter::context::StdioContext;
    use nice_expr::interpreter::formatter::{
        BasicRuntimeErrorFormatter, PrettyRuntimeErrorFormatter, RuntimeErrorFormatter,
    };
    use nice_expr::interpreter::TreeWalkInterpreter;

    let program = parse_program(src, path, format)?;
    type_check(src, path, &program, format)?;
    let mut interpreter = TreeWalkInterpreter::new(StdioContext::stdout());
    interpreter.run(&program);
    let failures = interpreter.context().failures();
    if failures > 0 {
        eprintln!("failed to write {failures} piece(s) of program output");
    }
    if !interpreter.has_errors() {
        return if failures > 0 { Err(EXIT_IO_ERROR) } else { Ok(()) };
    }
    let formatter: Box<dyn RuntimeErrorFormatter + '_> = match format {
        DiagnosticFormat::Basic => Box::new(BasicRuntimeErrorFormatter::new(src)),
        DiagnosticFormat::Pretty => Box::new(PrettyRuntimeErrorFormatter::new(src, path)),
    };
    for error in interpreter.errors() {
        eprintln!("{}", formatter.format_error(error));
    }
    Err(EXIT_SOFTWARE_ERROR)
}
