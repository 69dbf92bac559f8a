//! Command-line inspector for xmb XPath expressions.
//!
//! Parses path expressions with the `xmb-xpath` engine and prints them in
//! canonical, tree, JSON, or token form. Useful for checking the paths
//! declared in mapping descriptors before they ever touch a document.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use xmb_xpath::{Error, parse, serialize, tokenize};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "xmb")]
#[command(about = "XPath expression toolkit for the xmb data-binding layer")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported `xmb` subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Parse expressions and print them in canonical form
    Parse {
        /// XPath expressions to parse
        #[arg(required = true)]
        exprs: Vec<String>,

        /// Print the AST as an indented tree instead
        #[arg(long)]
        tree: bool,

        /// Print the AST as JSON instead
        #[arg(long, conflicts_with = "tree")]
        json: bool,
    },

    /// Validate expressions, reporting the first error
    Check {
        /// XPath expressions to validate
        #[arg(required = true)]
        exprs: Vec<String>,
    },

    /// Dump the token stream for each expression
    Tokens {
        /// XPath expressions to tokenize
        #[arg(required = true)]
        exprs: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { exprs, tree, json } => cmd_parse(&exprs, tree, json),
        Commands::Check { exprs } => cmd_check(&exprs),
        Commands::Tokens { exprs } => cmd_tokens(&exprs),
    }
}

/// Implements `xmb parse`.
fn cmd_parse(exprs: &[String], tree: bool, json: bool) -> ExitCode {
    for input in exprs {
        let expr = match parse(input) {
            Ok(expr) => expr,
            Err(err) => {
                report(input, &err);
                return ExitCode::FAILURE;
            }
        };

        if tree {
            // Display renders the indented diagnostic tree.
            print!("{expr}");
        } else if json {
            match serde_json::to_string_pretty(&expr) {
                Ok(rendered) => println!("{rendered}"),
                Err(err) => {
                    eprintln!("error: could not render JSON: {err}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", serialize(&expr));
        }
    }

    ExitCode::SUCCESS
}

/// Implements `xmb check`.
fn cmd_check(exprs: &[String]) -> ExitCode {
    for input in exprs {
        match parse(input) {
            Ok(expr) => println!("ok: {}", serialize(&expr)),
            Err(err) => {
                report(input, &err);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Implements `xmb tokens`.
fn cmd_tokens(exprs: &[String]) -> ExitCode {
    for input in exprs {
        match tokenize(input) {
            Ok(tokens) => {
                for spanned in tokens {
                    println!("{:4}  {:?}", spanned.offset, spanned.token);
                }
            }
            Err(err) => {
                report(input, &err.into());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Prints an error with caret context pointing into the input.
fn report(input: &str, err: &Error) {
    match err {
        // The lex error's display already includes the input and caret.
        Error::Lex(_) => eprintln!("error: {err}"),
        Error::Syntax(syntax) => {
            eprintln!("error: {err}");
            if let Some(position) = syntax.position {
                eprintln!("  {input}");
                eprintln!("  {}^", " ".repeat(position.min(input.len())));
            }
        }
    }
}
