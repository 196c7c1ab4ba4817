//! CLI command definitions and handlers

pub mod analyze;
pub mod serve;

use crate::extract::ReferenceKind;
use crate::knowledge::ApiQueryOptions;
use crate::protocol::Method;
use crate::analyzer::SearchOptions;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const LONG_ABOUT: &str = r#"
Structural analysis for Unreal Engine style C++ codebases.

Point the analyzer at an engine checkout (--engine) or any C++ codebase
(--custom), then query classes, hierarchies, references and patterns.

QUICK START:
    unreal-analyzer --engine ~/UnrealEngine class AActor
    unreal-analyzer --custom ./MyGame hierarchy AMyCharacter
    unreal-analyzer --custom ./MyGame search "GetWorld\(\)" --files "**/*.cpp"

KNOWLEDGE:
    unreal-analyzer practices UPROPERTY      Best practices for a pattern
    unreal-analyzer --custom . patterns Source/MyActor.h

SERVER:
    unreal-analyzer --custom . serve         JSON requests on stdin, one per line
"#;

/// Unreal Engine source analyzer
#[derive(Parser, Debug)]
#[command(name = "unreal-analyzer")]
#[command(author, version)]
#[command(about = "Structural analysis for Unreal Engine C++ codebases")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Unreal Engine root (must contain Engine/Source)
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "custom")]
    pub engine: Option<PathBuf>,

    /// Any C++ codebase root
    #[arg(long, global = true, value_name = "PATH")]
    pub custom: Option<PathBuf>,

    /// JSON output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show methods, properties and bases of a class
    #[command(visible_alias = "c")]
    Class {
        /// Class name, e.g. AActor
        name: String,
    },

    /// Show the inheritance tree of a class
    #[command(visible_alias = "h")]
    Hierarchy {
        name: String,

        /// Leave interface lists out
        #[arg(long)]
        no_interfaces: bool,
    },

    /// Find every occurrence of an identifier
    #[command(visible_alias = "r")]
    Refs {
        identifier: String,

        /// class, function or variable
        #[arg(short, long)]
        kind: Option<ReferenceKind>,
    },

    /// Regex search over source lines
    #[command(visible_alias = "s")]
    Search(SearchArgs),

    /// Summarize an engine subsystem (Rendering, Physics, Audio, ...)
    Subsystem { name: String },

    /// Query synthesized API documentation
    Api(ApiArgs),

    /// Detect known Unreal patterns in a file
    Patterns {
        /// File path, relative to the root or absolute
        file: PathBuf,
    },

    /// Best practices for a pattern or concept
    Practices { concept: String },

    /// Answer newline-delimited JSON requests on stdin
    Serve,
}

/// Arguments for the search command
#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:
    unreal-analyzer --custom . search \"BeginPlay\"
    unreal-analyzer --custom . search \"tick\" --files \"**/*.h\" --comments")]
pub struct SearchArgs {
    /// Case-insensitive regular expression
    pub query: String,

    /// File glob (default from config)
    #[arg(short, long)]
    pub files: Option<String>,

    /// Also search comment lines
    #[arg(long)]
    pub comments: bool,
}

/// Arguments for the api command
#[derive(Args, Debug)]
pub struct ApiArgs {
    /// Query terms
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Object, Actor, Structure, Component or Miscellaneous
    #[arg(long)]
    pub category: Option<String>,

    /// Module name, e.g. Engine
    #[arg(long)]
    pub module: Option<String>,

    /// Max results
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,

    /// Leave examples out of the results
    #[arg(long)]
    pub no_examples: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Cli {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }

    /// Initialization request implied by `--engine` / `--custom`
    pub fn init_method(&self) -> Option<Method> {
        match (&self.engine, &self.custom) {
            (Some(path), _) => Some(Method::InitializeEngine { path: path.clone() }),
            (None, Some(path)) => Some(Method::InitializeCustom { path: path.clone() }),
            (None, None) => None,
        }
    }
}

impl Commands {
    /// Request this subcommand maps to; `None` for `serve`
    pub fn to_method(&self) -> Option<Method> {
        let method = match self {
            Commands::Class { name } => Method::AnalyzeClass {
                class_name: name.clone(),
            },
            Commands::Hierarchy {
                name,
                no_interfaces,
            } => Method::FindClassHierarchy {
                class_name: name.clone(),
                include_interfaces: !no_interfaces,
            },
            Commands::Refs { identifier, kind } => Method::FindReferences {
                identifier: identifier.clone(),
                kind: *kind,
            },
            Commands::Search(args) => {
                let mut options = SearchOptions::new(&args.query).with_comments(args.comments);
                if let Some(files) = &args.files {
                    options = options.with_file_pattern(files);
                }
                Method::SearchCode(options)
            }
            Commands::Subsystem { name } => Method::AnalyzeSubsystem {
                subsystem: name.clone(),
            },
            Commands::Api(args) => Method::QueryApiReference {
                query: args.query.join(" "),
                options: ApiQueryOptions {
                    category: args.category.clone(),
                    module: args.module.clone(),
                    max_results: args.limit,
                    include_examples: !args.no_examples,
                },
            },
            Commands::Patterns { file } => Method::DetectPatterns {
                file_path: file.clone(),
            },
            Commands::Practices { concept } => Method::GetBestPractices {
                concept: concept.clone(),
            },
            Commands::Serve => return None,
        };
        Some(method)
    }
}
