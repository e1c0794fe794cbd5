//! `clap`-derive command-line surface: one `compile` subcommand.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rlc", about = "Compiles the demo source language to textual LLVM IR")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a source file, optionally dumping an intermediate stage.
    Compile(CompileArgs),
}

#[derive(clap::Args)]
pub struct CompileArgs {
    /// Path to the source file to compile.
    pub source: PathBuf,

    /// Dump this intermediate stage instead of the final LLVM IR.
    #[arg(long, value_enum)]
    pub emit: Option<EmitStageArg>,

    /// Overrides `Config::target_triple`.
    #[arg(long)]
    pub target_triple: Option<String>,

    /// Overrides `Config::data_layout`.
    #[arg(long)]
    pub data_layout: Option<String>,

    /// Optional `#config.toml`-style config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write output here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmitStageArg {
    Ast,
    Hir,
    Mir,
    LlvmIr,
}
