use clap::Parser as _;
use rlc::cli::{Cli, Command, CompileArgs, EmitStageArg};
use rlc::config::{Config, EmitStage};
use rlc::emit::Module as EmitModule;
use rlc::errors::CompileError;
use rlc::passes::{FieldResolution, NameResolver, SkeletonRegistration};
use rlc::span::SourceMap;
use rlc::types::TypeContext;
use rlc::{codegen, mir, parser};
use std::io::Write;
use tracing::info;

fn resolve_config(args: &CompileArgs) -> Result<Config, CompileError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(triple) = &args.target_triple {
        config.target_triple = triple.clone();
    }
    if let Some(layout) = &args.data_layout {
        config.data_layout = layout.clone();
    }
    if let Some(emit) = args.emit {
        config.emit_stage = match emit {
            EmitStageArg::Ast => EmitStage::Ast,
            EmitStageArg::Hir => EmitStage::Hir,
            EmitStageArg::Mir => EmitStage::Mir,
            EmitStageArg::LlvmIr => EmitStage::LlvmIr,
        };
    }
    Ok(config)
}

fn run_compile(args: CompileArgs) -> Result<String, CompileError> {
    let config = resolve_config(&args)?;

    let mut source_map = SourceMap::new();
    let contents = std::fs::read_to_string(&args.source)?;
    let file = source_map.add_file(args.source.clone(), contents.clone());

    let hir_module = parser::parse_str(&contents, file).map_err(|e| CompileError::Parse(e.to_string()))?;

    if config.emit_stage == EmitStage::Ast {
        return Ok(format!("{hir_module:#?}"));
    }

    let mut ctx = TypeContext::new();
    let mut skeleton = SkeletonRegistration::new(&mut ctx);
    skeleton.run(&hir_module);
    for error in skeleton.errors {
        tracing::warn!(%error, "skeleton registration error");
    }

    let mut names = NameResolver::new();
    names.run(&hir_module);

    let mut field_resolution = FieldResolution::new(&mut ctx, &names);
    field_resolution.run(&hir_module);
    for error in field_resolution.errors {
        tracing::warn!(%error, "field resolution error");
    }

    if config.emit_stage == EmitStage::Hir {
        return Ok(format!("{hir_module:#?}"));
    }

    let program = mir::lower_module(&hir_module);
    if config.emit_stage == EmitStage::Mir {
        return Ok(program.render());
    }

    let module_id = args
        .source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module")
        .to_string();
    let mut emit_module = EmitModule::new(module_id);
    emit_module.set_data_layout(config.data_layout.clone());
    emit_module.set_target_triple(config.target_triple.clone());
    codegen::codegen_module(&mut emit_module, &hir_module)?;

    Ok(emit_module.render())
}

fn main() {
    rlc::logging::init_tracing();
    let cli = Cli::parse();

    let Command::Compile(args) = cli.command;
    let output_path = args.output.clone();

    match run_compile(args) {
        Ok(text) => {
            info!("compilation finished");
            match output_path {
                Some(path) => {
                    if let Err(e) = std::fs::write(&path, text) {
                        eprintln!("error writing {}: {e}", path.display());
                        std::process::exit(1);
                    }
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut handle = stdout.lock();
                    let _ = writeln!(handle, "{text}");
                }
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
