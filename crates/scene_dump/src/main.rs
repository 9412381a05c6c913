use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use scene_import::graph::EntitySnapshot;
use scene_import::{
    resolve_project_paths, AssetDatabase, Diagnostics, Document, ResolveContext, SceneResolver,
    ScriptRegistry,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    root: Option<PathBuf>,
    json: bool,
    quiet: bool,
    asset: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.first().is_some_and(|arg| arg == "-h" || arg == "--help") {
        println!("{}", usage_text());
        return Ok(());
    }
    let options = parse_args(&args)?;
    run(&options, &mut io::stdout().lock())
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut asset = None;
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--root" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --root".to_string())?;
                options.root = Some(PathBuf::from(value));
                index += 2;
            }
            "--json" => {
                options.json = true;
                index += 1;
            }
            "--quiet" => {
                options.quiet = true;
                index += 1;
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option '{other}'\n\n{}", usage_text()));
            }
            other => {
                if asset.is_some() {
                    return Err(format!("unexpected argument '{other}'"));
                }
                asset = Some(PathBuf::from(other));
                index += 1;
            }
        }
    }
    options.asset = asset.ok_or_else(usage_text)?;
    Ok(options)
}

fn run(options: &Options, out: &mut impl Write) -> Result<(), String> {
    let paths = resolve_project_paths(options.root.as_deref()).map_err(|error| error.to_string())?;
    let assets = AssetDatabase::scan(&paths).map_err(|error| error.to_string())?;
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);

    let asset = if options.asset.is_absolute() {
        options.asset.clone()
    } else {
        paths.root.join(&options.asset)
    };
    info!(asset = %asset.display(), assets = assets.len(), "scene_dump_resolving");

    let (snapshots, diagnostics) = if is_prefab(&asset) {
        let prefab = assets
            .guid_of(&asset)
            .and_then(|guid| assets.prefab(guid))
            .ok_or_else(|| format!("{} is not a registered prefab", asset.display()))?;
        let built = prefab
            .instantiate(&[], &ctx)
            .map_err(|error| error.to_string())?;
        (built.graph.snapshot_roots(), built.diagnostics)
    } else {
        let document = Document::load(&asset).map_err(|error| error.to_string())?;
        let scene = SceneResolver::new(ctx)
            .resolve(&document)
            .map_err(|error| error.to_string())?;
        (scene.graph.snapshot_roots(), scene.diagnostics)
    };

    write_output(options, &snapshots, &diagnostics, out).map_err(|error| error.to_string())
}

fn is_prefab(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("prefab"))
}

fn write_output(
    options: &Options,
    snapshots: &[EntitySnapshot],
    diagnostics: &Diagnostics,
    out: &mut impl Write,
) -> io::Result<()> {
    if options.json {
        serde_json::to_writer_pretty(&mut *out, snapshots)?;
        writeln!(out)?;
    } else {
        for snapshot in snapshots {
            write_tree(snapshot, 0, out)?;
        }
    }
    if !options.quiet {
        for issue in diagnostics.issues() {
            eprintln!("{issue}");
        }
    }
    Ok(())
}

fn write_tree(snapshot: &EntitySnapshot, depth: usize, out: &mut impl Write) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    let inactive = if snapshot.active { "" } else { " (inactive)" };
    if snapshot.components.is_empty() {
        writeln!(out, "{indent}{}{inactive}", snapshot.name)?;
    } else {
        writeln!(
            out,
            "{indent}{}{inactive} [{}]",
            snapshot.name,
            snapshot.components.join(", ")
        )?;
    }
    for child in &snapshot.children {
        write_tree(child, depth + 1, out)?;
    }
    Ok(())
}

fn usage_text() -> String {
    [
        "scene_dump - resolve a scene or prefab and print its hierarchy",
        "",
        "Usage:",
        "  scene_dump [--root <dir>] [--json] [--quiet] <asset-path>",
        "",
        "The project root defaults to SCENE_IMPORT_ROOT, then to the nearest",
        "directory above the current one that contains Assets/.",
        "Relative asset paths are taken from the project root.",
    ]
    .join("\n")
}
