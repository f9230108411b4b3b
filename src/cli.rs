// ============================================================================
// pixelboard CLI: headless board operations via command-line arguments
// ============================================================================
//
// Usage examples:
//   pixelboard draw --size 16 --script house.pb --save "House" --export house.png
//   pixelboard preset heart --size 24 --share
//   pixelboard list --limit 10 --preview
//   pixelboard export 1718000000000 --output art.png --scale 30
//   pixelboard share 1718000000000
//   pixelboard open "http://localhost:8080/index.html?art=eyJncmlk..." --save "Copy"
//   pixelboard config --write
//
// Everything runs synchronously on the current thread against one Session.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};

use crate::catalog::SavedWork;
use crate::components::colors::WHITE;
use crate::error::{Error, Result};
use crate::logger;
use crate::ops::patterns::Pattern;
use crate::ops::scripting::run_script;
use crate::ops::stencils::sizes_for;
use crate::project::Session;
use crate::settings::AppSettings;
use crate::storage::FileStore;
use crate::{log_err, log_info};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// pixelboard headless pixel-art board.
///
/// Draw with editor scripts or presets, keep a catalog of saved works, share them as
/// links and export them as PNG.
#[derive(Parser, Debug)]
#[command(name = "pixelboard", about = "Headless pixel-art board", version)]
pub struct CliArgs {
    /// Directory holding the saved-work catalog (overrides the settings file).
    #[arg(long, global = true, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Echo log output and script console lines to the terminal.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Save / export / share options shared by commands that produce a board.
#[derive(clap::Args, Debug, Default)]
pub struct OutputArgs {
    /// Add the result to the catalog under this name.
    #[arg(long, value_name = "NAME")]
    pub save: Option<String>,

    /// Write the result as a PNG file.
    #[arg(long, value_name = "PNG")]
    pub export: Option<PathBuf>,

    /// Print a share link for the result.
    #[arg(long)]
    pub share: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an editor script on a fresh board.
    Draw {
        /// Board size in cells (defaults to the configured size).
        #[arg(long, value_name = "N")]
        size: Option<usize>,

        /// Script file, one command per line.
        #[arg(long, value_name = "FILE")]
        script: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Stamp a preset pattern (heart, smiley, flag, house, tree).
    Preset {
        pattern: String,

        #[arg(long, value_name = "N")]
        size: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the most recent saved works.
    List {
        #[arg(long, value_name = "N")]
        limit: Option<usize>,

        /// Draw a small color preview under each work.
        #[arg(long)]
        preview: bool,
    },

    /// Export a saved work as PNG.
    Export {
        id: u64,

        #[arg(short, long, value_name = "PNG")]
        output: PathBuf,

        /// Pixels per cell (defaults to the configured scale).
        #[arg(long, value_name = "N")]
        scale: Option<u32>,
    },

    /// Print the share link of a saved work.
    Share { id: u64 },

    /// Open a share token or share link.
    Open {
        #[arg(value_name = "TOKEN_OR_URL")]
        source: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the active settings and where they are read from.
    Config {
        /// Write the active settings to the settings file.
        #[arg(long)]
        write: bool,
    },
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run one CLI command and return an OS exit code.
/// `0` = success, `1` = the command failed.
pub fn run(args: CliArgs) -> ExitCode {
    let mut settings = AppSettings::load();
    if let Some(dir) = &args.store_dir {
        settings.storage_dir = Some(dir.clone());
    }
    if args.verbose
        && let Some(path) = logger::log_path()
    {
        eprintln!("log: {}", path.display());
    }

    match run_command(settings, args.command, args.verbose) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_err!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_command(settings: AppSettings, command: Command, verbose: bool) -> Result<()> {
    if let Command::Config { write } = command {
        return config(&settings, write);
    }

    let root = settings.storage_root();
    log_info!("Catalog directory: {}", root.display());
    let mut session = Session::new(settings, Box::new(FileStore::new(root)))?;

    match command {
        Command::Draw { size, script, output } => {
            let source = std::fs::read_to_string(&script)?;
            if let Some(n) = size {
                session.resize(n)?;
            }
            let console = run_script(&mut session, &source)?;
            if verbose {
                for line in &console {
                    println!("  [script] {}", line);
                }
            }
            finish(&mut session, &output)
        }
        Command::Preset { pattern, size, output } => {
            let pattern = Pattern::parse(&pattern).ok_or(Error::UnknownPattern(pattern))?;
            if let Some(n) = size {
                session.resize(n)?;
            }
            let painted = session.apply_preset(pattern).inspect_err(|e| {
                if matches!(e, Error::NoStencil { .. }) {
                    eprintln!("hint: {}", stencil_sizes_hint(pattern));
                }
            })?;
            println!("{}: {} cell(s) painted", pattern.name(), painted);
            finish(&mut session, &output)
        }
        Command::List { limit, preview } => {
            list(&session, limit, preview);
            Ok(())
        }
        Command::Export { id, output, scale } => {
            session.load_work(id)?;
            let scale = scale.unwrap_or(session.settings().export_scale);
            session.export_png_scaled(&output, scale)?;
            println!("{}", output.display());
            Ok(())
        }
        Command::Share { id } => {
            session.load_work(id)?;
            println!("{}", session.share_url(Utc::now())?);
            Ok(())
        }
        Command::Open { source, output } => {
            let art = if source.contains("://") {
                session.open_share_url(&source)?
            } else {
                session.open_share_token(&source)?
            };
            println!(
                "opened {}x{} board shared {} ({} cell(s) painted)",
                art.grid_size,
                art.grid_size,
                art.timestamp.format("%Y-%m-%d %H:%M"),
                session.grid().painted_count()
            );
            finish(&mut session, &output)
        }
        Command::Config { .. } => Ok(()),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Apply `--save`, `--export` and `--share` to the finished board, in that order.
fn finish(session: &mut Session, output: &OutputArgs) -> Result<()> {
    let now = Utc::now();

    if let Some(name) = &output.save {
        let name = if name.trim().is_empty() {
            Session::default_work_name(now)
        } else {
            name.clone()
        };
        let work = session.save_work(&name, now)?;
        println!("saved '{}' as id {}", work.name, work.id);
        if !session.is_persistent() {
            eprintln!("warning: catalog could not be written; the work was not kept");
        }
    }

    if let Some(path) = &output.export {
        export(session, path)?;
    }

    if output.share {
        println!("{}", session.share_url(now)?);
    }
    Ok(())
}

fn export(session: &Session, path: &Path) -> Result<()> {
    session.export_png(path)?;
    println!("{}", path.display());
    Ok(())
}

fn config(settings: &AppSettings, write: bool) -> Result<()> {
    match AppSettings::settings_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no config directory on this platform"),
    }
    print!("{}", settings.to_config_string());
    if write {
        settings.save()?;
        log_info!("Settings written");
    }
    Ok(())
}

/// Which board sizes `pattern` can be stamped at.
fn stencil_sizes_hint(pattern: Pattern) -> String {
    let sizes = sizes_for(pattern);
    if sizes.is_empty() {
        return format!("{} works at any size", pattern.name());
    }
    let sizes: Vec<String> = sizes.iter().map(|n| format!("{n}x{n}")).collect();
    format!("{} is available at {}", pattern.name(), sizes.join(", "))
}

/// Terminal rows for an `n × n` thumbnail, two columns of background color per cell.
fn preview_lines(work: &SavedWork, n: usize) -> Vec<String> {
    let thumb = work.thumbnail(n);
    thumb
        .chunks(n.max(1))
        .map(|row| {
            let mut line = String::from("     ");
            for color in row {
                let [r, g, b, _] = color.to_rgba().unwrap_or(WHITE).0;
                line.push_str(&format!("\x1b[48;2;{r};{g};{b}m  "));
            }
            line.push_str("\x1b[0m");
            line
        })
        .collect()
}

fn list(session: &Session, limit: Option<usize>, preview: bool) {
    let catalog = session.catalog();
    if catalog.is_empty() {
        println!("no saved works");
        return;
    }
    let limit = limit.unwrap_or(session.settings().gallery_size);
    let total = catalog.len();
    for (i, work) in catalog.recent(limit).into_iter().enumerate() {
        println!(
            "{:>3}. {}  [id {}, {}x{}, {} painted, {}]",
            total - i,
            work.name,
            work.id,
            work.grid_size,
            work.grid_size,
            work.painted_count,
            work.created_at.format("%Y-%m-%d %H:%M")
        );
        if preview {
            for line in preview_lines(work, session.settings().thumbnail_size) {
                println!("{}", line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Grid;
    use crate::components::colors::Color;
    use crate::io::to_record;
    use crate::storage::BlobStore;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("pixelboard").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_subcommands_and_globals() {
        let args = parse(&["preset", "heart", "--size", "8", "--share", "--store-dir", "/tmp/x"]);
        assert_eq!(args.store_dir.as_deref(), Some(Path::new("/tmp/x")));
        match args.command {
            Command::Preset { pattern, size, output } => {
                assert_eq!(pattern, "heart");
                assert_eq!(size, Some(8));
                assert!(output.share);
                assert!(output.save.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }

        let args = parse(&["-v", "export", "42", "-o", "a.png"]);
        assert!(args.verbose);
        assert!(matches!(args.command, Command::Export { id: 42, scale: None, .. }));
    }

    #[test]
    fn list_and_config_flags_parse() {
        assert!(matches!(
            parse(&["list", "--limit", "3", "--preview"]).command,
            Command::List { limit: Some(3), preview: true }
        ));
        assert!(matches!(parse(&["list"]).command, Command::List { limit: None, preview: false }));
        assert!(matches!(parse(&["config", "--write"]).command, Command::Config { write: true }));
    }

    #[test]
    fn config_without_write_only_prints() {
        assert!(run_command(AppSettings::default(), Command::Config { write: false }, false).is_ok());
    }

    #[test]
    fn preview_has_one_row_per_thumbnail_line() {
        let mut grid = Grid::new(8).unwrap();
        grid.set(0, 0, Color::new("#102030")).unwrap();
        let work = to_record(&grid, "p", 1, Utc::now()).unwrap();

        let lines = preview_lines(&work, 4);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("     \x1b[48;2;16;32;48m  "));
        assert!(lines[0].ends_with("\x1b[0m"));
        assert_eq!(lines[1].matches("\x1b[48;2;255;255;255m").count(), 4);
        assert!(preview_lines(&work, 0).is_empty());
    }

    #[test]
    fn preset_hint_lists_stencil_sizes() {
        assert_eq!(
            stencil_sizes_hint(Pattern::Heart),
            "heart is available at 8x8, 16x16, 24x24"
        );
        assert_eq!(stencil_sizes_hint(Pattern::Flag), "flag works at any size");
    }

    #[test]
    fn oversized_export_scale_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings {
            storage_dir: Some(dir.path().join("works")),
            ..AppSettings::default()
        };
        let save = Command::Preset {
            pattern: "heart".into(),
            size: Some(8),
            output: OutputArgs { save: Some("Heart".into()), ..OutputArgs::default() },
        };
        run_command(settings.clone(), save, false).unwrap();
        let id = Session::new(settings.clone(), Box::new(FileStore::new(dir.path().join("works"))))
            .unwrap()
            .catalog()
            .recent(1)[0]
            .id;

        let png = dir.path().join("huge.png");
        let export = Command::Export { id, output: png.clone(), scale: Some(u32::MAX) };
        assert!(matches!(run_command(settings, export, false), Err(Error::InvalidSize(_))));
        assert!(!png.exists());
    }

    #[test]
    fn draw_requires_a_script() {
        assert!(CliArgs::try_parse_from(["pixelboard", "draw", "--size", "8"]).is_err());
    }

    #[test]
    fn preset_saves_and_exports_into_the_store_dir() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("heart.png");
        let settings = AppSettings {
            storage_dir: Some(dir.path().join("works")),
            ..AppSettings::default()
        };
        let command = Command::Preset {
            pattern: "heart".into(),
            size: Some(8),
            output: OutputArgs {
                save: Some("Heart".into()),
                export: Some(png.clone()),
                share: true,
            },
        };
        run_command(settings.clone(), command, false).unwrap();
        assert!(png.exists());

        let store = FileStore::new(dir.path().join("works"));
        let raw = store.get("pixelArtWorks").unwrap().unwrap();
        assert!(raw.contains(r#""name":"Heart""#));

        let id = Session::new(settings.clone(), Box::new(store))
            .unwrap()
            .catalog()
            .recent(1)[0]
            .id;
        run_command(settings, Command::Share { id }, false).unwrap();
    }

    #[test]
    fn unknown_preset_and_missing_work_fail() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings {
            storage_dir: Some(dir.path().to_path_buf()),
            ..AppSettings::default()
        };
        let bad = Command::Preset {
            pattern: "spiral".into(),
            size: None,
            output: OutputArgs::default(),
        };
        assert!(matches!(
            run_command(settings.clone(), bad, false),
            Err(Error::UnknownPattern(_))
        ));
        assert!(matches!(
            run_command(settings, Command::Share { id: 1 }, false),
            Err(Error::NotFound(1))
        ));
    }
}
