// ============================================================================
// EDITOR SCRIPTS: one board command per line, replayed against a Session
// ============================================================================
//
//   size 16
//   color #FFA500
//   brush 3
//   press 4 4
//   stroke 0 0 1 1 2 2
//   tool eraser
//   key f
//   preset heart
//
// Blank lines and `//` comments are skipped. Every command maps to one Session
// call, so a script replays exactly what the board UI would do.

use crate::components::colors::Color;
use crate::components::tools::{BrushSize, Tool};
use crate::error::{Error, Result};
use crate::ops::patterns::Pattern;
use crate::project::Session;

/// One parsed script line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Size(usize),
    Tool(Tool),
    Color(Color),
    Brush(BrushSize),
    Press(usize, usize),
    Stroke(Vec<(usize, usize)>),
    Clear,
    Fill,
    Preset(Pattern),
    Key(char),
}

/// Parse a whole script into `(line number, command)` pairs.
pub fn parse_script(source: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with("//") {
            continue;
        }
        let cmd = parse_line(text).map_err(|message| Error::Script { line, message })?;
        commands.push((line, cmd));
    }
    Ok(commands)
}

fn parse_line(text: &str) -> std::result::Result<Command, String> {
    let (word, rest) = match text.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (text, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    match word.to_ascii_lowercase().as_str() {
        "size" => Ok(Command::Size(one_number(&args, "size")?)),
        "tool" => {
            let name = one_arg(&args, "tool")?;
            Tool::parse(name)
                .map(Command::Tool)
                .ok_or_else(|| format!("unknown tool '{}' (pencil, eraser, fill)", name))
        }
        // The rest of the line, so `rgb(1, 2, 3)` survives.
        "color" => Color::new(rest)
            .map(Command::Color)
            .ok_or_else(|| "color needs a value".to_string()),
        "brush" => {
            let radius: u8 = one_number(&args, "brush")?;
            BrushSize::from_radius(radius)
                .map(Command::Brush)
                .ok_or_else(|| format!("brush must be 1, 2 or 3, got {}", radius))
        }
        "press" => {
            if args.len() != 2 {
                return Err("press needs X Y".into());
            }
            Ok(Command::Press(number(args[0])?, number(args[1])?))
        }
        "stroke" => {
            if args.is_empty() || args.len() % 2 != 0 {
                return Err("stroke needs X Y pairs".into());
            }
            let points = args
                .chunks(2)
                .map(|p| Ok((number(p[0])?, number(p[1])?)))
                .collect::<std::result::Result<Vec<_>, String>>()?;
            Ok(Command::Stroke(points))
        }
        "clear" => no_args(&args, "clear", Command::Clear),
        "fill" => no_args(&args, "fill", Command::Fill),
        "preset" => {
            let name = one_arg(&args, "preset")?;
            Pattern::parse(name)
                .map(Command::Preset)
                .ok_or_else(|| format!("unknown preset '{}'", name))
        }
        "key" => {
            let mut chars = rest.chars();
            match (rest, chars.next(), chars.next()) {
                ("space", _, _) => Ok(Command::Key(' ')),
                (_, Some(c), None) => Ok(Command::Key(c)),
                _ => Err("key needs a single character or 'space'".into()),
            }
        }
        other => Err(format!("unknown command '{}'", other)),
    }
}

fn one_arg<'a>(args: &[&'a str], cmd: &str) -> std::result::Result<&'a str, String> {
    match args {
        [one] => Ok(*one),
        _ => Err(format!("{} takes exactly one argument", cmd)),
    }
}

fn one_number<T: std::str::FromStr>(args: &[&str], cmd: &str) -> std::result::Result<T, String> {
    number(one_arg(args, cmd)?)
}

fn number<T: std::str::FromStr>(s: &str) -> std::result::Result<T, String> {
    s.parse().map_err(|_| format!("'{}' is not a valid number", s))
}

fn no_args(args: &[&str], name: &str, cmd: Command) -> std::result::Result<Command, String> {
    if args.is_empty() {
        Ok(cmd)
    } else {
        Err(format!("{} takes no arguments", name))
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Parse and run `source` against the session. Returns console lines, one per command.
///
/// The whole script is parsed before anything runs; a command that fails at run time
/// stops the script with the board as the earlier commands left it.
pub fn run_script(session: &mut Session, source: &str) -> Result<Vec<String>> {
    let commands = parse_script(source)?;
    let mut console = Vec::with_capacity(commands.len());
    for (line, cmd) in commands {
        let out = execute(session, cmd).map_err(|e| Error::Script {
            line,
            message: e.to_string(),
        })?;
        console.push(out);
    }
    Ok(console)
}

fn execute(session: &mut Session, cmd: Command) -> Result<String> {
    Ok(match cmd {
        Command::Size(n) => {
            session.resize(n)?;
            format!("new {}x{} board", n, n)
        }
        Command::Tool(tool) => {
            session.set_tool(tool);
            format!("tool: {}", tool.label())
        }
        Command::Color(color) => {
            let msg = format!("color: {}", color);
            session.set_color(color);
            msg
        }
        Command::Brush(brush) => {
            session.set_brush(brush);
            format!("brush: {}", brush.label())
        }
        Command::Press(x, y) => {
            let n = session.press(x, y)?;
            format!("{} at ({}, {}): {} cell(s)", session.tool().label(), x, y, n)
        }
        Command::Stroke(points) => {
            let mut total = 0;
            for (x, y) in &points {
                total += session.press(*x, *y)?;
            }
            format!("stroke of {} point(s): {} cell(s)", points.len(), total)
        }
        Command::Clear => format!("cleared {} cell(s)", session.clear()),
        Command::Fill => format!("filled {} new cell(s)", session.fill()),
        Command::Preset(pattern) => {
            let painted = session.apply_preset(pattern)?;
            format!("preset {}: {} cell(s)", pattern.name(), painted)
        }
        Command::Key(k) => match session.handle_key(k) {
            Some(shortcut) => format!("key {:?}: {:?}", k, shortcut),
            None => format!("key {:?}: no action", k),
        },
    })
}
