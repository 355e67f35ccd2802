use std::path::PathBuf;

use thiserror::Error;

use crate::layout_engine::search::{Direction, Selector};
use crate::model::tree::{Rotation, Split};
use crate::model::vspace::SpaceMode;
use crate::sys::bridge::WindowId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("missing argument for '{0}'")]
    MissingArgument(String),
    #[error("invalid argument '{1}' for '{0}'")]
    InvalidArgument(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RatioOp {
    Absolute(f32),
    Toward(Selector),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOp {
    Float,
    Sticky,
    NativeFullscreen,
    FullscreenZoom,
    ParentZoom,
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreselOp {
    Direction(Direction),
    Cancel,
}

/// Relative or absolute desktop/monitor destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSel {
    Prev,
    Next,
    Index(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Inc,
    Dec,
}

/// Parsed `rows:cols:x:y:w:h` grid placement. Cell coordinates are clamped
/// to the grid at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowQuery {
    Id,
    Owner,
    Name,
    Tag,
    Float,
    Details(WindowId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopQuery {
    Id,
    Mode,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorQuery {
    Id,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Window(WindowQuery),
    Desktop(DesktopQuery),
    Monitor(MonitorQuery),
    DesktopsForMonitor(u32),
    MonitorForDesktop(u32),
}

/// A fully resolved command. Text is translated here, once, at the channel
/// boundary; nothing below this layer dispatches on strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    WindowFocus(Selector),
    WindowSwap(Selector),
    WindowWarp(Selector),
    WindowRatio(RatioOp),
    WindowToggle(ToggleOp),
    WindowInsertionPoint(PreselOp),
    WindowClose,
    WindowToDesktop(TargetSel),
    WindowToMonitor(TargetSel),
    WindowGrid(GridSpec),
    DesktopLayout(SpaceMode),
    DesktopRotate(Rotation),
    DesktopMirror(Split),
    DesktopEqualize,
    DesktopPadding(Step),
    DesktopGap(Step),
    DesktopToggleOffset,
    DesktopSerialize(PathBuf),
    DesktopDeserialize(PathBuf),
    MonitorFocus(TargetSel),
    Query(Query),
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let mut tokens = line.split_whitespace();
    let verb = tokens.next().ok_or(ParseError::MissingArgument("command".to_string()))?;
    let args: Vec<&str> = tokens.collect();

    match verb {
        "window_focus" => Ok(Command::WindowFocus(selector(verb, first(verb, &args)?)?)),
        "window_swap" => Ok(Command::WindowSwap(selector(verb, first(verb, &args)?)?)),
        "window_warp" => Ok(Command::WindowWarp(selector(verb, first(verb, &args)?)?)),
        "window_ratio" => {
            let op = first(verb, &args)?;
            if op == "abs" {
                let value = args
                    .get(1)
                    .ok_or(ParseError::MissingArgument(verb.to_string()))?
                    .parse::<f32>()
                    .map_err(|_| invalid(verb, args[1]))?;
                Ok(Command::WindowRatio(RatioOp::Absolute(value)))
            } else {
                Ok(Command::WindowRatio(RatioOp::Toward(selector(verb, op)?)))
            }
        }
        "window_toggle" => {
            let op = match first(verb, &args)? {
                "float" => ToggleOp::Float,
                "sticky" => ToggleOp::Sticky,
                "native-fullscreen" => ToggleOp::NativeFullscreen,
                "fullscreen" => ToggleOp::FullscreenZoom,
                "parent" => ToggleOp::ParentZoom,
                "split" => ToggleOp::Split,
                other => return Err(invalid(verb, other)),
            };
            Ok(Command::WindowToggle(op))
        }
        "window_use_insertion_point" => {
            let op = match first(verb, &args)? {
                "cancel" => PreselOp::Cancel,
                other => PreselOp::Direction(direction(verb, other)?),
            };
            Ok(Command::WindowInsertionPoint(op))
        }
        "window_close" => Ok(Command::WindowClose),
        "window_desktop" => Ok(Command::WindowToDesktop(target(verb, first(verb, &args)?)?)),
        "window_monitor" => Ok(Command::WindowToMonitor(target(verb, first(verb, &args)?)?)),
        "window_grid" => Ok(Command::WindowGrid(grid(verb, first(verb, &args)?)?)),
        "desktop_layout" => {
            let mode = match first(verb, &args)? {
                "bsp" => SpaceMode::Bsp,
                "monocle" => SpaceMode::Monocle,
                "float" => SpaceMode::Float,
                other => return Err(invalid(verb, other)),
            };
            Ok(Command::DesktopLayout(mode))
        }
        "desktop_rotate" => {
            let rotation = match first(verb, &args)? {
                "90" => Rotation::Deg90,
                "180" => Rotation::Deg180,
                "270" => Rotation::Deg270,
                other => return Err(invalid(verb, other)),
            };
            Ok(Command::DesktopRotate(rotation))
        }
        "desktop_mirror" => {
            let axis = match first(verb, &args)? {
                "vertical" => Split::Vertical,
                "horizontal" => Split::Horizontal,
                other => return Err(invalid(verb, other)),
            };
            Ok(Command::DesktopMirror(axis))
        }
        "desktop_equalize" => Ok(Command::DesktopEqualize),
        "desktop_padding" => Ok(Command::DesktopPadding(step(verb, first(verb, &args)?)?)),
        "desktop_gap" => Ok(Command::DesktopGap(step(verb, first(verb, &args)?)?)),
        "desktop_toggle" => match first(verb, &args)? {
            "offset" => Ok(Command::DesktopToggleOffset),
            other => Err(invalid(verb, other)),
        },
        "desktop_serialize" => Ok(Command::DesktopSerialize(first(verb, &args)?.into())),
        "desktop_deserialize" => Ok(Command::DesktopDeserialize(first(verb, &args)?.into())),
        "monitor_focus" => Ok(Command::MonitorFocus(target(verb, first(verb, &args)?)?)),
        "query" => query(&args),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn first<'a>(verb: &str, args: &[&'a str]) -> Result<&'a str, ParseError> {
    args.first().copied().ok_or(ParseError::MissingArgument(verb.to_string()))
}

fn invalid(verb: &str, arg: &str) -> ParseError {
    ParseError::InvalidArgument(verb.to_string(), arg.to_string())
}

fn selector(verb: &str, token: &str) -> Result<Selector, ParseError> {
    match token {
        "north" => Ok(Selector::North),
        "east" => Ok(Selector::East),
        "south" => Ok(Selector::South),
        "west" => Ok(Selector::West),
        "prev" => Ok(Selector::Prev),
        "next" => Ok(Selector::Next),
        "biggest" => Ok(Selector::Biggest),
        other => Err(invalid(verb, other)),
    }
}

fn direction(verb: &str, token: &str) -> Result<Direction, ParseError> {
    match token {
        "north" => Ok(Direction::North),
        "east" => Ok(Direction::East),
        "south" => Ok(Direction::South),
        "west" => Ok(Direction::West),
        other => Err(invalid(verb, other)),
    }
}

fn target(verb: &str, token: &str) -> Result<TargetSel, ParseError> {
    match token {
        "prev" => Ok(TargetSel::Prev),
        "next" => Ok(TargetSel::Next),
        other => other
            .parse::<u32>()
            .map(TargetSel::Index)
            .map_err(|_| invalid(verb, other)),
    }
}

fn step(verb: &str, token: &str) -> Result<Step, ParseError> {
    match token {
        "inc" => Ok(Step::Inc),
        "dec" => Ok(Step::Dec),
        other => Err(invalid(verb, other)),
    }
}

fn grid(verb: &str, token: &str) -> Result<GridSpec, ParseError> {
    let fields: Vec<u32> = token
        .split(':')
        .map(|field| field.parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid(verb, token))?;
    let [rows, cols, x, y, width, height] = fields[..] else {
        return Err(invalid(verb, token));
    };
    if rows == 0 || cols == 0 {
        return Err(invalid(verb, token));
    }
    Ok(GridSpec { rows, cols, x, y, width, height })
}

fn query(args: &[&str]) -> Result<Command, ParseError> {
    let domain = first("query", args)?;
    let op = args.get(1).copied().ok_or(ParseError::MissingArgument("query".to_string()))?;
    let parsed = match domain {
        "window" => Query::Window(match op {
            "id" => WindowQuery::Id,
            "owner" => WindowQuery::Owner,
            "name" => WindowQuery::Name,
            "tag" => WindowQuery::Tag,
            "float" => WindowQuery::Float,
            other => WindowQuery::Details(WindowId(
                other.parse::<u32>().map_err(|_| invalid("query window", other))?,
            )),
        }),
        "desktop" => Query::Desktop(match op {
            "id" => DesktopQuery::Id,
            "mode" => DesktopQuery::Mode,
            "windows" => DesktopQuery::Windows,
            other => return Err(invalid("query desktop", other)),
        }),
        "monitor" => Query::Monitor(match op {
            "id" => MonitorQuery::Id,
            "count" => MonitorQuery::Count,
            other => return Err(invalid("query monitor", other)),
        }),
        "desktops-for-monitor" => Query::DesktopsForMonitor(
            op.parse::<u32>().map_err(|_| invalid("query desktops-for-monitor", op))?,
        ),
        "monitor-for-desktop" => Query::MonitorForDesktop(
            op.parse::<u32>().map_err(|_| invalid("query monitor-for-desktop", op))?,
        ),
        other => return Err(ParseError::UnknownCommand(format!("query {other}"))),
    };
    Ok(Command::Query(parsed))
}
