use std::path::PathBuf;

use crate::session::{CatalogKind, ImageDetail, Mode};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetBaseUrl(String),
    SetApiKey(String),
    FetchModels,
    SelectModel { catalog: CatalogKind, choice: String },
    SetSystemPrompt(String),
    SetMode(Mode),
    SetTemperature(f32),
    SetMaxTokens(u32),
    SetImageDetail(ImageDetail),
    Attach(Vec<PathBuf>),
    Detach,
    Clear,
    Help,
}

#[derive(Clone, Copy, Debug)]
struct CommandSpec {
    command: &'static str,
    usage: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec { command: "url", usage: "/url <https://.../v1>" },
    CommandSpec { command: "key", usage: "/key <api key>" },
    CommandSpec { command: "models", usage: "/models" },
    CommandSpec { command: "model", usage: "/model <id or #>" },
    CommandSpec { command: "image-model", usage: "/image-model <id or #>" },
    CommandSpec { command: "system", usage: "/system <text> (empty to unset)" },
    CommandSpec { command: "mode", usage: "/mode text|image" },
    CommandSpec { command: "temp", usage: "/temp <0.0-2.0>" },
    CommandSpec { command: "max-tokens", usage: "/max-tokens <100-1000>" },
    CommandSpec { command: "detail", usage: "/detail low|high" },
    CommandSpec { command: "attach", usage: "/attach <path>... (quote paths with spaces)" },
    CommandSpec { command: "detach", usage: "/detach" },
    CommandSpec { command: "clear", usage: "/clear" },
    CommandSpec { command: "help", usage: "/help" },
];

pub fn help_lines() -> Vec<&'static str> {
    COMMANDS.iter().map(|spec| spec.usage).collect()
}

fn usage(command: &str) -> String {
    let usage = COMMANDS
        .iter()
        .find(|spec| spec.command == command)
        .map_or("/help", |spec| spec.usage);
    format!("usage: {}", usage)
}

fn parse_path_args(arg: &str) -> Vec<PathBuf> {
    let parts = match shell_words::split(arg) {
        Ok(parts) => parts,
        Err(_) => arg.split_whitespace().map(str::to_string).collect(),
    };
    parts
        .into_iter()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Parses a `/command`. Returns `None` when the input is a chat message.
pub fn parse(input: &str) -> Option<Result<Command, String>> {
    let rest = input.trim().strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let required = |arg: &str| {
        if arg.is_empty() {
            Err(usage(name))
        } else {
            Ok(arg.to_string())
        }
    };

    let command = match name {
        "url" => required(arg).map(Command::SetBaseUrl),
        "key" => required(arg).map(Command::SetApiKey),
        "models" => Ok(Command::FetchModels),
        "model" => required(arg).map(|choice| Command::SelectModel {
            catalog: CatalogKind::TextVision,
            choice,
        }),
        "image-model" => required(arg).map(|choice| Command::SelectModel {
            catalog: CatalogKind::ImageGen,
            choice,
        }),
        "system" => Ok(Command::SetSystemPrompt(arg.to_string())),
        "mode" => match arg.to_ascii_lowercase().as_str() {
            "text" | "vision" => Ok(Command::SetMode(Mode::TextVision)),
            "image" => Ok(Command::SetMode(Mode::ImageGen)),
            _ => Err(usage(name)),
        },
        "temp" => arg
            .parse::<f32>()
            .map(Command::SetTemperature)
            .map_err(|_| usage(name)),
        "max-tokens" => arg
            .parse::<u32>()
            .map(Command::SetMaxTokens)
            .map_err(|_| usage(name)),
        "detail" => ImageDetail::parse(arg)
            .map(Command::SetImageDetail)
            .ok_or_else(|| usage(name)),
        "attach" => {
            let paths = parse_path_args(arg);
            if paths.is_empty() {
                Err(usage(name))
            } else {
                Ok(Command::Attach(paths))
            }
        }
        "detach" => Ok(Command::Detach),
        "clear" => Ok(Command::Clear),
        "help" => Ok(Command::Help),
        other => Err(format!("unknown command '/{}'; try /help", other)),
    };
    Some(command)
}
