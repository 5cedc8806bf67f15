use clap::{Parser, Subcommand};
use fieldops_core::config::{ConfigOverrides, canonical_key};
use fieldops_core::error::AppError;
use fieldops_core::geolocation::GeolocationError;
use fieldops_core::model::Coordinates;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Field technician console for ISP operations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,

    /// Log in as this user before running the command
    #[arg(long, global = true, requires = "password")]
    pub user: Option<String>,

    /// Password used with --user
    #[arg(long, global = true, requires = "user")]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in; any non-empty username and password are accepted
    ///
    /// Example: login ahmad rahasia
    Login {
        username: Option<String>,
        password: Option<String>,
    },
    /// Log out and discard any open form or chat
    Logout,
    /// Show the job list
    Jobs,
    /// Show the technician profile
    Profile,
    /// Switch the main view
    ///
    /// Example: view profile
    View { name: String },
    /// Open the completion form for a job
    ///
    /// Example: select JOB-001
    Select { id: String },
    /// Show the open completion form
    Form,
    /// Attach a photo to the open form, or remove it
    ///
    /// Example: photo ./ont.jpg
    /// Example: photo --remove
    Photo {
        #[arg(required_unless_present = "remove", conflicts_with = "remove")]
        path: Option<PathBuf>,
        #[arg(long)]
        remove: bool,
    },
    /// Detect the current location again
    Locate,
    /// Set the free-text notes of the open form
    Notes {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Submit the open form
    Submit,
    /// Close the open form without submitting
    Close,
    /// Complete a job directly with a photo data URL and a location
    ///
    /// Example: complete JOB-001 --photo data:image/png;base64,AAAA --address "Jl. Merdeka 45" --lat -6.2 --lng 106.8
    Complete {
        id: String,
        #[arg(long)]
        photo: String,
        #[arg(long)]
        address: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Open the support chat for a job
    ///
    /// Example: chat JOB-002
    Chat { id: String },
    /// Send a chat message
    ///
    /// Example: say alamat pelanggan sudah benar?
    Say {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Replace the chat draft
    Draft {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Fill the chat draft with a quick reply (1-4)
    Quick { number: usize },
    /// Send the chat draft
    Send,
    /// Show the chat log
    Messages,
    /// Close the support chat
    ChatClose,
    /// Process background results; without a duration, until none are left
    ///
    /// Example: wait
    /// Example: wait 2000
    Wait { ms: Option<u64> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
    ChatReplyDelayMs,
    DevicePosition,
    GeolocationError,
    SeedPath,
    DesktopNotifications,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field = canonical_key(field);
    if canonical_field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match canonical_field.as_str() {
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            return Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            });
        }
        "theme" => ConfigOverrideTarget::Theme,
        "chat_reply_delay_ms" | "chat_reply_delay" => ConfigOverrideTarget::ChatReplyDelayMs,
        "device_position" | "position" => ConfigOverrideTarget::DevicePosition,
        "geolocation_error" => ConfigOverrideTarget::GeolocationError,
        "seed_path" | "seed" => ConfigOverrideTarget::SeedPath,
        "desktop_notifications" => ConfigOverrideTarget::DesktopNotifications,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if remainder.is_some() {
        return Err(format!("{canonical_field} override cannot have subfields"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` value into one set of overrides. Later
/// values win.
pub fn collect_overrides(raws: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();

    for raw in raws {
        let parsed = parse_config_override(raw)?;
        let value = parsed.value;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, value);
            }
            ConfigOverrideTarget::ChatReplyDelayMs => {
                let delay = value
                    .parse::<u64>()
                    .map_err(|_| format!("chat_reply_delay_ms must be a whole number, got '{value}'"))?;
                overrides.chat_reply_delay_ms = Some(delay);
            }
            ConfigOverrideTarget::DevicePosition => {
                overrides.device_position = Some(parse_position(&value)?);
            }
            ConfigOverrideTarget::GeolocationError => {
                if is_none_value(&value) {
                    overrides.geolocation_error = Some(None);
                } else {
                    let error = GeolocationError::parse(&value)
                        .ok_or_else(|| format!("unknown geolocation error '{value}'"))?;
                    overrides.geolocation_error = Some(Some(error.code().to_string()));
                }
            }
            ConfigOverrideTarget::SeedPath => overrides.seed_path = Some(PathBuf::from(value)),
            ConfigOverrideTarget::DesktopNotifications => {
                overrides.desktop_notifications = Some(parse_flag(&value)?);
            }
        }
    }

    Ok(overrides)
}

fn is_none_value(value: &str) -> bool {
    matches!(canonical_key(value).as_str(), "" | "none" | "off")
}

/// `lat,lng` or `none` for a device without geolocation.
fn parse_position(value: &str) -> Result<Option<Coordinates>, String> {
    if is_none_value(value) {
        return Ok(None);
    }

    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("device_position must be 'lat,lng', got '{value}'"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid longitude '{}'", lng.trim()))?;
    Ok(Some(Coordinates::new(lat, lng)))
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match canonical_key(value).as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(format!("expected true or false, got '{value}'")),
    }
}

/// Turns a clap failure into a one-line `invalid_input` error.
pub fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

/// Splits an interactive line into arguments. Double quotes group words and
/// `\"` escapes a quote inside them.
pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

/// Replaces a leading alias with its expansion. Aliases do not nest.
pub fn expand_alias(
    aliases: &std::collections::HashMap<String, String>,
    args: Vec<String>,
) -> Result<Vec<String>, AppError> {
    let Some(first) = args.first() else {
        return Ok(args);
    };
    let Some(expansion) = aliases.get(first) else {
        return Ok(args);
    };

    let mut expanded = split_command_line(expansion)?;
    expanded.extend(args.into_iter().skip(1));
    Ok(expanded)
}
