use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Render,
    Read,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help(HelpTopic),
    Render(RenderArgs),
    Read(ReadArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Select,
    Update,
    Delete,
}

impl StatementKind {
    fn parse(s: &str) -> anyhow::Result<Self> {
        Ok(match s {
            "insert" => StatementKind::Insert,
            "select" => StatementKind::Select,
            "update" => StatementKind::Update,
            "delete" => StatementKind::Delete,
            other => anyhow::bail!("unknown statement kind: {other} (expected insert|select|update|delete)"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderArgs {
    pub kind: StatementKind,
    pub table: String,
    /// JSON object of column → value.
    pub data: Option<String>,
    /// JSON condition map.
    pub conditions: Option<String>,
    pub columns: Option<Vec<String>>,
    pub order_by: Option<String>,
    pub numbered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadArgs {
    /// Explicit `--config`; `None` means the optional default `boardsql.toml`.
    pub config: Option<PathBuf>,
    pub database: Option<String>,
    pub table: String,
    pub conditions: Option<String>,
    pub columns: Option<Vec<String>>,
    pub order_by: Option<String>,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "render" => parse_render(it.map(|s| s.as_str())),
        "read" => parse_read(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Value of `--flag VALUE` or `--flag=VALUE`, if `token` is that flag.
fn flag_value<'a>(
    token: &'a str,
    flag: &str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<String>> {
    if token == flag {
        let Some(v) = it.next() else {
            anyhow::bail!("{flag} requires a value");
        };
        return Ok(Some(v.to_string()));
    }
    match token.strip_prefix(flag).and_then(|rest| rest.strip_prefix('=')) {
        Some(v) => Ok(Some(v.to_string())),
        None => Ok(None),
    }
}

fn split_columns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_render<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut kind: Option<StatementKind> = None;
    let mut table: Option<String> = None;
    let mut data: Option<String> = None;
    let mut conditions: Option<String> = None;
    let mut columns: Option<Vec<String>> = None;
    let mut order_by: Option<String> = None;
    let mut numbered = false;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Render));
        }
        if token == "--numbered" {
            numbered = true;
        } else if let Some(v) = flag_value(token, "--table", &mut it)? {
            table = Some(v);
        } else if let Some(v) = flag_value(token, "--data", &mut it)? {
            data = Some(v);
        } else if let Some(v) = flag_value(token, "--where", &mut it)? {
            conditions = Some(v);
        } else if let Some(v) = flag_value(token, "--columns", &mut it)? {
            columns = Some(split_columns(&v));
        } else if let Some(v) = flag_value(token, "--order-by", &mut it)? {
            order_by = Some(v);
        } else if token.starts_with('-') {
            anyhow::bail!("unknown option for render: {token}");
        } else if kind.is_none() {
            kind = Some(StatementKind::parse(token)?);
        } else {
            anyhow::bail!("unexpected argument: {token}");
        }
    }

    let Some(kind) = kind else {
        anyhow::bail!("render requires a statement kind (insert|select|update|delete)");
    };
    let Some(table) = table else {
        anyhow::bail!("render requires --table");
    };
    if matches!(kind, StatementKind::Insert | StatementKind::Update) && data.is_none() {
        anyhow::bail!("render {} requires --data", kind_name(kind));
    }

    Ok(Command::Render(RenderArgs {
        kind,
        table,
        data,
        conditions,
        columns,
        order_by,
        numbered,
    }))
}

fn kind_name(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::Insert => "insert",
        StatementKind::Select => "select",
        StatementKind::Update => "update",
        StatementKind::Delete => "delete",
    }
}

fn parse_read<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config: Option<PathBuf> = None;
    let mut database: Option<String> = None;
    let mut table: Option<String> = None;
    let mut conditions: Option<String> = None;
    let mut columns: Option<Vec<String>> = None;
    let mut order_by: Option<String> = None;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Read));
        }
        if let Some(v) = flag_value(token, "--config", &mut it)? {
            config = Some(PathBuf::from(v));
        } else if let Some(v) = flag_value(token, "--database", &mut it)? {
            database = Some(v);
        } else if let Some(v) = flag_value(token, "--table", &mut it)? {
            table = Some(v);
        } else if let Some(v) = flag_value(token, "--where", &mut it)? {
            conditions = Some(v);
        } else if let Some(v) = flag_value(token, "--columns", &mut it)? {
            columns = Some(split_columns(&v));
        } else if let Some(v) = flag_value(token, "--order-by", &mut it)? {
            order_by = Some(v);
        } else {
            anyhow::bail!("unknown option for read: {token}");
        }
    }

    let Some(table) = table else {
        anyhow::bail!("read requires --table");
    };

    Ok(Command::Read(ReadArgs {
        config,
        database,
        table,
        conditions,
        columns,
        order_by,
    }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
boardsql - render and run condition-map SQL for the board database

USAGE:
  boardsql <COMMAND> [OPTIONS]

COMMANDS:
  render        Print the SQL and bind values for a statement (no database needed)
  read          Run a SELECT and print rows as JSON lines

Run `boardsql <command> --help` for more."
            );
        }
        HelpTopic::Render => {
            println!(
                "\
USAGE:
  boardsql render <insert|select|update|delete> --table <TABLE> [OPTIONS]

OPTIONS:
  --table <TABLE>       Target table
  --data <JSON>         Column values, e.g. '{{\"title\":\"a\"}}' (insert, update)
  --where <JSON>        Condition map, e.g. '{{\"views\":{{\"type\":\"gte\",\"value\":10}}}}'
  --columns <A,B>       Selected columns (select; default *)
  --order-by <CLAUSE>   ORDER BY clause (select)
  --numbered            Render $1, $2, ... instead of ?
  -h, --help            Print help"
            );
        }
        HelpTopic::Read => {
            println!(
                "\
USAGE:
  boardsql read --table <TABLE> [OPTIONS]

OPTIONS:
  --table <TABLE>       Table to read
  --where <JSON>        Condition map
  --columns <A,B>       Selected columns (default *)
  --order-by <CLAUSE>   ORDER BY clause
  --config <FILE>       Config file path (default: boardsql.toml, optional)
  --database <URL>      Override database.url from config
  -h, --help            Print help

The database URL is taken from --database, then the config file, then DATABASE_URL."
            );
        }
    }
}
