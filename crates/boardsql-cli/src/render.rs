use crate::cli::{RenderArgs, StatementKind};
use anyhow::Context;
use boardsql::{Columns, ConditionMap, Placeholders, Record, Statement, statement};

pub(crate) fn parse_conditions(raw: Option<&str>) -> anyhow::Result<ConditionMap> {
    match raw {
        Some(json) => ConditionMap::from_json(json).context("invalid --where"),
        None => Ok(ConditionMap::new()),
    }
}

pub(crate) fn parse_columns(columns: Option<&[String]>) -> Columns {
    match columns {
        Some(list) if !list.is_empty() => Columns::List(list.to_vec()),
        _ => Columns::All,
    }
}

fn parse_data(raw: Option<&str>) -> anyhow::Result<Record> {
    let json = raw.unwrap_or("{}");
    serde_json::from_str(json).context("invalid --data: expected a JSON object")
}

pub fn build(args: &RenderArgs) -> anyhow::Result<Statement> {
    let conditions = parse_conditions(args.conditions.as_deref())?;

    let stmt = match args.kind {
        StatementKind::Insert => statement::insert(&args.table, &parse_data(args.data.as_deref())?)?,
        StatementKind::Select => statement::select(
            &args.table,
            &parse_columns(args.columns.as_deref()),
            &conditions,
            args.order_by.as_deref(),
        )?,
        StatementKind::Update => statement::update(
            &args.table,
            &parse_data(args.data.as_deref())?,
            &conditions,
        )?,
        StatementKind::Delete => statement::delete(&args.table, &conditions)?,
    };
    Ok(stmt)
}

/// The SQL line and the JSON bind line.
pub fn render(args: &RenderArgs) -> anyhow::Result<(String, String)> {
    let stmt = build(args)?;
    let style = if args.numbered {
        Placeholders::Numbered
    } else {
        Placeholders::Question
    };
    let sql = stmt.render(style).into_owned();
    let params = serde_json::to_string(stmt.params())?;
    Ok((sql, params))
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let (sql, params) = render(&args)?;
    println!("{sql}");
    println!("{params}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(kind: StatementKind) -> RenderArgs {
        RenderArgs {
            kind,
            table: "board".to_string(),
            data: None,
            conditions: None,
            columns: None,
            order_by: None,
            numbered: false,
        }
    }

    #[test]
    fn render_select_with_conditions() {
        let (sql, params) = render(&RenderArgs {
            conditions: Some(
                r#"{"is_deleted": false, "views": {"type": "between", "value": [100, 10]}}"#
                    .to_string(),
            ),
            columns: Some(vec!["board_id".to_string(), "title".to_string()]),
            order_by: Some("publish_date DESC".to_string()),
            ..args(StatementKind::Select)
        })
        .unwrap();

        assert_eq!(
            sql,
            "SELECT board_id, title FROM board WHERE is_deleted = ? AND views BETWEEN ? AND ? ORDER BY publish_date DESC"
        );
        assert_eq!(params, "[false,10,100]");
    }

    #[test]
    fn render_update_numbered() {
        let (sql, params) = render(&RenderArgs {
            data: Some(r#"{"title": "b"}"#.to_string()),
            conditions: Some(r#"{"board_id": [1, 2]}"#.to_string()),
            numbered: true,
            ..args(StatementKind::Update)
        })
        .unwrap();

        assert_eq!(sql, "UPDATE board SET title = $1 WHERE board_id IN ($2, $3)");
        assert_eq!(params, r#"["b",1,2]"#);
    }

    #[test]
    fn render_insert_keeps_document_order() {
        let (sql, _) = render(&RenderArgs {
            data: Some(r#"{"title": "a", "contents": "b", "views": 0}"#.to_string()),
            ..args(StatementKind::Insert)
        })
        .unwrap();
        assert_eq!(sql, "INSERT INTO board (title, contents, views) VALUES (?, ?, ?)");
    }

    #[test]
    fn render_delete_without_where_fails() {
        let err = render(&args(StatementKind::Delete)).unwrap_err();
        let err = err.downcast::<boardsql::OrmError>().unwrap();
        assert!(err.is_invalid_condition());
    }

    #[test]
    fn render_rejects_unknown_operator() {
        let err = render(&RenderArgs {
            conditions: Some(r#"{"views": {"type": "regex", "value": "x"}}"#.to_string()),
            ..args(StatementKind::Select)
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("regex"));
    }

    #[test]
    fn render_rejects_non_object_data() {
        assert!(
            render(&RenderArgs {
                data: Some("[1, 2]".to_string()),
                ..args(StatementKind::Insert)
            })
            .is_err()
        );
    }
}
