//! Structured description of every table: fields, constraints and indexes.
//!
//! This is what the documentation export serialises and what error
//! classification uses to turn a column list back into a constraint name.
//! It must stay in step with `changelog-*.sql`; the integration tests compare
//! it against a freshly created database.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::schema::{SchemaVariant, CHECK_TAG_OWNER, UNIQ_CODE, UNIQ_TAG_NAME};

static CANONICAL: Lazy<Vec<TableDoc>> = Lazy::new(|| tables(SchemaVariant::UniqueTagName));

#[derive(Clone, Debug, Serialize)]
pub struct TableDoc {
    pub name: &'static str,
    pub doc: TableNotes,
    pub fields: Vec<FieldDoc>,
    pub constraints: Vec<ConstraintDoc>,
    pub index: Vec<IndexDoc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TableNotes {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<&'static str>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FieldDoc {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub column_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose_name: Option<&'static str>,
    pub is_null: bool,
    pub is_unique: bool,
    pub primary_key: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub auto_increment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_update: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationDoc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RelationDoc {
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ConstraintKind {
    #[serde(rename = "UniqueConstraint")]
    Unique,
    #[serde(rename = "CheckConstraint")]
    Check,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConstraintDoc {
    #[serde(rename = "type")]
    pub kind: ConstraintKind,
    pub fields: Vec<&'static str>,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<&'static str>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IndexDoc {
    pub name: &'static str,
    pub fields: Vec<&'static str>,
}

impl FieldDoc {
    fn new(name: &'static str, column_type: &'static str) -> Self {
        Self {
            name,
            column_type,
            verbose_name: None,
            is_null: false,
            is_unique: false,
            primary_key: false,
            auto_increment: false,
            default: None,
            on_update: None,
            relation: None,
        }
    }

    fn id() -> Self {
        Self {
            is_unique: true,
            primary_key: true,
            auto_increment: true,
            ..Self::new("id", "int")
        }
    }

    fn verbose(mut self, verbose_name: &'static str) -> Self {
        self.verbose_name = Some(verbose_name);
        self
    }

    fn nullable(mut self) -> Self {
        self.is_null = true;
        self
    }

    fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    fn default_value(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    fn on_update(mut self, expr: &'static str) -> Self {
        self.on_update = Some(expr);
        self
    }

    fn cascades_from(mut self, table: &'static str) -> Self {
        self.relation = Some(RelationDoc {
            table,
            column: "id",
            on_delete: "CASCADE",
        });
        self
    }
}

const TAG_OWNER_CONDITION: &str =
    "(is_official = TRUE AND user_id IS NULL) OR (is_official = FALSE AND user_id IS NOT NULL)";

pub fn tables(variant: SchemaVariant) -> Vec<TableDoc> {
    let mut tag_constraints = vec![ConstraintDoc {
        kind: ConstraintKind::Check,
        fields: vec!["is_official", "user_id"],
        name: CHECK_TAG_OWNER,
        condition: Some(TAG_OWNER_CONDITION),
    }];
    if variant.has_unique_tag_name() {
        tag_constraints.push(ConstraintDoc {
            kind: ConstraintKind::Unique,
            fields: vec!["name", "is_official", "user_id"],
            name: UNIQ_TAG_NAME,
            condition: None,
        });
    }

    vec![
        TableDoc {
            name: "user",
            doc: TableNotes {
                title: "User",
                context: vec!["Deleting a user deletes their memos and personal tags"],
            },
            fields: vec![
                FieldDoc::id(),
                FieldDoc::new("name", "varchar(256)").verbose("user name"),
                FieldDoc::new("code", "varchar(256)").verbose("user code").unique(),
            ],
            constraints: vec![ConstraintDoc {
                kind: ConstraintKind::Unique,
                fields: vec!["code"],
                name: UNIQ_CODE,
                condition: None,
            }],
            index: vec![],
        },
        TableDoc {
            name: "memo",
            doc: TableNotes {
                title: "Memo",
                context: vec![
                    "Every memo belongs to exactly one existing user",
                    "updated_at is refreshed by the database on every change",
                ],
            },
            fields: vec![
                FieldDoc::id(),
                FieldDoc::new("created_at", "timestamp").default_value("CURRENT_TIMESTAMP"),
                FieldDoc::new("updated_at", "timestamp")
                    .default_value("CURRENT_TIMESTAMP")
                    .on_update("CURRENT_TIMESTAMP"),
                FieldDoc::new("user_id", "int").cascades_from("user"),
                FieldDoc::new("title", "varchar(256)").verbose("title"),
                FieldDoc::new("content", "text").verbose("content"),
            ],
            constraints: vec![],
            index: vec![],
        },
        TableDoc {
            name: "tag",
            doc: TableNotes {
                title: "Tag",
                context: vec![
                    "An official tag has no owner, a personal tag has exactly one",
                    "Official tags are not removed when a user is deleted",
                ],
            },
            fields: vec![
                FieldDoc::id(),
                FieldDoc::new("name", "varchar(50)").verbose("tag name"),
                FieldDoc::new("is_official", "boolean")
                    .verbose("official tag flag")
                    .default_value("false"),
                FieldDoc::new("user_id", "int").nullable().cascades_from("user"),
            ],
            constraints: tag_constraints,
            index: vec![],
        },
        TableDoc {
            name: "memo_tag_relation",
            doc: TableNotes {
                title: "Memo-tag association",
                context: vec!["The same tag may be attached to a memo more than once"],
            },
            fields: vec![
                FieldDoc::id(),
                FieldDoc::new("memo_id", "int").cascades_from("memo"),
                FieldDoc::new("tag_id", "int").cascades_from("tag"),
            ],
            constraints: vec![],
            index: vec![],
        },
    ]
}

/// Name of the unique constraint on `table` covering exactly `columns`, in order.
pub fn unique_constraint_for(table: &str, columns: &[&str]) -> Option<&'static str> {
    CANONICAL
        .iter()
        .find(|t| t.name == table)?
        .constraints
        .iter()
        .find(|c| c.kind == ConstraintKind::Unique && c.fields == columns)
        .map(|c| c.name)
}
