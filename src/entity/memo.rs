use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "memo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Filled by the database on insert.
    #[sea_orm(column_type = "Timestamp")]
    pub created_at: DateTimeUtc,
    /// Filled on insert and refreshed by the database whenever the row changes.
    #[sea_orm(column_type = "Timestamp")]
    pub updated_at: DateTimeUtc,
    pub user_id: i32,
    #[sea_orm(column_type = "String(Some(256))")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::memo_tag_relation::Entity")]
    MemoTagRelation,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::memo_tag_relation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MemoTagRelation.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::memo_tag_relation::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::memo_tag_relation::Relation::Memo.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
