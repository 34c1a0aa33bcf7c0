use sea_orm::entity::prelude::*;
use sea_orm::Set;

/// A tag is either official (no owner) or personal (exactly one owner).
/// The `check_tag_owner` constraint rejects every other combination.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tag")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(Some(50))")]
    pub name: String,
    pub is_official: bool,
    pub user_id: Option<i32>,
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

impl Related<super::memo::Entity> for Entity {
    fn to() -> RelationDef {
        super::memo_tag_relation::Relation::Memo.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::memo_tag_relation::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagScope {
    Official,
    Personal(i32),
}

impl TagScope {
    /// Reads the scope from the raw column pair. `None` for combinations the
    /// check constraint forbids.
    pub fn from_columns(is_official: bool, user_id: Option<i32>) -> Option<Self> {
        match (is_official, user_id) {
            (true, None) => Some(Self::Official),
            (false, Some(owner)) => Some(Self::Personal(owner)),
            _ => None,
        }
    }

    pub fn is_official(&self) -> bool {
        matches!(self, Self::Official)
    }

    pub fn owner(&self) -> Option<i32> {
        match self {
            Self::Official => None,
            Self::Personal(owner) => Some(*owner),
        }
    }
}

impl Model {
    pub fn scope(&self) -> Option<TagScope> {
        TagScope::from_columns(self.is_official, self.user_id)
    }
}

impl ActiveModel {
    pub fn official(name: impl Into<String>) -> Self {
        Self::in_scope(name, TagScope::Official)
    }

    pub fn personal(name: impl Into<String>, user_id: i32) -> Self {
        Self::in_scope(name, TagScope::Personal(user_id))
    }

    pub fn in_scope(name: impl Into<String>, scope: TagScope) -> Self {
        Self {
            name: Set(name.into()),
            is_official: Set(scope.is_official()),
            user_id: Set(scope.owner()),
            ..Default::default()
        }
    }
}
