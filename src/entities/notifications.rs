use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub way_id: i32,
    /// First day the reminder is active.
    pub start_time: ChronoDate,
    /// Last day the reminder is active.
    pub end_time: ChronoDate,
    /// 0 = Monday .. 6 = Sunday
    pub week_day: i32,
    pub time: ChronoTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ways::Entity",
        from = "Column::WayId",
        to = "super::ways::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Ways,
}

impl Related<super::ways::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ways.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
