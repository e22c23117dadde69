use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "routes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub way_id: i32,
    pub start_place_id: i32,
    pub end_place_id: i32,
    pub transport_id: Option<i32>,
    pub transport_name: String,
    pub time: ChronoTime,
    /// Order of this leg inside its way, starting at 0.
    pub position: i32,
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
    #[sea_orm(
        belongs_to = "super::places::Entity",
        from = "Column::StartPlaceId",
        to = "super::places::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    StartPlace,
    #[sea_orm(
        belongs_to = "super::places::Entity",
        from = "Column::EndPlaceId",
        to = "super::places::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    EndPlace,
}

impl Related<super::ways::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ways.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
