use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "room")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub cinema_name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub number: i32,
    pub capacity: i32,
    /// ISO `YYYY-MM-DD`.
    pub construction_date: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cinema::Entity",
        from = "Column::CinemaName",
        to = "super::cinema::Column::Name",
        on_delete = "Cascade"
    )]
    Cinema,
}

impl Related<super::cinema::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cinema.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
