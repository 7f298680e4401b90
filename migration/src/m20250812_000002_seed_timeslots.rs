use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const SLOTS: [(&str, &str); 5] = [
    ("10:00:00", "12:00:00"),
    ("13:30:00", "15:30:00"),
    ("16:00:00", "18:00:00"),
    ("18:30:00", "20:30:00"),
    ("21:00:00", "23:00:00"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert.into_table(Timeslot::Table).columns([Timeslot::StartTime, Timeslot::EndTime]);
        for (start, end) in SLOTS {
            insert.values_panic([start.into(), end.into()]);
        }
        manager.exec_stmt(insert).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut delete = Query::delete();
        delete.from_table(Timeslot::Table).cond_where(
            Expr::col(Timeslot::StartTime).is_in(SLOTS.iter().map(|(start, _)| *start)),
        );
        manager.exec_stmt(delete).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Timeslot {
    Table,
    StartTime,
    EndTime,
}
