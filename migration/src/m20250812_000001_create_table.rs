use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cinema::Table)
                    .if_not_exists()
                    .col(string_len(Cinema::Name, 100).primary_key())
                    .col(string_len_null(Cinema::Street, 200))
                    .col(integer(Cinema::StreetNumber))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Room::Table)
                    .if_not_exists()
                    .col(string_len(Room::CinemaName, 100))
                    .col(integer(Room::Number))
                    .col(integer(Room::Capacity))
                    .col(string_len(Room::ConstructionDate, 10))
                    .primary_key(Index::create().col(Room::CinemaName).col(Room::Number))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_cinema")
                            .from(Room::Table, Room::CinemaName)
                            .to(Cinema::Table, Cinema::Name)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Film::Table)
                    .if_not_exists()
                    .col(pk_auto(Film::Id))
                    .col(string_len(Film::Title, 200))
                    .col(integer(Film::Year))
                    .col(string_len(Film::Genre, 100))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Timeslot::Table)
                    .if_not_exists()
                    .col(pk_auto(Timeslot::Id))
                    .col(string_len(Timeslot::StartTime, 8))
                    .col(string_len(Timeslot::EndTime, 8))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Showtime::Table)
                    .if_not_exists()
                    .col(pk_auto(Showtime::Id))
                    .col(double(Showtime::Price))
                    .col(string_len(Showtime::ShowDate, 10))
                    .col(integer(Showtime::FilmId))
                    .col(string_len(Showtime::RoomCinemaName, 100))
                    .col(integer(Showtime::RoomNumber))
                    .col(integer(Showtime::TimeslotId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_showtime_film")
                            .from(Showtime::Table, Showtime::FilmId)
                            .to(Film::Table, Film::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_showtime_room")
                            .from(Showtime::Table, (Showtime::RoomCinemaName, Showtime::RoomNumber))
                            .to(Room::Table, (Room::CinemaName, Room::Number))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_showtime_timeslot")
                            .from(Showtime::Table, Showtime::TimeslotId)
                            .to(Timeslot::Table, Timeslot::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One screening per room, timeslot and day.
        manager
            .create_index(
                Index::create()
                    .name("idx_showtime_slot_unique")
                    .table(Showtime::Table)
                    .col(Showtime::RoomCinemaName)
                    .col(Showtime::RoomNumber)
                    .col(Showtime::TimeslotId)
                    .col(Showtime::ShowDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_showtime_show_date")
                    .table(Showtime::Table)
                    .col(Showtime::ShowDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Showtime::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Timeslot::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Film::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Room::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Cinema::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Cinema {
    Table,
    Name,
    Street,
    StreetNumber,
}

#[derive(DeriveIden)]
enum Room {
    Table,
    CinemaName,
    Number,
    Capacity,
    ConstructionDate,
}

#[derive(DeriveIden)]
enum Film {
    Table,
    Id,
    Title,
    Year,
    Genre,
}

#[derive(DeriveIden)]
enum Timeslot {
    Table,
    Id,
    StartTime,
    EndTime,
}

#[derive(DeriveIden)]
enum Showtime {
    Table,
    Id,
    Price,
    ShowDate,
    FilmId,
    RoomCinemaName,
    RoomNumber,
    TimeslotId,
}
