use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Matches::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Matches::Phase).string().not_null())
                    .col(
                        ColumnDef::new(Matches::ThemeIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Matches::Themes).string().not_null())
                    .col(
                        ColumnDef::new(Matches::WordsPerPlayer)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Matches::TurnSeconds).integer().not_null())
                    .col(ColumnDef::new(Matches::SkipReset).string().not_null())
                    .col(
                        ColumnDef::new(Matches::TimeRemaining)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Matches::RoundsPlayed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Matches::CurrentPlayer).string().null())
                    .col(
                        ColumnDef::new(Matches::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Matches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Teams::MatchId).string().not_null())
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .col(
                        ColumnDef::new(Teams::Points)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Teams::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Teams are listed in creation order; the winner tie-break
        // depends on it.
        manager
            .create_index(
                Index::create()
                    .name("idx_teams_match_id")
                    .table(Teams::Table)
                    .col(Teams::MatchId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Players::TeamId).string().not_null())
                    .col(ColumnDef::new(Players::Name).string().not_null())
                    .col(ColumnDef::new(Players::OrderInTeam).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_players_team_id")
                    .table(Players::Table)
                    .col(Players::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TurnOrder::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TurnOrder::MatchId).string().not_null())
                    .col(ColumnDef::new(TurnOrder::TurnIndex).integer().not_null())
                    .col(ColumnDef::new(TurnOrder::PlayerId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(TurnOrder::MatchId)
                            .col(TurnOrder::TurnIndex),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Words::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Words::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Words::MatchId).string().not_null())
                    .col(ColumnDef::new(Words::TeamId).string().not_null())
                    .col(ColumnDef::new(Words::Text).string().not_null())
                    .col(ColumnDef::new(Words::State).string().not_null())
                    .to_owned(),
            )
            .await?;

        // The round-end check filters words by match and state.
        manager
            .create_index(
                Index::create()
                    .name("idx_words_match_id_state")
                    .table(Words::Table)
                    .col(Words::MatchId)
                    .col(Words::State)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Words::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TurnOrder::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Matches::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Matches {
    Table,
    Id,
    Phase,
    ThemeIndex,
    Themes,
    WordsPerPlayer,
    TurnSeconds,
    SkipReset,
    TimeRemaining,
    RoundsPlayed,
    CurrentPlayer,
    Version,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    MatchId,
    Name,
    Points,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Players {
    Table,
    Id,
    TeamId,
    Name,
    OrderInTeam,
}

#[derive(DeriveIden)]
enum TurnOrder {
    Table,
    MatchId,
    TurnIndex,
    PlayerId,
}

#[derive(DeriveIden)]
enum Words {
    Table,
    Id,
    MatchId,
    TeamId,
    Text,
    State,
}
