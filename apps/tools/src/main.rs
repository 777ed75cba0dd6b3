use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::{
    domain::GroupId,
    protocol::{
        BoardFilter, BoardRecord, ColumnRecord, GroupRecord, NewBoard, NewColumn, NewGroup,
        NewState, NoFilter, StateRecord,
    },
};
use storage::{Repository, Storage};

const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];
const DEFAULT_STATES: [(&str, &str); 3] = [
    ("open", "#64748b"),
    ("blocked", "#ef4444"),
    ("closed", "#22c55e"),
];

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/kanban.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateGroup {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Creates a board with the three default lists.
    CreateBoard {
        name: String,
        #[arg(long)]
        group_id: Option<i64>,
    },
    SeedStates,
    ListBoards {
        #[arg(long)]
        group_id: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateGroup { name, description } => {
            let group =
                Repository::<GroupRecord>::insert(&storage, &NewGroup { name, description })
                    .await?;
            println!("created group_id={}", group.id);
        }
        Command::CreateBoard { name, group_id } => {
            let board = Repository::<BoardRecord>::insert(
                &storage,
                &NewBoard {
                    name,
                    background_color: None,
                    group_id: group_id.map(GroupId),
                    folder_id: None,
                },
            )
            .await?;
            for (position, column) in DEFAULT_COLUMNS.iter().enumerate() {
                Repository::<ColumnRecord>::insert(
                    &storage,
                    &NewColumn {
                        name: column.to_string(),
                        color: None,
                        board_id: board.id,
                        position: position as f64,
                    },
                )
                .await?;
            }
            println!("created board_id={}", board.id);
        }
        Command::SeedStates => {
            let existing = Repository::<StateRecord>::list(&storage, &NoFilter {}).await?;
            for (name, color) in DEFAULT_STATES {
                if existing.iter().any(|s| s.name == name) {
                    continue;
                }
                let state = Repository::<StateRecord>::insert(
                    &storage,
                    &NewState {
                        name: name.to_string(),
                        color: Some(color.to_string()),
                    },
                )
                .await?;
                println!("created state_id={} name={name}", state.id);
            }
        }
        Command::ListBoards { group_id } => {
            let filter = BoardFilter {
                group_id: group_id.map(GroupId),
                folder_id: None,
            };
            for board in Repository::<BoardRecord>::list(&storage, &filter).await? {
                println!("{}\t{}", board.id, board.name);
            }
        }
    }

    Ok(())
}
