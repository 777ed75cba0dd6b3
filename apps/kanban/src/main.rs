use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    filter::filter_board,
    model::{BoardKey, CardKey, ColumnKey, GroupKey, Priority, TagKey},
    reorder::{move_card, move_column},
    stats::board_statistics,
    FileStore, HistoryLogger, ResourceClient, WorkspaceStore, WorkspaceSync,
};
use tracing::warn;

mod render;

type Store = WorkspaceStore<FileStore>;

#[derive(Parser, Debug)]
#[command(name = "kanban", about = "Local Kanban boards with optional server sync")]
struct Cli {
    /// Directory holding the workspace document.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Name recorded in history entries and comments.
    #[arg(long, default_value = "local")]
    user: String,
    /// Board server to mirror groups and boards to.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = "warn")]
    log_filter: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Group(GroupCommand),
    #[command(subcommand)]
    Board(BoardCommand),
    #[command(subcommand)]
    List(ListCommand),
    #[command(subcommand)]
    Card(CardCommand),
    /// Moves a card to a list, optionally at a position within it.
    Move {
        card: String,
        column: String,
        #[arg(long)]
        index: Option<usize>,
        #[command(flatten)]
        target: BoardArg,
    },
    #[command(subcommand)]
    Tag(TagCommand),
    Comment {
        card: String,
        text: String,
        #[command(flatten)]
        target: BoardArg,
    },
    /// Shows the board with only the cards matching `term`.
    Search {
        term: String,
        #[command(flatten)]
        target: BoardArg,
    },
    Stats {
        #[command(flatten)]
        target: BoardArg,
    },
    /// Board activity, or one card's history with `--card`.
    History {
        #[arg(long)]
        card: Option<String>,
        #[command(flatten)]
        target: BoardArg,
    },
    /// Pushes every group and board to the server.
    Sync,
}

#[derive(Args, Debug)]
struct BoardArg {
    /// Board to act on; the active board when omitted.
    #[arg(long)]
    board: Option<String>,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Add { title: String },
    Rename { group: String, title: String },
    Rm { group: String },
    Ls,
}

#[derive(Subcommand, Debug)]
enum BoardCommand {
    Add { group: String, title: String },
    Rename { board: String, title: String },
    Rm { board: String },
    Use { board: String },
    Color { board: String, color: String },
    Show { board: Option<String> },
    Ls,
}

#[derive(Subcommand, Debug)]
enum ListCommand {
    Add {
        title: String,
        #[arg(long)]
        at: Option<usize>,
        #[command(flatten)]
        target: BoardArg,
    },
    Rename {
        column: String,
        title: String,
        #[command(flatten)]
        target: BoardArg,
    },
    Rm {
        column: String,
        #[command(flatten)]
        target: BoardArg,
    },
    Color {
        column: String,
        color: String,
        #[command(flatten)]
        target: BoardArg,
    },
    Move {
        column: String,
        index: usize,
        #[command(flatten)]
        target: BoardArg,
    },
}

#[derive(Subcommand, Debug)]
enum CardCommand {
    Add {
        column: String,
        title: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[command(flatten)]
        target: BoardArg,
    },
    /// Changes the given fields; others keep their value.
    Edit {
        card: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[command(flatten)]
        target: BoardArg,
    },
    Rm {
        card: String,
        #[command(flatten)]
        target: BoardArg,
    },
    Show {
        card: String,
        #[command(flatten)]
        target: BoardArg,
    },
}

#[derive(Subcommand, Debug)]
enum TagCommand {
    Add {
        card: String,
        name: String,
        #[arg(long, default_value = "bg-blue-500")]
        color: String,
        #[command(flatten)]
        target: BoardArg,
    },
    Rm {
        card: String,
        tag: String,
        #[command(flatten)]
        target: BoardArg,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log_filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let data_dir = match cli.data_dir.clone() {
        Some(dir) => dir,
        None => FileStore::default_dir()
            .ok_or_else(|| anyhow!("no data directory on this platform; pass --data-dir"))?,
    };
    let mut store = WorkspaceStore::open(FileStore::new(&data_dir), HistoryLogger::new(&cli.user))
        .with_context(|| format!("failed to open workspace in {}", data_dir.display()))?;
    let sync = match cli.server_url.as_deref() {
        Some(url) => Some(WorkspaceSync::new(ResourceClient::new(url)?)),
        None => None,
    };

    run(cli.command, &mut store, sync.as_ref()).await
}

async fn run(command: Command, store: &mut Store, sync: Option<&WorkspaceSync>) -> Result<()> {
    match command {
        Command::Group(command) => run_group(command, store, sync).await?,
        Command::Board(command) => run_board(command, store, sync).await?,
        Command::List(command) => run_list(command, store)?,
        Command::Card(command) => run_card(command, store)?,
        Command::Move {
            card,
            column,
            index,
            target,
        } => {
            let board = board_key(store, &target)?;
            let outcome = store.update_board(&board, |b, logger| {
                move_card(
                    b,
                    &CardKey::from(card.as_str()),
                    &ColumnKey::from(column.as_str()),
                    index,
                    logger,
                )
            })?;
            println!("{}", render::outcome(&outcome));
        }
        Command::Tag(TagCommand::Add {
            card,
            name,
            color,
            target,
        }) => {
            let board = board_key(store, &target)?;
            let tag = store.edit_board(&board, |editor| {
                editor.add_tag(&CardKey::from(card.as_str()), &name, &color)
            })?;
            println!("{tag}");
        }
        Command::Tag(TagCommand::Rm { card, tag, target }) => {
            let board = board_key(store, &target)?;
            let removed = store.edit_board(&board, |editor| {
                editor.remove_tag(&CardKey::from(card.as_str()), &TagKey::from(tag.as_str()))
            })?;
            println!("removed tag {}", removed.name);
        }
        Command::Comment { card, text, target } => {
            let board = board_key(store, &target)?;
            let comment = store.edit_board(&board, |editor| {
                editor.add_comment(&CardKey::from(card.as_str()), &text)
            })?;
            println!("{comment}");
        }
        Command::Search { term, target } => {
            let board = board_ref(store, &target)?;
            print!("{}", render::board(&filter_board(board, &term)));
        }
        Command::Stats { target } => {
            let board = board_ref(store, &target)?;
            print!("{}", render::statistics(&board_statistics(board)));
        }
        Command::History { card, target } => {
            let board = board_ref(store, &target)?;
            let now = store.logger().now();
            let entries = match card {
                Some(card) => {
                    let key = CardKey::from(card.as_str());
                    &board
                        .card(&key)
                        .ok_or_else(|| anyhow!("card {key} not found"))?
                        .history
                }
                None => &board.activity_log,
            };
            print!("{}", render::history(entries, now));
        }
        Command::Sync => {
            let sync = sync.ok_or_else(|| anyhow!("--server-url is required for sync"))?;
            sync.client().health().await?;
            let groups: Vec<GroupKey> = store
                .workspace()
                .groups
                .iter()
                .map(|g| g.id.clone())
                .collect();
            for group in groups {
                sync.push_group(store, &group).await?;
                let boards: Vec<BoardKey> = store
                    .workspace()
                    .group(&group)
                    .map(|g| g.boards.iter().map(|b| b.id.clone()).collect())
                    .unwrap_or_default();
                for board in boards {
                    sync.push_board(store, &board).await?;
                }
            }
            println!("synced {} group(s)", store.workspace().groups.len());
        }
    }
    Ok(())
}

async fn run_group(command: GroupCommand, store: &mut Store, sync: Option<&WorkspaceSync>) -> Result<()> {
    match command {
        GroupCommand::Add { title } => {
            let group = store.create_group(&title)?;
            if let Some(sync) = sync {
                if let Err(error) = sync.push_group(store, &group).await {
                    warn!(%error, group = %group, "group was saved locally but not on the server");
                }
            }
            println!("{group}");
        }
        GroupCommand::Rename { group, title } => {
            let group = GroupKey::from(group);
            store.rename_group(&group, &title)?;
            if let Some(sync) = sync {
                if let Err(error) = sync.push_group(store, &group).await {
                    warn!(%error, group = %group, "rename was saved locally but not on the server");
                }
            }
        }
        GroupCommand::Rm { group } => {
            let removed = store.delete_group(&GroupKey::from(group))?;
            if let (Some(sync), Some(remote)) = (sync, removed.remote_id) {
                if let Err(error) = sync.delete_group_remote(remote).await {
                    warn!(%error, group = %removed.id, "group was deleted locally but not on the server");
                }
            }
        }
        GroupCommand::Ls => print!("{}", render::groups(store.workspace())),
    }
    Ok(())
}

async fn run_board(command: BoardCommand, store: &mut Store, sync: Option<&WorkspaceSync>) -> Result<()> {
    let mut pushed = None;
    match command {
        BoardCommand::Add { group, title } => {
            let board = store.create_board(&GroupKey::from(group), &title)?;
            println!("{board}");
            pushed = Some(board);
        }
        BoardCommand::Rename { board, title } => {
            let board = BoardKey::from(board);
            store.rename_board(&board, &title)?;
            pushed = Some(board);
        }
        BoardCommand::Color { board, color } => {
            let board = BoardKey::from(board);
            store.set_background_color(&board, &color)?;
            pushed = Some(board);
        }
        BoardCommand::Rm { board } => {
            let removed = store.delete_board(&BoardKey::from(board))?;
            if let (Some(sync), Some(remote)) = (sync, removed.remote_id) {
                if let Err(error) = sync.delete_board_remote(remote).await {
                    warn!(%error, board = %removed.id, "board was deleted locally but not on the server");
                }
            }
        }
        BoardCommand::Use { board } => store.set_active_board(&BoardKey::from(board))?,
        BoardCommand::Show { board } => {
            let board = board_ref(store, &BoardArg { board })?;
            print!("{}", render::board(board));
        }
        BoardCommand::Ls => print!("{}", render::boards(store.workspace())),
    }

    if let (Some(sync), Some(board)) = (sync, pushed) {
        if let Err(error) = sync.push_board(store, &board).await {
            warn!(%error, board = %board, "board was saved locally but not on the server");
        }
    }
    Ok(())
}

fn run_list(command: ListCommand, store: &mut Store) -> Result<()> {
    match command {
        ListCommand::Add { title, at, target } => {
            let board = board_key(store, &target)?;
            let column = store.edit_board(&board, |editor| editor.add_column(&title, at))?;
            println!("{column}");
        }
        ListCommand::Rename {
            column,
            title,
            target,
        } => {
            let board = board_key(store, &target)?;
            store.edit_board(&board, |editor| {
                editor.rename_column(&ColumnKey::from(column.as_str()), &title)
            })?;
        }
        ListCommand::Rm { column, target } => {
            let board = board_key(store, &target)?;
            let removed = store.edit_board(&board, |editor| {
                editor.delete_column(&ColumnKey::from(column.as_str()))
            })?;
            println!("removed list {} with {} card(s)", removed.title, removed.cards.len());
        }
        ListCommand::Color {
            column,
            color,
            target,
        } => {
            let board = board_key(store, &target)?;
            store.edit_board(&board, |editor| {
                editor.set_column_color(&ColumnKey::from(column.as_str()), &color)
            })?;
        }
        ListCommand::Move {
            column,
            index,
            target,
        } => {
            let board = board_key(store, &target)?;
            let outcome = store.update_board(&board, |b, _| {
                move_column(b, &ColumnKey::from(column.as_str()), index)
            })?;
            println!("{}", render::outcome(&outcome));
        }
    }
    Ok(())
}

fn run_card(command: CardCommand, store: &mut Store) -> Result<()> {
    match command {
        CardCommand::Add {
            column,
            title,
            priority,
            target,
        } => {
            let board = board_key(store, &target)?;
            let card = store.edit_board(&board, |editor| {
                editor.create_task(&ColumnKey::from(column.as_str()), &title, priority)
            })?;
            println!("{card}");
        }
        CardCommand::Edit {
            card,
            title,
            description,
            priority,
            target,
        } => {
            let board = board_key(store, &target)?;
            let key = CardKey::from(card.as_str());
            let changed = store.edit_board(&board, |editor| {
                let current = editor
                    .find_card(&key)
                    .cloned()
                    .ok_or_else(|| client_core::ClientError::CardNotFound(key.clone()))?;
                editor.edit_card(
                    &key,
                    title.as_deref().unwrap_or(&current.title),
                    description.as_deref().unwrap_or(&current.description),
                    priority.unwrap_or(current.priority),
                )
            })?;
            if changed.is_empty() {
                println!("nothing changed");
            } else {
                let fields: Vec<_> = changed.iter().map(|f| f.label()).collect();
                println!("updated {}", fields.join(", "));
            }
        }
        CardCommand::Rm { card, target } => {
            let board = board_key(store, &target)?;
            let removed = store.edit_board(&board, |editor| {
                editor.delete_card(&CardKey::from(card.as_str()))
            })?;
            println!("removed card {}", removed.title);
        }
        CardCommand::Show { card, target } => {
            let board = board_ref(store, &target)?;
            let key = CardKey::from(card.as_str());
            let card = board
                .card(&key)
                .ok_or_else(|| anyhow!("card {key} not found"))?;
            print!("{}", render::card(card, store.logger().now()));
        }
    }
    Ok(())
}

fn board_key(store: &Store, target: &BoardArg) -> Result<BoardKey> {
    Ok(board_ref(store, target)?.id.clone())
}

fn board_ref<'a>(store: &'a Store, target: &BoardArg) -> Result<&'a client_core::model::Board> {
    match &target.board {
        Some(id) => {
            let key = BoardKey::from(id.as_str());
            store
                .board(&key)
                .ok_or_else(|| anyhow!("board {key} not found"))
        }
        None => store
            .active_board()
            .ok_or_else(|| anyhow!("no active board; create one or pass --board")),
    }
}
