//! Line-oriented session driver: the concrete frontend.
//!
//! The graphical canvas (node boxes, drag handles, modals) lives outside this
//! repository; this shell exposes the same interactions as typed commands so
//! the editor is a complete, runnable program. It talks to the controller
//! exclusively through its command API and re-renders from `graph()`.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::api::ConfigStore;
use crate::editor::{Editor, Frontend};
use crate::graph::NodeKind;
use crate::layout::Direction;

/// Notifications as terminal lines; the toast popups of the original UI.
pub struct StdioFrontend;

impl StdioFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdioFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for StdioFrontend {
    fn notify_info(&self, message: &str) {
        println!("[info] {message}");
    }

    fn notify_error(&self, message: &str) {
        eprintln!("[error] {message}");
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Help,
    Show,
    AddWorker,
    AddTopic,
    Rename { id: String, label: String },
    SetMeta { id: String, text: String },
    SetServer { id: String, server: String },
    SetTimeout { id: String, seconds: Option<u32> },
    Move { id: String, x: f64, y: f64 },
    Connect { source: String, target: String },
    DeleteNode { id: String },
    DeleteEdge { id: String },
    Layout { direction: Direction },
    Spacing { rank: f64, node: f64 },
    ToggleEdges,
    Load,
    Save,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = parts.collect();

    let arg = |i: usize, what: &str| -> Result<String, String> {
        args.get(i)
            .map(|s| s.to_string())
            .ok_or_else(|| format!("usage: {verb} expects {what}"))
    };
    let num = |i: usize, what: &str| -> Result<f64, String> {
        arg(i, what)?
            .parse::<f64>()
            .map_err(|_| format!("{what} must be a number"))
    };
    // Commands taking free text join the remaining words back together.
    let rest = |from: usize| args[from..].join(" ");

    match verb {
        "help" => Ok(Command::Help),
        "show" => Ok(Command::Show),
        "add-worker" => Ok(Command::AddWorker),
        "add-topic" => Ok(Command::AddTopic),
        "rename" => {
            let id = arg(0, "<id> <label>")?;
            if args.len() < 2 {
                return Err("usage: rename <id> <label>".to_string());
            }
            Ok(Command::Rename {
                id,
                label: rest(1),
            })
        }
        "set-meta" => Ok(Command::SetMeta {
            id: arg(0, "<id> <text>")?,
            text: rest(1),
        }),
        "set-server" => Ok(Command::SetServer {
            id: arg(0, "<id> <server>")?,
            server: arg(1, "<id> <server>")?,
        }),
        "set-timeout" => {
            let id = arg(0, "<id> [seconds]")?;
            let seconds = match args.get(1) {
                None => None,
                Some(raw) => Some(
                    raw.parse::<u32>()
                        .map_err(|_| "seconds must be a non-negative integer".to_string())?,
                ),
            };
            Ok(Command::SetTimeout { id, seconds })
        }
        "move" => Ok(Command::Move {
            id: arg(0, "<id> <x> <y>")?,
            x: num(1, "<x>")?,
            y: num(2, "<y>")?,
        }),
        "connect" => Ok(Command::Connect {
            source: arg(0, "<source> <target>")?,
            target: arg(1, "<source> <target>")?,
        }),
        "delete-node" => Ok(Command::DeleteNode {
            id: arg(0, "<id>")?,
        }),
        "delete-edge" => Ok(Command::DeleteEdge {
            id: arg(0, "<id>")?,
        }),
        "layout" => match arg(0, "lr|tb")?.as_str() {
            "lr" => Ok(Command::Layout {
                direction: Direction::LeftRight,
            }),
            "tb" => Ok(Command::Layout {
                direction: Direction::TopBottom,
            }),
            other => Err(format!("unknown direction {other:?}, expected lr or tb")),
        },
        "spacing" => Ok(Command::Spacing {
            rank: num(0, "<rank>")?,
            node: num(1, "<node>")?,
        }),
        "toggle-edges" => Ok(Command::ToggleEdges),
        "load" => Ok(Command::Load),
        "save" => Ok(Command::Save),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command {other:?}, try help")),
    }
}

fn print_help() {
    println!(
        "commands:\n  \
         show                          print nodes and edges\n  \
         add-worker | add-topic        add a node\n  \
         rename <id> <label>           relabel a node\n  \
         set-meta <id> <text>          worker metadata\n  \
         set-server <id> <server>      worker bootstrap server\n  \
         set-timeout <id> [seconds]    worker timeout (omit to clear)\n  \
         move <id> <x> <y>             reposition a node\n  \
         connect <source> <target>     add an edge (topic->worker = input)\n  \
         delete-node <id>              delete a node (confirms)\n  \
         delete-edge <id>              delete an edge (confirms)\n  \
         layout lr|tb                  recompute the layout\n  \
         spacing <rank> <node>         layout spacing (100-500)\n  \
         toggle-edges                  flip edge rendering style\n  \
         load | save                   sync with the config service\n  \
         quit"
    );
}

fn print_graph<S: ConfigStore, F: Frontend>(editor: &Editor<S, F>) {
    let graph = editor.graph();
    let params = editor.spacing();
    println!(
        "direction={:?} rank_spacing={:.0} node_spacing={:.0} edge_style={}",
        editor.direction(),
        params.rank_spacing,
        params.node_spacing,
        editor.default_style()
    );
    println!("nodes ({}):", graph.node_count());
    for node in graph.nodes() {
        match node.kind {
            NodeKind::Worker => {
                let worker = node.worker.as_ref();
                let server = worker.map(|w| w.bootstrap_server.as_str()).unwrap_or("");
                let timeout = worker
                    .and_then(|w| w.timeout_seconds)
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {:<14} worker  {:?}  server={server} timeout={timeout} at ({:.0}, {:.0})",
                    node.id, node.label, node.position.x, node.position.y
                );
            }
            NodeKind::Topic => {
                println!(
                    "  {:<14} topic   {:?}  at ({:.0}, {:.0})",
                    node.id, node.label, node.position.x, node.position.y
                );
            }
        }
    }
    println!("edges ({}):", graph.edge_count());
    for edge in graph.edges() {
        println!(
            "  {:<30} {} -> {}  [{}]",
            edge.id, edge.source, edge.target, edge.style
        );
    }
}

fn prompt(text: &str) -> std::io::Result<()> {
    print!("{text}");
    std::io::stdout().flush()
}

type InputLines = Lines<BufReader<Stdin>>;

async fn confirm(lines: &mut InputLines, question: &str) -> crate::Result<bool> {
    prompt(&format!("{question} [y/N] "))?;
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Read commands until quit/EOF, dispatching against the controller.
pub async fn run_session<S: ConfigStore, F: Frontend>(
    editor: &mut Editor<S, F>,
) -> crate::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_help();

    loop {
        prompt("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        match command {
            Command::Help => print_help(),
            Command::Show => print_graph(editor),
            Command::AddWorker => {
                let id = editor.add_worker();
                println!("added {id}");
            }
            Command::AddTopic => {
                let id = editor.add_topic();
                println!("added {id}");
            }
            Command::Rename { id, label } => editor.rename(&id, &label),
            Command::SetMeta { id, text } => editor.set_metadata(&id, &text),
            Command::SetServer { id, server } => editor.set_bootstrap_server(&id, &server),
            Command::SetTimeout { id, seconds } => editor.set_timeout(&id, seconds),
            Command::Move { id, x, y } => editor.move_node(&id, x, y),
            Command::Connect { source, target } => editor.connect(&source, &target),
            Command::DeleteNode { id } => {
                if let Some(question) = editor.request_delete_node(&id) {
                    if confirm(&mut lines, &question).await? {
                        editor.confirm_pending();
                    } else {
                        editor.cancel_pending();
                    }
                }
            }
            Command::DeleteEdge { id } => {
                if let Some(question) = editor.request_delete_edge(&id) {
                    if confirm(&mut lines, &question).await? {
                        editor.confirm_pending();
                    } else {
                        editor.cancel_pending();
                    }
                }
            }
            Command::Layout { direction } => editor.relayout(direction),
            Command::Spacing { rank, node } => editor.set_spacing(rank, node),
            Command::ToggleEdges => {
                let style = editor.toggle_edge_style();
                println!("edge style: {style}");
            }
            Command::Load => editor.load().await,
            Command::Save => {
                if confirm(&mut lines, "save the current graph?").await? {
                    editor.save().await;
                }
            }
            Command::Quit => break,
        }
    }

    Ok(())
}
