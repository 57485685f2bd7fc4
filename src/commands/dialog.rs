//! Terminal front end for the selection dialog

use super::{todays_page, Context};
use crate::dialog::{DialogState, SelectionDialog};
use crate::error::ImportError;
use crate::graph::Graph;
use crate::label::{render_label, LabelFields};
use crate::outline::{generate_uid, OutlineNode};
use chrono::{Local, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{debug, info};

const PLACEHOLDER_TEXT: &str = "Importing from Otter...";

fn render(dialog: &SelectionDialog, label: &str) {
    let now = Utc::now();
    println!();
    println!("Page {}", dialog.page() / dialog.page_size() + 1);
    for (i, speech) in dialog.visible().iter().enumerate() {
        let marker = if dialog.selected() == Some(speech.id.as_str()) {
            '*'
        } else {
            ' '
        };
        let text = render_label(
            label,
            &LabelFields {
                title: speech.title.as_deref(),
                summary: speech.summary.as_deref(),
                created_at: speech.created_at,
                link: None,
            },
            &Local,
            now,
        );
        println!("{} {:>2}. {}", marker, i + 1, text);
    }
    if let Some(error) = dialog.error() {
        println!("Error: {}", error);
    }

    let mut actions = vec!["[number] select"];
    if dialog.can_previous() {
        actions.push("[p]revious");
    }
    if dialog.can_next() {
        actions.push("[n]ext");
    }
    if dialog.selected().is_some() {
        actions.push("[i]mport");
    }
    actions.push("[q]uit");
    println!("{}", actions.join("  "));
}

/// Next line of input, or `None` once the dialog is interrupted.
///
/// End of input and read errors close the dialog first, so the transient
/// block is gone whichever way the loop ends.
async fn read_choice<R>(
    dialog: &mut SelectionDialog,
    graph: &dyn Graph,
    lines: &mut Lines<R>,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let cancel = dialog.cancel_token();
    let line = tokio::select! {
        _ = cancel.cancelled() => Ok(None),
        line = lines.next_line() => line,
    };
    match line {
        Ok(Some(line)) => Ok(Some(line)),
        Ok(None) => {
            dialog.cancel(graph).await;
            Ok(None)
        }
        Err(e) => {
            dialog.cancel(graph).await;
            Err(e)
        }
    }
}

/// Run the dialog on `block`, or on a new placeholder block at the end of
/// `parent` (today's daily page by default).
pub(crate) async fn run_dialog(
    ctx: &Context,
    block: Option<String>,
    parent: Option<String>,
) -> anyhow::Result<()> {
    let prefs = ctx.store.try_load()?;
    let importer = ctx.importer(&prefs)?;

    let block_uid = match block {
        Some(uid) => uid,
        None => {
            let parent = match parent {
                Some(uid) => uid,
                None => todays_page(&ctx.graph)?,
            };
            let uid = generate_uid();
            let order = ctx.graph.children_count(&parent).await?;
            let node = OutlineNode {
                uid: Some(uid.clone()),
                ..OutlineNode::leaf(PLACEHOLDER_TEXT)
            };
            ctx.graph.create_block(&parent, &node, order).await?;
            debug!(parent = %parent, uid = %uid, "Created placeholder block");
            uid
        }
    };

    let mut dialog = SelectionDialog::new(block_uid, ctx.config.dialog.page_size);
    let interrupt = {
        let cancel = dialog.cancel_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted");
                cancel.cancel();
            }
        })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    dialog.open();

    loop {
        match dialog.state().clone() {
            DialogState::ListLoading => {
                println!("Loading recordings...");
                dialog.load(&importer).await;
                continue;
            }
            DialogState::ListLoaded => render(&dialog, prefs.label_or_default()),
            DialogState::ListError(message) => {
                println!("Error: {}", message);
                println!("[r]etry  [q]uit");
            }
            DialogState::Closed => break,
            DialogState::Idle | DialogState::Importing => {}
        }

        let line = match read_choice(&mut dialog, &*ctx.graph, &mut lines).await {
            Ok(Some(line)) => line,
            Ok(None) => {
                dialog.cancel(&*ctx.graph).await;
                break;
            }
            Err(e) => {
                interrupt.abort();
                return Err(e.into());
            }
        };

        match line.trim() {
            "q" => dialog.cancel(&*ctx.graph).await,
            "r" => dialog.retry(),
            "p" => dialog.previous(),
            "n" => {
                dialog.next();
            }
            "i" if dialog.selected().is_some() => match dialog.confirm(&importer).await {
                Ok(outcome) => println!(
                    "Imported recording {} as block {} under {}",
                    outcome.id, outcome.block_uid, outcome.target
                ),
                Err(ImportError::Cancelled) => println!("Import cancelled"),
                // Shown inline on the next render
                Err(_) => {}
            },
            other => match other.parse::<usize>() {
                Ok(n) if (1..=dialog.visible().len()).contains(&n) => {
                    let id = dialog.visible()[n - 1].id.clone();
                    dialog.select(&id);
                }
                _ => println!("Unknown choice: {}", other),
            },
        }
    }

    interrupt.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LocalGraph;

    const BLOCK: &str = "dialog001";

    fn graph_with_page() -> LocalGraph {
        let graph = LocalGraph::in_memory();
        graph.ensure_page("page00001", "Inbox").unwrap();
        graph
    }

    async fn open_dialog(graph: &LocalGraph) -> SelectionDialog {
        let node = OutlineNode {
            uid: Some(BLOCK.to_string()),
            ..OutlineNode::leaf(PLACEHOLDER_TEXT)
        };
        graph.create_block("page00001", &node, 0).await.unwrap();
        let mut dialog = SelectionDialog::new(BLOCK, 10);
        dialog.open();
        dialog
    }

    #[tokio::test]
    async fn test_read_choice_returns_line() {
        let graph = graph_with_page();
        let mut dialog = open_dialog(&graph).await;
        let mut lines = BufReader::new(&b"2\n"[..]).lines();

        let line = read_choice(&mut dialog, &graph, &mut lines).await.unwrap();

        assert_eq!(line.as_deref(), Some("2"));
        assert_eq!(dialog.state(), &DialogState::ListLoading);
        assert!(graph.text_of(BLOCK).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_end_of_input_closes_dialog() {
        let graph = graph_with_page();
        let mut dialog = open_dialog(&graph).await;
        let mut lines = BufReader::new(&b""[..]).lines();

        let line = read_choice(&mut dialog, &graph, &mut lines).await.unwrap();

        assert!(line.is_none());
        assert_eq!(dialog.state(), &DialogState::Closed);
        assert!(graph.text_of(BLOCK).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_error_removes_transient_block() {
        let graph = graph_with_page();
        let mut dialog = open_dialog(&graph).await;
        // Not UTF-8, so reading the line fails
        let mut lines = BufReader::new(&b"\xff\xfe\n"[..]).lines();

        let result = read_choice(&mut dialog, &graph, &mut lines).await;

        assert!(result.is_err());
        assert_eq!(dialog.state(), &DialogState::Closed);
        assert!(dialog.cancel_token().is_cancelled());
        assert!(graph.text_of(BLOCK).unwrap().is_none());
        assert_eq!(graph.children_count("page00001").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_interrupt_ends_reading() {
        let graph = graph_with_page();
        let mut dialog = open_dialog(&graph).await;
        dialog.cancel_token().cancel();
        let (_writer, reader) = tokio::io::duplex(64);
        let mut lines = BufReader::new(reader).lines();

        let line = read_choice(&mut dialog, &graph, &mut lines).await.unwrap();

        assert!(line.is_none());
    }
}
