use std::time::Duration;

use futures::{Stream, StreamExt};
use prettytable::Table;

/// Discord rejects message content longer than this.
const MESSAGE_LIMIT: usize = 2000;
/// Room left for the "and N more" note.
const NOTE_ROOM: usize = 64;

/// Renders a table in a code block under `header`, dropping rows from the bottom until the
/// message fits into a single Discord message.
pub fn table_message(header: &str, mut table: Table) -> String {
    let mut dropped = 0;

    loop {
        let rendered = format!("{}\n```\n{}\n```", header, table);
        if rendered.len() + NOTE_ROOM <= MESSAGE_LIMIT || table.len() == 0 {
            return match dropped {
                0 => rendered,
                n => format!("{}\n...and {} more. Narrow down your search to see them.", rendered, n),
            };
        }

        table.remove_row(table.len() - 1);
        dropped += 1;
    }
}

/// Waits for the next item of `stream`, giving up once it has been quiet for `idle`.
///
/// The clock restarts on every item, unlike a collector timeout which counts from the start.
pub async fn next_within<S>(stream: &mut S, idle: Duration) -> Option<S::Item>
where
    S: Stream + Unpin,
{
    tokio::time::timeout(idle, stream.next()).await.ok().flatten()
}

#[cfg(test)]
mod tests {
    use futures::stream;
    use prettytable::row;

    use super::*;

    #[test]
    fn small_tables_are_left_alone() {
        let mut table = Table::new();
        table.set_titles(row!["No.", "Name"]);
        table.add_row(row![1, "Asha"]);

        let message = table_message("Players", table);

        assert!(message.starts_with("Players\n```\n"));
        assert!(message.contains("Asha"));
        assert!(!message.contains("more."));
    }

    #[test]
    fn long_tables_are_cut_to_fit() {
        let mut table = Table::new();
        table.set_titles(row!["No.", "Name"]);
        for i in 0..500 {
            table.add_row(row![i + 1, format!("Player number {}", i + 1)]);
        }

        let message = table_message("Players", table);

        assert!(message.len() <= MESSAGE_LIMIT);
        assert!(message.contains("Player number 1 "));
        assert!(message.contains("more. Narrow down your search"));
    }

    #[tokio::test]
    async fn idle_clock_restarts_on_every_item() {
        let mut slow = Box::pin(stream::unfold(0, |i| async move {
            if i == 4 {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(40)).await;
            Some((i, i + 1))
        }));

        let mut seen = Vec::new();
        while let Some(i) = next_within(&mut slow, Duration::from_millis(200)).await {
            seen.push(i);
        }

        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn quiet_streams_time_out() {
        let mut quiet = stream::pending::<u8>();

        assert_eq!(next_within(&mut quiet, Duration::from_millis(20)).await, None);
    }
}
