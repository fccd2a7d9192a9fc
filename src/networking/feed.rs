use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};
use super::queue::PresenceSender;
use super::wire::decode_message;

/// Counters for one run of [`pump_lines`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub delivered: usize,
    pub malformed: usize,
}

/// Read newline-delimited presence messages and forward them to the room.
///
/// Malformed lines are logged and skipped. Returns when the input ends or
/// the room stops listening.
pub async fn pump_lines<R>(reader: R, sender: PresenceSender) -> anyhow::Result<FeedStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = FeedStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match decode_message(&line) {
            Ok(event) => {
                if sender.send(event).is_err() {
                    info!("Presence queue closed, stopping feed");
                    break;
                }
                stats.delivered += 1;
            }
            Err(e) => {
                warn!("Skipping malformed presence message: {}", e);
                stats.malformed += 1;
            }
        }
    }

    info!("Presence feed finished: {} delivered, {} malformed", stats.delivered, stats.malformed);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networking::queue::presence_channel;
    use crate::world::PresenceEvent;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_pump_lines_skips_bad_input() {
        let input = concat!(
            "{\"type\":\"join\",\"id\":\"alice\"}\n",
            "\n",
            "garbage\n",
            "{\"type\":\"positions\",\"peers\":{\"alice\":{\"position\":[1,0,1],\"rotation\":[0,0,0,1]}}}\n",
            "{\"type\":\"leave\",\"id\":\"alice\"}\n",
        );
        let (sender, receiver) = presence_channel();

        let stats = pump_lines(BufReader::new(input.as_bytes()), sender).await.unwrap();
        assert_eq!(stats, FeedStats { delivered: 3, malformed: 1 });

        let events = receiver.drain();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], PresenceEvent::Joined("alice".into()));
        assert_eq!(events[2], PresenceEvent::Left("alice".into()));
    }
}
