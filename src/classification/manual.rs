/*!
 * Deciders that do not call a model.
 *
 * `ManualDecider` shows each segment to an operator and reads a one-letter
 * answer; `FixedDecider` always returns the defaults, which keeps every
 * segment as-is.
 */

use async_trait::async_trait;
use log::warn;
use std::io::{BufRead, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream, Stderr};
use tokio::runtime::Handle;
use tokio::sync::Mutex;

use super::{DecisionRequest, SegmentDecider, TopicDecision};

/// Invalid answers accepted before falling back to defaults
const MAX_PROMPT_ATTEMPTS: usize = 3;

/// In-memory buffer between the input thread and the decider
const INPUT_BUFFER_BYTES: usize = 4096;

/// Operator answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Same,
    Different,
    Quit,
}

impl Answer {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "s" | "same" => Some(Self::Same),
            "d" | "different" => Some(Self::Different),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

struct Console<R, W> {
    input: R,
    output: W,
}

/// Interactive decider driven by an operator.
///
/// Answering `q` raises the shared cancel flag so the pipeline stops before
/// the next segment.
pub struct ManualDecider<R, W> {
    console: Mutex<Console<R, W>>,
    cancel: Arc<AtomicBool>,
}

impl ManualDecider<BufReader<DuplexStream>, Stderr> {
    /// Decider reading answers from stdin and prompting on stderr
    pub fn stdio(cancel: Arc<AtomicBool>) -> std::io::Result<Self> {
        let input = spawn_line_reader(std::io::stdin())?;
        Ok(Self::new(input, tokio::io::stderr(), cancel))
    }
}

/// Async reader fed line by line from `source` on a dedicated thread.
///
/// The thread is detached: a read blocked on the terminal never holds up
/// runtime shutdown after Ctrl-C. The reader sees EOF once `source` ends.
pub fn spawn_line_reader<S>(source: S) -> std::io::Result<BufReader<DuplexStream>>
where
    S: Read + Send + 'static,
{
    let handle = Handle::try_current().map_err(std::io::Error::other)?;
    let (mut writer, reader) = tokio::io::duplex(INPUT_BUFFER_BYTES);

    std::thread::Builder::new()
        .name("manual-input".to_string())
        .spawn(move || {
            for line in std::io::BufReader::new(source).lines() {
                let Ok(line) = line else { break };
                let forwarded = handle.block_on(writer.write_all(format!("{}\n", line).as_bytes()));
                if forwarded.is_err() {
                    break;
                }
            }
        })?;

    Ok(BufReader::new(reader))
}

impl<R, W> ManualDecider<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W, cancel: Arc<AtomicBool>) -> Self {
        Self {
            console: Mutex::new(Console { input, output }),
            cancel,
        }
    }

    async fn ask(console: &mut Console<R, W>, request: &DecisionRequest<'_>) -> std::io::Result<Option<Answer>> {
        let next_title = request.next.map(|s| s.title.as_str()).unwrap_or("(none)");
        let text = format!(
            "\n--- Segment {}/{} ---\n{}\n{}\n--- Next: {} ---\n",
            request.segment_number,
            request.total_segments,
            request.current.title,
            request.current.body.trim_end(),
            next_title
        );
        console.output.write_all(text.as_bytes()).await?;

        for _ in 0..MAX_PROMPT_ATTEMPTS {
            console
                .output
                .write_all(b"Same topic as next [s], different [d], quit [q]: ")
                .await?;
            console.output.flush().await?;

            let mut line = String::new();
            if console.input.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            if let Some(answer) = Answer::parse(&line) {
                return Ok(Some(answer));
            }
            console.output.write_all(b"Please answer s, d or q.\n").await?;
        }
        Ok(None)
    }
}

#[async_trait]
impl<R, W> SegmentDecider for ManualDecider<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn decide(&self, request: DecisionRequest<'_>) -> TopicDecision {
        let mut console = self.console.lock().await;

        match Self::ask(&mut console, &request).await {
            Ok(Some(Answer::Same)) => TopicDecision {
                reasoning: "Marked as same topic by operator".to_string(),
                ..TopicDecision::default()
            },
            Ok(Some(Answer::Different)) => TopicDecision {
                different: true,
                reasoning: "Marked as different topic by operator".to_string(),
                ..TopicDecision::default()
            },
            Ok(Some(Answer::Quit)) => {
                self.cancel.store(true, Ordering::SeqCst);
                TopicDecision {
                    reasoning: "Operator quit".to_string(),
                    ..TopicDecision::default()
                }
            }
            Ok(None) => {
                warn!("Segment #{}: no usable operator answer, using defaults", request.segment_number);
                TopicDecision::fallback("No operator answer")
            }
            Err(e) => {
                warn!("Segment #{}: console error, using defaults: {}", request.segment_number, e);
                TopicDecision::fallback(format!("Console error: {}", e))
            }
        }
    }

    fn source_name(&self) -> String {
        "manual".to_string()
    }
}

/// Decider that keeps every segment as it is
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDecider;

#[async_trait]
impl SegmentDecider for FixedDecider {
    async fn decide(&self, _request: DecisionRequest<'_>) -> TopicDecision {
        TopicDecision::default()
    }

    fn source_name(&self) -> String {
        "none".to_string()
    }
}
