use super::{RecognitionOutcome, SpeechError, SpeechIo};
use crate::llm::prompts::ConversationTemplates;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio_util::sync::CancellationToken;

/// Terminal stand-in for a microphone and speaker.
///
/// Each captured line is one utterance; replies are printed. End of input
/// cancels `closed` so the caller can shut the loop down.
pub struct ConsoleSpeech<R, W> {
    reader: R,
    writer: W,
    closed: CancellationToken,
}

impl ConsoleSpeech<BufReader<Stdin>, Stdout> {
    pub fn stdio(closed: CancellationToken) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), closed)
    }
}

impl<R, W> ConsoleSpeech<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W, closed: CancellationToken) -> Self {
        Self {
            reader,
            writer,
            closed,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<R, W> SpeechIo for ConsoleSpeech<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn capture(&mut self) -> RecognitionOutcome {
        if let Err(e) = self
            .writer
            .write_all(ConversationTemplates::listening().as_bytes())
            .await
        {
            return RecognitionOutcome::ServiceUnavailable(e.to_string());
        }
        if let Err(e) = self.writer.flush().await {
            return RecognitionOutcome::ServiceUnavailable(e.to_string());
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line).await {
            Ok(0) => {
                log::info!("Console input closed");
                self.closed.cancel();
                RecognitionOutcome::ServiceUnavailable("input closed".to_string())
            }
            Ok(_) => {
                let text = line.trim();
                if text.is_empty() {
                    RecognitionOutcome::NoSpeechDetected
                } else {
                    RecognitionOutcome::recognized(text)
                }
            }
            Err(e) => RecognitionOutcome::ServiceUnavailable(e.to_string()),
        }
    }

    async fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        self.writer
            .write_all(format!("AI: {}\n", text).as_bytes())
            .await?;
        self.writer.flush().await?;
        Ok(())
    }
}
