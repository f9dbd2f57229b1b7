//! Line source.
//!
//! Yields one [`InputRecord`] per input line, reading the configured paths in order and
//! falling back to standard input when none are given (`-` also means standard input).
//! Paths that cannot be opened and streams that fail mid-read are reported and skipped;
//! they never stop intake.
use std::{collections::VecDeque, path::PathBuf};

use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
};
use tracing::{trace, warn};

use fanout_model::InputRecord;

type Stream = Box<dyn AsyncBufRead + Unpin + Send>;

enum Input {
    Stdin,
    Path(PathBuf),
    Reader(String, Stream),
}

impl Input {
    fn name(&self) -> String {
        match self {
            Input::Stdin => "<stdin>".to_string(),
            Input::Path(p) => p.display().to_string(),
            Input::Reader(name, _) => name.clone(),
        }
    }
}

pub struct LineSource {
    pending: VecDeque<Input>,
    current: Option<(String, Stream)>,
    buf: Vec<u8>,
}

impl LineSource {
    /// Reads `paths` in order, or standard input when `paths` is empty.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut pending: VecDeque<Input> = paths
            .into_iter()
            .map(Into::into)
            .map(|p: PathBuf| {
                if p.as_os_str() == "-" {
                    Input::Stdin
                } else {
                    Input::Path(p)
                }
            })
            .collect();
        if pending.is_empty() {
            pending.push_back(Input::Stdin);
        }
        Self::with_inputs(pending)
    }

    /// Reads from an already opened stream.
    pub fn from_reader<R>(name: impl Into<String>, reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self::with_inputs(VecDeque::from([Input::Reader(
            name.into(),
            Box::new(reader),
        )]))
    }

    /// Queues another stream after the ones already configured.
    pub fn chain_reader<R>(mut self, name: impl Into<String>, reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        self.pending
            .push_back(Input::Reader(name.into(), Box::new(reader)));
        self
    }

    fn with_inputs(pending: VecDeque<Input>) -> Self {
        Self {
            pending,
            current: None,
            buf: Vec::new(),
        }
    }

    /// Next record, or `None` once every stream is exhausted.
    pub async fn next(&mut self) -> Option<InputRecord> {
        loop {
            if let Some((name, stream)) = self.current.as_mut() {
                self.buf.clear();
                match stream.read_until(b'\n', &mut self.buf).await {
                    Ok(0) => {
                        trace!(target: "fanout.core.source", input = %name, "input exhausted");
                        self.current = None;
                    }
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&self.buf);
                        return Some(InputRecord::from_line(&line));
                    }
                    Err(e) => {
                        warn!(target: "fanout.core.source", input = %name, error = %e, "read failed; skipping rest of input");
                        self.current = None;
                    }
                }
                continue;
            }

            let input = self.pending.pop_front()?;
            self.current = open(input).await;
        }
    }
}

async fn open(input: Input) -> Option<(String, Stream)> {
    let name = input.name();
    let stream: Stream = match input {
        Input::Stdin => Box::new(BufReader::new(tokio::io::stdin())),
        Input::Reader(_, reader) => reader,
        Input::Path(path) => match File::open(&path).await {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                warn!(target: "fanout.core.source", input = %name, error = %e, "cannot open input; skipping");
                return None;
            }
        },
    };
    trace!(target: "fanout.core.source", input = %name, "reading input");
    Some((name, stream))
}
