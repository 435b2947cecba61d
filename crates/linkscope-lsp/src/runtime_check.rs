//! Best-effort runtime check.
//!
//! Runs the document with the Links interpreter on a worker thread and turns
//! a reported runtime error into a diagnostic. The check never fails loudly:
//! a missing interpreter, a timeout or output that does not match yields no
//! diagnostics.

use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use linkscope_common::diagnostics::diagnostic_messages;
use linkscope_common::limits::{MAX_RUNTIME_OUTPUT_BYTES, RUNTIME_CHECK_POLL_MS};
use linkscope_common::position::{byte_to_utf16_column, utf16_len};
use linkscope_common::{LineMap, Range, RuntimeCheckOptions};
use memchr::memmem;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::diagnostics::LspDiagnostic;

static ERROR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:\*\*\*\s*)?(?:Runtime|Fatal) error\s*:\s*(?P<message>.*?)\s*$")
        .expect("valid regex")
});
static LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bline\s+(?P<line>\d+)").expect("valid regex"));
static EXPRESSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)In expression:\s*(?P<expr>.+?)\s*$").expect("valid regex"));

/// Extra time granted to the worker on top of the interpreter timeout.
const WAIT_GRACE: Duration = Duration::from_millis(500);

/// A runtime error reported by the interpreter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeError {
    pub message: String,
    /// 1-based editor line.
    pub line: Option<u32>,
    pub expression: Option<String>,
}

/// Extract the first runtime error from interpreter output.
pub fn parse_runtime_output(output: &str) -> Option<RuntimeError> {
    let captures = ERROR_RE.captures(output)?;
    let message = captures.name("message")?.as_str().to_string();
    let line = LINE_RE
        .captures(output)
        .and_then(|c| c.name("line")?.as_str().parse().ok());
    let expression = EXPRESSION_RE
        .captures(output)
        .and_then(|c| c.name("expr"))
        .map(|m| m.as_str().to_string());
    Some(RuntimeError {
        message,
        line,
        expression,
    })
}

/// Range of the failing expression: on the reported line when there is one,
/// anywhere in the document otherwise.
pub fn locate_runtime_error(error: &RuntimeError, source: &str, line_map: &LineMap) -> Option<Range> {
    let expression = error.expression.as_deref()?.lines().next()?.trim();
    if expression.is_empty() {
        return None;
    }
    let length = utf16_len(expression);

    if let Some(line) = error.line {
        let line = line.checked_sub(1)?;
        let text = line_map.line_text(line as usize, source)?;
        let byte = memmem::find(text.as_bytes(), expression.as_bytes())?;
        return Some(Range::on_line(line, byte_to_utf16_column(text, byte), length));
    }

    let offset = memmem::find(source.as_bytes(), expression.as_bytes())?;
    let start = line_map.offset_to_position(offset as u32, source);
    Some(Range::on_line(start.line, start.character, length))
}

/// Turn interpreter output into at most one diagnostic.
pub fn diagnostics_from_output(output: &str, uri: &str, source: &str) -> Vec<LspDiagnostic> {
    let Some(error) = parse_runtime_output(output) else {
        trace!("no runtime error in interpreter output");
        return Vec::new();
    };
    let line_map = LineMap::build(source);
    let Some(range) = locate_runtime_error(&error, source, &line_map) else {
        debug!(message = %error.message, "runtime error could not be located");
        return Vec::new();
    };
    vec![LspDiagnostic::from_message(
        &diagnostic_messages::RUNTIME_ERROR,
        &[error.message.as_str()],
        range,
        uri,
    )]
}

/// Entry point for starting runtime checks.
pub struct RuntimeCheck;

impl RuntimeCheck {
    /// Start the interpreter on a copy of `source`. Structural diagnostics do
    /// not wait for this.
    pub fn spawn(options: &RuntimeCheckOptions, uri: &str, source: &str) -> PendingRuntimeCheck {
        let (tx, rx) = mpsc::channel();
        let timeout = Duration::from_millis(options.timeout_ms);
        let command = options.command.clone();
        let args = options.args.clone();
        let program = source.to_string();

        let spawned = thread::Builder::new()
            .name("linkscope-runtime-check".to_string())
            .spawn(move || {
                let output = run_interpreter(&command, &args, &program, timeout);
                let _ = tx.send(output);
            });
        if let Err(err) = spawned {
            debug!(error = %err, "could not start runtime check worker");
        }

        PendingRuntimeCheck {
            receiver: rx,
            wait_limit: timeout + WAIT_GRACE,
            uri: uri.to_string(),
            source: source.to_string(),
        }
    }
}

/// A runtime check in flight.
pub struct PendingRuntimeCheck {
    receiver: Receiver<Option<String>>,
    wait_limit: Duration,
    uri: String,
    source: String,
}

impl PendingRuntimeCheck {
    /// Block until the interpreter finishes. Any failure yields no
    /// diagnostics.
    pub fn wait(self) -> Vec<LspDiagnostic> {
        match self.receiver.recv_timeout(self.wait_limit) {
            Ok(Some(output)) => diagnostics_from_output(&output, &self.uri, &self.source),
            Ok(None) => Vec::new(),
            Err(err) => {
                debug!(error = %err, "runtime check produced no result");
                Vec::new()
            }
        }
    }
}

/// Run the interpreter with a hard wall-clock cap. Returns the combined
/// stdout and stderr, or `None` on spawn failure or timeout.
fn run_interpreter(command: &str, args: &[String], source: &str, timeout: Duration) -> Option<String> {
    let mut file = tempfile::Builder::new()
        .prefix("linkscope-")
        .suffix(".links")
        .tempfile()
        .map_err(|err| debug!(error = %err, "could not create temporary document"))
        .ok()?;
    file.write_all(source.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|err| debug!(error = %err, "could not write temporary document"))
        .ok()?;

    let mut child = Command::new(command)
        .args(args)
        .arg(file.path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| debug!(command, error = %err, "could not start interpreter"))
        .ok()?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_reader = thread::spawn(move || read_limited(stdout));
    let stderr_reader = thread::spawn(move || read_limited(stderr));

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                trace!(%status, "interpreter exited");
                break;
            }
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                debug!(timeout_ms = timeout.as_millis() as u64, "interpreter timed out");
                return None;
            }
            Ok(None) => thread::sleep(Duration::from_millis(RUNTIME_CHECK_POLL_MS)),
            Err(err) => {
                let _ = child.kill();
                debug!(error = %err, "could not poll interpreter");
                return None;
            }
        }
    }

    let mut output = stdout_reader.join().unwrap_or_default();
    output.push_str(&stderr_reader.join().unwrap_or_default());
    Some(output)
}

/// Read up to `MAX_RUNTIME_OUTPUT_BYTES`, then drain the rest so the child
/// never blocks on a full pipe.
fn read_limited<R: Read>(reader: Option<R>) -> String {
    let Some(mut reader) = reader else {
        return String::new();
    };
    let mut buffer = Vec::new();
    let _ = (&mut reader)
        .take(MAX_RUNTIME_OUTPUT_BYTES as u64)
        .read_to_end(&mut buffer);
    let _ = io::copy(&mut reader, &mut io::sink());
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runtime_error_with_line_and_expression() {
        let output = "*** Runtime error: hd of empty list\nline 3\nIn expression: hd([])\n";
        let error = parse_runtime_output(output).unwrap();
        assert_eq!(error.message, "hd of empty list");
        assert_eq!(error.line, Some(3));
        assert_eq!(error.expression.as_deref(), Some("hd([])"));
    }

    #[test]
    fn test_parse_fatal_error_without_line() {
        let output = "*** Fatal error : division by zero\nIn expression: 1 / 0.\n";
        let error = parse_runtime_output(output).unwrap();
        assert_eq!(error.message, "division by zero");
        assert_eq!(error.line, None);
    }

    #[test]
    fn test_unrelated_output_is_ignored() {
        assert!(parse_runtime_output("hello world\n").is_none());
        assert!(diagnostics_from_output("ok", "file:///a.links", "print(\"ok\")").is_empty());
    }

    #[test]
    fn test_locate_on_reported_line() {
        let source = "var xs = [];\nvar y = 1;\nprint(hd(xs))\n";
        let line_map = LineMap::build(source);
        let error = RuntimeError {
            message: "hd of empty list".to_string(),
            line: Some(3),
            expression: Some("hd(xs)".to_string()),
        };
        assert_eq!(
            locate_runtime_error(&error, source, &line_map),
            Some(Range::on_line(2, 6, 6))
        );

        let wrong_line = RuntimeError {
            line: Some(1),
            ..error.clone()
        };
        assert_eq!(locate_runtime_error(&wrong_line, source, &line_map), None);

        let no_line = RuntimeError { line: None, ..error };
        assert_eq!(
            locate_runtime_error(&no_line, source, &line_map),
            Some(Range::on_line(2, 6, 6))
        );
    }

    #[test]
    fn test_missing_interpreter_yields_nothing() {
        let options = RuntimeCheckOptions {
            enabled: true,
            command: "linkscope-no-such-interpreter".to_string(),
            args: Vec::new(),
            timeout_ms: 2_000,
        };
        let pending = RuntimeCheck::spawn(&options, "file:///a.links", "print(1)\n");
        assert!(pending.wait().is_empty());
    }

    #[cfg(unix)]
    fn shell(script: &str, timeout_ms: u64) -> RuntimeCheckOptions {
        RuntimeCheckOptions {
            enabled: true,
            command: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            timeout_ms,
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_interpreter_is_killed_at_the_deadline() {
        let started = Instant::now();
        let args = ["-c".to_string(), "sleep 5".to_string()];
        let output = run_interpreter("sh", &args, "1\n", Duration::from_millis(200));
        assert_eq!(output, None);
        assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());

        let started = Instant::now();
        let pending = RuntimeCheck::spawn(&shell("sleep 5", 200), "file:///a.links", "1\n");
        assert!(pending.wait().is_empty());
        assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
    }

    #[cfg(unix)]
    #[test]
    fn test_reported_runtime_error_becomes_a_diagnostic() {
        let script = "printf '%s\\n' '*** Runtime error: hd of empty list' 'In expression: hd(xs)'";
        let pending = RuntimeCheck::spawn(&shell(script, 5_000), "file:///a.links", "print(hd(xs))\n");
        let diagnostics = pending.wait();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Some(4001));
        assert_eq!(diagnostics[0].range, Range::on_line(0, 6, 6));
    }
}
